//! Latency benchmarks for the forecast pipeline.
//!
//! # Benchmarks
//!
//! - `parse_sequence`: Shape validation of a raw request body
//! - `scaler_transform`: Input scaling of a 7x6 window
//! - `predict_linear`: Full pipeline with the linear baseline model
//! - `predict_onnx`: Full pipeline with a real ONNX model
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//!
//! # With a real ONNX model (place test_model.onnx in benches/)
//! cargo bench -- predict_onnx
//! ```

use cashflow_forecast::{
    model::load_model, CashflowPredictor, LinearModel, Scaler, Sequence, NUM_FEATURES,
    SEQUENCE_LENGTH,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn raw_rows() -> Vec<Vec<f64>> {
    (0..SEQUENCE_LENGTH)
        .map(|t| {
            let base = 200_000.0 + t as f64 * 2_500.0;
            vec![base, base * 0.7, base * 0.95, base * 0.68, base * 0.9, base * 0.65]
        })
        .collect()
}

fn input_scaler() -> Scaler {
    Scaler::MinMax {
        scale: vec![4.0e-6; NUM_FEATURES],
        min: vec![0.0; NUM_FEATURES],
    }
}

fn target_scaler() -> Scaler {
    Scaler::Standard {
        mean: vec![60_000.0],
        scale: vec![15_000.0],
    }
}

fn benchmark_preprocessing(c: &mut Criterion) {
    c.bench_function("parse_sequence", |b| {
        b.iter(|| Sequence::parse(black_box(raw_rows())))
    });

    let sequence = Sequence::parse(raw_rows()).unwrap();
    let scaler = input_scaler();
    c.bench_function("scaler_transform", |b| {
        b.iter(|| scaler.transform(black_box(sequence.values())))
    });
}

fn benchmark_predict_linear(c: &mut Criterion) {
    let model = LinearModel::new(vec![vec![0.05; NUM_FEATURES]; SEQUENCE_LENGTH], 0.0).unwrap();
    let predictor =
        CashflowPredictor::new(Box::new(model), input_scaler(), target_scaler()).unwrap();
    let sequence = Sequence::parse(raw_rows()).unwrap();

    c.bench_function("predict_linear", |b| {
        b.iter(|| predictor.predict(black_box(&sequence)))
    });
}

//
// ONNX Benchmarks
//
// Place a model at benches/test_model.onnx to enable.
//

fn benchmark_predict_onnx(c: &mut Criterion) {
    use std::path::PathBuf;

    let model_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("benches")
        .join("test_model.onnx");

    if !model_path.exists() {
        eprintln!(
            "Skipping ONNX benchmarks: model not found at {}",
            model_path.display()
        );
        return;
    }

    let model = load_model(&model_path).unwrap();
    let predictor = CashflowPredictor::new(model, input_scaler(), target_scaler()).unwrap();
    let sequence = Sequence::parse(raw_rows()).unwrap();

    c.bench_function("predict_onnx", |b| {
        b.iter(|| predictor.predict(black_box(&sequence)))
    });
}

criterion_group!(
    benches,
    benchmark_preprocessing,
    benchmark_predict_linear,
    benchmark_predict_onnx,
);
criterion_main!(benches);
