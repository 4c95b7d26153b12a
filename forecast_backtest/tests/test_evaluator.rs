use chrono::NaiveDate;
use forecast_backtest::models::{SmoothingConfig, Trend};
use forecast_backtest::{
    Evaluator, EvaluatorConfig, FitOptions, FoldOutcome, ForecastError, ModelConfig, ModelFitError,
    Series,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn ramp(n: usize) -> Series {
    Series::from_values(start(), (0..n).map(|i| 100.0 + i as f64).collect()).unwrap()
}

fn noisy(n: usize, seed: u64) -> Series {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..n)
        .map(|i| 100.0 + 0.3 * i as f64 + rng.gen_range(-2.0..2.0))
        .collect();
    Series::from_values(start(), values).unwrap()
}

fn evaluator(folds: usize, parallel: bool) -> Evaluator {
    Evaluator::new(EvaluatorConfig {
        folds,
        parallel,
        ..Default::default()
    })
}

#[test]
fn test_smoothing_tracks_ramp() {
    let report = evaluator(4, true)
        .evaluate(&ramp(40), &[ModelConfig::exponential_smoothing()])
        .unwrap();

    let scores = report.scores("ETS(additive)").unwrap();
    assert_eq!(scores.len(), 4);
    for (i, record) in scores.iter().enumerate() {
        assert_eq!(record.fold_index, i);
        assert!(record.error() < 1.0, "fold {} error {}", i, record.error());
    }
}

#[test]
fn test_reports_every_model_in_fold_order() {
    let models = vec![
        ModelConfig::exponential_smoothing(),
        ModelConfig::ExponentialSmoothing(SmoothingConfig::new(Trend::None)),
        ModelConfig::arima(1, 1, 1),
    ];
    let report = evaluator(5, true).evaluate(&noisy(120, 1), &models).unwrap();

    assert_eq!(report.folds().len(), 5);
    assert_eq!(
        report.model_names().collect::<Vec<_>>(),
        vec!["ETS(additive)", "ETS(none)", "ARIMA(1,1,1)"]
    );
    for name in report.model_names() {
        let scores = report.scores(name).unwrap();
        let indices: Vec<usize> = scores.iter().map(|r| r.fold_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(scores.iter().all(|r| r.model_name == name));
    }
}

#[test]
fn test_parallel_and_sequential_reports_match() {
    let series = noisy(90, 42);
    let models = vec![
        ModelConfig::exponential_smoothing(),
        ModelConfig::arima(2, 1, 0),
        ModelConfig::arima(0, 1, 1),
    ];
    let parallel = evaluator(4, true).evaluate(&series, &models).unwrap();
    let sequential = evaluator(4, false).evaluate(&series, &models).unwrap();
    let again = evaluator(4, true).evaluate(&series, &models).unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel, again);
}

#[test]
fn test_failure_does_not_affect_other_models() {
    let series = noisy(60, 5);
    let viable = ModelConfig::arima(1, 1, 0);

    let alone = evaluator(3, true).evaluate_one(&series, &viable).unwrap();
    let mixed = evaluator(3, true)
        .evaluate(&series, &[ModelConfig::arima(30, 0, 0), viable.clone()])
        .unwrap();

    assert_eq!(alone.scores("ARIMA(1,1,0)"), mixed.scores("ARIMA(1,1,0)"));

    let failed = mixed.scores("ARIMA(30,0,0)").unwrap();
    assert_eq!(failed.len(), 3);
    assert!(failed.iter().all(|r| r.is_failed()));
    assert!(matches!(
        failed[0].outcome,
        FoldOutcome::Failed {
            reason: ModelFitError::InsufficientObservations { needed: 62, got: 15 }
        }
    ));

    let summary = mixed.summary("ARIMA(30,0,0)").unwrap();
    assert_eq!(summary.failures, 3);
    assert!(summary.mean.is_infinite());
}

#[test]
fn test_timeout_is_recorded_per_fold() {
    let evaluator = Evaluator::new(EvaluatorConfig {
        folds: 3,
        parallel: false,
        fit: FitOptions {
            time_limit: Some(Duration::ZERO),
            ..Default::default()
        },
    });
    let report = evaluator
        .evaluate_one(&noisy(60, 9), &ModelConfig::arima(1, 1, 1))
        .unwrap();
    for record in report.scores("ARIMA(1,1,1)").unwrap() {
        assert_eq!(record.failure(), Some(&ModelFitError::Timeout { limit_ms: 0 }));
    }
}

#[test]
fn test_insufficient_data_is_fatal() {
    let result = evaluator(5, true).evaluate(&ramp(5), &[ModelConfig::exponential_smoothing()]);
    assert!(matches!(result, Err(ForecastError::InsufficientData { .. })));
}

#[test]
fn test_duplicate_names_rejected() {
    let models = vec![ModelConfig::exponential_smoothing(), ModelConfig::exponential_smoothing()];
    let result = evaluator(2, true).evaluate(&ramp(30), &models);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_report_serializes() {
    let report = evaluator(2, false)
        .evaluate_one(&ramp(12), &ModelConfig::arima(30, 0, 0))
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let first = &json["scores"]["ARIMA(30,0,0)"][0];
    assert_eq!(first["fold_index"], 0);
    assert_eq!(first["outcome"]["status"], "failed");
    assert_eq!(first["outcome"]["reason"]["kind"], "insufficient_observations");
}
