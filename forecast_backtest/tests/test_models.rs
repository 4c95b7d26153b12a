use approx::assert_abs_diff_eq;
use forecast_backtest::models::{ArimaOrder, SmoothingConfig, Trend};
use forecast_backtest::{FitOptions, ForecastModel, ModelConfig, ModelFitError, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

fn noisy_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0;
    (0..n)
        .map(|_| {
            price += rng.gen_range(-1.0..1.0);
            price
        })
        .collect()
}

fn options() -> FitOptions {
    FitOptions {
        time_limit: None,
        ..Default::default()
    }
}

#[rstest]
#[case(ModelConfig::exponential_smoothing())]
#[case(ModelConfig::ExponentialSmoothing(SmoothingConfig::new(Trend::None)))]
#[case(ModelConfig::ExponentialSmoothing(SmoothingConfig::new(Trend::Damped)))]
#[case(ModelConfig::ExponentialSmoothing(SmoothingConfig::seasonal(Trend::Additive, 7)))]
#[case(ModelConfig::arima(0, 0, 0))]
#[case(ModelConfig::arima(1, 1, 1))]
#[case(ModelConfig::arima(2, 1, 2))]
#[case(ModelConfig::arima(1, 2, 0))]
fn test_forecast_has_requested_horizon(#[case] config: ModelConfig) {
    let train = noisy_walk(60, 7);
    let fitted = config.fit(&train, &options()).unwrap();
    let forecast = fitted.forecast(12).unwrap();
    assert_eq!(forecast.horizon(), 12);
    assert_eq!(forecast.values().len(), 12);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_fit_does_not_depend_on_future_values() {
    // The same training window must give the same forecast whatever follows it
    let full = noisy_walk(80, 11);
    let config = ModelConfig::arima(1, 1, 0);

    let a = config.fit(&full[..50], &options()).unwrap().forecast(5).unwrap();
    let mut altered = full.clone();
    for v in altered[50..].iter_mut() {
        *v *= 10.0;
    }
    let b = config.fit(&altered[..50], &options()).unwrap().forecast(5).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_holt_on_linear_ramp() {
    let train: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let forecast = ModelConfig::exponential_smoothing()
        .fit(&train, &options())
        .unwrap()
        .forecast(5)
        .unwrap();
    let actual: Vec<f64> = (30..35).map(|i| 100.0 + i as f64).collect();
    let mae = forecast.mean_absolute_error(&actual).unwrap();
    assert_abs_diff_eq!(mae, 0.0, epsilon = 1e-6);
}

#[test]
fn test_arima_order_too_large_for_sample() {
    let train = noisy_walk(15, 3);
    let err = ModelConfig::arima(30, 0, 0).fit(&train, &options()).unwrap_err();
    assert_eq!(err, ModelFitError::InsufficientObservations { needed: 62, got: 15 });
}

#[test]
fn test_arima_name_and_order() {
    let order = ArimaOrder::new(2, 1, 2);
    assert_eq!(order.name(), "ARIMA(2,1,2)");
    assert_eq!(order.parameter_count(), 5);
    assert_eq!(ModelConfig::Arima(order).to_string(), "ARIMA(2,1,2)");
}

#[test]
fn test_model_config_json_round_trip() {
    let config = ModelConfig::ExponentialSmoothing(SmoothingConfig::seasonal(Trend::Damped, 7));
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(
        json,
        r#"{"family":"exponential_smoothing","trend":"damped","seasonal_period":7}"#
    );
    let back: ModelConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
