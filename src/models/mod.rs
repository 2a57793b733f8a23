// Decision models built on top of the signals.

pub mod ensemble;

pub use ensemble::{Contributor, Direction, EnsembleModel, Forecast, ForecastExplanation};
