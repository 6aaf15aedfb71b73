pub mod predictor;
pub mod preprocessor;
