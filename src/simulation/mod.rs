pub mod generator;
pub mod market_sample;
