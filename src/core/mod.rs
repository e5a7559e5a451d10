pub mod drawdown;
pub mod firms;
pub mod normalizer;
pub mod sessions;
pub mod stats;
pub mod status;
