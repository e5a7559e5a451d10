pub mod bridge;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod report;
#[cfg(test)]
pub mod test_helpers;
