pub mod analysis;
pub mod config;
pub mod coverage;
pub mod optimizer;
pub mod output;
pub mod pricing;
pub mod schedule;
pub mod server;
pub mod types;
pub mod weights;
