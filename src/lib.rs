pub mod artifacts;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod vendor;
