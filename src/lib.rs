pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod logging;
pub mod normalize;
pub mod sinks;
pub mod sources;
pub mod types;
