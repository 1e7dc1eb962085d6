pub mod config;
pub mod logging;

pub use config::LedgerConfig;
pub use logging::{init_logging, init_logging_to_dir};
