//! Logger initialization.
//!
//! The library itself only emits through the `log` facade, and only at
//! draw-call granularity. Binaries call `init_logging` once to install an
//! `env_logger` backend.

mod init;

pub use init::{init_logging, LoggingConfig};
