//! Logging setup.
//!
//! The library itself only talks to the `log` facade. Hosts that want the
//! default backend call [`init_logging`] early in `main`.

mod init;

pub use init::{LoggingConfig, init_logging, init_test_logging};
