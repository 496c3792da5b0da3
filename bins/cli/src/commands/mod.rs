//! CLI command handlers.

pub mod bytes;
pub mod config;
pub mod fetch;
pub mod parse;
pub mod validate;

pub use bytes::run_bytes;
pub use config::run_config_show;
pub use fetch::{FetchInput, run_fetch};
pub use parse::run_parse;
pub use validate::run_validate;
