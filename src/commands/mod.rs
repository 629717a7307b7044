//! Command implementations for the `sentiscope` binary.
//!
//! - **analyze**: classify a single text (sentiment or stance)
//! - **batch**: classify a file of texts in parallel, one JSON line each
//! - **init**: write a default `.sentiscope.toml`

pub mod analyze;
pub mod batch;
pub mod init;

pub use analyze::run_single;
pub use batch::{run_batch, BatchOptions};
pub use init::init_config;
