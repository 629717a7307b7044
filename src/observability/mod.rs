//! Logging setup.
//!
//! Library code only emits `tracing` events; the binary decides where they
//! go by calling [`init_tracing`] once at startup:
//!
//! ```ignore
//! use sentiscope::observability::init_tracing;
//!
//! fn main() {
//!     init_tracing(cli.verbosity);
//!     // ... rest of application
//! }
//! ```
//!
//! Each analyzed request runs inside an `analyze` span carrying its request
//! id and operation, so cache and classifier events can be correlated.

mod logging;

pub use logging::{filter_for_verbosity, init_tracing};
