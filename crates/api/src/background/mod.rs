//! Background tasks and scheduled jobs.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. Tasks stop when the shutdown receiver fires.

pub mod session_cleanup;
