//! labhost-exec: System command execution abstraction
//!
//! Provides the `SystemRunner` trait, a local implementation backed by
//! `tokio::process`, and a scripted fake for testing the configurator
//! without mutating a real host.

pub mod error;
pub mod fake;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use fake::FakeRunner;
pub use local::LocalRunner;
pub use result::CommandResult;
pub use traits::SystemRunner;
