//! labhost-resources: Desired-state model and reconcile engine
//!
//! A `Resource` is one declarative configuration requirement with an
//! is-present check and an apply-action. The engine walks an ordered list
//! of resources, skips the ones already satisfied, applies the rest, and
//! keeps going past individual failures.

pub mod error;
pub mod file;
pub mod firewall;
pub mod package;
pub mod reconcile;
pub mod report;
pub mod service;
pub mod template;
pub mod traits;
pub mod user;

pub use error::ResourceError;
pub use file::ConfigFile;
pub use firewall::NatMasquerade;
pub use package::AptPackage;
pub use reconcile::reconcile;
pub use report::{CheckReport, Outcome, RunReport};
pub use service::SystemdUnit;
pub use traits::Resource;
pub use user::SystemUser;
