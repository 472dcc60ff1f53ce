//! PCS Service
//!
//! Stage services of the private computation pipeline.
//!
//! Architecture:
//! - Container: launching, awaiting and stopping worker containers (podman backend)
//! - Sharding: sharder argument building and container launch
//! - Stage: per-stage coordinators that check an instance and delegate to the layers above
//!
//! All layers are trait-based so each one can be replaced by a double in tests.

pub mod config;
pub mod container;
pub mod error;
pub mod sharding;
pub mod stage;

pub use config::Config;
pub use error::{Error, Result};
