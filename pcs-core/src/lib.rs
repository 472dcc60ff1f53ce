//! PCS Core
//!
//! Core types for the private computation pipeline.
//!
//! This crate contains:
//! - Domain types: the pipeline instance, its stage records and container records
//! - Binary configuration: which binary version each containerized step runs
//! - Constants shared by the stage services

pub mod constants;
pub mod domain;
