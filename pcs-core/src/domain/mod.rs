//! Core domain types
//!
//! This module contains the structures shared by the stage services and the CLI.
//! They describe one private computation run and what each stage left behind,
//! without any knowledge of how containers are actually launched.

pub mod binary_config;
pub mod container;
pub mod instance;
pub mod stage_state;
