//! Common test utilities and infrastructure

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{ExperimentWorkspace, TestHelpers};
