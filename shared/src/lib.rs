//! Shared types for the fair routing experiment pipeline
//!
//! Contains the result record model, the solver result-file format and the
//! logging setup used by every pipeline stage.

pub mod errors;
pub mod logging;
pub mod numeric;
pub mod records;
pub mod types;

pub use errors::*;
pub use types::*;

pub use records::{decode_result, RawResultFile};
