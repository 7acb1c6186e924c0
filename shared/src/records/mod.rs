//! On-disk record formats exchanged with the solver
//!
//! The solver writes one result file per run; this module decodes and
//! validates those files into [`RunResult`](crate::RunResult) values.

pub mod result_file;

pub use result_file::{decode_result, RawResultFile};
