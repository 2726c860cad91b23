//! DsxLens engine - extraction orchestration
//!
//! This crate ties the scanners together:
//! - One-call extraction of a DSX document into a `JobInfo`
//! - Structural validation of the assembled job
//! - Token estimation for downstream budgeting

pub mod extractor;
pub mod validator;
pub mod estimate;

pub use extractor::{extract, DsxExtractor};
pub use validator::Validator;
pub use estimate::{SectionEstimate, TokenEstimate};
