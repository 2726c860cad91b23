//! DsxLens Core
//!
//! Core domain model for extracted DSX jobs.
//! Never rename issue codes or serialized labels - they are part of the output format.

pub mod codes;
pub mod model;
pub mod diagnostic;
pub mod metadata;
pub mod config;

pub use codes::{JobType, ParameterType, WriteMode, LookupMethod, ScriptRole, format_column_type, sql_type_name};
pub use model::{
    JobInfo, Parameter, Stage, Source, Target, Transform, Lookup, SqlScript, Filter,
    SpecializedStage, Column, FlowConnection,
};
pub use diagnostic::{Issue, IssueCode, ValidationReport};
pub use metadata::{ExtractionMetadata, FormatVersion};
pub use config::{Config, ConfigError, ExtractionConfig, EstimateConfig, OutputConfig};
