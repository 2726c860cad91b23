//! DSX document scanning
//!
//! This crate handles:
//! - The pattern catalog for every construct of the DSX grammar
//! - Resolving stage identifiers to names and types
//! - One extractor per job facet (header, parameters, stages, lookups, transforms, ...)
//! - Column recovery from output pins
//! - Flow assembly with a fallback strategy, and the flow graph

pub mod patterns;
pub mod text;
pub mod resolver;
pub mod header;
pub mod parameters;
pub mod columns;
pub mod stages;
pub mod lookups;
pub mod transforms;
pub mod filters;
pub mod specialized;
pub mod flow;
pub mod graph;

pub use resolver::{SymbolTable, UNKNOWN};
pub use header::JobHeader;
pub use columns::ColumnIndex;
pub use stages::{StageContext, StageExtractor, StageSet};
pub use flow::{FlowAssembler, FlowStrategy, LinkRecordStrategy, ParallelListStrategy};
pub use graph::FlowGraph;
