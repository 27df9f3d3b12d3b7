//! # Filament - Data Lineage Engine
//!
//! Filament tracks which program runs read and wrote which data entities, and
//! answers lineage queries over that record: starting from a dataset or
//! stream, it walks out through the runs that touched it, level by level, and
//! returns every access relation it found inside a time window.
//!
//! ## Quick Start
//!
//! ```rust
//! use filament::{
//!     now_millis, AccessLog, AccessType, DataId, LineageEngine, ProgramId, ProgramKind,
//!     RunId, RunRef, RunRegistry,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> filament::Result<()> {
//!     let log = Arc::new(AccessLog::new());
//!     let registry = Arc::new(RunRegistry::new());
//!
//!     // One run of a cleaning job: it reads the raw events and writes the
//!     // cleaned ones.
//!     let cleaner = ProgramId::new("default", "etl", ProgramKind::Job, "clean");
//!     let run = RunRef::new(cleaner, RunId::generate(now_millis()));
//!     registry.record_run(&run);
//!
//!     let raw = DataId::dataset("default", "raw_events");
//!     let clean = DataId::dataset("default", "clean_events");
//!     log.record(&run, &raw, AccessType::Read)?;
//!     log.record(&run, &clean, AccessType::Write)?;
//!
//!     // Walk the lineage of the cleaned dataset over all time.
//!     let engine = LineageEngine::new(log, registry);
//!     let lineage = engine.compute_lineage(&clean, 0, u64::MAX, 3)?;
//!     assert_eq!(lineage.len(), 2);
//!
//!     for relation in &lineage {
//!         println!("{relation}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Run-granular traversal**: the hop unit is a single run, so one noisy
//!   program does not pull its unrelated runs into every result
//! - **Cycle safe**: self-loops, mutual dependencies, and arbitrary graph
//!   shapes all terminate, bounded by the requested level count
//! - **Access merging**: unknown-direction accesses are suppressed once a
//!   concrete read or write is known for the same run and entity
//! - **Workflow rollup**: relations of workflow-launched runs can be
//!   re-attributed to the workflow itself
//! - **Scoped metadata**: user and system metadata per entity, assembled for
//!   everything a run touched
//! - **Thread safe**: the in-memory store and registry take shared references
//!   and synchronize internally
//!
//! ## Workflow rollup
//!
//! Pipelines often run as a workflow that launches member programs; for
//! reporting it is the workflow, not the member, that matters. Passing
//! [`Rollup::Workflow`] to [`LineageEngine::compute_lineage_with`] rewrites
//! each relation of a workflow-launched run onto the workflow's own program
//! and run id, drops the now-meaningless component detail, and merges again
//! on the rewritten keys.

#![warn(missing_docs)]

// ── Core ──────────────────────────────────────────────────────────────────────
// Identities, access relations, errors, and scan bounds.
pub mod entity;
pub mod error;
pub mod relation;
pub mod scan;

// ── Storage & Metadata ───────────────────────────────────────────────────────
// The access log, the run registry, and scoped metadata records.
pub mod metadata;
pub mod registry;
pub mod store;

// ── Engine ───────────────────────────────────────────────────────────────────
pub mod engine;

// ── Stable API ───────────────────────────────────────────────────────────────
// These types form the core stable API surface. Breaking changes follow semver.
pub use engine::{LineageEngine, Rollup};
pub use entity::{
    now_millis, ApplicationId, DataId, DataKind, EntityRef, ProgramId, ProgramKind, RunId, RunRef,
};
pub use error::{FilamentError, Result};
pub use metadata::{MetadataRecord, MetadataScope};
pub use registry::{RunMetadataLookup, RunRegistry};
pub use relation::{
    collapse_unknown_access, AccessType, GraphEdge, GraphNode, Lineage, LineageGraph, Relation,
};
pub use scan::{RunFilter, ScanRange};
pub use store::{AccessLog, RelationReader};

/// Prelude module for convenient imports.
///
/// ```rust
/// use filament::prelude::*;
/// ```
pub mod prelude {
    pub use crate::engine::{LineageEngine, Rollup};
    pub use crate::entity::{DataId, ProgramId, ProgramKind, RunId, RunRef};
    pub use crate::error::{FilamentError, Result};
    pub use crate::registry::RunRegistry;
    pub use crate::relation::{AccessType, Lineage, Relation};
    pub use crate::store::AccessLog;
}
