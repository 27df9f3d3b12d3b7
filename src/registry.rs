//! Run records and metadata lookup
//!
//! [`RunMetadataLookup`] is the control-plane boundary next to the relation
//! store: which runs started inside a window, which workflow run launched a
//! given run, and what metadata an entity carries. [`RunRegistry`] is the
//! bundled thread-safe in-memory implementation.

use crate::entity::{EntityRef, ProgramId, RunId, RunRef};
use crate::error::Result;
use crate::metadata::{MetadataRecord, MetadataScope};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Control-plane lookup the engine consults alongside the relation store.
///
/// Unknown runs and entities yield `None` or empty sets; genuine backend
/// failures map onto [`crate::FilamentError::StoreUnavailable`].
pub trait RunMetadataLookup: Send + Sync {
    /// Ids of every known run whose start time falls in `[start, end)`.
    fn runs_in_range(&self, start: u64, end: u64) -> Result<HashSet<RunId>>;

    /// The workflow run that launched `run`, or `None` for standalone runs.
    fn workflow_owner_of(&self, run: &RunRef) -> Result<Option<RunRef>>;

    /// All metadata records for `entity`, across scopes.
    fn metadata_for(&self, entity: &EntityRef) -> Result<HashSet<MetadataRecord>>;
}

#[derive(Debug, Clone)]
struct RunRecord {
    program: ProgramId,
    workflow: Option<RunRef>,
}

#[derive(Debug, Clone, Default)]
struct MetadataEntry {
    properties: BTreeMap<String, String>,
    tags: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct RunRegistryInner {
    // Keyed by RunId, which orders by embedded time; range scans over the
    // key space implement runs_in_range directly.
    runs: BTreeMap<RunId, RunRecord>,
    metadata: HashMap<EntityRef, BTreeMap<MetadataScope, MetadataEntry>>,
}

/// In-memory run records plus entity metadata.
///
/// A run's start time is the timestamp embedded in its [`RunId`], so
/// registering a run needs no separate clock. Workflow-launched runs carry a
/// back-reference to the workflow run that started them.
#[derive(Debug, Default)]
pub struct RunRegistry {
    inner: RwLock<RunRegistryInner>,
}

impl RunRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a run. Re-registering is a no-op.
    pub fn record_run(&self, run: &RunRef) {
        let mut inner = self.inner.write();
        inner.runs.entry(run.run).or_insert_with(|| RunRecord {
            program: run.program.clone(),
            workflow: None,
        });
    }

    /// Registers `member` as launched by the workflow run `workflow`.
    ///
    /// Both runs are registered if they were not already.
    pub fn record_workflow_member(&self, member: &RunRef, workflow: &RunRef) {
        let mut inner = self.inner.write();
        inner
            .runs
            .entry(workflow.run)
            .or_insert_with(|| RunRecord {
                program: workflow.program.clone(),
                workflow: None,
            });
        inner
            .runs
            .entry(member.run)
            .or_insert_with(|| RunRecord {
                program: member.program.clone(),
                workflow: None,
            })
            .workflow = Some(workflow.clone());
    }

    /// Replaces the properties of `entity` in `scope`.
    pub fn set_properties(
        &self,
        scope: MetadataScope,
        entity: &EntityRef,
        properties: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) {
        let mut inner = self.inner.write();
        let entry = inner
            .metadata
            .entry(entity.clone())
            .or_default()
            .entry(scope)
            .or_default();
        entry.properties = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Adds tags to `entity` in `scope`.
    pub fn add_tags(
        &self,
        scope: MetadataScope,
        entity: &EntityRef,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) {
        let mut inner = self.inner.write();
        let entry = inner
            .metadata
            .entry(entity.clone())
            .or_default()
            .entry(scope)
            .or_default();
        entry.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Number of registered runs.
    pub fn run_count(&self) -> usize {
        self.inner.read().runs.len()
    }
}

impl RunMetadataLookup for RunRegistry {
    fn runs_in_range(&self, start: u64, end: u64) -> Result<HashSet<RunId>> {
        if start >= end {
            return Ok(HashSet::new());
        }
        let inner = self.inner.read();
        Ok(inner
            .runs
            .range(RunId::from_parts(start, 0)..RunId::from_parts(end, 0))
            .map(|(id, _)| *id)
            .collect())
    }

    fn workflow_owner_of(&self, run: &RunRef) -> Result<Option<RunRef>> {
        let inner = self.inner.read();
        Ok(inner.runs.get(&run.run).and_then(|record| {
            if record.program == run.program {
                record.workflow.clone()
            } else {
                None
            }
        }))
    }

    fn metadata_for(&self, entity: &EntityRef) -> Result<HashSet<MetadataRecord>> {
        let inner = self.inner.read();
        let Some(scopes) = inner.metadata.get(entity) else {
            return Ok(HashSet::new());
        };
        Ok(scopes
            .iter()
            .map(|(scope, entry)| {
                MetadataRecord::new(
                    entity.clone(),
                    *scope,
                    entry.properties.clone(),
                    entry.tags.clone(),
                )
            })
            .collect())
    }
}
