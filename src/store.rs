//! Relation store: the reader boundary and the in-memory access log
//!
//! [`RelationReader`] is the read-side trait the lineage engine queries;
//! production deployments back it with whatever holds their access history.
//! [`AccessLog`] is the bundled thread-safe in-memory implementation with a
//! writer surface, suitable for tests, tools, and embedded use.
//!
//! # Example
//!
//! ```rust
//! use filament::{AccessLog, AccessType, DataId, ProgramId, ProgramKind, RunId, RunRef};
//!
//! let log = AccessLog::new();
//! let orders = DataId::dataset("default", "orders");
//! let loader = ProgramId::new("default", "shop", ProgramKind::Job, "loader");
//! let run = RunRef::new(loader, RunId::generate(1_000));
//!
//! log.record(&run, &orders, AccessType::Write)?;
//! assert_eq!(log.len(), 1);
//! # Ok::<(), filament::FilamentError>(())
//! ```

use crate::entity::{DataId, EntityRef, ProgramId, RunId, RunRef};
use crate::error::{FilamentError, Result};
use crate::relation::{AccessType, Relation};
use crate::scan::{RunFilter, ScanRange};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Read-only view over recorded access relations.
///
/// Queries are bounded two ways at once: a [`ScanRange`] over run start
/// times and a [`RunFilter`] over run identities. Implementations must honor
/// both. Unknown entities and runs yield empty sets, never errors; genuine
/// backend failures map onto [`FilamentError::StoreUnavailable`].
pub trait RelationReader: Send + Sync {
    /// All relations whose data side (for data entities) or program side
    /// (for programs) matches `entity`, within `range` and passing `filter`.
    ///
    /// Applications never appear in relations, so an application reference
    /// always yields the empty set.
    fn relations_for_entity(
        &self,
        entity: &EntityRef,
        range: ScanRange,
        filter: &RunFilter,
    ) -> Result<HashSet<Relation>>;

    /// Every entity `run` touched: the data entities of its relations plus
    /// the program itself.
    fn entities_for_run(&self, run: &RunRef) -> Result<HashSet<EntityRef>>;
}

#[derive(Debug, Default)]
struct AccessLogInner {
    relations: Vec<Relation>,
    seen: HashSet<Relation>,
    by_data: HashMap<DataId, Vec<usize>>,
    by_program: HashMap<ProgramId, Vec<usize>>,
    by_run: HashMap<RunId, Vec<usize>>,
}

impl AccessLogInner {
    fn push(&mut self, relation: Relation) {
        if !self.seen.insert(relation.clone()) {
            // Re-observing an identical access is a no-op in set terms.
            return;
        }
        let idx = self.relations.len();
        self.by_data
            .entry(relation.data.clone())
            .or_default()
            .push(idx);
        self.by_program
            .entry(relation.program.clone())
            .or_default()
            .push(idx);
        self.by_run.entry(relation.run).or_default().push(idx);
        self.relations.push(relation);
    }
}

/// Append-only, thread-safe in-memory store of access relations.
///
/// Writers may keep appending while queries run; a query observes some
/// point-in-time subset of the log. Relations are deduplicated by value and
/// indexed by data entity, program, and run.
#[derive(Debug, Default)]
pub struct AccessLog {
    inner: RwLock<AccessLogInner>,
}

impl AccessLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one access of `data` by `run`.
    ///
    /// The data entity and the program must live in the same namespace.
    pub fn record(&self, run: &RunRef, data: &DataId, access: AccessType) -> Result<()> {
        self.push(Relation::new(
            data.clone(),
            run.program.clone(),
            access,
            run.run,
        ))
    }

    /// Records one access performed by a named sub-component of the program.
    pub fn record_component(
        &self,
        run: &RunRef,
        data: &DataId,
        access: AccessType,
        component: impl Into<String>,
    ) -> Result<()> {
        self.push(
            Relation::new(data.clone(), run.program.clone(), access, run.run)
                .with_component(component),
        )
    }

    /// Number of distinct relations recorded.
    pub fn len(&self) -> usize {
        self.inner.read().relations.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, relation: Relation) -> Result<()> {
        if relation.data.namespace != relation.program.namespace {
            return Err(FilamentError::NamespaceMismatch {
                data: relation.data.to_string(),
                program: relation.program.to_string(),
            });
        }
        self.inner.write().push(relation);
        Ok(())
    }
}

impl RelationReader for AccessLog {
    fn relations_for_entity(
        &self,
        entity: &EntityRef,
        range: ScanRange,
        filter: &RunFilter,
    ) -> Result<HashSet<Relation>> {
        let inner = self.inner.read();
        let indices = match entity {
            EntityRef::Data(data) => inner.by_data.get(data),
            EntityRef::Program(program) => inner.by_program.get(program),
            EntityRef::Application(_) => None,
        };
        let Some(indices) = indices else {
            return Ok(HashSet::new());
        };
        Ok(indices
            .iter()
            .map(|&i| &inner.relations[i])
            .filter(|rel| range.contains(rel.run.time_millis()) && filter.allows(&rel.run))
            .cloned()
            .collect())
    }

    fn entities_for_run(&self, run: &RunRef) -> Result<HashSet<EntityRef>> {
        let inner = self.inner.read();
        let Some(indices) = inner.by_run.get(&run.run) else {
            return Ok(HashSet::new());
        };
        let mut entities = HashSet::new();
        for &i in indices {
            let rel = &inner.relations[i];
            if rel.program == run.program {
                entities.insert(EntityRef::Data(rel.data.clone()));
                entities.insert(EntityRef::Program(rel.program.clone()));
            }
        }
        Ok(entities)
    }
}
