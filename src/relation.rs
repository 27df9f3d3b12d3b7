//! Access relations and lineage results
//!
//! A [`Relation`] is one recorded fact: a run of a program touched a data
//! entity in some direction. A [`Lineage`] is the immutable set of relations
//! a traversal found. This module also hosts the access-merge policy
//! ([`collapse_unknown_access`]) and a serializable node/edge export of a
//! lineage ([`LineageGraph`]).
//!
//! # Features
//!
//! - **Value semantics**: relations hash and compare by content; there is no
//!   access-time field, so re-observing an access changes nothing
//! - **Access merging**: unknown-direction accesses are dropped once a
//!   concrete read or write is known for the same key
//! - **Graph export**: stable, sorted node/edge view for rendering

use crate::entity::{DataId, ProgramId, RunId, RunRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// How a program run touched a data entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessType {
    /// The run read the entity.
    Read,
    /// The run wrote the entity.
    Write,
    /// The run touched the entity but the direction was not recorded.
    Unknown,
}

impl AccessType {
    /// Lower-case label used in display forms and graph exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Read => "read",
            AccessType::Write => "write",
            AccessType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded access: one run of one program touching one data entity.
///
/// Equality covers all five fields. Components name the parts of the program
/// that performed the access (for example the stage of a job); they are part
/// of the identity, so the same access with and without component detail is
/// two distinct relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// The data entity that was accessed.
    pub data: DataId,
    /// The program whose run performed the access.
    pub program: ProgramId,
    /// Direction of the access.
    pub access: AccessType,
    /// The run that performed the access.
    pub run: RunId,
    /// Sub-components of the program that touched the entity, if recorded.
    pub components: BTreeSet<String>,
}

impl Relation {
    /// Creates a relation with no component detail.
    pub fn new(data: DataId, program: ProgramId, access: AccessType, run: RunId) -> Self {
        Self {
            data,
            program,
            access,
            run,
            components: BTreeSet::new(),
        }
    }

    /// Adds a component name.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.insert(component.into());
        self
    }

    /// The run reference this relation belongs to.
    pub fn run_ref(&self) -> RunRef {
        RunRef::new(self.program.clone(), self.run)
    }

    fn key(&self) -> RelationKey {
        RelationKey {
            data: self.data.clone(),
            program: self.program.clone(),
            run: self.run,
            components: self.components.clone(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} in {}", self.program, self.access, self.data, self.run)
    }
}

/// Grouping key for the access-merge policy: a relation minus its access.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RelationKey {
    data: DataId,
    program: ProgramId,
    run: RunId,
    components: BTreeSet<String>,
}

/// Drops `Unknown` accesses that are shadowed by a recorded direction.
///
/// Relations are grouped by (data, program, run, components); within a group
/// an `Unknown` relation survives only when it is the sole access. `Read` and
/// `Write` never shadow each other. The function is pure and idempotent, and
/// is applied once per finished result set, never mid-traversal.
pub fn collapse_unknown_access(relations: HashSet<Relation>) -> HashSet<Relation> {
    let known: HashSet<RelationKey> = relations
        .iter()
        .filter(|r| r.access != AccessType::Unknown)
        .map(Relation::key)
        .collect();
    relations
        .into_iter()
        .filter(|r| r.access != AccessType::Unknown || !known.contains(&r.key()))
        .collect()
}

/// An immutable set of relations, the result of a lineage computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lineage {
    relations: HashSet<Relation>,
}

impl Lineage {
    /// Wraps a set of relations.
    pub fn new(relations: impl IntoIterator<Item = Relation>) -> Self {
        Self {
            relations: relations.into_iter().collect(),
        }
    }

    /// The relations in this lineage.
    pub fn relations(&self) -> &HashSet<Relation> {
        &self.relations
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether the lineage holds no relations.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Iterates over the relations.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// Exports the lineage as a node/edge graph with stable ordering.
    ///
    /// Every distinct data entity and program becomes a node keyed by its
    /// display form; every relation becomes an edge. Writes point program to
    /// data, reads point data to program, unknown accesses follow the write
    /// direction. Nodes and edges come out sorted so serialized output is
    /// reproducible.
    pub fn to_graph(&self) -> LineageGraph {
        let mut nodes = BTreeSet::new();
        let mut edges = BTreeSet::new();
        for relation in &self.relations {
            let data_id = relation.data.to_string();
            let program_id = relation.program.to_string();
            nodes.insert(GraphNode {
                id: data_id.clone(),
                kind: relation.data.kind.as_str().to_string(),
            });
            nodes.insert(GraphNode {
                id: program_id.clone(),
                kind: relation.program.kind.as_str().to_string(),
            });
            let (source, target) = match relation.access {
                AccessType::Read => (data_id, program_id),
                AccessType::Write | AccessType::Unknown => (program_id, data_id),
            };
            edges.insert(GraphEdge {
                source,
                target,
                access: relation.access,
                run: relation.run.to_string(),
            });
        }
        LineageGraph {
            nodes: nodes.into_iter().collect(),
            edges: edges.into_iter().collect(),
        }
    }
}

impl FromIterator<Relation> for Lineage {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Lineage {
    type Item = &'a Relation;
    type IntoIter = std::collections::hash_set::Iter<'a, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.iter()
    }
}

/// Serializable node/edge view of a [`Lineage`], suitable for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageGraph {
    /// Distinct entities and programs, sorted by id.
    pub nodes: Vec<GraphNode>,
    /// One edge per relation, sorted.
    pub edges: Vec<GraphEdge>,
}

/// Node in an exported lineage graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphNode {
    /// Display-form id, also the edge endpoint key.
    pub id: String,
    /// "dataset", "stream", or the program kind.
    pub kind: String,
}

/// Edge in an exported lineage graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Direction of the underlying access.
    pub access: AccessType,
    /// Run that performed the access.
    pub run: String,
}
