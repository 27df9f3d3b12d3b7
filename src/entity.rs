//! Entity identity types
//!
//! Names for everything lineage talks about: datasets and streams
//! ([`DataId`]), programs and their parent applications ([`ProgramId`],
//! [`ApplicationId`]), and single executions ([`RunId`], [`RunRef`]).
//! [`EntityRef`] is the union used for store queries and metadata keys.
//!
//! Run ids embed their creation time in epoch milliseconds together with a
//! process-wide sequence number, so a run's start time can always be
//! recovered from the id alone and ids order chronologically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of data entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataKind {
    /// A stored dataset.
    Dataset,
    /// An event stream.
    Stream,
}

impl DataKind {
    /// Lower-case label used in display forms and graph exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Dataset => "dataset",
            DataKind::Stream => "stream",
        }
    }
}

/// Identifies a dataset or stream by namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataId {
    /// Namespace the entity lives in.
    pub namespace: String,
    /// Entity name, unique within its namespace for its kind.
    pub name: String,
    /// Dataset or stream.
    pub kind: DataKind,
}

impl DataId {
    /// Creates a dataset reference.
    pub fn dataset(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind: DataKind::Dataset,
        }
    }

    /// Creates a stream reference.
    pub fn stream(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind: DataKind::Stream,
        }
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.kind.as_str(), self.namespace, self.name)
    }
}

/// Kind of program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProgramKind {
    /// A batch job, possibly made of named sub-components.
    Job,
    /// A long-running request handler.
    Service,
    /// A background worker.
    Worker,
    /// An orchestrator that launches other programs.
    Workflow,
}

impl ProgramKind {
    /// Lower-case label used in display forms and graph exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramKind::Job => "job",
            ProgramKind::Service => "service",
            ProgramKind::Worker => "worker",
            ProgramKind::Workflow => "workflow",
        }
    }
}

/// Identifies an application: the deployment unit programs belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId {
    /// Namespace the application lives in.
    pub namespace: String,
    /// Application name.
    pub name: String,
}

impl ApplicationId {
    /// Creates an application reference.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Identifies a program inside an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId {
    /// Namespace the program lives in.
    pub namespace: String,
    /// Parent application name.
    pub application: String,
    /// What sort of program this is.
    pub kind: ProgramKind,
    /// Program name, unique within the application for its kind.
    pub name: String,
}

impl ProgramId {
    /// Creates a program reference.
    pub fn new(
        namespace: impl Into<String>,
        application: impl Into<String>,
        kind: ProgramKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            application: application.into(),
            kind,
            name: name.into(),
        }
    }

    /// The parent application of this program.
    pub fn application_id(&self) -> ApplicationId {
        ApplicationId::new(self.namespace.clone(), self.application.clone())
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.namespace,
            self.application,
            self.kind.as_str(),
            self.name
        )
    }
}

/// Any entity lineage or metadata can refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityRef {
    /// A dataset or stream.
    Data(DataId),
    /// A program.
    Program(ProgramId),
    /// An application.
    Application(ApplicationId),
}

impl EntityRef {
    /// The namespace the referenced entity lives in.
    pub fn namespace(&self) -> &str {
        match self {
            EntityRef::Data(d) => &d.namespace,
            EntityRef::Program(p) => &p.namespace,
            EntityRef::Application(a) => &a.namespace,
        }
    }
}

impl From<DataId> for EntityRef {
    fn from(data: DataId) -> Self {
        EntityRef::Data(data)
    }
}

impl From<ProgramId> for EntityRef {
    fn from(program: ProgramId) -> Self {
        EntityRef::Program(program)
    }
}

impl From<ApplicationId> for EntityRef {
    fn from(application: ApplicationId) -> Self {
        EntityRef::Application(application)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Data(d) => d.fmt(f),
            EntityRef::Program(p) => p.fmt(f),
            EntityRef::Application(a) => a.fmt(f),
        }
    }
}

static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identifies one program execution.
///
/// The id embeds the wall-clock time it was generated at, so stores can
/// derive a run's start time without a separate lookup, plus a process-wide
/// sequence number that keeps ids generated within the same millisecond
/// distinct. Ordering is chronological (time, then sequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId {
    time_millis: u64,
    seq: u64,
}

impl RunId {
    /// Mints a new id stamped with `time_millis`.
    pub fn generate(time_millis: u64) -> Self {
        Self {
            time_millis,
            seq: RUN_SEQ.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Reassembles an id from its parts, for fixtures and storage.
    pub fn from_parts(time_millis: u64, seq: u64) -> Self {
        Self { time_millis, seq }
    }

    /// The timestamp embedded at generation time, in epoch milliseconds.
    pub fn time_millis(&self) -> u64 {
        self.time_millis
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:06}", self.time_millis, self.seq)
    }
}

/// One execution of one program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunRef {
    /// The program that ran.
    pub program: ProgramId,
    /// The execution id.
    pub run: RunId,
}

impl RunRef {
    /// Creates a run reference.
    pub fn new(program: ProgramId, run: RunId) -> Self {
        Self { program, run }
    }
}

impl fmt::Display for RunRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.program, self.run)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
