use std::sync::atomic::{AtomicU64, Ordering};

/// Records whose identifiers the service allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Job,
    Application,
    Student,
    College,
}

impl RecordKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            RecordKind::Job => "job",
            RecordKind::Application => "app",
            RecordKind::Student => "stu",
            RecordKind::College => "col",
        }
    }
}

/// Allocates identifiers for new records.
pub trait IdSource: Send + Sync {
    fn next_id(&self, kind: RecordKind) -> String;
}

/// Counters owned by one service instance, yielding `job-000001`, `app-000001`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    jobs: AtomicU64,
    applications: AtomicU64,
    students: AtomicU64,
    colleges: AtomicU64,
}

impl SequentialIds {
    fn counter(&self, kind: RecordKind) -> &AtomicU64 {
        match kind {
            RecordKind::Job => &self.jobs,
            RecordKind::Application => &self.applications,
            RecordKind::Student => &self.students,
            RecordKind::College => &self.colleges,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self, kind: RecordKind) -> String {
        let id = self.counter(kind).fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{id:06}", kind.prefix())
    }
}
