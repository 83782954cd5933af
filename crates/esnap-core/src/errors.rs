use thiserror::Error;

/// Result type alias for pure core operations
pub type Result<T> = std::result::Result<T, EsnapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by esnap maps onto one of these kinds. Each kind has
/// a stable code used in CLI output and by tests that assert on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Caller supplied something unusable (bad flag combination, empty uuid)
    InvalidInput,
    /// Generation, manifest, snapshot or file does not exist
    NotFound,
    /// Size or hash of a stored file disagrees with its manifest entry
    IntegrityMismatch,
    /// Filesystem read/write/copy failure
    Io,
    /// Index-name collision while merging metadata
    Conflict,
    /// JSON or pointer bytes could not be decoded or encoded
    Serialization,
    /// Another writer holds the Location, or a generation slot is taken
    Concurrency,
    /// Backup-producing service answered with a non-success status
    RemoteService,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::IntegrityMismatch => "ERR_INTEGRITY_MISMATCH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::RemoteService => "ERR_REMOTE_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields make failures programmatically inspectable, and the
/// context fields (location, snapshot, file, expected/observed) make the
/// rendered message self-explanatory.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    location: Option<String>,
    snapshot_uuid: Option<String>,
    index_name: Option<String>,
    path: Option<String>,
    expected: Option<String>,
    observed: Option<String>,
    status: Option<u16>,
    message: String,
    conflicts: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            location: None,
            snapshot_uuid: None,
            index_name: None,
            path: None,
            expected: None,
            observed: None,
            status: None,
            message: String::new(),
            conflicts: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the Location (repository directory) the operation was scoped to
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add snapshot uuid context
    pub fn with_snapshot_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.snapshot_uuid = Some(uuid.into());
        self
    }

    /// Add index name context
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Add file path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the value a check expected to find
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Add the value a check actually observed
    pub fn with_observed(mut self, observed: impl Into<String>) -> Self {
        self.observed = Some(observed.into());
        self
    }

    /// Add a remote HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the full set of conflicting index names found during a merge
    pub fn with_conflicts(mut self, names: Vec<String>) -> Self {
        self.conflicts = Some(names);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn snapshot_uuid(&self) -> Option<&str> {
        self.snapshot_uuid.as_deref()
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn observed(&self) -> Option<&str> {
        self.observed.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Conflicting index names, if any (populated on Conflict)
    pub fn conflicts(&self) -> Option<&[String]> {
        self.conflicts.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(location) = &self.location {
            write!(f, " (location: {})", location)?;
        }
        if let Some(uuid) = &self.snapshot_uuid {
            write!(f, " (snapshot: {})", uuid)?;
        }
        if let Some(index_name) = &self.index_name {
            write!(f, " (index: {})", index_name)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (file: {})", path)?;
        }
        if let Some(expected) = &self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(observed) = &self.observed {
            write!(f, " (observed: {})", observed)?;
        }
        if let Some(status) = self.status {
            write!(f, " (http status: {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// One index name that both documents define with different folder ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConflict {
    pub index_name: String,
    pub existing_id: String,
    pub incoming_id: String,
}

impl std::fmt::Display for IndexConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (destination id {}, source id {})",
            self.index_name, self.existing_id, self.incoming_id
        )
    }
}

/// Domain failures raised by pure core functions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EsnapError {
    /// No snapshot record with this uuid exists in the document
    #[error("Snapshot not found: {uuid}")]
    SnapshotNotFound { uuid: String },

    /// No snapshot record with this name exists in the document
    #[error("No snapshot named {name}")]
    SnapshotNameNotFound { name: String },

    /// Merging would redefine index names already owned by the destination
    #[error("Snapshot {uuid} conflicts with existing destination indices: {}", render_conflicts(.conflicts))]
    IndexConflicts {
        uuid: String,
        conflicts: Vec<IndexConflict>,
    },
}

fn render_conflicts(conflicts: &[IndexConflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<EsnapError> for ExError {
    fn from(err: EsnapError) -> Self {
        let message = err.to_string();
        match err {
            EsnapError::SnapshotNotFound { uuid } => ExError::new(ExErrorKind::NotFound)
                .with_snapshot_uuid(uuid)
                .with_message(message),
            EsnapError::SnapshotNameNotFound { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }
            EsnapError::IndexConflicts { uuid, conflicts } => {
                let names = conflicts.iter().map(|c| c.index_name.clone()).collect();
                let mut ex = ExError::new(ExErrorKind::Conflict)
                    .with_op("merge_snapshot")
                    .with_snapshot_uuid(uuid)
                    .with_message(message)
                    .with_conflicts(names);
                if let [single] = conflicts.as_slice() {
                    ex = ex.with_index_name(single.index_name.clone());
                }
                ex
            }
        }
    }
}
