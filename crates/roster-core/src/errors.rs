use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Storage
    /// Recorded schema does not match the embedded migrations
    SchemaMismatch,
    Persistence,
    Io,
    /// The store was shut down; no further reads or writes are possible
    StoreClosed,

    // Observation
    SubscriptionClosed,

    // Internal
    Concurrency,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::SchemaMismatch => "ERR_SCHEMA_MISMATCH",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::StoreClosed => "ERR_STORE_CLOSED",
            ExErrorKind::SubscriptionClosed => "ERR_SUBSCRIPTION_CLOSED",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind is a failure of the underlying storage medium
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ExErrorKind::SchemaMismatch
                | ExErrorKind::Persistence
                | ExErrorKind::Io
                | ExErrorKind::StoreClosed
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the operation
/// and entity context needed when reading logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// True for failures of the storage medium (the `StorageError` family)
    pub fn is_storage_error(&self) -> bool {
        self.kind.is_storage()
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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain-level failures raised by the store and the view synchronizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    /// The store has been closed
    #[error("Store is closed")]
    StoreClosed,

    /// The observer was cancelled or its store closed
    #[error("Subscription closed for observer {observer_id}")]
    SubscriptionClosed { observer_id: u64 },

    /// A recorded migration differs from the embedded one
    #[error("Schema mismatch for migration {migration_id}: {reason}")]
    SchemaMismatch {
        migration_id: String,
        reason: String,
    },

    /// The synchronizer task ended abnormally
    #[error("View sync task failed: {message}")]
    SyncTaskFailed { message: String },

    /// A lock guarding shared state was poisoned by a panicking thread
    #[error("Lock poisoned: {what}")]
    LockPoisoned { what: String },
}

impl From<RosterError> for ExError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::StoreClosed => ExError::new(ExErrorKind::StoreClosed)
                .with_message("Store is closed"),

            RosterError::SubscriptionClosed { observer_id } => {
                ExError::new(ExErrorKind::SubscriptionClosed)
                    .with_entity_id(observer_id.to_string())
                    .with_message("Subscription closed")
            }

            RosterError::SchemaMismatch {
                migration_id,
                reason,
            } => ExError::new(ExErrorKind::SchemaMismatch)
                .with_op("migration")
                .with_entity_id(migration_id)
                .with_message(reason),

            RosterError::SyncTaskFailed { message } => ExError::new(ExErrorKind::Internal)
                .with_op("view_sync")
                .with_message(message),

            RosterError::LockPoisoned { what } => ExError::new(ExErrorKind::Concurrency)
                .with_message(format!("Lock poisoned: {}", what)),
        }
    }
}
