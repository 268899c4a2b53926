use thiserror::Error;

use crate::model::Value;

/// Result type alias using ViewFilterError
pub type Result<T> = std::result::Result<T, ViewFilterError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, log assertions and external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Projection
    ConstructionFailed,
    FieldAccessDenied,
    Introspection,
    ProjectionFailed,

    // Metadata configuration
    DuplicateTag,
    UnknownTag,
    DuplicateClass,
    UnknownClass,
    DuplicateField,
    UnknownField,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ConstructionFailed => "ERR_CONSTRUCTION_FAILED",
            ExErrorKind::FieldAccessDenied => "ERR_FIELD_ACCESS_DENIED",
            ExErrorKind::Introspection => "ERR_INTROSPECTION",
            ExErrorKind::ProjectionFailed => "ERR_PROJECTION_FAILED",
            ExErrorKind::DuplicateTag => "ERR_DUPLICATE_TAG",
            ExErrorKind::UnknownTag => "ERR_UNKNOWN_TAG",
            ExErrorKind::DuplicateClass => "ERR_DUPLICATE_CLASS",
            ExErrorKind::UnknownClass => "ERR_UNKNOWN_CLASS",
            ExErrorKind::DuplicateField => "ERR_DUPLICATE_FIELD",
            ExErrorKind::UnknownField => "ERR_UNKNOWN_FIELD",
        }
    }
}

/// Canonical structured error type
///
/// Flattened, classification-first view of a [`ViewFilterError`], used by the
/// logging macros and by callers that only care about stable codes.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    type_name: Option<String>,
    field: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            type_name: None,
            field: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add type name context
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add field name context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
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

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {})", type_name)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
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

/// Error taxonomy for view filtering
#[derive(Error, Debug, Clone)]
pub enum ViewFilterError {
    // ===== Projection failures =====
    /// A class or container kind has no zero-argument constructor
    #[error("Cannot construct {type_name}: {reason}")]
    ConstructionFailed { type_name: String, reason: String },

    /// A field cannot be read from the source or written to the clone
    #[error("Cannot access field {type_name}.{field}: {reason}")]
    FieldAccessDenied {
        type_name: String,
        field: String,
        reason: String,
    },

    /// Any other failure raised by a metadata or ancestry provider
    #[error("Introspection failed: {reason}")]
    Introspection { reason: String },

    /// Unified failure returned by a projection call
    ///
    /// `object` is the value being processed at the innermost point of
    /// failure; `cause` is the original error.
    #[error("Projection failed on {object:?}: {cause}")]
    ProjectionFailed {
        object: Value,
        #[source]
        cause: Box<ViewFilterError>,
    },

    // ===== Metadata configuration =====
    #[error("View tag already defined: {name}")]
    DuplicateTag { name: String },

    #[error("Unknown view tag: {name}")]
    UnknownTag { name: String },

    #[error("Class already defined: {name}")]
    DuplicateClass { name: String },

    #[error("Unknown class: {name}")]
    UnknownClass { name: String },

    #[error("Field {field} declared twice on {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("Unknown field {field} on {type_name}")]
    UnknownField { type_name: String, field: String },
}

impl ViewFilterError {
    /// Wrap this error as a `ProjectionFailed` naming `object`.
    ///
    /// An error that is already a `ProjectionFailed` is returned unchanged, so
    /// the wrapper always names the innermost value.
    pub fn at(self, object: &Value) -> Self {
        match self {
            ViewFilterError::ProjectionFailed { .. } => self,
            cause => ViewFilterError::ProjectionFailed {
                object: object.clone(),
                cause: Box::new(cause),
            },
        }
    }

    /// The value being processed when a projection failed
    pub fn object(&self) -> Option<&Value> {
        match self {
            ViewFilterError::ProjectionFailed { object, .. } => Some(object),
            _ => None,
        }
    }

    /// The original cause of a projection failure
    pub fn cause(&self) -> Option<&ViewFilterError> {
        match self {
            ViewFilterError::ProjectionFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Convert ViewFilterError to ExError
impl From<ViewFilterError> for ExError {
    fn from(err: ViewFilterError) -> Self {
        let message = err.to_string();
        match err {
            ViewFilterError::ConstructionFailed { type_name, .. } => {
                ExError::new(ExErrorKind::ConstructionFailed)
                    .with_type_name(type_name)
                    .with_message(message)
            }

            ViewFilterError::FieldAccessDenied {
                type_name, field, ..
            } => ExError::new(ExErrorKind::FieldAccessDenied)
                .with_type_name(type_name)
                .with_field(field)
                .with_message(message),

            ViewFilterError::Introspection { .. } => {
                ExError::new(ExErrorKind::Introspection).with_message(message)
            }

            // The failing value is described in `message`; `type_name` only
            // ever carries a class name, taken from the cause.
            ViewFilterError::ProjectionFailed { cause, .. } => {
                let source: ExError = (*cause).into();
                let mut ex = ExError::new(ExErrorKind::ProjectionFailed)
                    .with_op("apply_to")
                    .with_message(message);
                if let Some(type_name) = source.type_name() {
                    ex = ex.with_type_name(type_name);
                }
                ex.with_source(source)
            }

            ViewFilterError::DuplicateTag { .. } => {
                ExError::new(ExErrorKind::DuplicateTag).with_message(message)
            }

            ViewFilterError::UnknownTag { .. } => {
                ExError::new(ExErrorKind::UnknownTag).with_message(message)
            }

            ViewFilterError::DuplicateClass { name } => ExError::new(ExErrorKind::DuplicateClass)
                .with_type_name(name)
                .with_message(message),

            ViewFilterError::UnknownClass { name } => ExError::new(ExErrorKind::UnknownClass)
                .with_type_name(name)
                .with_message(message),

            ViewFilterError::DuplicateField { type_name, field } => {
                ExError::new(ExErrorKind::DuplicateField)
                    .with_type_name(type_name)
                    .with_field(field)
                    .with_message(message)
            }

            ViewFilterError::UnknownField { type_name, field } => {
                ExError::new(ExErrorKind::UnknownField)
                    .with_type_name(type_name)
                    .with_field(field)
                    .with_message(message)
            }
        }
    }
}
