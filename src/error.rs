use std::fmt;
use std::path::PathBuf;

/// Main error type for backup operations
#[derive(Debug)]
pub enum BackupError {
    Io {
        source: std::io::Error,
        context: String,
    },
    Config {
        message: String,
        path: Option<PathBuf>,
    },
    /// Source directory is missing or not a directory. The only fatal
    /// input error: the run aborts before any side effect.
    SourceMissing {
        path: PathBuf,
    },
    Snapshot {
        operation: String,
        reason: String,
    },
    Generic {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::Io { context, .. } => {
                write!(f, "IO error during {}", context)
            }
            BackupError::Config { message, path } => {
                if let Some(path) = path {
                    write!(f, "Configuration error in {}: {}", path.display(), message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            BackupError::SourceMissing { path } => {
                write!(f, "Source directory '{}' does not exist", path.display())
            }
            BackupError::Snapshot { operation, reason } => {
                write!(f, "Snapshot error during {}: {}", operation, reason)
            }
            BackupError::Generic { message, .. } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Io { source, .. } => Some(source),
            BackupError::Generic { source, .. } => source
                .as_deref()
                .map(|s| s as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

pub trait ErrorContext<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BackupError::Generic {
            message: f(),
            source: Some(Box::new(e)),
        })
    }

    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BackupError::Io {
            source: e,
            context: f(),
        })
    }
}

impl<T> ErrorContext<T> for std::result::Result<T, BackupError> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| BackupError::Generic {
            message: f(),
            source: Some(Box::new(e)),
        })
    }

    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self
    }
}

// Conversion from anyhow::Error for the binary entry point
impl From<anyhow::Error> for BackupError {
    fn from(err: anyhow::Error) -> Self {
        BackupError::Generic {
            message: err.to_string(),
            source: None,
        }
    }
}

// anyhow's blanket From impl already covers BackupError -> anyhow::Error,
// since BackupError is Error + Send + Sync + 'static.
