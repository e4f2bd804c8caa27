use std::path::{Path, PathBuf};

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("discovery error: {0}")]
    Discovery(String),

    #[error("file not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied reading '{}'", path.display())]
    Permission { path: PathBuf },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata error in '{}': {msg}", path.display())]
    Metadata { path: PathBuf, msg: String },

    #[error("format error in '{}' line {line}: {msg}", path.display())]
    Format {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("encoding error: `{command}` {}{}", exit_description(*code), stderr_suffix(stderr))]
    Encoding {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlotError {
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn metadata(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            msg: msg.into(),
        }
    }

    pub fn format(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            line,
            msg: msg.into(),
        }
    }

    pub fn encoding(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Encoding {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Classify an I/O failure on `path` into the file-access variants.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::Permission {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with code {c}"),
        None => "was terminated by a signal or failed to run".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
