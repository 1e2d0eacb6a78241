use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocgenError>;

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed (400).
    Validation,
    /// The requested template does not exist (404).
    NotFound,
    /// A collaborator failed or produced nothing (500).
    Rendering,
}

/// Failure of an external rendering or conversion process.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {}", exit_label(*code), stderr.trim())]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {}s", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum DocgenError {
    #[error("Tipo e dados são obrigatórios")]
    MissingLegacyFields,

    #[error("Tipo inválido: {0}")]
    UnknownKind(String),

    #[error("template e context são obrigatórios")]
    MissingRenderFields,

    #[error("Nome de template inválido: {0}")]
    InvalidTemplateName(String),

    #[error("Template não encontrado: {0}")]
    TemplateNotFound(String),

    #[error("Documento não foi gerado: {0}")]
    Render(#[source] CollaboratorError),

    #[error("Documento não foi gerado")]
    DocumentMissing,

    #[error("PDF não foi gerado: {0}")]
    Conversion(#[source] CollaboratorError),

    #[error("PDF não foi gerado")]
    PdfMissing,

    #[error("failed to list templates in {}: {source}", dir.display())]
    Catalog {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl DocgenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocgenError::MissingLegacyFields
            | DocgenError::UnknownKind(_)
            | DocgenError::MissingRenderFields
            | DocgenError::InvalidTemplateName(_) => ErrorKind::Validation,
            DocgenError::TemplateNotFound(_) => ErrorKind::NotFound,
            DocgenError::Render(_)
            | DocgenError::DocumentMissing
            | DocgenError::Conversion(_)
            | DocgenError::PdfMissing
            | DocgenError::Catalog { .. }
            | DocgenError::Io { .. }
            | DocgenError::Archive(_) => ErrorKind::Rendering,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocgenError::Io {
            path: path.into(),
            source,
        }
    }
}
