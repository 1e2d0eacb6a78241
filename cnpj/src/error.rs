use std::path::PathBuf;

use thiserror::Error;

use crate::record::LookupSource;

pub type Result<T> = std::result::Result<T, LookupError>;

#[derive(Debug, Error)]
pub enum LookupError {
    /// The provider answered with a non-success HTTP status.
    #[error("{provider} responded with HTTP {status}")]
    Status {
        provider: LookupSource,
        status: u16,
    },

    /// The provider could not be reached or timed out.
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: LookupSource,
        message: String,
    },

    /// The provider answered 2xx but the body was not a usable record.
    #[error("{provider} returned an unusable body: {message}")]
    Body {
        provider: LookupSource,
        message: String,
    },

    #[error("failed to read registry {}: {source}", path.display())]
    RegistryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {} is not a JSON array of records: {source}", path.display())]
    RegistryFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CNPJ não encontrado em nenhuma fonte")]
    NotFound,
}

impl LookupError {
    /// HTTP status a proxy should answer with: the provider's own status
    /// when it sent one, 500 otherwise.
    pub fn proxy_status(&self) -> u16 {
        match self {
            LookupError::Status { status, .. } => *status,
            LookupError::NotFound => 404,
            _ => 500,
        }
    }

    pub(crate) fn transport(provider: LookupSource, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "timed out".to_string()
        } else {
            err.to_string()
        };
        LookupError::Transport { provider, message }
    }
}
