//! Local registry of well-known companies (the largest banks), consulted
//! before any external provider.

use std::path::Path;

use crate::error::LookupError;
use crate::error::Result;
use crate::normalize_cnpj;
use crate::record::CompanyRecord;

#[derive(Debug, Clone, Default)]
pub struct LocalRegistry {
    records: Vec<CompanyRecord>,
}

impl LocalRegistry {
    pub fn from_records(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    /// Parse a registry from its JSON text.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let records: Vec<CompanyRecord> =
            serde_json::from_str(contents).map_err(|source| LookupError::RegistryFormat {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { records })
    }

    /// Read and parse the registry file.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LookupError::RegistryIo {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::parse(path, &contents)
    }

    /// Like [`LocalRegistry::load`], but a missing or malformed file is
    /// logged and treated as an empty registry.
    pub async fn load_or_empty(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(registry) => registry,
            Err(err) => {
                tracing::warn!(error = %err, "local CNPJ registry unavailable; treating as empty");
                Self::default()
            }
        }
    }

    /// Find a record whose CNPJ matches `cnpj` once both are reduced to digits.
    pub fn find(&self, cnpj: &str) -> Option<&CompanyRecord> {
        let wanted = normalize_cnpj(cnpj);
        if wanted.is_empty() {
            return None;
        }
        self.records
            .iter()
            .find(|record| normalize_cnpj(&record.cnpj) == wanted)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
