//! Local-first lookup with external fallbacks.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::LookupError;
use crate::error::Result;
use crate::normalize_cnpj;
use crate::provider::CnpjProvider;
use crate::record::LookupOutcome;
use crate::record::LookupSource;
use crate::registry::LocalRegistry;

/// Tries the local registry, then each provider in order. The registry
/// file is re-read on every lookup so edits take effect without a restart.
#[derive(Clone)]
pub struct CnpjResolver {
    registry_path: PathBuf,
    providers: Vec<Arc<dyn CnpjProvider>>,
}

impl CnpjResolver {
    pub fn new(registry_path: impl Into<PathBuf>, providers: Vec<Arc<dyn CnpjProvider>>) -> Self {
        Self {
            registry_path: registry_path.into(),
            providers,
        }
    }

    /// The provider answering for `source`, if configured.
    pub fn provider(&self, source: LookupSource) -> Option<&Arc<dyn CnpjProvider>> {
        self.providers.iter().find(|p| p.source() == source)
    }

    /// Resolve `raw` (any punctuation) to a normalised record.
    ///
    /// Provider failures are logged and the next source is tried; only
    /// when every source misses does this return [`LookupError::NotFound`].
    pub async fn resolve(&self, raw: &str) -> Result<LookupOutcome> {
        let cnpj = normalize_cnpj(raw);
        if cnpj.is_empty() {
            tracing::debug!(raw, "CNPJ has no digits");
            return Err(LookupError::NotFound);
        }

        let registry = LocalRegistry::load_or_empty(&self.registry_path).await;
        if let Some(record) = registry.find(&cnpj) {
            tracing::debug!(%cnpj, "CNPJ found in local registry");
            return Ok(LookupOutcome {
                source: LookupSource::Local,
                data: record.clone(),
            });
        }

        for provider in &self.providers {
            match provider.lookup(&cnpj).await {
                Ok(data) => {
                    tracing::info!(%cnpj, source = %provider.source(), "CNPJ resolved");
                    return Ok(LookupOutcome {
                        source: provider.source(),
                        data,
                    });
                }
                Err(err) => {
                    tracing::warn!(%cnpj, source = %provider.source(), error = %err, "CNPJ provider failed");
                }
            }
        }

        tracing::info!(%cnpj, "CNPJ not found in any source");
        Err(LookupError::NotFound)
    }
}

impl std::fmt::Debug for CnpjResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CnpjResolver")
            .field("registry_path", &self.registry_path)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.source()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
