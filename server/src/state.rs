use std::path::PathBuf;
use std::sync::Arc;

use petition_cnpj::BrasilApiProvider;
use petition_cnpj::CnpjProvider;
use petition_cnpj::CnpjResolver;
use petition_cnpj::ReceitaWsProvider;
use petition_docgen::Orchestrator;

use crate::config::ServerConfig;

/// Shared state behind every handler.
#[derive(Debug)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub resolver: CnpjResolver,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, resolver: CnpjResolver, public_dir: PathBuf) -> Self {
        Self {
            orchestrator,
            resolver,
            public_dir,
        }
    }

    /// Wire the real collaborators (script renderer, LibreOffice, HTTP
    /// providers) from configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        let orchestrator = Orchestrator::new(
            config.docgen_settings(),
            Arc::new(config.script_renderer()),
            Arc::new(config.libreoffice_converter()),
        );

        let client = reqwest::Client::new();
        let providers: Vec<Arc<dyn CnpjProvider>> = vec![
            Arc::new(BrasilApiProvider::new(client.clone(), config.brasilapi_settings())),
            Arc::new(ReceitaWsProvider::new(client, config.receitaws_settings())),
        ];
        let resolver = CnpjResolver::new(config.registry_path.clone(), providers);

        Self::new(orchestrator, resolver, config.public_dir.clone())
    }
}
