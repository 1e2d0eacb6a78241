//! Server configuration loading
//!
//! Loads `petition.toml` from `--config`, else `PETITION_CONFIG`, else the
//! working directory. Every key has a default, so a missing file (or an
//! empty one) yields a working configuration.

use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use petition_cnpj::ProviderSettings;
use petition_docgen::ConversionPolicy;
use petition_docgen::DocgenSettings;
use petition_docgen::LibreOfficeConverter;
use petition_docgen::ScriptRenderer;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid PORT value {0:?}")]
    Port(String),

    #[error("cannot resolve listen address {0}")]
    Address(String),
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static front-end files; `GET /` serves `index.html` from here.
    pub public_dir: PathBuf,
    pub templates_dir: PathBuf,
    /// Scratch space for the legacy endpoints.
    pub temp_dir: PathBuf,
    /// Published artifacts, served under `/out/`.
    pub out_dir: PathBuf,
    /// Local CNPJ registry (JSON array of company records).
    pub registry_path: PathBuf,
    pub body_limit_bytes: usize,
    pub renderer: RendererConfig,
    pub converter: ConverterConfig,
    pub cnpj: CnpjConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            templates_dir: PathBuf::from("templates"),
            temp_dir: PathBuf::from("temp"),
            out_dir: PathBuf::from("out"),
            registry_path: PathBuf::from("data/bancos_top20.json"),
            body_limit_bytes: 50 * 1024 * 1024,
            renderer: RendererConfig::default(),
            converter: ConverterConfig::default(),
            cnpj: CnpjConfig::default(),
        }
    }
}

/// Rendering collaborator (the templating script).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub program: PathBuf,
    pub script: PathBuf,
    /// Run with an empty environment apart from `PATH=/usr/bin:/bin`.
    pub clean_env: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("/usr/bin/python3.11"),
            script: PathBuf::from("gerar_docx_docxtpl.py"),
            clean_env: true,
        }
    }
}

/// Conversion collaborator (LibreOffice) and its grace policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub program: PathBuf,
    pub timeout_secs: u64,
    pub grace_ms: u64,
    pub settle_ms: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("libreoffice"),
            timeout_secs: 30,
            grace_ms: 3000,
            settle_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CnpjConfig {
    pub brasilapi_base_url: String,
    pub receitaws_base_url: String,
    /// Timeout for each provider in the lookup fallback chain.
    pub fallback_timeout_secs: u64,
    /// Timeout for the raw proxy endpoints.
    pub proxy_timeout_secs: u64,
}

impl Default for CnpjConfig {
    fn default() -> Self {
        Self {
            brasilapi_base_url: "https://brasilapi.com.br".to_string(),
            receitaws_base_url: "https://www.receitaws.com.br".to_string(),
            fallback_timeout_secs: 10,
            proxy_timeout_secs: 20,
        }
    }
}

impl ServerConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "PETITION_CONFIG";

    pub const DEFAULT_CONFIG_FILENAME: &'static str = "petition.toml";

    /// Load configuration.
    ///
    /// An explicitly requested file (`explicit` or `PETITION_CONFIG`) must
    /// exist; the implicit `./petition.toml` falls back to defaults when
    /// absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(Self::ENV_CONFIG_PATH).map(PathBuf::from));

        match requested {
            Some(path) => Self::load_from_path(&path),
            None => {
                let path = PathBuf::from(Self::DEFAULT_CONFIG_FILENAME);
                if !path.exists() {
                    tracing::info!(path = %path.display(), "config not found, using defaults");
                    return Ok(Self::default());
                }
                Self::load_from_path(&path)
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let cfg: ServerConfig = toml::from_str(contents)?;
        cfg.validate();
        Ok(cfg)
    }

    /// Apply a `PORT` environment value, as read by the caller.
    pub fn with_port_override(mut self, port: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) {
            self.port = raw
                .parse()
                .map_err(|_| ConfigError::Port(raw.to_string()))?;
        }
        Ok(self)
    }

    /// Resolve `host` and `port` to a listen address. `host` may be an IPv4
    /// or IPv6 literal (`0.0.0.0`, `::`) or a name such as `localhost`.
    pub async fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let target = format!("{}:{}", self.host, self.port);
        let mut resolved = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|err| ConfigError::Address(format!("{target}: {err}")))?;
        resolved
            .next()
            .ok_or_else(|| ConfigError::Address(format!("{target}: no address")))
    }

    pub fn policy(&self) -> ConversionPolicy {
        ConversionPolicy {
            grace: Duration::from_millis(self.converter.grace_ms),
            settle: Duration::from_millis(self.converter.settle_ms),
        }
    }

    pub fn docgen_settings(&self) -> DocgenSettings {
        DocgenSettings {
            templates_dir: self.templates_dir.clone(),
            temp_dir: self.temp_dir.clone(),
            out_dir: self.out_dir.clone(),
            policy: self.policy(),
        }
    }

    pub fn script_renderer(&self) -> ScriptRenderer {
        ScriptRenderer {
            program: self.renderer.program.clone(),
            script: self.renderer.script.clone(),
            clean_env: self.renderer.clean_env,
        }
    }

    pub fn libreoffice_converter(&self) -> LibreOfficeConverter {
        LibreOfficeConverter::new(
            self.converter.program.clone(),
            Duration::from_secs(self.converter.timeout_secs),
        )
    }

    pub fn brasilapi_settings(&self) -> ProviderSettings {
        self.provider_settings(&self.cnpj.brasilapi_base_url)
    }

    pub fn receitaws_settings(&self) -> ProviderSettings {
        self.provider_settings(&self.cnpj.receitaws_base_url)
    }

    fn provider_settings(&self, base_url: &str) -> ProviderSettings {
        ProviderSettings {
            base_url: base_url.to_string(),
            lookup_timeout: Duration::from_secs(self.cnpj.fallback_timeout_secs),
            proxy_timeout: Duration::from_secs(self.cnpj.proxy_timeout_secs),
        }
    }

    /// Warn about values that work but are probably mistakes.
    fn validate(&self) {
        if self.converter.grace_ms == 0 {
            tracing::warn!("converter.grace_ms is 0; spurious converter errors will fail requests");
        }
        if self.converter.timeout_secs == 0 {
            tracing::warn!("converter.timeout_secs is 0; every conversion will time out");
        }
        if self.body_limit_bytes < 1024 * 1024 {
            tracing::warn!(
                body_limit_bytes = self.body_limit_bytes,
                "request body limit is under 1 MiB; large petitions may be rejected"
            );
        }
        if self.cnpj.fallback_timeout_secs == 0 || self.cnpj.proxy_timeout_secs == 0 {
            tracing::warn!("a CNPJ timeout is 0; provider calls will fail immediately");
        }
    }
}
