//! External CNPJ providers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LookupError;
use crate::error::Result;
use crate::record::CompanyRecord;
use crate::record::LookupSource;
use crate::record::format_address;
use crate::record::text_field;

pub const BRASILAPI_BASE_URL: &str = "https://brasilapi.com.br";
pub const RECEITAWS_BASE_URL: &str = "https://www.receitaws.com.br";

/// An external company-data source.
///
/// `lookup` is the fallback path used by the resolver and returns a
/// normalised record; `fetch_raw` returns the provider's body untouched
/// for the proxy endpoints.
#[async_trait]
pub trait CnpjProvider: Send + Sync {
    fn source(&self) -> LookupSource;

    /// Fetch and normalise. `cnpj` is already reduced to digits.
    async fn lookup(&self, cnpj: &str) -> Result<CompanyRecord>;

    /// Fetch the provider's body as-is.
    async fn fetch_raw(&self, cnpj: &str) -> Result<Value>;
}

/// Base URL and timeouts for an HTTP provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    /// Used by `lookup` (the fallback chain).
    pub lookup_timeout: Duration,
    /// Used by `fetch_raw` (the proxy endpoints).
    pub proxy_timeout: Duration,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            lookup_timeout: Duration::from_secs(10),
            proxy_timeout: Duration::from_secs(20),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

async fn get_json(
    client: &reqwest::Client,
    source: LookupSource,
    url: &str,
    timeout: Duration,
) -> Result<Value> {
    tracing::debug!(%source, url, "querying CNPJ provider");
    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| LookupError::transport(source, &e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(LookupError::Status {
            provider: source,
            status: status.as_u16(),
        });
    }

    resp.json::<Value>().await.map_err(|e| LookupError::Body {
        provider: source,
        message: e.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// BrasilAPI
// ─────────────────────────────────────────────────────────────────────────────

/// `GET {base}/api/cnpj/v1/{cnpj}`. Carries no e-mail or phone.
#[derive(Debug, Clone)]
pub struct BrasilApiProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl BrasilApiProvider {
    pub fn new(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn endpoint(&self, cnpj: &str) -> String {
        self.settings.url(&format!("/api/cnpj/v1/{cnpj}"))
    }
}

impl Default for BrasilApiProvider {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), ProviderSettings::new(BRASILAPI_BASE_URL))
    }
}

#[async_trait]
impl CnpjProvider for BrasilApiProvider {
    fn source(&self) -> LookupSource {
        LookupSource::BrasilApi
    }

    async fn lookup(&self, cnpj: &str) -> Result<CompanyRecord> {
        let body = get_json(
            &self.client,
            self.source(),
            &self.endpoint(cnpj),
            self.settings.lookup_timeout,
        )
        .await?;
        Ok(CompanyRecord {
            name: text_field(&body, "razao_social"),
            cnpj: text_field(&body, "cnpj"),
            address: format_address(&body),
            email: String::new(),
            phone: String::new(),
        })
    }

    async fn fetch_raw(&self, cnpj: &str) -> Result<Value> {
        get_json(
            &self.client,
            self.source(),
            &self.endpoint(cnpj),
            self.settings.proxy_timeout,
        )
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReceitaWS
// ─────────────────────────────────────────────────────────────────────────────

/// `GET {base}/v1/cnpj/{cnpj}`. Maps `email` and `telefone`.
///
/// ReceitaWS reports unknown or malformed identifiers with HTTP 200 and
/// `{"status": "ERROR"}`; `lookup` treats that as a failure.
#[derive(Debug, Clone)]
pub struct ReceitaWsProvider {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl ReceitaWsProvider {
    pub fn new(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn endpoint(&self, cnpj: &str) -> String {
        self.settings.url(&format!("/v1/cnpj/{cnpj}"))
    }
}

impl Default for ReceitaWsProvider {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), ProviderSettings::new(RECEITAWS_BASE_URL))
    }
}

#[async_trait]
impl CnpjProvider for ReceitaWsProvider {
    fn source(&self) -> LookupSource {
        LookupSource::ReceitaWs
    }

    async fn lookup(&self, cnpj: &str) -> Result<CompanyRecord> {
        let body = get_json(
            &self.client,
            self.source(),
            &self.endpoint(cnpj),
            self.settings.lookup_timeout,
        )
        .await?;
        if body.get("status").and_then(Value::as_str) == Some("ERROR") {
            return Err(LookupError::Body {
                provider: self.source(),
                message: text_field(&body, "message"),
            });
        }
        Ok(CompanyRecord {
            name: text_field(&body, "nome"),
            cnpj: text_field(&body, "cnpj"),
            address: format_address(&body),
            email: text_field(&body, "email"),
            phone: text_field(&body, "telefone"),
        })
    }

    async fn fetch_raw(&self, cnpj: &str) -> Result<Value> {
        get_json(
            &self.client,
            self.source(),
            &self.endpoint(cnpj),
            self.settings.proxy_timeout,
        )
        .await
    }
}
