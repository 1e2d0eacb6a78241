//! HTTP client for the petition server.

use anyhow::Context;
use anyhow::bail;
use clap::ValueEnum;
use petition_cnpj::LookupOutcome;
use petition_cnpj::normalize_cnpj;
use petition_form::PetitionPayload;
use petition_form::TemplateKind;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Docx,
    Pdf,
    Both,
}

impl Format {
    fn legacy_endpoint(self) -> &'static str {
        match self {
            Format::Docx => "/api/gerar-docx",
            Format::Pdf => "/api/gerar-pdf",
            Format::Both => "/api/gerar-ambos",
        }
    }

    fn generate_endpoint(self) -> &'static str {
        match self {
            Format::Docx => "/api/generate/docx",
            Format::Pdf => "/api/generate/pdf",
            Format::Both => "/api/generate/both",
        }
    }

    /// Extension of the single artifact a legacy request returns.
    pub fn legacy_extension(self) -> &'static str {
        match self {
            Format::Docx => "docx",
            Format::Pdf => "pdf",
            Format::Both => "zip",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PublishedUrls {
    #[serde(default)]
    pub docx_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PetitionClient {
    http: reqwest::Client,
    base_url: String,
}

impl PetitionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Current shape: the server renders `kind`'s template with the flat
    /// context and answers with artifact URLs.
    pub async fn publish(
        &self,
        kind: TemplateKind,
        payload: &PetitionPayload,
        format: Format,
    ) -> anyhow::Result<PublishedUrls> {
        let body = json!({
            "template": kind.template_file(),
            "context": payload.to_template_context(),
        });
        let response = self
            .http
            .post(self.url(format.generate_endpoint()))
            .json(&body)
            .send()
            .await
            .context("sending generation request")?;
        let urls = ensure_success(response)
            .await?
            .json::<PublishedUrls>()
            .await
            .context("decoding generation response")?;
        Ok(urls)
    }

    /// Legacy shape: `{tipo, dados}` in, artifact bytes out.
    pub async fn produce_legacy(
        &self,
        kind: TemplateKind,
        payload: &PetitionPayload,
        format: Format,
    ) -> anyhow::Result<Vec<u8>> {
        let body = json!({ "tipo": kind, "dados": payload });
        let response = self
            .http
            .post(self.url(format.legacy_endpoint()))
            .json(&body)
            .send()
            .await
            .context("sending generation request")?;
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Fetch a server-relative artifact URL such as `/out/<file>`.
    pub async fn download(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("downloading {path}"))?;
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    pub async fn lookup_cnpj(&self, id: &str) -> anyhow::Result<LookupOutcome> {
        let digits = normalize_cnpj(id);
        if digits.is_empty() {
            bail!("CNPJ inválido: {id}");
        }
        let response = self
            .http
            .get(self.url(&format!("/api/cnpj/{digits}")))
            .send()
            .await
            .context("sending lookup request")?;
        let outcome = ensure_success(response)
            .await?
            .json::<LookupOutcome>()
            .await
            .context("decoding lookup response")?;
        Ok(outcome)
    }
}

/// Turn an error status into an error carrying the server's message.
async fn ensure_success(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.to_string());
    bail!("server answered {}: {message}", status.as_u16())
}
