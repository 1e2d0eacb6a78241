//! Request handling: validate, render, optionally convert, deliver.
//!
//! Two request shapes are served:
//!
//! - **legacy** (`{tipo, dados}`): the template is chosen by petition
//!   variant, artifacts are rendered into a scratch directory, read back
//!   and returned as bytes (a ZIP when both formats are asked for). Scratch
//!   files are removed afterwards.
//! - **current** (`{template, context}`): the template is named by file,
//!   artifacts are written into the public output directory under a
//!   personalised name and returned as `/out/<file>` URLs.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use petition_form::TemplateKind;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumString;

use crate::archive::bundle_zip;
use crate::catalog::TemplateCatalog;
use crate::collaborator::Converter;
use crate::collaborator::Renderer;
use crate::error::DocgenError;
use crate::error::Result;
use crate::naming::document_filename;
use crate::naming::legacy_filename;
use crate::naming::temp_stem;
use crate::policy::ConversionPolicy;
use crate::policy::exists;
use crate::stage::RequestStage;
use crate::stage::RequestTrace;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";
const ZIP_MIME: &str = "application/zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Pdf,
    Both,
}

impl OutputFormat {
    pub fn wants_docx(self) -> bool {
        matches!(self, OutputFormat::Docx | OutputFormat::Both)
    }

    pub fn wants_pdf(self) -> bool {
        matches!(self, OutputFormat::Pdf | OutputFormat::Both)
    }
}

/// Body of the legacy endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LegacyRequest {
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub dados: Option<Value>,
}

impl LegacyRequest {
    fn validate(self) -> Result<(TemplateKind, Value)> {
        let tipo = self.tipo.filter(|t| !t.is_empty());
        let dados = self.dados.filter(|d| !d.is_null());
        let (Some(tipo), Some(dados)) = (tipo, dados) else {
            return Err(DocgenError::MissingLegacyFields);
        };
        match tipo.parse::<TemplateKind>() {
            Ok(kind) => Ok((kind, dados)),
            Err(_) => Err(DocgenError::UnknownKind(tipo)),
        }
    }
}

/// Body of the current-shape endpoints. `context` is handed to the
/// renderer untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
}

impl RenderRequest {
    fn validate(self) -> Result<(String, Value)> {
        let template = self.template.filter(|t| !t.is_empty());
        let context = self.context.filter(|c| !c.is_null());
        match (template, context) {
            (Some(template), Some(context)) => Ok((template, context)),
            _ => Err(DocgenError::MissingRenderFields),
        }
    }
}

/// A binary artifact returned as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// URLs of artifacts published into the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docx_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocgenSettings {
    pub templates_dir: PathBuf,
    /// Scratch space for the legacy endpoints.
    pub temp_dir: PathBuf,
    /// Published artifacts, served under `/out/`.
    pub out_dir: PathBuf,
    pub policy: ConversionPolicy,
}

impl Default for DocgenSettings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            temp_dir: PathBuf::from("temp"),
            out_dir: PathBuf::from("out"),
            policy: ConversionPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    catalog: TemplateCatalog,
    renderer: Arc<dyn Renderer>,
    converter: Arc<dyn Converter>,
    temp_dir: PathBuf,
    out_dir: PathBuf,
    policy: ConversionPolicy,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("catalog", &self.catalog)
            .field("temp_dir", &self.temp_dir)
            .field("out_dir", &self.out_dir)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        settings: DocgenSettings,
        renderer: Arc<dyn Renderer>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        Self {
            catalog: TemplateCatalog::new(settings.templates_dir),
            renderer,
            converter,
            temp_dir: settings.temp_dir,
            out_dir: settings.out_dir,
            policy: settings.policy,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Legacy shape: render (and convert) in scratch space and return the
    /// bytes. `Both` yields a ZIP holding the DOCX and the PDF.
    pub async fn produce(&self, request: LegacyRequest, format: OutputFormat) -> Result<Artifact> {
        let mut trace = RequestTrace::start("legacy");
        let mut scratch = Vec::new();
        let result = self
            .produce_inner(&mut trace, &mut scratch, request, format)
            .await;
        for path in scratch {
            if let Err(err) = tokio::fs::remove_file(&path).await {
                tracing::debug!(path = %path.display(), error = %err, "scratch file not removed");
            }
        }
        finish(&mut trace, result)
    }

    async fn produce_inner(
        &self,
        trace: &mut RequestTrace,
        scratch: &mut Vec<PathBuf>,
        request: LegacyRequest,
        format: OutputFormat,
    ) -> Result<Artifact> {
        let (kind, dados) = request.validate()?;
        let template = self.catalog.for_kind(kind).await?;
        trace.advance(RequestStage::Validated);
        tracing::debug!(%kind, %format, "legacy document request validated");

        ensure_dir(&self.temp_dir).await?;
        let docx = self.temp_dir.join(format!("{}.docx", temp_stem()));
        scratch.push(docx.clone());

        trace.advance(RequestStage::Rendering);
        self.render(&template, &docx, &dados).await?;

        if format == OutputFormat::Docx {
            return Ok(Artifact {
                filename: legacy_filename(kind, "docx"),
                content_type: DOCX_MIME,
                bytes: read(&docx).await?,
            });
        }

        trace.advance(RequestStage::Converting);
        let pdf = pdf_path_for(&docx, &self.temp_dir);
        scratch.push(pdf.clone());
        self.convert(&docx, &pdf).await?;
        let pdf_bytes = read(&pdf).await?;

        if format == OutputFormat::Pdf {
            return Ok(Artifact {
                filename: legacy_filename(kind, "pdf"),
                content_type: PDF_MIME,
                bytes: pdf_bytes,
            });
        }

        let docx_bytes = read(&docx).await?;
        let docx_name = legacy_filename(kind, "docx");
        let pdf_name = legacy_filename(kind, "pdf");
        let bytes = bundle_zip([
            (docx_name.as_str(), docx_bytes.as_slice()),
            (pdf_name.as_str(), pdf_bytes.as_slice()),
        ])?;
        Ok(Artifact {
            filename: legacy_filename(kind, "zip"),
            content_type: ZIP_MIME,
            bytes,
        })
    }

    /// Current shape: render (and convert) into the output directory and
    /// return the `/out/<file>` URLs of what was produced.
    pub async fn publish(
        &self,
        request: RenderRequest,
        format: OutputFormat,
    ) -> Result<PublishedUrls> {
        let mut trace = RequestTrace::start("publish");
        let result = self.publish_inner(&mut trace, request, format).await;
        finish(&mut trace, result)
    }

    async fn publish_inner(
        &self,
        trace: &mut RequestTrace,
        request: RenderRequest,
        format: OutputFormat,
    ) -> Result<PublishedUrls> {
        let (name, context) = request.validate()?;
        let template = self.catalog.resolve(&name).await?;
        trace.advance(RequestStage::Validated);
        tracing::debug!(template = %name, %format, "document request validated");

        ensure_dir(&self.out_dir).await?;
        let docx_name = document_filename(&context, "docx");
        let docx = self.out_dir.join(&docx_name);

        trace.advance(RequestStage::Rendering);
        self.render(&template, &docx, &context).await?;

        let mut urls = PublishedUrls::default();
        if format.wants_docx() {
            urls.docx_url = Some(out_url(&docx_name));
        }
        if format.wants_pdf() {
            trace.advance(RequestStage::Converting);
            let pdf = pdf_path_for(&docx, &self.out_dir);
            self.convert(&docx, &pdf).await?;
            if let Some(pdf_name) = pdf.file_name().and_then(|n| n.to_str()) {
                urls.pdf_url = Some(out_url(pdf_name));
            }
        }
        Ok(urls)
    }

    async fn render(&self, template: &Path, output: &Path, data: &Value) -> Result<()> {
        self.renderer
            .render(template, output, data)
            .await
            .map_err(DocgenError::Render)?;
        if !exists(output).await {
            return Err(DocgenError::DocumentMissing);
        }
        Ok(())
    }

    /// Conversion is only started once the DOCX is confirmed present.
    async fn convert(&self, docx: &Path, pdf: &Path) -> Result<()> {
        let out_dir = pdf.parent().unwrap_or(Path::new("."));
        let outcome = self.converter.convert(docx, out_dir).await;
        self.policy.confirm(outcome, pdf).await
    }
}

fn finish<T>(trace: &mut RequestTrace, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => trace.advance(RequestStage::Ready),
        Err(err) => trace.fail(err),
    }
    result
}

fn pdf_path_for(docx: &Path, out_dir: &Path) -> PathBuf {
    let stem = docx.file_stem().unwrap_or(docx.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".pdf");
    out_dir.join(name)
}

fn out_url(file_name: &str) -> String {
    format!("/out/{file_name}")
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DocgenError::io(dir, e))
}

async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| DocgenError::io(path, e))
}
