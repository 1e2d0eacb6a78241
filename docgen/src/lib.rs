//! Document orchestration for petitions.
//!
//! A request names a template (by petition variant or by file name) and
//! carries the data to fill it with. The orchestrator resolves the template,
//! hands it to a [`Renderer`] to produce a DOCX, optionally hands that to a
//! [`Converter`] for a PDF, and returns the bytes or the published URLs.
//!
//! Both collaborators are traits so the orchestration logic, including the
//! conversion grace policy, runs against fakes in tests.

mod archive;
mod catalog;
mod collaborator;
mod error;
mod naming;
mod orchestrator;
mod policy;
mod stage;

pub use archive::bundle_zip;
pub use catalog::TemplateCatalog;
pub use catalog::TemplateInfo;
pub use collaborator::Converter;
pub use collaborator::LibreOfficeConverter;
pub use collaborator::Renderer;
pub use collaborator::ScriptRenderer;
pub use error::CollaboratorError;
pub use error::DocgenError;
pub use error::ErrorKind;
pub use error::Result;
pub use naming::document_filename;
pub use naming::legacy_filename;
pub use orchestrator::Artifact;
pub use orchestrator::DocgenSettings;
pub use orchestrator::LegacyRequest;
pub use orchestrator::Orchestrator;
pub use orchestrator::OutputFormat;
pub use orchestrator::PublishedUrls;
pub use orchestrator::RenderRequest;
pub use policy::ConversionPolicy;
pub use stage::RequestStage;
pub use stage::RequestTrace;
