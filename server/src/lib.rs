//! HTTP surface for petition generation.
//!
//! Serves the form front end, the CNPJ lookup and proxy endpoints, the
//! legacy (`/api/gerar-*`) and current (`/api/generate/*`) document
//! endpoints, and the generated artifacts under `/out/`.

pub mod config;
mod cors;
pub mod error;
mod files;
mod routes;
pub mod state;

pub use config::ConfigError;
pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
