//! `petition-form`: state and arithmetic behind the petition form.
//!
//! Holds the bounded list of contract rows a claimant disputes, the
//! Brazilian-locale money formatting applied when a monetary field loses
//! focus, the derived totals, and the snapshot (`PetitionPayload`) handed
//! to the document orchestrator at submission time.
//!
//! ## Modules
//! - [`money`]: `format_amount` / `parse_amount` / `format_currency`
//! - [`contract`]: contract row and entry types
//! - [`totals`]: `recompute_totals`
//! - [`state`]: `FormState` (add / remove / edit / blur / submit)
//! - [`payload`]: `PetitionForm`, `PetitionPayload`, template context

pub mod contract;
pub mod money;
pub mod payload;
pub mod state;
pub mod template;
pub mod totals;

pub use contract::{ContractEntry, ContractField, ContractRow, ContractStatus, CopyAvailability, EntryId};
pub use money::{format_amount, format_currency, parse_amount};
pub use payload::{Claimant, PetitionForm, PetitionPayload, Respondent, Venue};
pub use state::{Alert, AlertLevel, FormError, FormState, RequiredField, SubmissionError};
pub use template::TemplateKind;
pub use totals::{Totals, recompute_totals};

/// Maximum number of live contract rows.
pub const MAX_CONTRACTS: usize = 2;
