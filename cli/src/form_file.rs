//! Form files: a TOML rendition of what a user types into the form.
//!
//! ```toml
//! template = "com_tutela"
//!
//! [petition]
//! nomeCompleto = "Maria José da Silva"
//! nomeEmpresa = "Banco Exemplo S.A."
//! # ...
//!
//! [[contracts]]
//! numero = "123456"
//! pago = "150000"
//! # ...
//! ```
//!
//! Contract amounts are raw keystrokes; they are formatted the same way the
//! form formats them when a field loses focus.

use std::path::Path;

use anyhow::Context;
use petition_form::ContractField;
use petition_form::FormError;
use petition_form::FormState;
use petition_form::PetitionForm;
use petition_form::TemplateKind;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FormFile {
    pub template: Option<TemplateKind>,
    pub petition: PetitionForm,
    pub contracts: Vec<RawContract>,
}

/// A contract row as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawContract {
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "inicioMM")]
    pub start_month: String,
    #[serde(rename = "inicioAA")]
    pub start_year: String,
    #[serde(rename = "fimMM")]
    pub end_month: String,
    #[serde(rename = "fimAA")]
    pub end_year: String,
    #[serde(rename = "situacao")]
    pub status: String,
    #[serde(rename = "parcela")]
    pub installment_amount: String,
    #[serde(rename = "pago")]
    pub amount_paid: String,
    #[serde(rename = "aPagar")]
    pub amount_owed: String,
    #[serde(rename = "copia")]
    pub has_copy: String,
}

impl RawContract {
    fn values(&self) -> [(ContractField, &str); 10] {
        [
            (ContractField::Number, self.number.as_str()),
            (ContractField::StartMonth, self.start_month.as_str()),
            (ContractField::StartYear, self.start_year.as_str()),
            (ContractField::EndMonth, self.end_month.as_str()),
            (ContractField::EndYear, self.end_year.as_str()),
            (ContractField::Status, self.status.as_str()),
            (ContractField::InstallmentAmount, self.installment_amount.as_str()),
            (ContractField::AmountPaid, self.amount_paid.as_str()),
            (ContractField::AmountOwed, self.amount_owed.as_str()),
            (ContractField::HasCopy, self.has_copy.as_str()),
        ]
    }
}

impl FormFile {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading form file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing form file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Replay the file through a fresh form: the first contract fills the
    /// row present on load, later ones are added. Every field is typed then
    /// blurred.
    pub fn replay(&self) -> Result<FormState, FormError> {
        let mut state = FormState::new();
        state.petition = self.petition.clone();
        state.template = self.template;

        let mut ids = state.entries().iter().map(|row| row.id).collect::<Vec<_>>();
        for (index, contract) in self.contracts.iter().enumerate() {
            let id = match ids.get(index) {
                Some(id) => *id,
                None => {
                    let id = state.add_entry()?;
                    ids.push(id);
                    id
                }
            };
            for (field, value) in contract.values() {
                state.set_field(id, field, value)?;
                state.blur_field(id, field)?;
            }
        }
        tracing::debug!(rows = state.len(), "form replayed");
        Ok(state)
    }
}
