//! Form State Manager.
//!
//! Owns the bounded collection of contract rows and keeps the displayed
//! totals in step with it. Every mutation (add, remove, edit, blur) ends by
//! recomputing totals; that is the only synchronisation point between rows
//! and totals.
//!
//! The row cap is enforced by checking the collection's length directly, so
//! there is no separate counter that could drift from the rows.

use thiserror::Error;

use crate::MAX_CONTRACTS;
use crate::contract::{ContractEntry, ContractField, ContractRow, EntryId};
use crate::payload::{PetitionForm, PetitionPayload};
use crate::template::TemplateKind;
use crate::totals::{Totals, recompute_totals};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
}

/// A user-visible message, replaced by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Success,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Máximo de 2 contratos permitidos")]
    CapacityReached,

    #[error("no contract row with id {0}")]
    UnknownEntry(EntryId),
}

/// A required field left blank, or a select field holding a value outside
/// its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredField {
    Petition {
        key: &'static str,
        label: &'static str,
    },
    Contract {
        id: EntryId,
        field: ContractField,
    },
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredField::Petition { label, .. } => f.write_str(label),
            RequiredField::Contract { id, field } => {
                write!(f, "Contrato {id}: {}", field.label())
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("campos obrigatórios não preenchidos: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),

    #[error("valores inválidos: {}", join_fields(.0))]
    InvalidValues(Vec<RequiredField>),

    #[error("Adicione pelo menos 1 contrato")]
    NoContracts,

    #[error("Selecione o tipo de petição (COM ou SEM Tutela)")]
    NoTemplate,
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Editable petition form: scalar fields, the template selector and up to
/// [`MAX_CONTRACTS`] contract rows.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub petition: PetitionForm,
    pub template: Option<TemplateKind>,
    rows: Vec<ContractRow>,
    last_id: u32,
    totals: Totals,
    alert: Option<Alert>,
}

impl FormState {
    /// A fresh form with one empty contract row, as presented on load.
    pub fn new() -> Self {
        let mut state = Self::default();
        state.push_row();
        state
    }

    /// Append an empty contract row.
    ///
    /// Rejected with a user-visible alert when the form already holds
    /// [`MAX_CONTRACTS`] rows; state is left untouched in that case.
    pub fn add_entry(&mut self) -> Result<EntryId, FormError> {
        if self.rows.len() >= MAX_CONTRACTS {
            tracing::debug!(rows = self.rows.len(), "contract row rejected at cap");
            let err = FormError::CapacityReached;
            self.alert = Some(Alert::error(err.to_string()));
            return Err(err);
        }

        Ok(self.push_row())
    }

    fn push_row(&mut self) -> EntryId {
        self.last_id += 1;
        let id = EntryId(self.last_id);
        self.rows.push(ContractRow::empty(id));
        self.recompute();
        id
    }

    /// Remove the row with `id`. Returns whether a row was removed.
    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.recompute();
        self.rows.len() != before
    }

    /// Store raw text typed into a row field.
    pub fn set_field(
        &mut self,
        id: EntryId,
        field: ContractField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let row = self.row_mut(id)?;
        *row.field_mut(field) = value.into();
        if field.is_monetary() {
            self.recompute();
        }
        Ok(())
    }

    /// The field lost focus: monetary fields are reformatted.
    pub fn blur_field(&mut self, id: EntryId, field: ContractField) -> Result<(), FormError> {
        let row = self.row_mut(id)?;
        row.format_on_blur(field);
        if field.is_monetary() {
            self.recompute();
        }
        Ok(())
    }

    pub fn entries(&self) -> &[ContractRow] {
        &self.rows
    }

    pub fn entry(&self, id: EntryId) -> Option<&ContractRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    /// The documents were generated and delivered.
    pub fn confirm_generated(&mut self) {
        self.alert = Some(Alert::success("Documento(s) gerado(s) com sucesso!"));
    }

    /// Validate the form and snapshot it into a payload.
    ///
    /// Required-field validation runs first and reports every blank field.
    /// Then each row with a non-empty contract number is included; if none
    /// qualifies the submission is refused with a user-visible alert.
    /// Totals are recomputed over the included entries only.
    pub fn build_payload(&mut self) -> Result<PetitionPayload, SubmissionError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(missing = missing.len(), "form has blank required fields");
            return Err(self.refuse(SubmissionError::MissingFields(missing)));
        }

        let mut contracts: Vec<ContractEntry> = Vec::with_capacity(self.rows.len());
        let mut invalid = Vec::new();
        for row in self.rows.iter().filter(|row| !row.number.is_empty()) {
            match row.to_entry() {
                Ok(entry) => contracts.push(entry),
                Err(fields) => invalid.extend(
                    fields
                        .into_iter()
                        .map(|field| RequiredField::Contract { id: row.id, field }),
                ),
            }
        }
        if !invalid.is_empty() {
            return Err(self.refuse(SubmissionError::InvalidValues(invalid)));
        }

        if contracts.is_empty() {
            return Err(self.refuse(SubmissionError::NoContracts));
        }

        Ok(PetitionPayload::new(self.petition.clone(), contracts))
    }

    /// Check the template selector, then build the payload.
    pub fn submit(&mut self) -> Result<(TemplateKind, PetitionPayload), SubmissionError> {
        let Some(kind) = self.template else {
            return Err(self.refuse(SubmissionError::NoTemplate));
        };
        let payload = self.build_payload()?;
        Ok((kind, payload))
    }

    /// Every refused submission leaves its reason in the alert slot.
    fn refuse(&mut self, err: SubmissionError) -> SubmissionError {
        self.alert = Some(Alert::error(err.to_string()));
        err
    }

    fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing: Vec<RequiredField> = self
            .petition
            .missing_fields()
            .into_iter()
            .map(|f| RequiredField::Petition {
                key: f.key,
                label: f.label,
            })
            .collect();
        for row in &self.rows {
            missing.extend(
                row.missing_fields()
                    .into_iter()
                    .map(|field| RequiredField::Contract { id: row.id, field }),
            );
        }
        missing
    }

    fn row_mut(&mut self, id: EntryId) -> Result<&mut ContractRow, FormError> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(FormError::UnknownEntry(id))
    }

    fn recompute(&mut self) {
        self.totals = recompute_totals(&self.rows);
    }
}
