//! Contract rows (as edited) and contract entries (as submitted).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::money::{format_amount, parse_amount};

/// Stable identifier of a contract row. Allocated monotonically; a removed
/// identifier is never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Situation of a disputed loan contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ContractStatus {
    #[serde(rename = "Ativo")]
    #[strum(serialize = "Ativo")]
    Active,
    #[serde(rename = "Quitado")]
    #[strum(serialize = "Quitado")]
    Settled,
    #[serde(rename = "Cancelado")]
    #[strum(serialize = "Cancelado")]
    Cancelled,
}

/// Whether the claimant holds a copy of the contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum CopyAvailability {
    #[serde(rename = "SIM")]
    #[strum(serialize = "SIM")]
    Yes,
    #[serde(rename = "NÃO")]
    #[strum(to_string = "NÃO", serialize = "NAO")]
    No,
}

/// Editable fields of a contract row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContractField {
    Number,
    StartMonth,
    StartYear,
    EndMonth,
    EndYear,
    Status,
    InstallmentAmount,
    AmountPaid,
    AmountOwed,
    HasCopy,
}

impl ContractField {
    pub const ALL: [ContractField; 10] = [
        ContractField::Number,
        ContractField::StartMonth,
        ContractField::StartYear,
        ContractField::EndMonth,
        ContractField::EndYear,
        ContractField::Status,
        ContractField::InstallmentAmount,
        ContractField::AmountPaid,
        ContractField::AmountOwed,
        ContractField::HasCopy,
    ];

    /// Monetary fields are reformatted on blur and feed the totals.
    pub fn is_monetary(self) -> bool {
        matches!(
            self,
            ContractField::InstallmentAmount | ContractField::AmountPaid | ContractField::AmountOwed
        )
    }

    /// Field label as shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            ContractField::Number => "Número do contrato",
            ContractField::StartMonth => "Início (MM)",
            ContractField::StartYear => "Início (AA)",
            ContractField::EndMonth => "Fim (MM)",
            ContractField::EndYear => "Fim (AA)",
            ContractField::Status => "Situação",
            ContractField::InstallmentAmount => "Parcela",
            ContractField::AmountPaid => "Valor pago",
            ContractField::AmountOwed => "Valor a pagar",
            ContractField::HasCopy => "Cópia do contrato",
        }
    }
}

/// One contract row as it sits in the form: free text, possibly incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRow {
    pub id: EntryId,
    pub number: String,
    pub start_month: String,
    pub start_year: String,
    pub end_month: String,
    pub end_year: String,
    pub status: String,
    pub installment_amount: String,
    pub amount_paid: String,
    pub amount_owed: String,
    pub has_copy: String,
}

impl ContractRow {
    pub(crate) fn empty(id: EntryId) -> Self {
        Self {
            id,
            number: String::new(),
            start_month: String::new(),
            start_year: String::new(),
            end_month: String::new(),
            end_year: String::new(),
            status: String::new(),
            installment_amount: String::new(),
            amount_paid: String::new(),
            amount_owed: String::new(),
            has_copy: String::new(),
        }
    }

    pub fn field(&self, field: ContractField) -> &str {
        match field {
            ContractField::Number => &self.number,
            ContractField::StartMonth => &self.start_month,
            ContractField::StartYear => &self.start_year,
            ContractField::EndMonth => &self.end_month,
            ContractField::EndYear => &self.end_year,
            ContractField::Status => &self.status,
            ContractField::InstallmentAmount => &self.installment_amount,
            ContractField::AmountPaid => &self.amount_paid,
            ContractField::AmountOwed => &self.amount_owed,
            ContractField::HasCopy => &self.has_copy,
        }
    }

    pub(crate) fn field_mut(&mut self, field: ContractField) -> &mut String {
        match field {
            ContractField::Number => &mut self.number,
            ContractField::StartMonth => &mut self.start_month,
            ContractField::StartYear => &mut self.start_year,
            ContractField::EndMonth => &mut self.end_month,
            ContractField::EndYear => &mut self.end_year,
            ContractField::Status => &mut self.status,
            ContractField::InstallmentAmount => &mut self.installment_amount,
            ContractField::AmountPaid => &mut self.amount_paid,
            ContractField::AmountOwed => &mut self.amount_owed,
            ContractField::HasCopy => &mut self.has_copy,
        }
    }

    /// Apply the on-blur formatting policy to a monetary field.
    pub(crate) fn format_on_blur(&mut self, field: ContractField) {
        if field.is_monetary() {
            let slot = self.field_mut(field);
            *slot = format_amount(slot);
        }
    }

    /// Fields that are required but empty, in form order.
    pub fn missing_fields(&self) -> Vec<ContractField> {
        ContractField::ALL
            .into_iter()
            .filter(|f| self.field(*f).trim().is_empty())
            .collect()
    }

    /// Convert into the submitted shape. Fails with the select fields whose
    /// value is outside their option list.
    pub(crate) fn to_entry(&self) -> Result<ContractEntry, Vec<ContractField>> {
        let status = self.status.parse::<ContractStatus>();
        let has_copy = self.has_copy.parse::<CopyAvailability>();
        match (status, has_copy) {
            (Ok(status), Ok(has_copy)) => Ok(ContractEntry {
                number: self.number.clone(),
                start_month: self.start_month.clone(),
                start_year: self.start_year.clone(),
                end_month: self.end_month.clone(),
                end_year: self.end_year.clone(),
                status,
                installment_amount: parse_amount(self.installment_amount.as_str()),
                amount_paid: parse_amount(self.amount_paid.as_str()),
                amount_owed: parse_amount(self.amount_owed.as_str()),
                has_copy,
            }),
            (status, has_copy) => {
                let mut invalid = Vec::new();
                if status.is_err() {
                    invalid.push(ContractField::Status);
                }
                if has_copy.is_err() {
                    invalid.push(ContractField::HasCopy);
                }
                Err(invalid)
            }
        }
    }
}

/// A contract as submitted, with parsed amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEntry {
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
    pub status: ContractStatus,
    #[serde(rename = "parcela")]
    pub installment_amount: f64,
    #[serde(rename = "pago")]
    pub amount_paid: f64,
    #[serde(rename = "aPagar")]
    pub amount_owed: f64,
    #[serde(rename = "copia")]
    pub has_copy: CopyAvailability,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_parses_form_values() {
        assert_eq!("Ativo".parse::<ContractStatus>().ok(), Some(ContractStatus::Active));
        assert_eq!("Quitado".parse::<ContractStatus>().ok(), Some(ContractStatus::Settled));
        assert_eq!("Cancelado".parse::<ContractStatus>().ok(), Some(ContractStatus::Cancelled));
        assert!("".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn copy_accepts_unaccented_no() {
        assert_eq!("NAO".parse::<CopyAvailability>().ok(), Some(CopyAvailability::No));
        assert_eq!(CopyAvailability::No.to_string(), "NÃO");
    }

    #[test]
    fn blur_formats_only_monetary_fields() {
        let mut row = ContractRow::empty(EntryId(1));
        *row.field_mut(ContractField::Number) = "123456".to_string();
        *row.field_mut(ContractField::AmountPaid) = "150000".to_string();
        row.format_on_blur(ContractField::Number);
        row.format_on_blur(ContractField::AmountPaid);
        assert_eq!(row.number, "123456");
        assert_eq!(row.amount_paid, "1.500,00");
    }

    #[test]
    fn entry_serializes_with_wire_keys() {
        let entry = ContractEntry {
            number: "42".to_string(),
            start_month: "01".to_string(),
            start_year: "20".to_string(),
            end_month: "12".to_string(),
            end_year: "25".to_string(),
            status: ContractStatus::Active,
            installment_amount: 100.0,
            amount_paid: 1500.0,
            amount_owed: 200.0,
            has_copy: CopyAvailability::Yes,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["numero"], "42");
        assert_eq!(value["situacao"], "Ativo");
        assert_eq!(value["aPagar"], 200.0);
        assert_eq!(value["copia"], "SIM");
    }
}
