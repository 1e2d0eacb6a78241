//! Derived monetary totals.
//!
//! Totals are never stored as independent state: they are recomputed from
//! the live rows after every add, remove, edit or blur, and once more from
//! the filtered entries at submission.

use serde::{Deserialize, Serialize};

use crate::contract::{ContractEntry, ContractRow};
use crate::money::{format_currency, parse_amount};

/// `total_paid = Σ paid`, `doubled_total = 2 × total_paid`,
/// `claim_value = doubled_total + Σ owed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(rename = "valorPagoIndevido")]
    pub total_paid: f64,
    #[serde(rename = "valorIndevidoDobro")]
    pub doubled_total: f64,
    #[serde(rename = "valorCausa")]
    pub claim_value: f64,
}

impl Totals {
    /// Fold `(paid, owed)` pairs into totals.
    pub fn from_amounts(amounts: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (total_paid, total_owed) = amounts
            .into_iter()
            .fold((0.0, 0.0), |(paid, owed), (p, o)| (paid + p, owed + o));
        let doubled_total = total_paid * 2.0;
        Self {
            total_paid,
            doubled_total,
            claim_value: doubled_total + total_owed,
        }
    }

    /// Totals over submitted entries.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ContractEntry>) -> Self {
        Self::from_amounts(entries.into_iter().map(|e| (e.amount_paid, e.amount_owed)))
    }

    /// The three display strings, in `R$ 1.500,00` form.
    pub fn display(&self) -> [String; 3] {
        [
            format_currency(self.total_paid),
            format_currency(self.doubled_total),
            format_currency(self.claim_value),
        ]
    }
}

/// Recompute totals from the rows currently in the form.
///
/// Each row contributes the parsed value of its paid and owed fields; a
/// blank or unparseable field contributes zero.
pub fn recompute_totals<'a>(rows: impl IntoIterator<Item = &'a ContractRow>) -> Totals {
    Totals::from_amounts(rows.into_iter().map(|row| {
        (
            parse_amount(row.amount_paid.as_str()),
            parse_amount(row.amount_owed.as_str()),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::EntryId;

    fn row(id: u32, paid: &str, owed: &str) -> ContractRow {
        let mut row = ContractRow::empty(EntryId(id));
        row.amount_paid = paid.to_string();
        row.amount_owed = owed.to_string();
        row
    }

    #[test]
    fn no_rows_means_zero() {
        assert_eq!(recompute_totals(std::iter::empty()), Totals::default());
    }

    #[test]
    fn blank_fields_contribute_zero() {
        let totals = recompute_totals(&[row(1, "1.500,00", "")]);
        assert_eq!(totals.total_paid, 1500.0);
        assert_eq!(totals.doubled_total, 3000.0);
        assert_eq!(totals.claim_value, 3000.0);
    }

    #[test]
    fn two_rows_sum() {
        let totals = recompute_totals(&[row(1, "100,00", "10,00"), row(2, "50,00", "5,00")]);
        assert_eq!(totals.total_paid, 150.0);
        assert_eq!(totals.doubled_total, 300.0);
        assert_eq!(totals.claim_value, 315.0);
    }

    #[test]
    fn display_strings() {
        let totals = Totals::from_amounts([(1500.0, 0.0)]);
        assert_eq!(
            totals.display(),
            [
                "R$ 1.500,00".to_string(),
                "R$ 3.000,00".to_string(),
                "R$ 3.000,00".to_string()
            ]
        );
    }
}
