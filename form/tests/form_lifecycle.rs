#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Contract-row lifecycle and totals, end to end through `FormState`.

use petition_form::{
    AlertLevel, ContractField, EntryId, FormError, FormState, MAX_CONTRACTS, PetitionForm,
    RequiredField, SubmissionError, TemplateKind, format_amount, parse_amount,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn filled_petition() -> PetitionForm {
    let mut form = PetitionForm::default();
    form.venue.court_type = "Juizado Especial Cível".to_string();
    form.venue.city = "Recife".to_string();
    form.venue.state = "Pernambuco".to_string();
    form.venue.state_preposition = "de".to_string();
    form.claimant.full_name = "Maria José da Silva".to_string();
    form.claimant.nationality = "brasileira".to_string();
    form.claimant.birth_date = "01/02/1960".to_string();
    form.claimant.marital_status = "viúva".to_string();
    form.claimant.profession = "aposentada".to_string();
    form.claimant.rg = "1234567".to_string();
    form.claimant.rg_state = "PE".to_string();
    form.claimant.cpf = "123.456.789-00".to_string();
    form.claimant.whatsapp = "(81) 99999-0000".to_string();
    form.claimant.email = "maria@example.com".to_string();
    form.claimant.street = "Rua das Flores".to_string();
    form.claimant.street_number = "10".to_string();
    form.claimant.district = "Boa Vista".to_string();
    form.claimant.postal_code = "50000-000".to_string();
    form.respondent.company_name = "Banco Exemplo S.A.".to_string();
    form.respondent.cnpj = "00.000.000/0001-91".to_string();
    form.respondent.street = "Av. Central".to_string();
    form.respondent.street_number = "1000".to_string();
    form.respondent.district = "Centro".to_string();
    form.respondent.city = "Brasília".to_string();
    form.respondent.state = "DF".to_string();
    form.respondent.postal_code = "70000-000".to_string();
    form.legal_aid = "Sim".to_string();
    form
}

fn fill_row(state: &mut FormState, id: EntryId, number: &str, paid: &str, owed: &str) {
    let values = [
        (ContractField::Number, number),
        (ContractField::StartMonth, "01"),
        (ContractField::StartYear, "20"),
        (ContractField::EndMonth, "12"),
        (ContractField::EndYear, "26"),
        (ContractField::Status, "Ativo"),
        (ContractField::InstallmentAmount, "35000"),
        (ContractField::AmountPaid, paid),
        (ContractField::AmountOwed, owed),
        (ContractField::HasCopy, "SIM"),
    ];
    for (field, value) in values {
        state.set_field(id, field, value).unwrap();
        state.blur_field(id, field).unwrap();
    }
}

#[test]
fn new_form_starts_with_one_row() {
    let state = FormState::new();
    assert_eq!(state.len(), 1);
    assert_eq!(state.entries()[0].id, EntryId(1));
}

#[test]
fn add_beyond_cap_is_rejected_with_alert() {
    let mut state = FormState::new();
    let second = state.add_entry().unwrap();
    assert_eq!(second, EntryId(2));

    let before: Vec<EntryId> = state.entries().iter().map(|r| r.id).collect();
    assert_eq!(state.add_entry(), Err(FormError::CapacityReached));
    let after: Vec<EntryId> = state.entries().iter().map(|r| r.id).collect();
    assert_eq!(before, after);

    let alert = state.take_alert().unwrap();
    assert_eq!(alert.level, AlertLevel::Error);
    assert_eq!(alert.message, "Máximo de 2 contratos permitidos");
}

#[test]
fn removed_identifiers_are_not_reused() {
    let mut state = FormState::new();
    let second = state.add_entry().unwrap();
    assert!(state.remove_entry(EntryId(1)));
    let third = state.add_entry().unwrap();
    assert_eq!(third, EntryId(3));
    let ids: Vec<EntryId> = state.entries().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, third]);
}

#[test]
fn removing_unknown_entry_is_a_noop() {
    let mut state = FormState::new();
    assert!(!state.remove_entry(EntryId(42)));
    assert_eq!(state.len(), 1);
}

#[test]
fn editing_unknown_entry_is_an_error() {
    let mut state = FormState::new();
    assert_eq!(
        state.set_field(EntryId(9), ContractField::AmountPaid, "1"),
        Err(FormError::UnknownEntry(EntryId(9)))
    );
}

#[test]
fn paid_amount_scenario() {
    let mut state = FormState::new();
    let id = state.entries()[0].id;
    state.set_field(id, ContractField::AmountPaid, "150000").unwrap();
    state.blur_field(id, ContractField::AmountPaid).unwrap();

    let row = state.entry(id).unwrap();
    assert_eq!(row.amount_paid, "1.500,00");
    assert_eq!(parse_amount(row.amount_owed.as_str()), 0.0);

    let totals = state.totals();
    assert_eq!(totals.total_paid, 1500.0);
    assert_eq!(totals.claim_value, 3000.0);
}

#[test]
fn removal_recomputes_totals() {
    let mut state = FormState::new();
    let first = state.entries()[0].id;
    let second = state.add_entry().unwrap();
    state.set_field(first, ContractField::AmountPaid, "10000").unwrap();
    state.blur_field(first, ContractField::AmountPaid).unwrap();
    state.set_field(second, ContractField::AmountOwed, "5000").unwrap();
    state.blur_field(second, ContractField::AmountOwed).unwrap();
    assert_eq!(state.totals().claim_value, 250.0);

    state.remove_entry(second);
    assert_eq!(state.totals().claim_value, 200.0);
}

#[test]
fn blank_required_fields_block_submission() {
    let mut state = FormState::new();
    let err = state.build_payload().unwrap_err();
    let SubmissionError::MissingFields(fields) = err else {
        panic!("expected missing fields, got {err:?}");
    };
    assert!(fields.contains(&RequiredField::Petition {
        key: "nomeCompleto",
        label: "Nome completo",
    }));
    assert!(fields.contains(&RequiredField::Contract {
        id: EntryId(1),
        field: ContractField::Number,
    }));
    assert_eq!(state.alert().map(|a| a.level), Some(AlertLevel::Error));
}

#[test]
fn zero_contracts_is_refused_with_alert() {
    let mut state = FormState::new();
    state.petition = filled_petition();
    state.remove_entry(EntryId(1));

    assert_eq!(state.build_payload(), Err(SubmissionError::NoContracts));
    assert_eq!(
        state.alert().map(|a| a.message.as_str()),
        Some("Adicione pelo menos 1 contrato")
    );
}

#[test]
fn invalid_select_value_is_reported() {
    let mut state = FormState::new();
    state.petition = filled_petition();
    fill_row(&mut state, EntryId(1), "123", "100", "0");
    state
        .set_field(EntryId(1), ContractField::Status, "Suspenso")
        .unwrap();

    assert_eq!(
        state.build_payload(),
        Err(SubmissionError::InvalidValues(vec![RequiredField::Contract {
            id: EntryId(1),
            field: ContractField::Status,
        }]))
    );
    assert_eq!(
        state.alert().map(|a| a.message.as_str()),
        Some("valores inválidos: Contrato 1: Situação")
    );
}

#[test]
fn full_submission_builds_payload() {
    let mut state = FormState::new();
    state.petition = filled_petition();
    state.template = Some(TemplateKind::WithInjunction);
    fill_row(&mut state, EntryId(1), "111", "150000", "20000");
    let second = state.add_entry().unwrap();
    fill_row(&mut state, second, "222", "5050", "");

    let (kind, payload) = state.submit().unwrap();
    assert_eq!(kind, TemplateKind::WithInjunction);
    assert_eq!(payload.contracts.len(), 2);
    assert_eq!(payload.contracts[0].installment_amount, 350.0);
    assert_eq!(payload.contracts[1].amount_owed, 0.0);
    assert_eq!(payload.totals.total_paid, 1550.5);
    assert_eq!(payload.totals.doubled_total, 3101.0);
    assert_eq!(payload.totals.claim_value, 3301.0);
}

#[test]
fn submit_without_template_is_refused() {
    let mut state = FormState::new();
    assert_eq!(state.submit(), Err(SubmissionError::NoTemplate));
    assert!(state.alert().is_some());
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Remove(u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Add), (1u32..6).prop_map(Op::Remove)]
}

proptest! {
    #[test]
    fn prop_entry_count_never_exceeds_cap(ops in prop::collection::vec(op(), 0..40)) {
        let mut state = FormState::new();
        for op in ops {
            let before: Vec<EntryId> = state.entries().iter().map(|r| r.id).collect();
            match op {
                Op::Add => {
                    let result = state.add_entry();
                    if before.len() >= MAX_CONTRACTS {
                        prop_assert!(result.is_err());
                        let after: Vec<EntryId> = state.entries().iter().map(|r| r.id).collect();
                        prop_assert_eq!(&before, &after);
                    } else {
                        let id = result.unwrap();
                        prop_assert!(before.iter().all(|existing| *existing < id));
                    }
                }
                Op::Remove(id) => {
                    state.remove_entry(EntryId(id));
                }
            }
            prop_assert!(state.len() <= MAX_CONTRACTS);
        }
    }

    #[test]
    fn prop_format_then_parse_recovers_cents(cents in 0u64..1_000_000_000_000) {
        let formatted = format_amount(&cents.to_string());
        let parsed = parse_amount(formatted.as_str());
        let expected = cents as f64 / 100.0;
        prop_assert!((parsed - expected).abs() <= expected.abs() * 1e-12 + 1e-9);
    }

    #[test]
    fn prop_parse_never_fails_on_garbage(s in "\\PC*") {
        let n = parse_amount(s.as_str());
        prop_assert!(n.is_finite());
    }

    #[test]
    fn prop_totals_identity(
        paid in prop::collection::vec(0u64..10_000_000, 1..=2),
        owed in prop::collection::vec(0u64..10_000_000, 2),
    ) {
        let mut state = FormState::new();
        let mut ids = vec![EntryId(1)];
        if paid.len() == 2 {
            ids.push(state.add_entry().unwrap());
        }
        for (i, id) in ids.iter().enumerate() {
            state.set_field(*id, ContractField::AmountPaid, paid[i].to_string()).unwrap();
            state.blur_field(*id, ContractField::AmountPaid).unwrap();
            state.set_field(*id, ContractField::AmountOwed, owed[i].to_string()).unwrap();
            state.blur_field(*id, ContractField::AmountOwed).unwrap();
        }

        let total_paid: f64 = ids.iter().enumerate().map(|(i, _)| paid[i] as f64 / 100.0).sum();
        let total_owed: f64 = ids.iter().enumerate().map(|(i, _)| owed[i] as f64 / 100.0).sum();
        let totals = state.totals();
        prop_assert!((totals.total_paid - total_paid).abs() < 1e-6);
        prop_assert_eq!(totals.doubled_total, totals.total_paid * 2.0);
        prop_assert!((totals.claim_value - (2.0 * total_paid + total_owed)).abs() < 1e-6);
    }
}
