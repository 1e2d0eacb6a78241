//! Scalar petition fields and the submitted payload.
//!
//! The wire shape keeps the camelCase Portuguese keys the rendering
//! templates were written against (`nomeCompleto`, `contratos`,
//! `valorCausa`, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::ContractEntry;
use crate::totals::Totals;

/// One scalar form field, described for validation and context building.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<'a> {
    /// Key in the submitted payload.
    pub key: &'static str,
    /// Key in the flat template context.
    pub context_key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    pub value: &'a str,
    pub required: bool,
}

const fn spec<'a>(
    key: &'static str,
    context_key: &'static str,
    label: &'static str,
    value: &'a str,
    required: bool,
) -> FieldSpec<'a> {
    FieldSpec {
        key,
        context_key,
        label,
        value,
        required,
    }
}

/// Court addressing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Venue {
    #[serde(rename = "tipoOrgao")]
    pub court_type: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "preposicaoEstado")]
    pub state_preposition: String,
}

impl Venue {
    pub fn fields(&self) -> [FieldSpec<'_>; 4] {
        [
            spec("tipoOrgao", "TIPO_ORGAO", "Tipo de órgão", &self.court_type, true),
            spec("cidade", "CIDADE", "Cidade", &self.city, true),
            spec("estado", "ESTADO", "Estado", &self.state, true),
            spec(
                "preposicaoEstado",
                "PREPOSICAO_ESTADO",
                "Preposição do estado",
                &self.state_preposition,
                true,
            ),
        ]
    }
}

/// The claimant (parte autora).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claimant {
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    #[serde(rename = "nacionalidade")]
    pub nationality: String,
    #[serde(rename = "nascimento")]
    pub birth_date: String,
    #[serde(rename = "estadoCivil")]
    pub marital_status: String,
    #[serde(rename = "profissao")]
    pub profession: String,
    pub rg: String,
    #[serde(rename = "estadoRg")]
    pub rg_state: String,
    pub cpf: String,
    pub whatsapp: String,
    pub email: String,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "numero")]
    pub street_number: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "bairro")]
    pub district: String,
    #[serde(rename = "cep")]
    pub postal_code: String,
}

impl Claimant {
    pub fn fields(&self) -> [FieldSpec<'_>; 15] {
        [
            spec("nomeCompleto", "NOME_COMPLETO", "Nome completo", &self.full_name, true),
            spec("nacionalidade", "NACIONALIDADE", "Nacionalidade", &self.nationality, true),
            spec("nascimento", "NASCIMENTO", "Data de nascimento", &self.birth_date, true),
            spec("estadoCivil", "ESTADO_CIVIL", "Estado civil", &self.marital_status, true),
            spec("profissao", "PROFISSAO", "Profissão", &self.profession, true),
            spec("rg", "RG", "RG", &self.rg, true),
            spec("estadoRg", "ESTADO_RG", "UF do RG", &self.rg_state, true),
            spec("cpf", "CPF", "CPF", &self.cpf, true),
            spec("whatsapp", "WHATSAPP", "WhatsApp", &self.whatsapp, true),
            spec("email", "EMAIL", "E-mail", &self.email, true),
            spec("logradouro", "LOGRADOURO", "Logradouro", &self.street, true),
            spec("numero", "NUMERO", "Número", &self.street_number, true),
            spec("complemento", "COMPLEMENTO", "Complemento", &self.complement, false),
            spec("bairro", "BAIRRO", "Bairro", &self.district, true),
            spec("cep", "CEP", "CEP", &self.postal_code, true),
        ]
    }
}

/// The respondent company (ré).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Respondent {
    #[serde(rename = "nomeEmpresa")]
    pub company_name: String,
    pub cnpj: String,
    #[serde(rename = "logRe")]
    pub street: String,
    #[serde(rename = "nRe")]
    pub street_number: String,
    #[serde(rename = "complRe")]
    pub complement: String,
    #[serde(rename = "bairroRe")]
    pub district: String,
    #[serde(rename = "cidadeRe")]
    pub city: String,
    #[serde(rename = "ufRe")]
    pub state: String,
    #[serde(rename = "cepRe")]
    pub postal_code: String,
}

impl Respondent {
    pub fn fields(&self) -> [FieldSpec<'_>; 9] {
        [
            spec("nomeEmpresa", "NOME_EMPRESA", "Razão social", &self.company_name, true),
            spec("cnpj", "CNPJ", "CNPJ", &self.cnpj, true),
            spec("logRe", "LOG_RE", "Logradouro da ré", &self.street, true),
            spec("nRe", "N_RE", "Número da ré", &self.street_number, true),
            spec("complRe", "COMPL_RE", "Complemento da ré", &self.complement, false),
            spec("bairroRe", "BAIRRO_RE", "Bairro da ré", &self.district, true),
            spec("cidadeRe", "CIDADE_RE", "Cidade da ré", &self.city, true),
            spec("ufRe", "UF_RE", "UF da ré", &self.state, true),
            spec("cepRe", "CEP_RE", "CEP da ré", &self.postal_code, true),
        ]
    }
}

/// Every scalar field of the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetitionForm {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(flatten)]
    pub claimant: Claimant,
    #[serde(flatten)]
    pub respondent: Respondent,
    #[serde(rename = "justicaGratuita")]
    pub legal_aid: String,
}

impl PetitionForm {
    /// All scalar fields in form order.
    pub fn fields(&self) -> Vec<FieldSpec<'_>> {
        let mut fields = Vec::with_capacity(29);
        fields.extend(self.venue.fields());
        fields.extend(self.claimant.fields());
        fields.extend(self.respondent.fields());
        fields.push(spec(
            "justicaGratuita",
            "JUSTICA_GRATUITA",
            "Justiça gratuita",
            &self.legal_aid,
            true,
        ));
        fields
    }

    /// Required fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<FieldSpec<'_>> {
        self.fields()
            .into_iter()
            .filter(|f| f.required && f.value.trim().is_empty())
            .collect()
    }
}

/// Snapshot handed to the document orchestrator. Built once at submission
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetitionPayload {
    #[serde(flatten)]
    pub form: PetitionForm,
    #[serde(rename = "contratos")]
    pub contracts: Vec<ContractEntry>,
    #[serde(flatten)]
    pub totals: Totals,
}

impl PetitionPayload {
    /// Assemble a payload, computing totals over `contracts`.
    pub fn new(form: PetitionForm, contracts: Vec<ContractEntry>) -> Self {
        let totals = Totals::from_entries(&contracts);
        Self {
            form,
            contracts,
            totals,
        }
    }

    /// Flat UPPER_SNAKE context for the current-shape rendering API.
    ///
    /// Scalar fields are passed as strings, per-contract amounts under
    /// `CT<n>_*_FLOAT` and totals as numbers; the rendering collaborator
    /// owns their final money formatting.
    pub fn to_template_context(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        for field in self.form.fields() {
            ctx.insert(field.context_key.to_string(), Value::from(field.value));
        }
        ctx.insert(
            "RAZAO_SOCIAL_RE".to_string(),
            Value::from(self.form.respondent.company_name.as_str()),
        );

        ctx.insert("QTD_CONTRATOS".to_string(), Value::from(self.contracts.len()));
        for (index, entry) in self.contracts.iter().enumerate() {
            let n = index + 1;
            let mut put = |suffix: &str, value: Value| {
                ctx.insert(format!("CT{n}_{suffix}"), value);
            };
            put("NUMERO", Value::from(entry.number.as_str()));
            put(
                "INICIO",
                Value::from(format!("{}/{}", entry.start_month, entry.start_year)),
            );
            put(
                "FIM",
                Value::from(format!("{}/{}", entry.end_month, entry.end_year)),
            );
            put("SITUACAO", Value::from(entry.status.as_ref()));
            put("PARCELA_FLOAT", Value::from(entry.installment_amount));
            put("PAGO_FLOAT", Value::from(entry.amount_paid));
            put("A_PAGAR_FLOAT", Value::from(entry.amount_owed));
            put("COPIA", Value::from(entry.has_copy.as_ref()));
        }

        ctx.insert(
            "VALOR_PAGO_INDEVIDO".to_string(),
            Value::from(self.totals.total_paid),
        );
        ctx.insert(
            "VALOR_INDEVIDO_DOBRO".to_string(),
            Value::from(self.totals.doubled_total),
        );
        ctx.insert("VALOR_CAUSA".to_string(), Value::from(self.totals.claim_value));
        ctx
    }
}
