//! Normalised company record and lookup outcome.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumString;

/// Where a lookup was answered from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LookupSource {
    Local,
    BrasilApi,
    ReceitaWs,
}

/// Company data in the shape the petition form consumes, regardless of
/// which source produced it. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyRecord {
    #[serde(rename = "nome")]
    pub name: String,
    pub cnpj: String,
    #[serde(rename = "endereco")]
    pub address: String,
    pub email: String,
    #[serde(rename = "whatsapp")]
    pub phone: String,
}

/// Successful lookup: `{ "source": "...", "data": { ... } }` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOutcome {
    pub source: LookupSource,
    pub data: CompanyRecord,
}

/// `"<logradouro>, <numero>, <municipio>/<uf>, <cep>"` from a provider body.
/// Absent keys render as empty strings, so the separators are always there.
pub fn format_address(body: &Value) -> String {
    format!(
        "{}, {}, {}/{}, {}",
        text_field(body, "logradouro"),
        text_field(body, "numero"),
        text_field(body, "municipio"),
        text_field(body, "uf"),
        text_field(body, "cep"),
    )
}

/// A provider field as text. Numbers are rendered, anything else is empty.
pub(crate) fn text_field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
