//! Artifact file names.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use petition_form::TemplateKind;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Attachment name for the legacy endpoints: `Peticao_Inicial_<tipo>.<ext>`.
pub fn legacy_filename(kind: TemplateKind, ext: &str) -> String {
    format!("Peticao_Inicial_{kind}.{ext}")
}

/// Personalised name for a published artifact:
/// `01_Peticao_Inicial_Emprestimo_<Nome>_<Sobrenome>_x_<RazaoSocial>.<ext>`.
///
/// The claimant's first and last name come from `NOME_COMPLETO` (or
/// `nome_completo`); the company from `RAZAO_SOCIAL_RE`, `razao_social` or
/// `nome_empresa`, first non-blank wins. Accents are stripped and every
/// run of other non-alphanumeric characters becomes a single `_`.
pub fn document_filename(context: &Value, ext: &str) -> String {
    let full_name = first_text(context, &["NOME_COMPLETO", "nome_completo"]).unwrap_or_default();
    let mut parts = full_name.split(' ').filter(|p| !p.is_empty());
    let first = parts.next().unwrap_or("Nome");
    let last = parts.next_back().unwrap_or(if full_name.trim().is_empty() {
        "Sobrenome"
    } else {
        first
    });
    let company = first_text(context, &["RAZAO_SOCIAL_RE", "razao_social", "nome_empresa"])
        .unwrap_or("Empresa");

    format!(
        "01_Peticao_Inicial_Emprestimo_{}_{}_x_{}.{ext}",
        slug(first),
        slug(last),
        slug(company)
    )
}

fn first_text<'a>(context: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| context.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique stem for scratch files: `peticao_<unix millis>_<seq>`.
pub(crate) fn temp_stem() -> String {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("peticao_{}_{seq}", chrono::Utc::now().timestamp_millis())
}
