//! Names given to downloaded artifacts.

use petition_form::TemplateKind;

const COMPANY_MAX_CHARS: usize = 30;

/// `01_Peticao_Inicial_Emprestimo_<Tutela|Sem_Tutela>_<Nome>_<Sobrenome>_x_<Razao>.<ext>`
///
/// Name parts are the alphanumeric runs of the claimant's name, so path
/// separators and other punctuation never reach the file name. The company
/// name keeps ASCII letters, digits and whitespace, turns whitespace runs
/// into `_` and is cut to 30 characters.
pub fn download_filename(kind: TemplateKind, full_name: &str, company: &str, ext: &str) -> String {
    let parts: Vec<&str> = full_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect();
    let first = parts.first().copied().unwrap_or("Nome");
    let last = parts.last().copied().unwrap_or("Sobrenome");

    let kept: String = company
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let company: String = kept
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(COMPANY_MAX_CHARS)
        .collect();

    format!(
        "01_Peticao_Inicial_Emprestimo_{}_{first}_{last}_x_{company}.{ext}",
        kind.file_label()
    )
}
