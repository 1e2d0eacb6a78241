//! Petition variant selector.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The two petition variants: with or without a request for injunctive
/// relief (tutela de urgência).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum TemplateKind {
    #[serde(rename = "com_tutela")]
    #[strum(serialize = "com_tutela")]
    WithInjunction,
    #[serde(rename = "sem_tutela")]
    #[strum(serialize = "sem_tutela")]
    WithoutInjunction,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::WithInjunction, TemplateKind::WithoutInjunction];

    /// Template file rendered for this variant.
    pub fn template_file(self) -> &'static str {
        match self {
            TemplateKind::WithInjunction => {
                "01_Peticao_Inicial_Emprestimo_Tutela_Nome_Sobrenome_Parte_Autora_x_Razao_Social_Re_LIMPO.docx"
            }
            TemplateKind::WithoutInjunction => {
                "01_Peticao_Inicial_Emprestimo_Sem_Tutela_Nome_Sobrenome_Parte_Autora_x_Razao_Social_Re_LIMPO.docx"
            }
        }
    }

    /// Label used in downloaded file names.
    pub fn file_label(self) -> &'static str {
        match self {
            TemplateKind::WithInjunction => "Tutela",
            TemplateKind::WithoutInjunction => "Sem_Tutela",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_keys_round_trip() {
        for kind in TemplateKind::ALL {
            assert_eq!(kind.as_ref().parse::<TemplateKind>().ok(), Some(kind));
        }
        assert!("xyz".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn each_variant_has_distinct_template() {
        assert_ne!(
            TemplateKind::WithInjunction.template_file(),
            TemplateKind::WithoutInjunction.template_file()
        );
    }
}
