//! Template lookup on disk.

use std::path::Path;
use std::path::PathBuf;

use petition_form::TemplateKind;
use serde::Serialize;

use crate::error::DocgenError;
use crate::error::Result;

const TEMPLATE_SUFFIX: &str = "_LIMPO.docx";

/// A template available for the current-shape API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// File name without the `_LIMPO.docx` suffix.
    pub name: String,
    /// File name to pass back as `template`.
    pub path: String,
}

/// Templates live as plain files in one directory.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    dir: PathBuf,
}

impl TemplateCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the template for a petition variant. Fails with
    /// [`DocgenError::TemplateNotFound`] when the file is not on disk.
    pub async fn for_kind(&self, kind: TemplateKind) -> Result<PathBuf> {
        self.existing(kind.template_file()).await
    }

    /// Path of a template named by the caller.
    ///
    /// Names that could leave the templates directory (separators, `..`,
    /// absolute paths) are rejected before touching the filesystem.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(DocgenError::InvalidTemplateName(name.to_string()));
        }
        self.existing(name).await
    }

    /// Every `*_LIMPO.docx` in the directory, sorted by file name.
    pub async fn list(&self) -> Result<Vec<TemplateInfo>> {
        let catalog_err = |source| DocgenError::Catalog {
            dir: self.dir.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(catalog_err)?;
        let mut templates = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(catalog_err)? {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(TEMPLATE_SUFFIX) {
                templates.push(TemplateInfo {
                    name: name.to_string(),
                    path: file_name.clone(),
                });
            }
        }
        templates.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(templates)
    }

    async fn existing(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            _ => Err(DocgenError::TemplateNotFound(file_name.to_string())),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !Path::new(name).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog_with(files: &[&str]) -> (tempfile::TempDir, TemplateCatalog) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            std::fs::write(dir.path().join(file), b"docx").unwrap();
        }
        let catalog = TemplateCatalog::new(dir.path());
        (dir, catalog)
    }

    #[tokio::test]
    async fn lists_only_clean_templates() {
        let (_dir, catalog) = catalog_with(&["B_LIMPO.docx", "A_LIMPO.docx", "notes.txt", "C.docx"]);
        let templates = catalog.list().await.unwrap();
        assert_eq!(
            templates,
            vec![
                TemplateInfo {
                    name: "A".to_string(),
                    path: "A_LIMPO.docx".to_string()
                },
                TemplateInfo {
                    name: "B".to_string(),
                    path: "B_LIMPO.docx".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_lookup() {
        let (_dir, catalog) = catalog_with(&[]);
        for name in ["../etc/passwd", "a/b.docx", "a\\b.docx", "..", ""] {
            let err = catalog.resolve(name).await.unwrap_err();
            assert!(matches!(err, DocgenError::InvalidTemplateName(_)), "{name}: {err:?}");
        }
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let (_dir, catalog) = catalog_with(&["A_LIMPO.docx"]);
        assert!(matches!(
            catalog.resolve("xyz").await,
            Err(DocgenError::TemplateNotFound(name)) if name == "xyz"
        ));
        assert!(catalog.resolve("A_LIMPO.docx").await.is_ok());
    }

    #[tokio::test]
    async fn variant_maps_to_its_file() {
        let (_dir, catalog) = catalog_with(&[TemplateKind::WithoutInjunction.template_file()]);
        let path = catalog.for_kind(TemplateKind::WithoutInjunction).await.unwrap();
        assert!(path.ends_with(TemplateKind::WithoutInjunction.template_file()));
        assert!(catalog.for_kind(TemplateKind::WithInjunction).await.is_err());
    }

    #[tokio::test]
    async fn missing_directory_is_a_catalog_error() {
        let catalog = TemplateCatalog::new("/nonexistent/templates");
        assert!(matches!(catalog.list().await, Err(DocgenError::Catalog { .. })));
    }
}
