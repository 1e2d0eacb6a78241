//! Grace policy for the conversion collaborator.
//!
//! LibreOffice sometimes exits with an error (typically a `javaldx`
//! warning) while still writing the PDF. A conversion therefore counts as
//! successful when the process exits cleanly **or** the artifact exists
//! once `grace` has elapsed. There is exactly one recheck; no retry loop.

use std::path::Path;
use std::time::Duration;

use crate::error::CollaboratorError;
use crate::error::DocgenError;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPolicy {
    /// Wait before rechecking for the artifact after a failed exit.
    pub grace: Duration,
    /// Wait before the final existence check once conversion is accepted.
    pub settle: Duration,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::from_millis(3000),
            settle: Duration::from_millis(1000),
        }
    }
}

impl ConversionPolicy {
    /// Decide whether a conversion produced `artifact`.
    pub async fn confirm(
        &self,
        outcome: std::result::Result<(), CollaboratorError>,
        artifact: &Path,
    ) -> Result<()> {
        if let Err(err) = outcome {
            tracing::warn!(error = %err, grace_ms = self.grace.as_millis() as u64, "converter reported an error; rechecking after grace period");
            tokio::time::sleep(self.grace).await;
            if !exists(artifact).await {
                tracing::warn!(artifact = %artifact.display(), "artifact missing after grace period");
                return Err(DocgenError::Conversion(err));
            }
            tracing::info!(artifact = %artifact.display(), "artifact present despite converter error");
        }

        tokio::time::sleep(self.settle).await;
        if !exists(artifact).await {
            return Err(DocgenError::PdfMissing);
        }
        Ok(())
    }
}

pub(crate) async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn spurious() -> CollaboratorError {
        CollaboratorError::Failed {
            program: "libreoffice".to_string(),
            code: Some(1),
            stderr: "javaldx: Could not find a Java Runtime Environment!".to_string(),
        }
    }

    fn assert_waited(start: Instant, millis: u64) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(millis)
                && elapsed < Duration::from_millis(millis + 50),
            "waited {elapsed:?}, expected ~{millis}ms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn clean_exit_waits_only_for_settle() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF").unwrap();

        let start = Instant::now();
        ConversionPolicy::default().confirm(Ok(()), &pdf).await.unwrap();
        assert_waited(start, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn error_with_artifact_present_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF").unwrap();

        let start = Instant::now();
        ConversionPolicy::default()
            .confirm(Err(spurious()), &pdf)
            .await
            .unwrap();
        assert_waited(start, 4000);
    }

    #[tokio::test(start_paused = true)]
    async fn error_without_artifact_fails_with_original_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionPolicy::default()
            .confirm(Err(spurious()), &dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocgenError::Conversion(CollaboratorError::Failed { .. })));
        assert!(err.to_string().contains("javaldx"));
    }

    #[tokio::test(start_paused = true)]
    async fn clean_exit_without_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionPolicy::default()
            .confirm(Ok(()), &dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocgenError::PdfMissing));
    }
}
