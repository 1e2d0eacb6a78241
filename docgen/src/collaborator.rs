//! External processes that render and convert documents.

use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;
use std::process::Output;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::error::CollaboratorError;

/// Fills a template with data and writes a DOCX to `output`.
///
/// The orchestrator checks for `output` afterwards; returning `Ok` without
/// writing it is treated as a rendering failure.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        template: &Path,
        output: &Path,
        data: &Value,
    ) -> Result<(), CollaboratorError>;
}

/// Converts `source` to PDF, writing `<out_dir>/<source stem>.pdf`.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, source: &Path, out_dir: &Path) -> Result<(), CollaboratorError>;
}

const CLEAN_PATH: &str = "/usr/bin:/bin";

/// Runs a Python templating script:
/// `<program> <script> <template> <output> <json>`.
///
/// Arguments are passed directly, without a shell, so the JSON needs no
/// quoting.
#[derive(Debug, Clone)]
pub struct ScriptRenderer {
    pub program: PathBuf,
    pub script: PathBuf,
    /// Clear the environment except `PATH=/usr/bin:/bin`.
    pub clean_env: bool,
}

impl ScriptRenderer {
    pub fn new(program: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            clean_env: true,
        }
    }
}

#[async_trait]
impl Renderer for ScriptRenderer {
    async fn render(
        &self,
        template: &Path,
        output: &Path,
        data: &Value,
    ) -> Result<(), CollaboratorError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.script)
            .arg(template)
            .arg(output)
            .arg(data.to_string());
        if self.clean_env {
            cmd.env_clear().env("PATH", CLEAN_PATH);
        }

        let out = run(cmd, self.program.as_os_str(), None).await?;
        let stderr = String::from_utf8_lossy(&out.stderr);
        if !stderr.trim().is_empty() && !stderr.contains("UserWarning") {
            tracing::warn!(stderr = %stderr.trim(), "renderer wrote to stderr");
        }
        Ok(())
    }
}

/// Headless LibreOffice:
/// `<program> --headless --convert-to pdf --outdir <out_dir> <source>`.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl LibreOfficeConverter {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new("libreoffice", Duration::from_secs(30))
    }
}

#[async_trait]
impl Converter for LibreOfficeConverter {
    async fn convert(&self, source: &Path, out_dir: &Path) -> Result<(), CollaboratorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(source);
        run(cmd, self.program.as_os_str(), Some(self.timeout)).await?;
        Ok(())
    }
}

/// Spawn `cmd`, capture its output and map a non-zero exit to
/// [`CollaboratorError::Failed`]. The child is killed if the timeout
/// elapses or the future is dropped.
async fn run(
    mut cmd: Command,
    program: &OsStr,
    timeout: Option<Duration>,
) -> Result<Output, CollaboratorError> {
    let program = program.to_string_lossy().into_owned();
    tracing::debug!(%program, "spawning collaborator");

    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CollaboratorError::Spawn {
            program: program.clone(),
            source,
        })?;

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(waited) => waited,
            Err(_) => {
                return Err(CollaboratorError::TimedOut {
                    program,
                    timeout: limit,
                });
            }
        },
        None => child.wait_with_output().await,
    };
    let out = waited.map_err(|source| CollaboratorError::Wait {
        program: program.clone(),
        source,
    })?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
        let stderr = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&out.stdout).into_owned()
        } else {
            stderr
        };
        return Err(CollaboratorError::Failed {
            program,
            code: out.status.code(),
            stderr,
        });
    }
    Ok(out)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn renderer_passes_arguments_without_shell() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("render.sh");
        // Writes the JSON argument to the output path.
        std::fs::write(&script, "printf '%s' \"$3\" > \"$2\"\n").unwrap();
        let output = dir.path().join("out.docx");

        let renderer = ScriptRenderer::new("/bin/sh", &script);
        let data = json!({ "NOME": "D'Ávila \"Jr\"" });
        renderer
            .render(Path::new("template.docx"), &output, &data)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&written).unwrap(), data);
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "echo 'template broken' >&2\nexit 3\n").unwrap();

        let renderer = ScriptRenderer::new("/bin/sh", &script);
        let err = renderer
            .render(Path::new("t.docx"), &dir.path().join("o.docx"), &json!({}))
            .await
            .unwrap_err();
        match err {
            CollaboratorError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("template broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let converter =
            LibreOfficeConverter::new("/nonexistent/soffice", Duration::from_secs(1));
        let err = converter
            .convert(Path::new("a.docx"), Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Spawn { .. }));
    }

    #[tokio::test]
    async fn slow_process_times_out() {
        let mut cmd = Command::new("/bin/sh");
        cmd.args(["-c", "sleep 5"]);
        let err = run(cmd, OsStr::new("/bin/sh"), Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::TimedOut { .. }));
    }
}
