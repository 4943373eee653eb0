//! Run the Meow engine as a child process.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::bridge::ExecutionResult;
use crate::error::LoadError;
use crate::loader::{Bootstrap, EntryPoint, ModuleArtifact};

/// Turns an engine artifact into a runnable [`ProcessEntryPoint`].
///
/// Downloaded engines are written to `cache_dir` under a name derived from
/// their md5 digest, so re-downloading the same build reuses the file.
#[derive(Debug, Clone)]
pub struct ProcessBootstrap {
    cache_dir: PathBuf,
    args: Vec<String>,
}

impl ProcessBootstrap {
    pub fn new(cache_dir: PathBuf, args: Vec<String>) -> Self {
        Self { cache_dir, args }
    }

    fn materialize(&self, bytes: &[u8]) -> Result<PathBuf, LoadError> {
        let io_err = |e: std::io::Error| LoadError::Instantiate { details: e.to_string() };

        fs::create_dir_all(&self.cache_dir).map_err(io_err)?;
        let path = self.cache_dir.join(format!("meow-engine-{:x}", md5::compute(bytes)));
        if !path.exists() {
            // Write under a temp name and rename so a half-written engine is never executed.
            let mut tmp = tempfile::NamedTempFile::new_in(&self.cache_dir).map_err(io_err)?;
            tmp.write_all(bytes).map_err(io_err)?;
            tmp.persist(&path).map_err(|e| io_err(e.error))?;
        }
        make_executable(&path).map_err(io_err)?;
        Ok(path)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl Bootstrap for ProcessBootstrap {
    fn instantiate(&self, artifact: ModuleArtifact) -> Result<Arc<dyn EntryPoint>, LoadError> {
        let program = match artifact {
            ModuleArtifact::Local(path) => path,
            ModuleArtifact::Downloaded { origin, bytes } => {
                if bytes.is_empty() {
                    return Err(LoadError::Instantiate {
                        details: format!("engine downloaded from {} is empty", origin),
                    });
                }
                self.materialize(&bytes)?
            }
        };
        info!(program = %program.display(), "engine instantiated");
        Ok(Arc::new(ProcessEntryPoint::new(program, self.args.clone())))
    }
}

/// Runs `<program> <args...> <source file>` once per request.
///
/// The child is killed when the run future is dropped, so quitting or
/// aborting a run never leaves an engine behind.
#[derive(Debug, Clone)]
pub struct ProcessEntryPoint {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessEntryPoint {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    async fn execute(self, source: String) -> ExecutionResult {
        let script = match write_script(&source) {
            Ok(script) => script,
            Err(e) => return ExecutionResult::failed(format!("failed to stage source: {}", e)),
        };

        debug!(program = %self.program.display(), script = %script.path().display(), "spawning engine");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                if output.status.success() {
                    return ExecutionResult { output: Some(stdout), error: None };
                }
                let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
                let error = if stderr.is_empty() {
                    format!("engine exited with {}", output.status)
                } else {
                    stderr
                };
                ExecutionResult { output: Some(stdout), error: Some(error) }
            }
            Err(e) => ExecutionResult::failed(format!("failed to start engine: {}", e)),
        }
    }
}

fn write_script(source: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut script = tempfile::Builder::new()
        .prefix("playground")
        .suffix(".nyan")
        .tempfile()?;
    script.write_all(source.as_bytes())?;
    script.flush()?;
    Ok(script)
}

impl EntryPoint for ProcessEntryPoint {
    fn run_meow(&self, source: &str) -> BoxFuture<'static, String> {
        let run = self.clone().execute(source.to_string());
        async move { serde_json::to_string(&run.await).unwrap_or_default() }.boxed()
    }
}
