use super::{types::*, Engine};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const PAGES_SCRIPT: &str = "pdf_pages.py";

/// Runs pdfplumber in a subprocess. Its output keeps `(cid:N)` escapes,
/// which the normalizer repairs.
pub struct PythonEngine {
    cfg: Config,
    scripts_dir: PathBuf,
    python_exe: PathBuf,
}

impl PythonEngine {
    pub fn new(cfg: &Config) -> Result<Self> {
        let scripts_dir = PathBuf::from(&cfg.paths.scripts_dir);
        if cfg.security.pin_scripts_dir {
            let cwd = std::env::current_dir().with_context(|| "current_dir")?;
            let canon = scripts_dir
                .canonicalize()
                .with_context(|| format!("canonicalize scripts_dir: {}", scripts_dir.display()))?;
            if !canon.starts_with(&cwd) {
                return Err(anyhow!(
                    "scripts_dir is outside cwd while pin_scripts_dir=true: {}",
                    canon.display()
                ));
            }
        }
        let path = scripts_dir.join(PAGES_SCRIPT);
        if !path.exists() {
            return Err(anyhow!("missing script: {}", path.display()));
        }
        let python_exe = resolve_python_exe(&cfg.engine.python_exe);
        Ok(Self {
            cfg: cfg.clone(),
            scripts_dir,
            python_exe,
        })
    }

    fn run_json<I: serde::Serialize, O: for<'de> serde::Deserialize<'de>>(
        &self,
        input: &I,
    ) -> Result<O> {
        let script = self.scripts_dir.join(PAGES_SCRIPT);
        let timeout_seconds = self.cfg.engine.timeout_seconds;
        debug!("python run {} timeout={}s", script.display(), timeout_seconds);

        let mut cmd = Command::new(&self.python_exe);
        cmd.arg(&script);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning python: {}", script.display()))?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| anyhow!("no stdin"))?;
            let bytes = serde_json::to_vec(input)?;
            use std::io::Write;
            stdin.write_all(&bytes)?;
            stdin.flush().ok();
        }

        let output = if timeout_seconds > 0 {
            wait_with_timeout(&mut child, Duration::from_secs(timeout_seconds))?
        } else {
            child
                .wait_with_output()
                .with_context(|| "waiting for python")?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "python script failed: {}\n{}",
                script.display(),
                stderr
            ));
        }

        if self.cfg.debug.keep_python_stderr && !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("python stderr {}: {}", script.display(), stderr.trim());
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("parsing python JSON output: {}", script.display()))
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("GRAD_CHECK_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

impl Engine for PythonEngine {
    fn doctor(&self) -> Result<EngineDiag> {
        self.run_json(&serde_json::json!({"cmd": "doctor"}))
    }

    fn page_texts(&self, input: &Path) -> Result<Vec<PageText>> {
        let out: PagesOut = self.run_json(&serde_json::json!({
            "cmd": "pages",
            "input_pdf": input,
        }))?;
        if !out.ok {
            let msg = out.error.unwrap_or_else(|| "pdf_pages failed".to_string());
            return Err(anyhow!(msg));
        }
        Ok(out.pages)
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output> {
    // Drain pipes while waiting so a chatty child can't block on a full buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf).with_context(|| "read stdout")?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf).with_context(|| "read stderr")?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            let stdout = stdout_thread
                .join()
                .map_err(|_| anyhow!("stdout reader thread panicked"))??;
            let stderr = stderr_thread
                .join()
                .map_err(|_| anyhow!("stderr reader thread panicked"))??;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if start.elapsed() > timeout {
            warn!("python process timed out after {:?}", timeout);
            let _ = child.kill();
            child.wait().with_context(|| "wait after kill")?;
            let _ = stdout_thread.join();
            let stderr = stderr_thread
                .join()
                .map_err(|_| anyhow!("stderr reader thread panicked"))??;
            return Err(anyhow!(
                "python process exceeded timeout ({:?}); stderr: {}",
                timeout,
                String::from_utf8_lossy(&stderr)
            ));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
