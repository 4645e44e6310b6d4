//! External provisioning engine driver
//!
//! Hands plans to an engine executable and reads back what it realized.
//! The engine is invoked as `<command> <args..> <verb>`:
//!
//! - `state`: prints the realized [`GlobalState`] as JSON (empty output
//!   means nothing is realized yet)
//! - `apply`: reads a [`Plan`] as JSON on stdin and prints an
//!   [`ApplyResult`] whose `realized` map carries the resulting resources

use crate::action::{ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::provider::{AuthStatus, CloudProvider};
use crate::state::GlobalState;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Provisioning engine reached through its command line
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    command: String,
    args: Vec<String>,
}

impl ExternalEngine {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the engine with `verb`, optionally feeding `input` on stdin
    async fn run(&self, verb: &str, input: Option<&[u8]>) -> Result<String> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.arg(verb);
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: {} {} {}",
            self.command,
            self.args.join(" "),
            verb
        );

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CloudError::EngineNotFound(self.command.clone()),
            _ => CloudError::Io(e),
        })?;

        // stdin is fed while stdout/stderr drain; a full pipe on either side
        // would otherwise block both processes
        let stdin = child.stdin.take();
        let feed = async move {
            if let (Some(bytes), Some(mut stdin)) = (input, stdin) {
                stdin.write_all(bytes).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CloudError::CommandFailed(format!(
                "{} {}: {}",
                self.command,
                verb,
                stderr.trim()
            )));
        }

        match fed {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(engine = %self.command, verb, "Engine exited without reading stdin");
            }
            other => other?,
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl CloudProvider for ExternalEngine {
    fn name(&self) -> &str {
        &self.command
    }

    fn display_name(&self) -> &str {
        "External provisioning engine"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        let which = Command::new("which").arg(&self.command).output().await?;

        if !which.status.success() {
            return Ok(AuthStatus::failed(format!(
                "{} not found on PATH",
                self.command
            )));
        }

        let path = String::from_utf8_lossy(&which.stdout).trim().to_string();
        Ok(AuthStatus::ok(path))
    }

    async fn get_state(&self) -> Result<GlobalState> {
        let output = self.run("state", None).await?;
        if output.trim().is_empty() {
            return Ok(GlobalState::new());
        }
        Ok(serde_json::from_str(&output)?)
    }

    async fn apply(&self, plan: &Plan) -> Result<ApplyResult> {
        let start = std::time::Instant::now();
        let payload = serde_json::to_vec(plan)?;

        tracing::info!(
            engine = %self.command,
            actions = plan.actions.len(),
            "Handing plan to engine"
        );
        let output = self.run("apply", Some(&payload)).await?;

        let mut result: ApplyResult = serde_json::from_str(&output)?;
        if result.duration_ms == 0 {
            result.duration_ms = start.elapsed().as_millis() as u64;
        }
        Ok(result)
    }
}
