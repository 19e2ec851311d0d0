//! Local mail submission through a sendmail-compatible binary.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use notifyhook_core::error::{RelayError, Result};
use notifyhook_core::transport::{MailMessage, Mailer};

/// Pipes each message into `<path> -t -i`; recipients come from the headers.
pub struct SendmailMailer {
    path: String,
}

impl SendmailMailer {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Mailer for SendmailMailer {
    async fn submit(&self, message: MailMessage) -> Result<()> {
        debug!("Submitting mail to {} via {}", message.to, self.path);

        let mut child = Command::new(&self.path)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RelayError::Mail(format!("cannot run {}: {}", self.path, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A binary that exits early closes the pipe; its exit status decides.
            match stdin.write_all(message.render().as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(RelayError::Mail(format!("writing to {}: {}", self.path, e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RelayError::Mail(format!("waiting for {}: {}", self.path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(RelayError::Mail(if stderr.is_empty() {
                format!("sendmail exited with {}", output.status)
            } else {
                format!("sendmail exited with {}: {}", output.status, stderr)
            }));
        }
        Ok(())
    }
}
