//! Child process execution.
//!
//! The child is started with a fully composed environment. A waiter task
//! owns the child and reports its exit status once, on a capacity-one
//! channel. While waiting, caught signals are forwarded to the child.

use crate::compose::EnvList;
use crate::signals::{self, SignalListener};
use envetcd_types::{EnvEtcdError, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Where the child's stdout goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutSink {
    /// The supervisor's own stdout
    Inherit,
    /// A freshly created file
    File(PathBuf),
}

impl StdoutSink {
    /// `File` when an output path is configured, `Inherit` otherwise.
    pub fn from_output(output: Option<&Path>) -> Self {
        match output {
            Some(path) if !path.as_os_str().is_empty() => StdoutSink::File(path.to_path_buf()),
            _ => StdoutSink::Inherit,
        }
    }
}

/// A command ready to be started.
#[derive(Debug, Clone)]
pub struct Runner {
    argv: Vec<String>,
    env: EnvList,
    stdout: StdoutSink,
}

/// A started child under supervision.
pub struct RunningChild {
    program: String,
    pid: Option<u32>,
    done: mpsc::Receiver<std::io::Result<ExitStatus>>,
    copier: Option<JoinHandle<Result<()>>>,
    signals: SignalListener,
}

impl Runner {
    /// Create a runner for `argv` with exactly the environment `env`.
    pub fn new(argv: Vec<String>, env: EnvList, stdout: StdoutSink) -> Self {
        Self { argv, env, stdout }
    }

    /// Start the child.
    ///
    /// # Errors
    ///
    /// - [`EnvEtcdError::Config`] for an empty argv
    /// - [`EnvEtcdError::File`] when the stdout file cannot be created
    /// - [`EnvEtcdError::Spawn`] when the program cannot be started
    pub async fn spawn(self) -> Result<RunningChild> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| EnvEtcdError::Config("no command given".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(self.env)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());

        let output_file = match &self.stdout {
            StdoutSink::Inherit => {
                cmd.stdout(Stdio::inherit());
                None
            }
            StdoutSink::File(path) => {
                let file = tokio::fs::File::create(path)
                    .await
                    .map_err(|source| EnvEtcdError::File {
                        path: path.clone(),
                        source,
                    })?;
                cmd.stdout(Stdio::piped());
                Some((path.clone(), file))
            }
        };

        // Subscribe before the child exists so no signal slips through.
        let signals = signals::listen()?;

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                if let Some((path, file)) = output_file {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                }
                return Err(EnvEtcdError::Spawn {
                    command: program.clone(),
                    source,
                });
            }
        };
        let pid = child.id();
        debug!(command = %program, ?pid, "started child");

        let copier = match (output_file, child.stdout.take()) {
            (Some((path, file)), Some(mut stdout)) => Some(tokio::spawn(async move {
                let file_error = |source| EnvEtcdError::File {
                    path: path.clone(),
                    source,
                };
                let mut writer = tokio::io::BufWriter::new(file);
                tokio::io::copy(&mut stdout, &mut writer)
                    .await
                    .map_err(file_error)?;
                writer.flush().await.map_err(file_error)?;
                writer.into_inner().sync_all().await.map_err(file_error)?;
                Ok(())
            })),
            _ => None,
        };

        let (tx, done) = mpsc::channel(1);
        tokio::spawn(async move {
            let status = child.wait().await;
            let _ = tx.send(status).await;
        });

        Ok(RunningChild {
            program: program.clone(),
            pid,
            done,
            copier,
            signals,
        })
    }

    /// Start the child and supervise it to completion.
    pub async fn run(self) -> Result<i32> {
        self.spawn().await?.supervise().await
    }
}

impl RunningChild {
    /// Forward signals until the child exits, then report its exit code.
    ///
    /// Stdout redirected to a file is flushed and synced before returning.
    ///
    /// # Errors
    ///
    /// - [`EnvEtcdError::ChildAbnormal`] when the child has no exit status
    /// - [`EnvEtcdError::File`] when the stdout file cannot be completed
    pub async fn supervise(mut self) -> Result<i32> {
        let status = loop {
            tokio::select! {
                biased;
                status = self.done.recv() => break status,
                Some(sig) = self.signals.recv() => {
                    // The waiter may have reaped the child since the last poll.
                    if let Ok(status) = self.done.try_recv() {
                        self.pid = None;
                        break Some(status);
                    }
                    if let Some(pid) = self.pid {
                        debug!(signal = ?sig, pid, "forwarding signal");
                        if let Err(e) = signals::forward(pid, sig) {
                            warn!(signal = ?sig, pid, error = %e, "failed to forward signal");
                        }
                    }
                }
            }
        };
        drop(self.signals);

        if let Some(copier) = self.copier.take() {
            copier
                .await
                .map_err(|e| EnvEtcdError::ChildAbnormal(format!("output copy task failed: {}", e)))??;
        }

        let status = match status {
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                return Err(EnvEtcdError::ChildAbnormal(format!(
                    "waiting on {} failed: {}",
                    self.program, e
                )))
            }
            None => {
                return Err(EnvEtcdError::ChildAbnormal(format!(
                    "lost track of {}",
                    self.program
                )))
            }
        };

        match status.code() {
            Some(code) => {
                debug!(command = %self.program, code, "child exited");
                Ok(code)
            }
            None => Err(EnvEtcdError::ChildAbnormal(describe(&status))),
        }
    }
}

#[cfg(unix)]
fn describe(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(sig) => format!("killed by signal {}", sig),
        None => status.to_string(),
    }
}

#[cfg(not(unix))]
fn describe(status: &ExitStatus) -> String {
    status.to_string()
}
