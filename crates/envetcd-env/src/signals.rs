//! Signal forwarding to the child.
//!
//! A single listener task owns the signal subscriptions and hands each
//! caught signal to the supervising loop over a channel; nothing runs inside
//! a raw signal handler.

use envetcd_types::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[cfg(unix)]
pub use nix::sys::signal::Signal;

/// Placeholder on platforms without POSIX signals; it has no values.
#[cfg(not(unix))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {}

/// Signals caught by the supervisor and relayed to the child.
#[cfg(unix)]
pub const FORWARDED: &[Signal] = &[
    Signal::SIGHUP,
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTERM,
    Signal::SIGUSR1,
    Signal::SIGUSR2,
];

/// Signals caught by the supervisor and relayed to the child.
#[cfg(not(unix))]
pub const FORWARDED: &[Signal] = &[];

/// Signal the async runtime may use internally for pre-emption. Never forwarded.
#[cfg(unix)]
pub const PREEMPTION: Option<Signal> = Some(Signal::SIGURG);

/// Signal the async runtime may use internally for pre-emption. Never forwarded.
#[cfg(not(unix))]
pub const PREEMPTION: Option<Signal> = None;

/// The subset of `signals` that may be subscribed to.
pub fn forwardable(signals: &[Signal]) -> Vec<Signal> {
    signals
        .iter()
        .copied()
        .filter(|s| Some(*s) != PREEMPTION)
        .collect()
}

/// Running signal subscription. Dropping it stops the listener task.
pub struct SignalListener {
    rx: mpsc::Receiver<Signal>,
    task: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Next caught signal, or `None` once the listener has stopped.
    pub async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Subscribe to [`FORWARDED`] and start the listener task.
#[cfg(unix)]
pub fn listen() -> Result<SignalListener> {
    use std::future::poll_fn;
    use std::task::Poll;
    use tokio::signal::unix::{signal, SignalKind};

    let mut streams = Vec::new();
    for sig in forwardable(FORWARDED) {
        streams.push((sig, signal(SignalKind::from_raw(sig as i32))?));
    }

    let (tx, rx) = mpsc::channel(16);
    let task = tokio::spawn(async move {
        loop {
            let caught = poll_fn(|cx| {
                for (sig, stream) in streams.iter_mut() {
                    if let Poll::Ready(Some(())) = stream.poll_recv(cx) {
                        return Poll::Ready(*sig);
                    }
                }
                Poll::Pending
            })
            .await;

            tracing::debug!(signal = ?caught, "caught signal");
            if tx.send(caught).await.is_err() {
                return;
            }
        }
    });

    Ok(SignalListener {
        rx,
        task: Some(task),
    })
}

/// Subscribe to [`FORWARDED`]; a no-op listener without POSIX signals.
#[cfg(not(unix))]
pub fn listen() -> Result<SignalListener> {
    let (_tx, rx) = mpsc::channel(1);
    Ok(SignalListener { rx, task: None })
}

/// Deliver `sig` to the process `pid`.
#[cfg(unix)]
pub fn forward(pid: u32, sig: Signal) -> Result<()> {
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).map_err(|_| {
        envetcd_types::EnvEtcdError::ChildAbnormal(format!("pid {} out of range", pid))
    })?;
    nix::sys::signal::kill(Pid::from_raw(pid), sig)
        .map_err(std::io::Error::from)?;
    Ok(())
}

/// Deliver `sig` to the process `pid`.
#[cfg(not(unix))]
pub fn forward(_pid: u32, sig: Signal) -> Result<()> {
    match sig {}
}
