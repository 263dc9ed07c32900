//! Top-level lifecycle.
//!
//! ```text
//! Configuring -> Resolving -> WritingFile ----------------> Exited
//!                          \-> Spawning -> Supervising ---> Exited
//! ```

use crate::compose::compose;
use crate::envfile::write_env_file;
use crate::resolver::resolve;
use crate::runner::{Runner, StdoutSink};
use envetcd_core::{config::normalize, state};
use envetcd_services::{EtcdClient, EtcdConfig};
use envetcd_types::{exit, Config, EnvMap, KvStore, Result};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::debug;

/// Lifecycle phase of a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Configuration is being validated
    Configuring,
    /// Tiers are being read from the store
    Resolving,
    /// The mapping is being written to an env-file
    WritingFile,
    /// The child is being started
    Spawning,
    /// The child is running
    Supervising,
    /// Done
    Exited,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Configuring => "configuring",
            Phase::Resolving => "resolving",
            Phase::WritingFile => "writing-file",
            Phase::Spawning => "spawning",
            Phase::Supervising => "supervising",
            Phase::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Drives one envetcd run from configuration to exit code.
#[derive(Debug)]
pub struct Supervisor {
    config: Config,
    phase: Phase,
}

impl Supervisor {
    /// Validate and normalize `config`.
    pub fn new(config: Config) -> Result<Self> {
        debug!(phase = %Phase::Configuring, "entering phase");
        let config = normalize(config)?;
        Ok(Self {
            config,
            phase: Phase::Configuring,
        })
    }

    /// The normalized configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "entering phase");
        self.phase = phase;
    }

    /// Run against the configured etcd cluster.
    pub async fn run(self) -> Result<i32> {
        let gateway = if self.config.use_default_gateway {
            state::init_default_gateway()
        } else {
            None
        };
        let store = EtcdClient::new(EtcdConfig::from(&self.config))?;
        self.run_with(store, gateway).await
    }

    /// Run against `store`, syncing it first when configured.
    pub async fn run_with<S: KvStore>(mut self, mut store: S, gateway: Option<Ipv4Addr>) -> Result<i32> {
        let env = self.resolve_with(&mut store, gateway).await?;

        if let Some(path) = self.config.write_env.clone() {
            self.enter(Phase::WritingFile);
            write_env_file(&path, &env)?;
            self.enter(Phase::Exited);
            return Ok(exit::SUCCESS);
        }

        self.enter(Phase::Spawning);
        let env_list = compose(&env, self.config.clean_env, std::env::vars_os());
        let runner = Runner::new(
            self.config.command.clone(),
            env_list,
            StdoutSink::from_output(self.config.output.as_deref()),
        );
        let child = runner.spawn().await?;

        self.enter(Phase::Supervising);
        let code = child.supervise().await;
        self.enter(Phase::Exited);
        code
    }

    /// Sync `store` when configured and build the mapping.
    pub async fn resolve_with<S: KvStore>(
        &mut self,
        store: &mut S,
        gateway: Option<Ipv4Addr>,
    ) -> Result<EnvMap> {
        self.enter(Phase::Resolving);
        if self.config.sync {
            store.sync_cluster().await?;
        }
        resolve(&self.config, &*store, gateway).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use envetcd_services::MemoryStore;
    use envetcd_types::EnvEtcdError;

    const PEER: &str = "http://127.0.0.1:4001";

    fn store() -> MemoryStore {
        MemoryStore::new(vec![PEER.to_string()])
            .with("/config/global/X", "hello \"world\"")
            .with("/config/global/LOG_LEVEL", "DEBUG")
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_new_requires_command() {
        let err = Supervisor::new(Config::default()).unwrap_err();
        assert!(matches!(err, EnvEtcdError::Config(_)));
        assert_eq!(err.exit_code(), exit::PARSE);
    }

    #[tokio::test]
    async fn test_sync_when_configured() {
        let mut store = store();
        let mut supervisor = Supervisor::new(Config {
            command: vec!["env".to_string()],
            ..Default::default()
        })
        .unwrap();

        supervisor.resolve_with(&mut store, None).await.unwrap();
        assert_eq!(store.sync_count(), 1);
        assert_eq!(supervisor.phase(), Phase::Resolving);

        let mut supervisor = Supervisor::new(Config {
            command: vec!["env".to_string()],
            sync: false,
            ..Default::default()
        })
        .unwrap();
        supervisor.resolve_with(&mut store, None).await.unwrap();
        assert_eq!(store.sync_count(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_cluster_stops_before_reads() {
        let supervisor = Supervisor::new(Config {
            command: vec!["env".to_string()],
            ..Default::default()
        })
        .unwrap();
        let err = supervisor
            .run_with(MemoryStore::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), exit::STORE);
    }

    #[tokio::test]
    async fn test_write_env_instead_of_exec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e");
        let marker = dir.path().join("ran");

        let supervisor = Supervisor::new(Config {
            write_env: Some(path.clone()),
            command: sh(&format!("touch '{}'", marker.display())),
            ..Default::default()
        })
        .unwrap();

        let code = supervisor.run_with(store(), None).await.unwrap();
        assert_eq!(code, 0);
        assert!(!marker.exists());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("X=\"hello \\\"world\\\"\"\n"));
        assert!(contents.contains("ETCD_PEERS=\"http://127.0.0.1:4001\"\n"));
    }

    #[tokio::test]
    async fn test_child_sees_clean_environment() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        // With a clean environment the child has no PATH, so use an absolute shell.
        let supervisor = Supervisor::new(Config {
            clean_env: true,
            output: Some(out.clone()),
            command: vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "printf '%s|%s|%s' \"$LOG_LEVEL\" \"$ETCD_PEERS\" \"${HOME:-unset}\"".to_string(),
            ],
            ..Default::default()
        })
        .unwrap();

        let code = supervisor.run_with(store(), None).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "DEBUG|http://127.0.0.1:4001|unset"
        );
    }

    #[tokio::test]
    async fn test_exit_status_propagates() {
        let supervisor = Supervisor::new(Config {
            command: sh("exit 37"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(supervisor.run_with(store(), None).await.unwrap(), 37);
    }
}
