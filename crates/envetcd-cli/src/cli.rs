//! Command-line definition.

use clap::builder::BoolishValueParser;
use clap::Parser;
use envetcd_core::config::default_hostname;
use envetcd_types::config::{TlsConfig, DEFAULT_PEER, DEFAULT_PREFIX};
use envetcd_types::{Config, LogLevel};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "envetcd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a command with its environment read from etcd", long_about = None)]
pub struct Cli {
    /// etcd peers to connect to
    #[arg(
        short = 'C',
        long,
        env = "ENVETCD_PEERS",
        value_delimiter = ',',
        default_value = DEFAULT_PEER
    )]
    pub peers: Vec<String>,

    /// CA certificate used to verify the etcd peers
    #[arg(long, env = "ENVETCD_CA_FILE")]
    pub ca_file: Option<PathBuf>,

    /// Client certificate presented to the etcd peers
    #[arg(long, env = "ENVETCD_CERT_FILE")]
    pub cert_file: Option<PathBuf>,

    /// Private key for --cert-file
    #[arg(long, env = "ENVETCD_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Host tier selector (defaults to the OS hostname)
    #[arg(long, env = "HOSTNAME")]
    pub hostname: Option<String>,

    /// System tier selector (derived from --service when empty)
    #[arg(long, env = "ENVETCD_SYSTEM", default_value = "")]
    pub system: String,

    /// Service tier selector
    #[arg(short, long, env = "ENVETCD_SERVICE", default_value = "")]
    pub service: String,

    /// Key prefix of the tier directories
    #[arg(short, long, env = "ENVETCD_PREFIX", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Log level (DEBUG, INFO, WARN, ERR)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "WARN")]
    pub log_level: LogLevel,

    /// Write the environment to this file instead of running a command
    #[arg(short, long, env = "ENVETCD_WRITE_ENV")]
    pub write_env: Option<PathBuf>,

    /// Redirect the command's stdout to this file
    #[arg(short, long, env = "ENVETCD_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Don't refresh the peer list from the cluster
    #[arg(long, env = "ENVETCD_NO_SYNC", value_parser = BoolishValueParser::new())]
    pub no_sync: bool,

    /// Don't pass the inherited environment to the command
    #[arg(short, long, env = "ENVETCD_CLEAN_ENV", value_parser = BoolishValueParser::new())]
    pub clean_env: bool,

    /// Keep characters outside [A-Za-z0-9_] in key names
    #[arg(long, env = "ENVETCD_NO_SANITIZE", value_parser = BoolishValueParser::new())]
    pub no_sanitize: bool,

    /// Keep the case of key names
    #[arg(long, env = "ENVETCD_NO_UPCASE", value_parser = BoolishValueParser::new())]
    pub no_upcase: bool,

    /// Export the default gateway as ENVETCD_DEFAULT_GATEWAY
    #[arg(
        short = 'd',
        long,
        env = "ENVETCD_USE_DEFAULT_GATEWAY",
        value_parser = BoolishValueParser::new()
    )]
    pub use_default_gateway: bool,

    /// Connect timeout to the etcd peers, in milliseconds
    #[arg(long, env = "ENVETCD_DIAL_TIMEOUT", default_value_t = 1000)]
    pub dial_timeout: u64,

    /// Command to run, with its arguments
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// Build the raw configuration record. Normalization happens later.
    pub fn into_config(self) -> Config {
        Config {
            peers: self
                .peers
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            tls: TlsConfig {
                ca_file: self.ca_file,
                cert_file: self.cert_file,
                key_file: self.key_file,
            },
            sync: !self.no_sync,
            prefix: self.prefix,
            system: self.system,
            service: self.service,
            hostname: self.hostname.unwrap_or_else(default_hostname),
            sanitize: !self.no_sanitize,
            upcase: !self.no_upcase,
            clean_env: self.clean_env,
            use_default_gateway: self.use_default_gateway,
            write_env: self.write_env.filter(|p| !p.as_os_str().is_empty()),
            output: self.output.filter(|p| !p.as_os_str().is_empty()),
            dial_timeout: Duration::from_millis(self.dial_timeout),
            command: self.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("envetcd").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trailing_command_keeps_its_flags() {
        let cli = parse(&["-s", "web-api", "--no-sync", "sh", "-c", "exit 37"]);
        assert_eq!(cli.command, vec!["sh", "-c", "exit 37"]);
        assert_eq!(cli.service, "web-api");
        assert!(cli.no_sync);
    }

    #[test]
    fn test_into_config() {
        let config = parse(&[
            "-C",
            "10.0.0.1:4001, 10.0.0.2:4001",
            "--hostname",
            "h1",
            "--no-upcase",
            "--dial-timeout",
            "250",
            "-l",
            "debug",
            "env",
        ])
        .into_config();

        assert_eq!(config.peers, vec!["10.0.0.1:4001", "10.0.0.2:4001"]);
        assert_eq!(config.hostname, "h1");
        assert!(config.sync);
        assert!(config.sanitize);
        assert!(!config.upcase);
        assert_eq!(config.dial_timeout, Duration::from_millis(250));
        assert_eq!(config.command, vec!["env"]);
    }

    #[test]
    fn test_unknown_flag_is_not_a_command() {
        let err = Cli::try_parse_from(["envetcd", "--bogus", "env"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);

        let cli = parse(&["--no-sync", "--", "--bogus"]);
        assert_eq!(cli.command, vec!["--bogus"]);
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let err = Cli::try_parse_from(["envetcd", "-l", "loud", "env"]).unwrap_err();
        assert!(err.use_stderr());
    }
}
