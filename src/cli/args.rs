use crate::core::{default_session_ttl, JanitorConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Community wallet service
#[derive(Parser, Debug)]
#[command(name = "community-wallet")]
#[command(about = "Wallet ledger and presence service over a JSON document store", long_about = None)]
pub struct Cli {
    /// Directory holding the site document
    #[arg(
        long = "data-dir",
        env = "WALLET_DATA_DIR",
        value_name = "DIR",
        default_value = ".",
        global = true
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server together with the background janitor
    Serve(ServeArgs),
    /// Write every wallet balance as CSV to stdout
    Balances,
    /// Run one janitor sweep and exit
    Sweep(SweepArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "WALLET_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5050)]
    pub port: u16,

    /// Seconds between janitor sweeps
    #[arg(long = "sweep-interval-secs", value_name = "SECS", default_value_t = 300)]
    pub sweep_interval_secs: u64,

    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Lifetime of an admin session
    #[arg(long = "session-ttl-secs", value_name = "SECS", default_value_t = 7200)]
    pub session_ttl_secs: u64,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Idle time after which a presence entry is removed
    #[arg(long = "presence-ttl-secs", value_name = "SECS", default_value_t = 1800)]
    pub presence_ttl_secs: u64,
}

impl ServeArgs {
    /// Create a JanitorConfig from CLI arguments
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn to_janitor_config(&self) -> JanitorConfig {
        JanitorConfig::new(
            Duration::from_secs(self.sweep_interval_secs),
            Duration::from_secs(self.sweep.presence_ttl_secs),
        )
    }

    /// Admin session lifetime, falling back to the default for zero
    pub fn session_ttl(&self) -> chrono::Duration {
        if self.session_ttl_secs == 0 {
            warn!("invalid session ttl (0), using default");
            return default_session_ttl();
        }
        i64::try_from(self.session_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(default_session_ttl)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SweepArgs {
    pub fn to_janitor_config(&self) -> JanitorConfig {
        JanitorConfig::new(
            JanitorConfig::default().interval,
            Duration::from_secs(self.presence_ttl_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn serve_args(args: &[&str]) -> ServeArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Command::Serve(serve) => serve,
            other => panic!("Expected serve, got {:?}", other),
        }
    }

    #[rstest]
    #[case::serve(&["program", "serve"], "serve")]
    #[case::balances(&["program", "balances"], "balances")]
    #[case::sweep(&["program", "sweep"], "sweep")]
    #[case::global_after_subcommand(&["program", "balances", "--data-dir", "/tmp"], "balances")]
    fn test_subcommand_parsing(#[case] args: &[&str], #[case] expected: &str) {
        let parsed = Cli::try_parse_from(args).unwrap();
        let name = match parsed.command {
            Command::Serve(_) => "serve",
            Command::Balances => "balances",
            Command::Sweep(_) => "sweep",
        };
        assert_eq!(name, expected);
    }

    #[test]
    fn test_data_dir_flag() {
        let parsed = Cli::try_parse_from(["program", "--data-dir", "/srv/wallet", "sweep"]).unwrap();
        assert_eq!(parsed.data_dir, PathBuf::from("/srv/wallet"));
    }

    #[test]
    fn test_serve_defaults() {
        let serve = serve_args(&["program", "serve"]);

        assert_eq!(serve.host, "0.0.0.0");
        assert_eq!(serve.port, 5050);
        assert_eq!(serve.bind_address(), "0.0.0.0:5050");
        assert_eq!(serve.to_janitor_config(), JanitorConfig::default());
        assert_eq!(serve.session_ttl(), chrono::Duration::hours(2));
    }

    #[rstest]
    #[case::all_defaults(&["program", "serve"], 300, 1800)]
    #[case::custom_interval(&["program", "serve", "--sweep-interval-secs", "60"], 60, 1800)]
    #[case::custom_ttl(&["program", "serve", "--presence-ttl-secs", "600"], 300, 600)]
    #[case::zero_interval(&["program", "serve", "--sweep-interval-secs", "0"], 300, 1800)]
    #[case::zero_ttl(&["program", "serve", "--presence-ttl-secs", "0"], 300, 1800)]
    fn test_janitor_config_conversion(
        #[case] args: &[&str],
        #[case] expected_interval: u64,
        #[case] expected_ttl: u64,
    ) {
        let config = serve_args(args).to_janitor_config();

        assert_eq!(config.interval, Duration::from_secs(expected_interval));
        assert_eq!(config.presence_ttl, Duration::from_secs(expected_ttl));
    }

    #[rstest]
    #[case::custom(&["program", "serve", "--session-ttl-secs", "600"], 600)]
    #[case::zero_falls_back(&["program", "serve", "--session-ttl-secs", "0"], 7200)]
    fn test_session_ttl(#[case] args: &[&str], #[case] expected_secs: i64) {
        assert_eq!(
            serve_args(args).session_ttl(),
            chrono::Duration::seconds(expected_secs)
        );
    }

    #[test]
    fn test_sweep_presence_ttl() {
        let parsed = Cli::try_parse_from(["program", "sweep", "--presence-ttl-secs", "60"]).unwrap();
        let Command::Sweep(sweep) = parsed.command else {
            panic!("Expected sweep");
        };
        assert_eq!(sweep.to_janitor_config().presence_ttl, Duration::from_secs(60));
    }

    #[rstest]
    #[case::missing_subcommand(&["program"])]
    #[case::unknown_subcommand(&["program", "launch"])]
    #[case::invalid_port(&["program", "serve", "--port", "not-a-port"])]
    #[case::negative_interval(&["program", "serve", "--sweep-interval-secs", "-5"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
