//! CLI argument definitions for the A-Prime server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// A-Prime - a conversational assistant backend with persisted sessions.
#[derive(Parser, Debug)]
#[command(name = "aprime", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Interface to bind.
    #[arg(long = "host", default_value = "127.0.0.1")]
    pub host: String,

    /// Data directory for the SQLite database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > APRIME_CONFIG env var > ~/.aprime/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(|key| std::env::var(key).ok())
    }

    fn resolve_config_path_with<F>(&self, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = lookup("APRIME_CONFIG") {
            return PathBuf::from(p);
        }
        match lookup("HOME") {
            Some(home) => PathBuf::from(home).join(".aprime").join("config.toml"),
            None => PathBuf::from("config.toml"),
        }
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > APRIME_PORT env var > config file value > 8000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.resolve_port_with(config_port, |key| std::env::var(key).ok())
    }

    fn resolve_port_with<F>(&self, config_port: u16, lookup: F) -> u16
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = self.port {
            return p;
        }
        if let Some(p) = lookup("APRIME_PORT").and_then(|v| v.parse::<u16>().ok()) {
            return p;
        }
        if config_port != 0 {
            return config_port;
        }
        8000
    }

    /// Data directory override, if given.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Log level override, if given.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("aprime").chain(args.iter().copied()))
    }

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.host, "127.0.0.1");
        assert!(args.port.is_none());
        assert!(args.resolve_data_dir().is_none());
        assert!(args.resolve_log_level().is_none());
    }

    #[test]
    fn test_port_priority() {
        let args = parse(&["--port", "9100"]);
        assert_eq!(args.resolve_port_with(8000, env(&[("APRIME_PORT", "9200")])), 9100);

        let args = parse(&[]);
        assert_eq!(args.resolve_port_with(8000, env(&[("APRIME_PORT", "9200")])), 9200);
        assert_eq!(args.resolve_port_with(8500, env(&[])), 8500);
        assert_eq!(args.resolve_port_with(0, env(&[])), 8000);
    }

    #[test]
    fn test_port_env_unparseable_falls_through() {
        let args = parse(&[]);
        assert_eq!(
            args.resolve_port_with(8500, env(&[("APRIME_PORT", "not-a-port")])),
            8500
        );
    }

    #[test]
    fn test_config_path_priority() {
        let args = parse(&["-c", "/etc/aprime.toml"]);
        assert_eq!(
            args.resolve_config_path_with(env(&[("APRIME_CONFIG", "/tmp/x.toml")])),
            PathBuf::from("/etc/aprime.toml")
        );

        let args = parse(&[]);
        assert_eq!(
            args.resolve_config_path_with(env(&[("APRIME_CONFIG", "/tmp/x.toml")])),
            PathBuf::from("/tmp/x.toml")
        );
        assert_eq!(
            args.resolve_config_path_with(env(&[("HOME", "/home/ada")])),
            PathBuf::from("/home/ada/.aprime/config.toml")
        );
        assert_eq!(
            args.resolve_config_path_with(env(&[])),
            PathBuf::from("config.toml")
        );
    }

    #[test]
    fn test_overrides() {
        let args = parse(&["--data-dir", "/srv/aprime", "-l", "debug", "--host", "0.0.0.0"]);
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/srv/aprime"));
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
        assert_eq!(args.host, "0.0.0.0");
    }
}
