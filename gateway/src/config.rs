//! Configuration for the Shepherd gateway
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use shepherd_learning::LearningConfig;

use crate::error::{GatewayError, Result};

/// Shepherd gateway - moderation classification for the community dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "shepherd-gateway")]
#[command(about = "AI-assisted content moderation with a learning feedback loop")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8090")]
    pub listen: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Base URL of an OpenAI-compatible chat completions API
    #[arg(long, env = "LLM_BASE_URL", default_value = "http://localhost:11434/v1")]
    pub llm_base_url: String,

    /// Model used for classification
    #[arg(long, env = "LLM_MODEL", default_value = "llama3.1")]
    pub llm_model: String,

    /// API key for the LLM service (omit for local servers)
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// YAML file with learning configuration (defaults apply when omitted)
    #[arg(long, env = "LEARNING_CONFIG")]
    pub learning_config: Option<PathBuf>,

    /// Override the oracle timeout in milliseconds
    #[arg(long, env = "ORACLE_TIMEOUT_MS")]
    pub oracle_timeout_ms: Option<u64>,

    /// JSON-lines file for training cases (overrides the config file)
    #[arg(long, env = "CASE_JOURNAL")]
    pub case_journal: Option<PathBuf>,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.llm_base_url.starts_with("http://") && !self.llm_base_url.starts_with("https://")
        {
            return Err(GatewayError::Config("LLM_BASE_URL must be an http(s) URL".to_string()));
        }

        if self.llm_model.trim().is_empty() {
            return Err(GatewayError::Config("LLM_MODEL must not be empty".to_string()));
        }

        if self.oracle_timeout_ms == Some(0) {
            return Err(GatewayError::Config("ORACLE_TIMEOUT_MS must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Learning configuration from file (if any) with CLI overrides applied.
    pub fn learning(&self) -> Result<LearningConfig> {
        let mut config = match &self.learning_config {
            Some(path) => LearningConfig::from_file(path)?,
            None => LearningConfig::default(),
        };

        if let Some(timeout_ms) = self.oracle_timeout_ms {
            config.oracle.timeout_ms = timeout_ms;
        }
        if let Some(path) = &self.case_journal {
            config.store.journal_path = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// HTTP timeout for the LLM client; a little above the oracle timeout so
    /// the oracle's own deadline fires first.
    pub fn http_timeout(&self, config: &LearningConfig) -> Duration {
        Duration::from_millis(config.oracle.timeout_ms) + Duration::from_secs(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["shepherd-gateway"];
        for (flag, value) in [("--llm-base-url", "http://localhost:11434/v1"), ("--llm-model", "llama3.1")] {
            if !extra.contains(&flag) {
                argv.extend_from_slice(&[flag, value]);
            }
        }
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_validate() {
        let args = args(&[]);
        assert!(args.validate().is_ok());
        assert_eq!(args.learning().unwrap().classifier.max_hints, 5);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let args = args(&["--llm-base-url", "localhost:11434"]);
        assert!(matches!(args.validate(), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_unreadable_learning_config() {
        let args = args(&["--learning-config", "/nonexistent/learning.yaml"]);
        assert!(matches!(args.learning(), Err(GatewayError::Learning(_))));
    }

    #[test]
    fn test_cli_overrides_learning_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.yaml");
        std::fs::write(&path, "oracle:\n  timeout_ms: 9000\nclassifier:\n  max_hints: 3\n").unwrap();

        let args = args(&[
            "--learning-config",
            path.to_str().unwrap(),
            "--oracle-timeout-ms",
            "2500",
        ]);
        let config = args.learning().unwrap();

        assert_eq!(config.oracle.timeout_ms, 2500);
        assert_eq!(config.classifier.max_hints, 3);
        assert_eq!(args.http_timeout(&config), Duration::from_millis(3500));
    }
}
