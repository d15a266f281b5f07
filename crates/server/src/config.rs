use anyhow::Context;
use recon_match::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Bunyan-style JSON lines.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on `invoices × transactions` per request.
    pub max_pairs: u64,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_pairs: 4_000_000,
            max_body_bytes: 16 * 1024 * 1024,
            log_format: LogFormat::Pretty,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `RECON_CONFIG` (a TOML file) if set, then applies `RECON_*`
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("RECON_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(host) = lookup("RECON_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("RECON_PORT") {
            self.port = port.parse().with_context(|| format!("RECON_PORT '{port}'"))?;
        }
        if let Some(max) = lookup("RECON_MAX_PAIRS") {
            self.max_pairs = max.parse().with_context(|| format!("RECON_MAX_PAIRS '{max}'"))?;
        }
        if let Some(max) = lookup("RECON_MAX_BODY_BYTES") {
            self.max_body_bytes = max
                .parse()
                .with_context(|| format!("RECON_MAX_BODY_BYTES '{max}'"))?;
        }
        if let Some(format) = lookup("RECON_LOG_FORMAT") {
            self.log_format = format.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
