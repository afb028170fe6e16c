//! Empirion runtime configuration

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use empirion_agents::{AgentConfig, PoolConfig};
use empirion_common::{
    EmpirionError, Result, DEFAULT_AGENT_INTERVAL_MS, DEFAULT_ENGINE_INTERVAL_MS,
    DEFAULT_MAX_AGENTS, DEFAULT_SATURATION_CEILING, DEFAULT_SHUTDOWN_TIMEOUT_MS,
    DEFAULT_TRANSPORT_PORT,
};
use empirion_evolution::EvolutionConfig;

/// Prefix of every environment variable read by [`EmpirionConfig::load`]
pub const ENV_PREFIX: &str = "EMPIRION_";

/// Lowest accepted saturation ceiling
pub const MIN_SATURATION_CEILING: f64 = 1.0;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct EmpirionConfig {
    /// Transport bind host
    pub host: String,
    /// Transport bind port
    pub port: u16,
    /// Whether the supervisor starts the WebSocket transport
    pub transport_enabled: bool,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Evolution engine settings
    pub engine: EngineSettings,
    /// Agent pool settings
    pub pool: PoolSettings,
}

impl Default for EmpirionConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_TRANSPORT_PORT,
            transport_enabled: true,
            log_json: false,
            engine: EngineSettings::default(),
            pool: PoolSettings::default(),
        }
    }
}

/// Evolution cadence and saturation settings
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Cadence of the supervisor's own engine loop
    pub engine_interval_ms: u64,
    /// Cadence of every agent's evolution loop
    pub agent_interval_ms: u64,
    /// Ceiling applied to every growing quantity
    pub saturation_ceiling: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            engine_interval_ms: DEFAULT_ENGINE_INTERVAL_MS,
            agent_interval_ms: DEFAULT_AGENT_INTERVAL_MS,
            saturation_ceiling: DEFAULT_SATURATION_CEILING,
        }
    }
}

/// Agent pool settings
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum registered agents
    pub max_agents: usize,
    /// Agents created when the supervisor starts
    pub initial_agents: Vec<String>,
    /// Deadline for tasks to stop during shutdown
    pub shutdown_timeout_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_agents: DEFAULT_MAX_AGENTS,
            initial_agents: vec!["Alpha".into(), "Beta".into(), "Gamma".into()],
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}

impl EmpirionConfig {
    /// Load configuration from `.env` and `EMPIRION_*` environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        cfg.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())?;
        Ok(cfg)
    }

    /// Override fields from `lookup`, keyed by the variable name without prefix
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_value("PORT", &port)?;
        }
        if let Some(enabled) = lookup("TRANSPORT_ENABLED") {
            self.transport_enabled = parse_value("TRANSPORT_ENABLED", &enabled)?;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.log_json = parse_value("LOG_JSON", &json)?;
        }

        // Engine settings
        if let Some(val) = lookup("ENGINE_INTERVAL_MS") {
            self.engine.engine_interval_ms = parse_value("ENGINE_INTERVAL_MS", &val)?;
        }
        if let Some(val) = lookup("AGENT_INTERVAL_MS") {
            self.engine.agent_interval_ms = parse_value("AGENT_INTERVAL_MS", &val)?;
        }
        if let Some(val) = lookup("SATURATION_CEILING") {
            let ceiling: f64 = parse_value("SATURATION_CEILING", &val)?;
            // Must hold every starting value of the optimization state
            if !ceiling.is_finite() || ceiling < MIN_SATURATION_CEILING {
                return Err(EmpirionError::Config(format!(
                    "{}SATURATION_CEILING={:?}: must be a finite number >= {}",
                    ENV_PREFIX, val, MIN_SATURATION_CEILING
                )));
            }
            self.engine.saturation_ceiling = ceiling;
        }

        // Pool settings
        if let Some(val) = lookup("MAX_AGENTS") {
            self.pool.max_agents = parse_value("MAX_AGENTS", &val)?;
        }
        if let Some(val) = lookup("INITIAL_AGENTS") {
            self.pool.initial_agents = val
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(val) = lookup("SHUTDOWN_TIMEOUT_MS") {
            self.pool.shutdown_timeout_ms = parse_value("SHUTDOWN_TIMEOUT_MS", &val)?;
        }

        Ok(())
    }

    /// Transport bind address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| EmpirionError::Config(format!("invalid bind address: {}", e)))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.pool.shutdown_timeout_ms)
    }

    /// Settings for the supervisor's own engine
    pub fn engine_config(&self) -> EvolutionConfig {
        EvolutionConfig {
            interval: Duration::from_millis(self.engine.engine_interval_ms),
            saturation_ceiling: self.engine.saturation_ceiling,
            ..EvolutionConfig::default()
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        let mut agent = AgentConfig::with_interval(Duration::from_millis(
            self.engine.agent_interval_ms,
        ));
        agent.evolution.saturation_ceiling = self.engine.saturation_ceiling;

        PoolConfig {
            max_agents: self.pool.max_agents,
            shutdown_timeout: self.shutdown_timeout(),
            agent,
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| EmpirionError::Config(format!("{}{}={:?}: {}", ENV_PREFIX, key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = EmpirionConfig::default();
        assert_eq!(cfg.port, 8765);
        assert!(cfg.transport_enabled);
        assert_eq!(cfg.pool.initial_agents, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(cfg.pool.max_agents, 100);
        assert_eq!(cfg.engine.saturation_ceiling, 1e15);
    }

    #[test]
    fn test_overrides_applied() {
        let mut cfg = EmpirionConfig::default();
        cfg.apply_overrides(lookup_from(&[
            ("PORT", "9000"),
            ("TRANSPORT_ENABLED", "false"),
            ("AGENT_INTERVAL_MS", "250"),
            ("INITIAL_AGENTS", " Nova , ,Orion"),
            ("SHUTDOWN_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 9000);
        assert!(!cfg.transport_enabled);
        assert_eq!(cfg.engine.agent_interval_ms, 250);
        assert_eq!(cfg.pool.initial_agents, vec!["Nova", "Orion"]);
        assert_eq!(cfg.shutdown_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut cfg = EmpirionConfig::default();
        let err = cfg
            .apply_overrides(lookup_from(&[("MAX_AGENTS", "many")]))
            .unwrap_err();
        assert!(matches!(err, EmpirionError::Config(ref msg) if msg.contains("EMPIRION_MAX_AGENTS")));
    }

    #[test]
    fn test_invalid_saturation_ceiling_rejected() {
        for raw in ["NaN", "inf", "-1", "0", "0.001"] {
            let mut cfg = EmpirionConfig::default();
            let err = cfg
                .apply_overrides(lookup_from(&[("SATURATION_CEILING", raw)]))
                .unwrap_err();
            assert!(
                matches!(err, EmpirionError::Config(ref msg) if msg.contains("SATURATION_CEILING")),
                "{} accepted",
                raw
            );
            assert_eq!(cfg.engine.saturation_ceiling, 1e15);
        }

        let mut cfg = EmpirionConfig::default();
        cfg.apply_overrides(lookup_from(&[("SATURATION_CEILING", "1e6")]))
            .unwrap();
        assert_eq!(cfg.engine.saturation_ceiling, 1e6);
    }

    #[test]
    fn test_derived_configs() {
        let mut cfg = EmpirionConfig::default();
        cfg.engine.saturation_ceiling = 64.0;
        cfg.engine.agent_interval_ms = 20;

        let pool = cfg.pool_config();
        assert_eq!(pool.agent.interval(), Duration::from_millis(20));
        assert_eq!(pool.agent.evolution.saturation_ceiling, 64.0);
        assert_eq!(cfg.engine_config().saturation_ceiling, 64.0);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = EmpirionConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..EmpirionConfig::default()
        };
        assert_eq!(cfg.socket_addr().unwrap().ip().to_string(), "127.0.0.1");

        let bad = EmpirionConfig {
            host: "not a host".into(),
            ..EmpirionConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
