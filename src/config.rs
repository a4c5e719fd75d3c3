use std::env;

const LOG_FILTER_VAR: &str = "MIZ_CORE_LOG";
const LOG_DISABLED_VAR: &str = "MIZ_CORE_LOG_DISABLED";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Process-level settings, read once at startup and handed to whoever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub logging_enabled: bool,
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging_enabled: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(filter) = lookup(LOG_FILTER_VAR) {
            let filter = filter.trim();
            if !filter.is_empty() {
                cfg.log_filter = filter.to_string();
            }
        }

        if let Some(flag) = lookup(LOG_DISABLED_VAR) {
            cfg.logging_enabled = !matches!(flag.trim(), "1" | "true" | "yes" | "on");
        }

        cfg
    }

    /// Installs the global subscriber. Logs go to stderr: stdout carries the protocol.
    pub fn init_logging(&self) {
        if !self.logging_enabled {
            return;
        }

        let filter = tracing_subscriber::EnvFilter::try_new(&self.log_filter)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    }
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = CoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(cfg, CoreConfig::default());
        assert_eq!(cfg.log_filter, "warn");
        assert!(cfg.logging_enabled);
    }

    #[test]
    fn reads_filter_and_disable_flag() {
        let cfg = CoreConfig::from_lookup(lookup_from(&[
            ("MIZ_CORE_LOG", "miz_core=debug"),
            ("MIZ_CORE_LOG_DISABLED", "1"),
        ]));
        assert_eq!(cfg.log_filter, "miz_core=debug");
        assert!(!cfg.logging_enabled);
    }

    #[test]
    fn blank_filter_keeps_default() {
        let cfg = CoreConfig::from_lookup(lookup_from(&[("MIZ_CORE_LOG", "   ")]));
        assert_eq!(cfg.log_filter, "warn");
    }
}
