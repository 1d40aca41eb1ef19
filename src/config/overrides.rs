use super::MonitorConfig;
use tracing::warn;

/// Apply environment overrides on top of file/default values.
///
/// Unparseable values are ignored with a warning.
pub fn apply_env_overrides(config: &mut MonitorConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut MonitorConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("FARM_ARENA_SERVER_URL") {
        config.server.base_url = v;
    }
    if let Some(v) = lookup("FARM_ARENA_PACING_MS") {
        match v.parse::<u64>() {
            Ok(n) => config.pacing.delay_ms = n,
            Err(_) => warn!(value = %v, "Ignoring unparseable FARM_ARENA_PACING_MS"),
        }
    }
    if let Some(v) = lookup("FARM_ARENA_HEADLESS") {
        match v.parse::<bool>() {
            Ok(b) => config.ui.headless = b,
            Err(_) => warn!(value = %v, "Ignoring unparseable FARM_ARENA_HEADLESS"),
        }
    }
    if let Some(v) = lookup("FARM_ARENA_LOG_FILE") {
        config.ui.log_file = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_overrides_replace_values() {
        let env: HashMap<&str, &str> = [
            ("FARM_ARENA_SERVER_URL", "http://10.0.0.2:9000"),
            ("FARM_ARENA_PACING_MS", "5"),
            ("FARM_ARENA_HEADLESS", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = MonitorConfig::default();
        apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.pacing.delay_ms, 5);
        assert!(config.ui.headless);
        assert_eq!(config.ui.log_file, "farm-arena.log");
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let mut config = MonitorConfig::default();
        apply_overrides(&mut config, |k| match k {
            "FARM_ARENA_PACING_MS" => Some("soon".to_string()),
            "FARM_ARENA_HEADLESS" => Some("maybe".to_string()),
            _ => None,
        });

        assert_eq!(config.pacing.delay_ms, 1000);
        assert!(!config.ui.headless);
    }
}
