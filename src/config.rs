use std::{env, path::PathBuf};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PORT: u16 = 8080;

/// Process settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the storage slots (`HABIT_DATA_DIR`).
    pub data_dir: PathBuf,
    /// HTTP port (`PORT`).
    pub port: u16,
    /// Answer to the startup "restore previous data?" question
    /// (`HABIT_AUTO_RECOVER`).
    pub auto_recover: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            port: DEFAULT_PORT,
            auto_recover: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`; unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("HABIT_DATA_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup("PORT").and_then(|value| value.trim().parse::<u16>().ok()) {
            config.port = port;
        }
        if let Some(flag) = lookup("HABIT_AUTO_RECOVER") {
            config.auto_recover = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("HABIT_DATA_DIR", "/tmp/habits"),
            ("PORT", "9090"),
            ("HABIT_AUTO_RECOVER", "Yes"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/habits"));
        assert_eq!(config.port, 9090);
        assert!(config.auto_recover);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("HABIT_DATA_DIR", "  "),
            ("PORT", "eighty"),
            ("HABIT_AUTO_RECOVER", "maybe"),
        ]));
        assert_eq!(config, Config::default());
    }
}
