use crate::error_handling::Error::{IOError, InvalidConfig, MissingConfigKey, YamlParsingError};
use crate::error_handling::Result;
use indexmap::IndexMap;
use log::LevelFilter;
use serde_yaml::Value;
use std::io::Read;

/// Pipeline settings for the `forge` binary.
#[derive(Clone, Debug, PartialEq)]
pub struct ForgeConfig {
    determinize: bool,
    minimize: bool,
    log_level: LevelFilter,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        ForgeConfig {
            determinize: true,
            minimize: true,
            log_level: LevelFilter::Warn,
        }
    }
}

impl ForgeConfig {
    pub fn determinize(&self) -> bool {
        self.determinize
    }

    // Minimization only applies to determinized output
    pub fn minimize(&self) -> bool {
        self.determinize && self.minimize
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

impl ForgeConfig {
    const DETERMINIZE_KEY: &'static str = "determinize";
    const MINIMIZE_KEY: &'static str = "minimize";
    const LOG_LEVEL_KEY: &'static str = "log_level";

    pub fn parse_from_file(yaml_file_path: &str) -> Result<ForgeConfig> {
        match std::fs::File::open(yaml_file_path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    return Err(IOError(e));
                }
                Self::parse_from_str(contents.as_str())
            }
            Err(e) => Err(IOError(e)),
        }
    }

    pub fn parse_from_str(yaml_content: &str) -> Result<ForgeConfig> {
        match serde_yaml::from_str::<IndexMap<String, Value>>(yaml_content) {
            Ok(kv_pairs) => Self::load_from_kv_pairs(kv_pairs),
            Err(e) => Err(YamlParsingError(e)),
        }
    }

    fn get_key_value<'a>(
        kv_map: &'a IndexMap<String, Value>,
        key: &'static str,
    ) -> Result<&'a Value> {
        kv_map.get(key).ok_or(MissingConfigKey(key))
    }

    fn load_from_kv_pairs(kv_pairs: IndexMap<String, Value>) -> Result<Self> {
        let determinize = match Self::get_key_value(&kv_pairs, Self::DETERMINIZE_KEY)? {
            Value::Bool(b) => *b,
            _ => return Err(InvalidConfig(Self::DETERMINIZE_KEY)),
        };
        let minimize = match Self::get_key_value(&kv_pairs, Self::MINIMIZE_KEY)? {
            Value::Bool(b) => *b,
            _ => return Err(InvalidConfig(Self::MINIMIZE_KEY)),
        };

        let log_level = match kv_pairs.get(Self::LOG_LEVEL_KEY) {
            None => LevelFilter::Warn,
            Some(Value::String(level)) => level
                .parse::<LevelFilter>()
                .map_err(|_| InvalidConfig(Self::LOG_LEVEL_KEY))?,
            Some(_) => return Err(InvalidConfig(Self::LOG_LEVEL_KEY)),
        };

        Ok(Self {
            determinize,
            minimize,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::Error;

    #[test]
    fn test_read_fixture_config() -> Result<()> {
        let project_root = env!("CARGO_MANIFEST_DIR");
        let config_path = std::path::Path::new(project_root)
            .join("fixtures")
            .join("forge.yaml");
        let config = ForgeConfig::parse_from_file(config_path.to_str().unwrap())?;
        assert!(config.determinize());
        assert!(!config.minimize());
        assert_eq!(config.log_level(), LevelFilter::Info);
        Ok(())
    }

    #[test]
    fn test_optional_log_level() -> Result<()> {
        let config = ForgeConfig::parse_from_str("determinize: false\nminimize: true\n")?;
        assert!(!config.determinize());
        // ignored without determinization
        assert!(!config.minimize());
        assert_eq!(config.log_level(), LevelFilter::Warn);
        Ok(())
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            ForgeConfig::parse_from_str("determinize: true\n"),
            Err(Error::MissingConfigKey("minimize"))
        ));
        assert!(matches!(
            ForgeConfig::parse_from_str("determinize: yes please\nminimize: true\n"),
            Err(Error::InvalidConfig("determinize"))
        ));
        assert!(matches!(
            ForgeConfig::parse_from_str("determinize: true\nminimize: true\nlog_level: loud\n"),
            Err(Error::InvalidConfig("log_level"))
        ));
        assert!(matches!(
            ForgeConfig::parse_from_str("- determinize"),
            Err(Error::YamlParsingError(_))
        ));
    }

    #[test]
    fn test_default() {
        let config = ForgeConfig::default();
        assert!(config.determinize() && config.minimize());
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }
}
