use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "browser-stats";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_DB_FILE: &str = "browser-stats.sqlite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub dialect: String,
    pub workers: usize,
    pub interval_secs: Option<u64>,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            dialect: "sqlite".to_string(),
            workers: 0,
            interval_secs: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub file: PathBuf,
    pub created: bool,
}

pub fn load_or_create(path: Option<&Path>) -> Result<ConfigLoad, String> {
    let file = match path {
        Some(path) => path.to_path_buf(),
        None => config_dir()?.join(CONFIG_FILE_NAME),
    };

    if file.exists() {
        let contents = fs::read_to_string(&file)
            .map_err(|err| format!("read config {}: {}", file.display(), err))?;
        let config = parse(&contents)
            .map_err(|err| format!("parse config {}: {}", file.display(), err))?;
        return Ok(ConfigLoad {
            config,
            file,
            created: false,
        });
    }

    if let Some(dir) = file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    }
    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&file, contents)
        .map_err(|err| format!("write config {}: {}", file.display(), err))?;

    Ok(ConfigLoad {
        config,
        file,
        created: true,
    })
}

fn parse(contents: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(contents)
}

fn config_dir() -> Result<PathBuf, String> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir).join(CONFIG_DIR_NAME));
    }
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = parse("dialect = \"postgres\"\nworkers = 3\n").expect("parse");
        assert_eq!(config.dialect, "postgres");
        assert_eq!(config.workers, 3);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE));
        assert_eq!(config.interval_secs, None);
    }

    #[test]
    fn creates_default_file_once() {
        let dir = std::env::temp_dir().join(format!("browser-stats-config-{}", std::process::id()));
        let file = dir.join("nested").join(CONFIG_FILE_NAME);

        let first = load_or_create(Some(&file)).expect("create");
        assert!(first.created);
        assert_eq!(first.config, CliConfig::default());

        let second = load_or_create(Some(&file)).expect("load");
        assert!(!second.created);
        assert_eq!(second.config, first.config);

        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
