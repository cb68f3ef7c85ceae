use crate::config::schema::{ConfigFile, FetchConfig, OutputConfig};
use crate::error::{Error, Result};
use crate::output::{OutputHandler, csv::CsvOutput, json::JsonOutput, sqlite::SqliteOutput};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FetchConfig> {
        let path = path.as_ref();
        let mut visited = HashSet::new();
        let config = Self::load_with_inheritance(path, &mut visited)?.resolve();

        config.validate()?;
        config.engine()?;
        if let Some(OutputConfig::Sqlite { table, .. }) = &config.report {
            Self::check_table_name(table)?;
        }

        Ok(config)
    }

    fn load_with_inheritance(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<ConfigFile> {
        let path = fs::canonicalize(path).map_err(|e| {
            Error::Config(format!("{}: {}", path.display(), e))
        })?;

        if visited.contains(&path) {
            return Err(Error::Config(format!(
                "Circular inheritance detected involving {}",
                path.display()
            )));
        }
        visited.insert(path.clone());

        let config = Self::load_file(&path)?;

        if let Some(parent_path_str) = &config.extends {
            let parent_path = path.parent()
                .ok_or_else(|| Error::Config(format!(
                    "Cannot determine parent directory for {}",
                    path.display()
                )))?
                .join(parent_path_str);

            let parent_config = Self::load_with_inheritance(&parent_path, visited)?;
            Ok(config.over(parent_config))
        } else {
            Ok(config)
        }
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config: ConfigFile = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some("yaml") | Some("yml") => {
                let config: ConfigFile = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            Some("toml") => {
                let config: ConfigFile = toml::from_str(&content)?;
                Ok(config)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    fn check_table_name(table: &str) -> Result<()> {
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !table.starts_with(|c: char| c.is_ascii_digit());
        if valid {
            Ok(())
        } else {
            Err(Error::Config(format!("Invalid sqlite table name: {:?}", table)))
        }
    }

    pub async fn create_report(config: &FetchConfig) -> Result<Option<Box<dyn OutputHandler>>> {
        let handler: Option<Box<dyn OutputHandler>> = match &config.report {
            None => None,
            Some(OutputConfig::Json { path }) => Some(Box::new(JsonOutput::new(PathBuf::from(path))?)),
            Some(OutputConfig::Csv { path }) => Some(Box::new(CsvOutput::new(PathBuf::from(path))?)),
            Some(OutputConfig::Sqlite { path, table }) => {
                Some(Box::new(SqliteOutput::new(PathBuf::from(path), table.clone()).await?))
            }
        };
        Ok(handler)
    }
}
