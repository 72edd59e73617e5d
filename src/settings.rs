use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::sources::{DirectorySource, RankingSources};

pub const DEFAULT_CONFIG_FILE: &str = "scraper.toml";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const DEFAULT_CATEGORIES: &[&str] = &[
    "national-universities",
    "liberal-arts-colleges",
    "engineering",
    "business",
    "computer-science",
    "nursing",
    "law",
    "medicine",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub default_year: String,
    pub rankings: RankingSettings,
    pub directory: DirectorySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    pub url_template: String,
    pub categories: Vec<String>,
    pub table_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub url: String,
}

impl Settings {
    /// Defaults, then the optional file, then `SCRAPER_*` env vars.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let settings: Settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080_i64)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", 20_i64)?
            .set_default("concurrency", 4_i64)?
            .set_default("default_year", "2025")?
            .set_default(
                "rankings.url_template",
                "https://rankings.example.org/{year}/best-{category}-schools",
            )?
            .set_default("rankings.categories", DEFAULT_CATEGORIES.to_vec())?
            .set_default("rankings.table_id", "rankings")?
            .set_default("directory.url", "https://directory.example.org/institutions")?
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix("SCRAPER")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("rankings.categories")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "concurrency",
                reason: "must be at least 1".into(),
            });
        }
        if !self.rankings.url_template.contains("{category}") {
            return Err(ConfigError::Invalid {
                key: "rankings.url_template",
                reason: "missing {category} placeholder".into(),
            });
        }
        Ok(())
    }

    pub fn ranking_sources(&self) -> RankingSources {
        RankingSources {
            url_template: self.rankings.url_template.clone(),
            categories: self.rankings.categories.clone(),
            table_id: self.rankings.table_id.clone(),
        }
    }

    pub fn directory_source(&self) -> DirectorySource {
        DirectorySource {
            url: self.directory.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_file() {
        let s = Settings::load(Some(Path::new("does/not/exist.toml"))).unwrap();
        assert_eq!(s.concurrency, 4);
        assert_eq!(s.default_year, "2025");
        assert_eq!(s.rankings.categories.len(), DEFAULT_CATEGORIES.len());
        assert!(s.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(s.ranking_sources().for_year("2025").len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut s = Settings::load(Some(Path::new("does/not/exist.toml"))).unwrap();
        s.concurrency = 0;
        assert!(matches!(
            s.validate(),
            Err(ConfigError::Invalid { key: "concurrency", .. })
        ));
    }
}
