//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file given with `--config` (TOML)
//! 3. Environment variables: `SITEMAP_SCRUB_*` prefix, lists comma separated
//! 4. Command line arguments, applied by the caller

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

use crate::document::WriteOptions;
use crate::transform::{Scrub, DEFAULT_PRUNE_TAGS};

pub const ENV_PREFIX: &str = "SITEMAP_SCRUB";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] ConfigError),

    #[error("missing required value: {0}")]
    Missing(&'static str),
}

/// Resolved settings of a scrub run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Source document
    pub input: PathBuf,
    /// Destination document
    pub output: PathBuf,
    /// Literal text to search for. Required.
    pub search: Option<String>,
    /// Replacement text. Required.
    pub replace: Option<String>,
    /// Tags pruned after replacement, in this order
    #[serde(deserialize_with = "tag_list")]
    pub prune_tags: Vec<String>,
    /// Output indentation width, 0 for a single line
    pub indent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sitemap.xml"),
            output: PathBuf::from("output.xml"),
            search: None,
            replace: None,
            prune_tags: DEFAULT_PRUNE_TAGS.iter().map(|t| t.to_string()).collect(),
            indent: 2,
        }
    }
}

impl Settings {
    /// Load defaults, the optional config file and `SITEMAP_SCRUB_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Settings, SettingsError> {
        Self::load_sources(config_file, Some(environment()))
    }

    fn load_sources(
        config_file: Option<&Path>,
        env: Option<Environment>,
    ) -> Result<Settings, SettingsError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("input", defaults.input.to_string_lossy().to_string())?
            .set_default("output", defaults.output.to_string_lossy().to_string())?
            .set_default("prune_tags", defaults.prune_tags)?
            .set_default("indent", defaults.indent as i64)?;

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Build the scrub described by these settings.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Missing`]: `search` or `replace` is not set.
    pub fn scrub(&self) -> Result<Scrub, SettingsError> {
        let search = self.search.as_ref().ok_or(SettingsError::Missing("search"))?;
        let replace = self.replace.as_ref().ok_or(SettingsError::Missing("replace"))?;
        Ok(Scrub::new(search.as_str(), replace.as_str())
            .with_prune_tags(self.prune_tags.iter().cloned()))
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            indent_size: self.indent,
            ..WriteOptions::default()
        }
    }
}

/// Environment variables are kept as strings: `SITEMAP_SCRUB_SEARCH=007` searches for `007`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
}

/// Accepts a list, or a comma separated string as given in the environment.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagList;

    impl<'de> Visitor<'de> for TagList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a list of tags or a comma separated string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Vec<String>, E> {
            Ok(value
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<String>, A::Error> {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_any(TagList)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_sources_when_load_then_defaults() {
        let settings = Settings::load_sources(None, None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.prune_tags, vec!["image:image", "PageMap"]);
    }

    #[test]
    fn given_config_file_when_load_then_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scrub.toml");
        fs::write(
            &path,
            r#"
input = "in.xml"
search = "http://staging"
replace = "https://www"
prune_tags = ["video:video"]
indent = 4
"#,
        )
        .unwrap();

        let settings = Settings::load_sources(Some(&path), None).unwrap();
        assert_eq!(settings.input, PathBuf::from("in.xml"));
        assert_eq!(settings.output, PathBuf::from("output.xml"));
        assert_eq!(settings.search.as_deref(), Some("http://staging"));
        assert_eq!(settings.replace.as_deref(), Some("https://www"));
        assert_eq!(settings.prune_tags, vec!["video:video"]);
        assert_eq!(settings.write_options().indent_size, 4);
    }

    #[test]
    fn given_environment_when_load_then_values_kept_verbatim() {
        let vars: config::Map<String, String> = [
            ("SITEMAP_SCRUB_SEARCH", "007"),
            ("SITEMAP_SCRUB_REPLACE", "TRUE"),
            ("SITEMAP_SCRUB_OUTPUT", "1.50"),
            ("SITEMAP_SCRUB_PRUNE_TAGS", "video:video, PageMap"),
            ("SITEMAP_SCRUB_INDENT", "4"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let settings = Settings::load_sources(None, Some(environment().source(Some(vars)))).unwrap();
        assert_eq!(settings.search.as_deref(), Some("007"));
        assert_eq!(settings.replace.as_deref(), Some("TRUE"));
        assert_eq!(settings.output, PathBuf::from("1.50"));
        assert_eq!(settings.prune_tags, vec!["video:video", "PageMap"]);
        assert_eq!(settings.indent, 4);
    }

    #[test]
    fn given_config_file_and_environment_when_load_then_environment_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scrub.toml");
        fs::write(&path, "search = \"a\"\nprune_tags = [\"PageMap\"]\n").unwrap();
        let vars: config::Map<String, String> =
            [("SITEMAP_SCRUB_SEARCH".to_string(), "b".to_string())].into_iter().collect();

        let settings =
            Settings::load_sources(Some(&path), Some(environment().source(Some(vars)))).unwrap();
        assert_eq!(settings.search.as_deref(), Some("b"));
        assert_eq!(settings.prune_tags, vec!["PageMap"]);
    }

    #[test]
    fn given_missing_config_file_when_load_then_error() {
        let dir = TempDir::new().unwrap();
        let result = Settings::load_sources(Some(&dir.path().join("absent.toml")), None);
        assert!(matches!(result, Err(SettingsError::Load(_))));
    }

    #[test]
    fn given_missing_search_when_scrub_then_error() {
        let settings = Settings {
            replace: Some("x".into()),
            ..Settings::default()
        };
        assert!(matches!(settings.scrub(), Err(SettingsError::Missing("search"))));

        let settings = Settings {
            search: Some("x".into()),
            ..Settings::default()
        };
        assert!(matches!(settings.scrub(), Err(SettingsError::Missing("replace"))));
    }

    #[test]
    fn given_complete_settings_when_scrub_then_configured() {
        let settings = Settings {
            search: Some("a".into()),
            replace: Some("".into()),
            prune_tags: vec![],
            ..Settings::default()
        };
        let scrub = settings.scrub().unwrap();
        assert_eq!(scrub.search, "a");
        assert_eq!(scrub.replace, "");
        assert!(scrub.prune_tags.is_empty());
    }
}
