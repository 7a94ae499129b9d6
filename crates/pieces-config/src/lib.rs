//! Configuration management for Pieces.
//!
//! Parses `pieces.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Taxonomy Declarations
//!
//! The `[taxonomies]` table maps a taxonomy name to the kinds it declares.
//! Each `(taxonomy, kind)` pair becomes a markup construct named
//! `taxonomy:kind`. Two forms are accepted:
//!
//! ```toml
//! [taxonomies]
//! unit = ["parameter", "constant"]
//!
//! [taxonomies.pieces]
//! kinds = ["fafafa"]
//! handler = "annotate"
//! ```
//!
//! The short form uses the `section` handler. A missing config file is not
//! an error: it yields a configuration without taxonomies.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pieces.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Taxonomy declarations keyed by taxonomy name.
    taxonomies: BTreeMap<String, TaxonomyEntry>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    extensions: Option<Vec<String>>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for documents.
    pub source_dir: PathBuf,
    /// File extensions (without dot) treated as documents.
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["rst".to_owned(), "txt".to_owned()]
}

/// One entry of the `[taxonomies]` table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaxonomyEntry {
    /// `name = ["kind", ...]`
    Kinds(Vec<String>),
    /// `[taxonomies.name]` with `kinds` and an optional `handler`.
    Table {
        kinds: Vec<String>,
        #[serde(default)]
        handler: HandlerStyle,
    },
}

impl TaxonomyEntry {
    fn kinds(&self) -> &[String] {
        match self {
            Self::Kinds(kinds) | Self::Table { kinds, .. } => kinds,
        }
    }

    fn handler(&self) -> HandlerStyle {
        match self {
            Self::Kinds(_) => HandlerStyle::default(),
            Self::Table { handler, .. } => *handler,
        }
    }
}

/// How occurrences of a taxonomy's markup are handled.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandlerStyle {
    /// Emit an anchor and a titled section, registering the object immediately.
    #[default]
    Section,
    /// Defer an edit that annotates the title of the next section.
    Annotate,
}

/// A validated taxonomy declaration, ready to be turned into markup handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyDeclaration {
    /// Taxonomy name (the part before `:` in markup names).
    pub name: String,
    /// Declared kinds, in declaration order.
    pub kinds: Vec<String>,
    /// Handler style for every kind of this taxonomy.
    pub handler: HandlerStyle,
}

impl TaxonomyDeclaration {
    /// Create a declaration with the default handler style.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kinds: kinds.into_iter().map(Into::into).collect(),
            handler: HandlerStyle::default(),
        }
    }

    /// Set the handler style.
    #[must_use]
    pub fn with_handler(mut self, handler: HandlerStyle) -> Self {
        self.handler = handler;
        self
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a name to be non-empty and free of `:` and whitespace.
fn require_markup_segment(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if value.contains(':') || value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{field} '{value}' must not contain ':' or whitespace"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pieces.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the declarations are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
    }

    /// Taxonomy declarations in taxonomy-name order.
    #[must_use]
    pub fn taxonomies(&self) -> Vec<TaxonomyDeclaration> {
        self.taxonomies
            .iter()
            .map(|(name, entry)| TaxonomyDeclaration {
                name: name.clone(),
                kinds: entry.kinds().to_vec(),
                handler: entry.handler(),
            })
            .collect()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            taxonomies: BTreeMap::new(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                extensions: default_extensions(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        self.validate_taxonomies()?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        if self.docs_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "docs.extensions cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_taxonomies(&self) -> Result<(), ConfigError> {
        for (name, entry) in &self.taxonomies {
            require_markup_segment(name, "taxonomy name")?;
            if entry.kinds().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "taxonomy '{name}' must declare at least one kind"
                )));
            }
            for kind in entry.kinds() {
                require_markup_segment(kind, &format!("kind of taxonomy '{name}'"))?;
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            extensions: self
                .docs
                .extensions
                .clone()
                .unwrap_or_else(default_extensions),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.extensions, vec!["rst", "txt"]);
        assert!(config.taxonomies().is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml_str("", Path::new("/project")).unwrap();
        assert!(config.taxonomies().is_empty());
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/docs")
        );
    }

    #[test]
    fn test_parse_short_form_taxonomies() {
        let toml = r#"
[taxonomies]
unit = ["parameter"]
other = ["thing", "widget"]
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();

        assert_eq!(
            config.taxonomies(),
            vec![
                TaxonomyDeclaration::new("other", ["thing", "widget"]),
                TaxonomyDeclaration::new("unit", ["parameter"]),
            ]
        );
    }

    #[test]
    fn test_parse_table_form_taxonomy() {
        let toml = r#"
[taxonomies.pieces]
kinds = ["fafafa", "orphan"]
handler = "annotate"
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();

        assert_eq!(
            config.taxonomies(),
            vec![
                TaxonomyDeclaration::new("pieces", ["fafafa", "orphan"])
                    .with_handler(HandlerStyle::Annotate)
            ]
        );
    }

    #[test]
    fn test_table_form_defaults_to_section_handler() {
        let toml = r#"
[taxonomies.unit]
kinds = ["parameter"]
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();
        assert_eq!(config.taxonomies()[0].handler, HandlerStyle::Section);
    }

    #[test]
    fn test_mixed_forms() {
        let toml = r#"
[taxonomies]
unit = ["parameter"]

[taxonomies.pieces]
kinds = ["fafafa"]
handler = "annotate"
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();
        let names: Vec<_> = config.taxonomies().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["pieces", "unit"]);
    }

    #[test]
    fn test_duplicate_kinds_are_kept_for_registry() {
        let toml = r#"
[taxonomies]
unit = ["parameter", "parameter"]
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();
        assert_eq!(config.taxonomies()[0].kinds, vec!["parameter", "parameter"]);
    }

    #[test]
    fn test_resolve_docs_paths() {
        let toml = r#"
[docs]
source_dir = "documentation"
extensions = ["rst"]
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/documentation")
        );
        assert_eq!(config.docs_resolved.extensions, vec!["rst"]);
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let toml = r#"
[docs]
extensions = []
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("docs.extensions"));
    }

    #[test]
    fn test_taxonomy_without_kinds_rejected() {
        let toml = r#"
[taxonomies]
unit = []
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("at least one kind"));
    }

    #[test]
    fn test_kind_with_colon_rejected() {
        let toml = r#"
[taxonomies]
unit = ["para:meter"]
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
    }

    #[test]
    fn test_taxonomy_name_with_whitespace_rejected() {
        let toml = r#"
[taxonomies]
"my unit" = ["parameter"]
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("my unit"));
    }

    #[test]
    fn test_unknown_handler_is_parse_error() {
        let toml = r#"
[taxonomies.unit]
kinds = ["parameter"]
handler = "explode"
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/pieces.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[docs]\nsource_dir = \"src\"\n\n[taxonomies]\nunit = [\"parameter\"]\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("src"));
        assert_eq!(config.taxonomies().len(), 1);
    }

    #[test]
    fn test_apply_cli_settings_source_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_dir: Some(PathBuf::from("/custom/docs")),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/custom/docs")
        );
    }

    #[test]
    fn test_apply_cli_settings_none_keeps_config() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
    }
}
