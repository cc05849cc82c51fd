//! Generator configuration.
//!
//! Handles loading and validating the config file that describes one
//! template-cache module: which templates to collect, how their URLs are
//! derived, and how the generated file looks. Every option except `source`
//! has a default, so the smallest useful config is a single line.
//!
//! ## Config File
//!
//! TOML by default; a path ending in `.json` is read as JSON with the same
//! keys. Keys are camelCase so configs carried over from JavaScript build
//! setups keep working.
//!
//! ```toml
//! # Glob pattern, or an explicit list: source = ["a/x.html", "a/y.html"]
//! source = "src/app/**/*.html"
//!
//! root = ""                      # Prefix for every cache key
//! # base = "src/app"             # Directory keys are relative to (default: derived)
//! outputFilename = "templates.js"
//! module = "templates"
//! standalone = false             # true → angular.module('templates', [])
//!
//! templateHeader = "angular.module('<%= module %>'<%= standalone %>).run(['$templateCache', function($templateCache) {"
//! templateBody = "$templateCache.put('<%= url %>','<%= contents %>');"
//! templateFooter = "}]);"
//!
//! [escapeOptions]
//! quotes = "single"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::escape::EscapeOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

pub const DEFAULT_OUTPUT_FILENAME: &str = "templates.js";
pub const DEFAULT_MODULE: &str = "templates";
pub const DEFAULT_TEMPLATE_HEADER: &str = "angular.module('<%= module %>'<%= standalone %>).run(['$templateCache', function($templateCache) {";
pub const DEFAULT_TEMPLATE_BODY: &str = "$templateCache.put('<%= url %>','<%= contents %>');";
pub const DEFAULT_TEMPLATE_FOOTER: &str = "}]);";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Where the templates come from.
///
/// Deserializes from either a string (glob pattern) or an array of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    /// Glob pattern expanded against the filesystem on every pass.
    Pattern(String),
    /// Explicit file paths, used as given and in the given order.
    List(Vec<String>),
}

/// Configuration for one generated template-cache module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheConfig {
    pub source: Source,
    /// Prefix joined in front of every cache key.
    #[serde(default)]
    pub root: String,
    /// Directory cache keys are computed relative to. When absent it is the
    /// static prefix of a pattern, or the shared parent of a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
    #[serde(default = "default_module")]
    pub module: String,
    /// Declare the module with an empty dependency list.
    #[serde(default)]
    pub standalone: bool,
    #[serde(default = "default_template_header")]
    pub template_header: String,
    #[serde(default = "default_template_body")]
    pub template_body: String,
    #[serde(default = "default_template_footer")]
    pub template_footer: String,
    #[serde(default)]
    pub escape_options: EscapeOptions,
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_template_header() -> String {
    DEFAULT_TEMPLATE_HEADER.to_string()
}

fn default_template_body() -> String {
    DEFAULT_TEMPLATE_BODY.to_string()
}

fn default_template_footer() -> String {
    DEFAULT_TEMPLATE_FOOTER.to_string()
}

impl CacheConfig {
    /// Stock settings for `source`.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            root: String::new(),
            base: None,
            output_filename: default_output_filename(),
            module: default_module(),
            standalone: false,
            template_header: default_template_header(),
            template_body: default_template_body(),
            template_footer: default_template_footer(),
            escape_options: EscapeOptions::default(),
        }
    }

    /// Check everything deserialization can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.source {
            Source::Pattern(pattern) => {
                if pattern.is_empty() {
                    return Err(ConfigError::Validation("source must not be empty".into()));
                }
                glob::Pattern::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("source is not a valid glob pattern: {e}"))
                })?;
            }
            Source::List(files) => {
                if files.is_empty() {
                    return Err(ConfigError::Validation(
                        "source list must not be empty".into(),
                    ));
                }
                if let Some(i) = files.iter().position(|f| f.is_empty()) {
                    return Err(ConfigError::Validation(format!(
                        "source list entry {i} is empty"
                    )));
                }
            }
        }
        if self.base.as_deref() == Some("") {
            return Err(ConfigError::Validation("base must not be empty".into()));
        }
        validate_output_filename(&self.output_filename)?;
        if self.module.is_empty() {
            return Err(ConfigError::Validation("module must not be empty".into()));
        }
        Ok(())
    }
}

/// The artifact name must stay inside the output directory.
fn validate_output_filename(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "outputFilename must not be empty".into(),
        ));
    }
    let escapes = Path::new(name)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::Validation(format!(
            "outputFilename must be a relative path inside the output directory: {name}"
        )));
    }
    Ok(())
}

/// Parse and validate a TOML config.
pub fn from_toml_str(content: &str) -> Result<CacheConfig, ConfigError> {
    let config: CacheConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a JSON config.
pub fn from_json_str(content: &str) -> Result<CacheConfig, ConfigError> {
    let config: CacheConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a config file; `.json` files are JSON, everything else TOML.
pub fn load_config(path: &Path) -> Result<CacheConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_str(&content)
    } else {
        from_toml_str(&content)
    }
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ng-template-cache configuration
# ===============================
# Only `source` is required. Values shown below are the defaults.
# Unknown keys will cause an error.

# Templates to collect: a glob pattern, or an explicit list of files.
#   source = ["src/app/home.html", "src/app/about.html"]
source = "src/app/**/*.html"

# Prefix for every cache key. "." or "./..." keeps a leading "./" on keys.
root = ""

# Directory cache keys are computed relative to. Defaults to the static part
# of the pattern ("src/app" above), or the shared parent directory of a list.
# base = "src/app"

# Name of the generated file, relative to the output directory.
outputFilename = "templates.js"

# AngularJS module the templates are registered on.
module = "templates"

# true declares the module (`angular.module('templates', [])`) instead of
# attaching to an existing one.
standalone = false

# Generated file layout. Header variables: module, standalone.
# Body variables (once per template): url, contents, file. Footer: none.
templateHeader = "angular.module('<%= module %>'<%= standalone %>).run(['$templateCache', function($templateCache) {"
templateBody = "$templateCache.put('<%= url %>','<%= contents %>');"
templateFooter = "}]);"

# ---------------------------------------------------------------------------
# String escaping for template contents
# ---------------------------------------------------------------------------
[escapeOptions]
# Quote that is escaped inside contents: single | double | backtick.
quotes = "single"
# Surround contents with the quote character.
wrap = false
# Only escape what a string literal strictly requires (keeps non-ASCII text).
minimal = false
# Astral characters as \u{1F600} instead of surrogate pairs.
es6 = false
# JSON-compatible output (double quotes, always wrapped).
json = false
# Break up `</script` and `<!--` for inline <script> embedding.
isScriptContext = false
# Lowercase hex digits in escapes.
lowercaseHex = false
# Escape printable ASCII as well.
escapeEverything = false
"##
}
