//! Extractor configuration.
//!
//! Configuration is an explicit value threaded into every scan call - there
//! is no global options state. A config can be built in code or loaded from
//! a `.phpotrc.json` file found by walking up from a start directory.
//! Defaults reproduce the stock gettext function aliases with comment
//! extraction off.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::extract::FunctionRole;

pub const CONFIG_FILE_NAME: &str = ".phpotrc.json";

/// Which comments, if any, the scanner attaches to matched calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentMode {
    /// Do not extract comments.
    #[default]
    Off,
    /// Attach the nearest preceding comment block, whatever its text.
    All,
    /// Attach the nearest preceding comment block only when its text starts
    /// with this marker (e.g. `"translators:"`). The marker is kept in the
    /// attached text.
    Prefix(String),
}

/// Configuration bundle for one extraction pass.
///
/// Immutable once handed to the scanner; callers reuse one value across
/// files (and across threads - the extractor only reads it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Function name -> role. Names are matched case-sensitively against the
    /// trailing identifier of a call.
    #[serde(default = "default_functions")]
    pub functions: HashMap<String, FunctionRole>,

    /// Comment capture mode.
    #[serde(default)]
    pub extract_comments: CommentMode,

    /// Names of domain constants. A bare identifier in the domain position
    /// of a call is accepted when listed here; its name is passed through as
    /// the entry's domain for the surrounding tool to resolve.
    #[serde(default)]
    pub domain_constants: HashSet<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            functions: default_functions(),
            extract_comments: CommentMode::default(),
            domain_constants: HashSet::new(),
        }
    }
}

/// The stock function table: gettext names, their `__`-style shorthands,
/// and the no-op markers.
pub fn default_functions() -> HashMap<String, FunctionRole> {
    use FunctionRole::*;
    [
        ("gettext", Simple),
        ("__", Simple),
        ("ngettext", Plural),
        ("n__", Plural),
        ("pgettext", Context),
        ("p__", Context),
        ("dgettext", Domain),
        ("d__", Domain),
        ("dngettext", DomainPlural),
        ("dn__", DomainPlural),
        ("dpgettext", DomainContext),
        ("dp__", DomainContext),
        ("npgettext", ContextPlural),
        ("np__", ContextPlural),
        ("dnpgettext", DomainContextPlural),
        ("dnp__", DomainContextPlural),
        ("noop", Marker),
        ("noop__", Marker),
    ]
    .into_iter()
    .map(|(name, role)| (name.to_string(), role))
    .collect()
}

/// Build a function table from (name, role-name) pairs.
///
/// Fails on the first unknown role name - a configuration error surfaces
/// immediately instead of silently skewing a whole extraction run.
pub fn function_table_from_names<'a, I>(pairs: I) -> Result<HashMap<String, FunctionRole>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(name, role)| {
            let role = FunctionRole::parse(role)
                .with_context(|| format!("Invalid role for function \"{}\"", name))?;
            Ok((name.to_string(), role))
        })
        .collect()
}

pub fn default_config_json() -> Result<String> {
    let config = ExtractorConfig::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: ExtractorConfig,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: ExtractorConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: ExtractorConfig::default(),
            from_file: false,
        }),
    }
}
