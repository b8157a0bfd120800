use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// On-disk shape of `prototool.yaml` / `prototool.json`.
///
/// Paths in here are relative to the directory holding the file. They are
/// resolved into a [`Config`] by the config provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalConfig {
    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default)]
    pub protoc: ExternalProtocConfig,

    #[serde(default)]
    pub lint: ExternalLintConfig,

    #[serde(default)]
    pub generate: ExternalGenerateConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalProtocConfig {
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub allow_unused_imports: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalLintConfig {
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub rules: ExternalLintRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalLintRules {
    #[serde(default)]
    pub add: Vec<String>,

    #[serde(default)]
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalGenerateConfig {
    #[serde(default)]
    pub plugins: Vec<ExternalGenPlugin>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalGenPlugin {
    pub name: String,

    #[serde(default)]
    pub flags: String,

    #[serde(default)]
    pub output: String,
}

/// Resolved configuration governing one proto set.
///
/// `dir_path` is the directory of the configuration file, the work directory
/// when the configuration came from inline data, or empty when no
/// configuration file governs the files at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub dir_path: Utf8PathBuf,

    /// Absolute, cleaned paths pruned from discovery.
    pub exclude_prefixes: Vec<Utf8PathBuf>,

    pub compile: CompileConfig,

    pub lint: LintConfig,

    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileConfig {
    pub protobuf_version: String,
    pub include_paths: Vec<Utf8PathBuf>,
    pub allow_unused_imports: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintConfig {
    pub group: String,
    /// Upper-cased rule ids, first-seen order.
    pub include_ids: Vec<String>,
    pub exclude_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateConfig {
    pub plugins: Vec<GenPlugin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenPlugin {
    pub name: String,
    pub flags: String,
    pub output_path: Utf8PathBuf,
}

impl Config {
    /// Whether this configuration came from a file or inline data.
    pub fn is_configured(&self) -> bool {
        !self.dir_path.as_str().is_empty()
    }
}
