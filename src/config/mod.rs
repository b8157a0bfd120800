//! Configuration lookup and loading.
//!
//! [`ConfigProvider`] is the whole surface the discovery core needs from the
//! configuration subsystem. [`FileConfigProvider`] is the on-disk
//! implementation: it finds the nearest `prototool.yaml`/`prototool.json` by
//! walking up from a directory, parses it, and resolves relative paths in it
//! against the directory holding the file.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{DEFAULT_WALK_TIMEOUT_MS, ResolverSettings};

use crate::models::{
    CompileConfig, Config, ExternalConfig, GenPlugin, GenerateConfig, LintConfig,
};
use crate::paths::clean;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::{PoisonError, RwLock};

/// Configuration file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["prototool.yaml", "prototool.json"];

/// Finds and loads the configuration governing a directory.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider: Send + Sync {
    /// Nearest configuration file at or above `dir_path`, if any.
    fn file_path_for_dir(&self, dir_path: &Utf8Path) -> Result<Option<Utf8PathBuf>, ConfigError>;

    /// Load the configuration file at `file_path`.
    fn get(&self, file_path: &Utf8Path) -> Result<Config, ConfigError>;

    /// Load inline configuration data as if it lived in `dir_path`.
    fn get_for_data(&self, dir_path: &Utf8Path, data: &str) -> Result<Config, ConfigError>;

    /// Exclude prefixes declared by the configuration nearest `dir_path`.
    fn exclude_prefixes_for_dir(&self, dir_path: &Utf8Path)
    -> Result<Vec<Utf8PathBuf>, ConfigError>;

    /// Exclude prefixes declared by inline configuration data.
    fn exclude_prefixes_for_data(
        &self,
        dir_path: &Utf8Path,
        data: &str,
    ) -> Result<Vec<Utf8PathBuf>, ConfigError>;
}

/// Configuration provider backed by files on disk.
///
/// Lookups and parsed files are cached for the lifetime of the provider, so a
/// walk that asks about every directory of a large tree only touches the disk
/// once per directory.
#[derive(Debug, Default)]
pub struct FileConfigProvider {
    dir_to_file: RwLock<HashMap<Utf8PathBuf, Option<Utf8PathBuf>>>,
    file_to_config: RwLock<HashMap<Utf8PathBuf, Config>>,
}

impl FileConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn cached_lookup(&self, dir_path: &Utf8Path) -> Option<Option<Utf8PathBuf>> {
        self.dir_to_file
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(dir_path)
            .cloned()
    }
}

impl ConfigProvider for FileConfigProvider {
    fn file_path_for_dir(&self, dir_path: &Utf8Path) -> Result<Option<Utf8PathBuf>, ConfigError> {
        let mut searched = Vec::new();
        let mut current = Some(dir_path);

        let found = loop {
            let Some(dir) = current else {
                break None;
            };
            if dir.as_str().is_empty() {
                break None;
            }
            if let Some(cached) = self.cached_lookup(dir) {
                break cached;
            }
            searched.push(dir.to_path_buf());
            if let Some(file_path) = config_file_in_dir(dir)? {
                break Some(file_path);
            }
            current = dir.parent();
        };

        let mut cache = self
            .dir_to_file
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for dir in searched {
            cache.insert(dir, found.clone());
        }

        Ok(found)
    }

    fn get(&self, file_path: &Utf8Path) -> Result<Config, ConfigError> {
        if let Some(config) = self
            .file_to_config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_path)
        {
            return Ok(config.clone());
        }

        let data = fs::read_to_string(file_path).map_err(|source| ConfigError::Read {
            path: file_path.to_path_buf(),
            source,
        })?;
        let dir_path = file_path.parent().unwrap_or(Utf8Path::new("/"));
        let config = parse_config(dir_path, file_path.as_str(), &data)?;

        tracing::debug!("Loaded configuration from {}", file_path);
        self.file_to_config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file_path.to_path_buf(), config.clone());
        Ok(config)
    }

    fn get_for_data(&self, dir_path: &Utf8Path, data: &str) -> Result<Config, ConfigError> {
        parse_config(dir_path, "inline configuration data", data)
    }

    fn exclude_prefixes_for_dir(
        &self,
        dir_path: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, ConfigError> {
        match self.file_path_for_dir(dir_path)? {
            Some(file_path) => Ok(self.get(&file_path)?.exclude_prefixes),
            None => Ok(Vec::new()),
        }
    }

    fn exclude_prefixes_for_data(
        &self,
        dir_path: &Utf8Path,
        data: &str,
    ) -> Result<Vec<Utf8PathBuf>, ConfigError> {
        Ok(self.get_for_data(dir_path, data)?.exclude_prefixes)
    }
}

/// The configuration file directly inside `dir_path`, if there is one.
fn config_file_in_dir(dir_path: &Utf8Path) -> Result<Option<Utf8PathBuf>, ConfigError> {
    let mut found = Vec::new();
    for name in CONFIG_FILE_NAMES {
        let candidate = dir_path.join(name);
        match fs::metadata(&candidate) {
            Ok(metadata) if metadata.is_file() => found.push(candidate),
            Ok(_) => {}
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {}
            Err(source) => {
                return Err(ConfigError::Lookup {
                    path: candidate,
                    source,
                });
            }
        }
    }

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        _ => Err(ConfigError::MultipleConfigFiles {
            dir: dir_path.to_path_buf(),
            files: found
                .iter()
                .filter_map(|f| f.file_name().map(str::to_string))
                .collect(),
        }),
    }
}

/// Parse configuration text and resolve it against `dir_path`.
pub(crate) fn parse_config(
    dir_path: &Utf8Path,
    origin: &str,
    data: &str,
) -> Result<Config, ConfigError> {
    let external = if data.trim().is_empty() {
        ExternalConfig::default()
    } else {
        serde_yaml_ng::from_str(data).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?
    };
    resolve_config(dir_path, external)
}

fn resolve_config(dir_path: &Utf8Path, external: ExternalConfig) -> Result<Config, ConfigError> {
    let mut exclude_prefixes = IndexSet::new();
    for exclude in &external.excludes {
        let resolved = resolve_relative(dir_path, "excludes", exclude)?;
        if resolved == dir_path || !resolved.starts_with(dir_path) {
            return Err(ConfigError::ExcludeOutsideConfigDir {
                dir: dir_path.to_path_buf(),
                value: exclude.clone(),
            });
        }
        exclude_prefixes.insert(resolved);
    }

    let mut include_paths = IndexSet::new();
    for include in &external.protoc.includes {
        include_paths.insert(resolve_relative(dir_path, "protoc.includes", include)?);
    }

    let include_ids = normalize_rule_ids(&external.lint.rules.add);
    let exclude_ids = normalize_rule_ids(&external.lint.rules.remove);
    if let Some(rule) = include_ids.intersection(&exclude_ids).next() {
        return Err(ConfigError::ConflictingLintRule {
            dir: dir_path.to_path_buf(),
            rule: rule.clone(),
        });
    }

    let mut plugins = Vec::with_capacity(external.generate.plugins.len());
    for plugin in external.generate.plugins {
        let name = plugin.name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidPlugin {
                dir: dir_path.to_path_buf(),
            });
        }
        plugins.push(GenPlugin {
            name: name.to_string(),
            flags: plugin.flags,
            output_path: clean(&dir_path.join(&plugin.output)),
        });
    }

    Ok(Config {
        dir_path: dir_path.to_path_buf(),
        exclude_prefixes: exclude_prefixes.into_iter().collect(),
        compile: CompileConfig {
            protobuf_version: external.protoc.version,
            include_paths: include_paths.into_iter().collect(),
            allow_unused_imports: external.protoc.allow_unused_imports,
        },
        lint: LintConfig {
            group: external.lint.group,
            include_ids: include_ids.into_iter().collect(),
            exclude_ids: exclude_ids.into_iter().collect(),
        },
        generate: GenerateConfig { plugins },
    })
}

fn resolve_relative(
    dir_path: &Utf8Path,
    field: &'static str,
    value: &str,
) -> Result<Utf8PathBuf, ConfigError> {
    if Utf8Path::new(value).is_absolute() {
        return Err(ConfigError::AbsolutePath {
            dir: dir_path.to_path_buf(),
            field,
            value: value.to_string(),
        });
    }
    Ok(clean(&dir_path.join(value)))
}

fn normalize_rule_ids(ids: &[String]) -> IndexSet<String> {
    ids.iter()
        .map(|id| id.trim().to_uppercase())
        .filter(|id| !id.is_empty())
        .collect()
}
