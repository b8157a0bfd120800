use crate::config::ConfigProvider;
use crate::error::DiscoveryError;
use crate::models::{Config, ProtoFile, ProtoSet};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

/// What owns a directory of proto files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OwnerKey<'a> {
    /// Inline configuration data owns everything.
    Data(&'a str),
    /// No configuration file at or above the directory.
    Unconfigured,
    File(Utf8PathBuf),
}

/// Group proto files into sets by owning configuration.
///
/// Directories that share an owning configuration file end up in the same
/// set, as do all directories with no configuration file. With `config_data`
/// there is exactly one owner and the disk is never consulted. Each owner's
/// configuration is loaded once. Sets come back sorted by configuration
/// directory.
///
/// The returned sets have both `work_dir_path` and `dir_path` set to
/// `work_dir_path`; callers resolving a specific directory overwrite
/// `dir_path`.
pub fn group_proto_files(
    config_provider: &dyn ConfigProvider,
    work_dir_path: &Utf8Path,
    proto_files: Vec<ProtoFile>,
    config_data: Option<&str>,
) -> Result<Vec<ProtoSet>, DiscoveryError> {
    let mut owner_to_dirs: IndexMap<OwnerKey<'_>, IndexMap<Utf8PathBuf, Vec<ProtoFile>>> =
        IndexMap::new();
    for (dir_path, files) in dir_path_to_proto_files(proto_files) {
        let owner = owner_for_dir(config_provider, &dir_path, config_data)?;
        owner_to_dirs
            .entry(owner)
            .or_default()
            .insert(dir_path, files);
    }

    let mut proto_sets = Vec::with_capacity(owner_to_dirs.len());
    for (owner, dir_path_to_files) in owner_to_dirs {
        let config = match owner {
            OwnerKey::Data(data) => config_provider.get_for_data(work_dir_path, data)?,
            OwnerKey::Unconfigured => Config::default(),
            OwnerKey::File(file_path) => config_provider.get(&file_path)?,
        };
        proto_sets.push(ProtoSet {
            work_dir_path: work_dir_path.to_path_buf(),
            dir_path: work_dir_path.to_path_buf(),
            config,
            dir_path_to_files,
        });
    }

    proto_sets.sort_by(|a, b| a.config.dir_path.as_str().cmp(b.config.dir_path.as_str()));
    Ok(proto_sets)
}

fn owner_for_dir<'a>(
    config_provider: &dyn ConfigProvider,
    dir_path: &Utf8Path,
    config_data: Option<&'a str>,
) -> Result<OwnerKey<'a>, DiscoveryError> {
    if let Some(data) = config_data {
        return Ok(OwnerKey::Data(data));
    }
    Ok(match config_provider.file_path_for_dir(dir_path)? {
        Some(file_path) => OwnerKey::File(file_path),
        None => OwnerKey::Unconfigured,
    })
}

/// Partition files by the directory that directly contains them, keeping
/// first-seen directory order and walk order within each directory.
fn dir_path_to_proto_files(proto_files: Vec<ProtoFile>) -> IndexMap<Utf8PathBuf, Vec<ProtoFile>> {
    let mut dir_path_to_files: IndexMap<Utf8PathBuf, Vec<ProtoFile>> = IndexMap::new();
    for proto_file in proto_files {
        let dir_path = proto_file
            .path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();
        dir_path_to_files.entry(dir_path).or_default().push(proto_file);
    }
    dir_path_to_files
}
