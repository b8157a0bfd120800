//! Integration tests for ProtoSetProvider against real directory trees
//!
//! These tests verify:
//! - Grouping by owning configuration file, including nested overrides
//! - Exclude handling, including excludes declared deeper in the tree
//! - Inline configuration data replacing every configuration file
//! - Single-result resolution errors (no files, ambiguous configuration)
//! - The walk timeout

use camino::{Utf8Path, Utf8PathBuf};
use protoset::{
    Config, ConfigError, ConfigProvider, DiscoveryError, FileConfigProvider, ProtoSet,
    ProtoSetProvider,
};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn create_test_tree() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn write_proto(path: &Utf8Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "syntax = \"proto3\";\n\npackage test;\n").unwrap();
}

fn write_config(dir: &Utf8Path, contents: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("prototool.yaml"), contents).unwrap();
}

fn file_provider() -> ProtoSetProvider {
    ProtoSetProvider::new(Arc::new(FileConfigProvider::new()))
}

fn file_names(proto_set: &ProtoSet) -> Vec<String> {
    proto_set
        .files()
        .map(|f| f.display_path.to_string())
        .collect()
}

#[tokio::test]
async fn test_unconfigured_tree_forms_one_set() {
    let (_temp_dir, root) = create_test_tree();
    write_proto(&root.join("a/x.proto"));
    write_proto(&root.join("b/y.proto"));

    let proto_sets = file_provider()
        .get_multiple_for_dir(&root, &root)
        .await
        .unwrap();

    assert_eq!(proto_sets.len(), 1);
    let proto_set = &proto_sets[0];
    assert_eq!(proto_set.config.dir_path, Utf8PathBuf::new());
    assert_eq!(proto_set.dir_path_to_files.len(), 2);
    assert_eq!(
        proto_set.dir_path_to_files[root.join("a").as_path()][0].path,
        root.join("a/x.proto")
    );
    assert_eq!(
        proto_set.dir_path_to_files[root.join("b").as_path()][0].path,
        root.join("b/y.proto")
    );
}

#[tokio::test]
async fn test_nested_config_splits_sets() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "lint:\n  group: uber2\n");
    write_config(&root.join("sub"), "lint:\n  group: google\n");
    write_proto(&root.join("a.proto"));
    write_proto(&root.join("sub/b.proto"));
    write_proto(&root.join("sub/inner/c.proto"));

    let proto_sets = file_provider()
        .get_multiple_for_dir(&root, &root)
        .await
        .unwrap();

    assert_eq!(proto_sets.len(), 2);
    assert_eq!(proto_sets[0].config.dir_path, root);
    assert_eq!(proto_sets[0].config.lint.group, "uber2");
    assert_eq!(file_names(&proto_sets[0]), vec!["a.proto"]);

    assert_eq!(proto_sets[1].config.dir_path, root.join("sub"));
    assert_eq!(proto_sets[1].config.lint.group, "google");
    assert_eq!(
        file_names(&proto_sets[1]),
        vec!["sub/b.proto", "sub/inner/c.proto"]
    );

    for proto_set in &proto_sets {
        assert_eq!(proto_set.work_dir_path, root);
        assert_eq!(proto_set.dir_path, root);
    }
}

#[tokio::test]
async fn test_excluded_directory_is_pruned() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "excludes:\n  - vendor\n");
    write_proto(&root.join("vendor/z.proto"));
    write_proto(&root.join("vendor/nested/w.proto"));
    write_proto(&root.join("keep/z2.proto"));

    let proto_set = file_provider().get_for_dir(&root, &root).await.unwrap();

    assert_eq!(file_names(&proto_set), vec!["keep/z2.proto"]);
    assert_eq!(proto_set.config.exclude_prefixes, vec![root.join("vendor")]);
}

#[tokio::test]
async fn test_exclude_declared_in_nested_config() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "");
    write_config(&root.join("sub"), "excludes:\n  - gen\n");
    write_proto(&root.join("sub/gen/generated.proto"));
    write_proto(&root.join("sub/src/real.proto"));
    write_proto(&root.join("top.proto"));

    let proto_sets = file_provider()
        .get_multiple_for_dir(&root, &root)
        .await
        .unwrap();

    let all: Vec<String> = proto_sets.iter().flat_map(file_names).collect();
    assert_eq!(all, vec!["top.proto", "sub/src/real.proto"]);
}

#[tokio::test]
async fn test_file_exclude_keeps_siblings() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "excludes:\n  - a/skip.proto\n");
    write_proto(&root.join("a/skip.proto"));
    write_proto(&root.join("a/keep.proto"));

    let proto_set = file_provider().get_for_dir(&root, &root).await.unwrap();
    assert_eq!(file_names(&proto_set), vec!["a/keep.proto"]);
}

#[tokio::test]
async fn test_ambiguous_sibling_configs() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root.join("a"), "");
    write_config(&root.join("b"), "");
    write_proto(&root.join("a/x.proto"));
    write_proto(&root.join("b/y.proto"));

    let err = file_provider().get_for_dir(&root, &root).await.unwrap_err();

    match err {
        DiscoveryError::AmbiguousConfiguration { dir, config_dirs } => {
            assert_eq!(dir, root);
            assert_eq!(config_dirs, vec![root.join("a"), root.join("b")]);
        }
        other => panic!("expected ambiguity error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_config_data_overrides_disk_configs() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root.join("a"), "excludes:\n  - hidden\n");
    write_config(&root.join("b"), "");
    write_proto(&root.join("a/x.proto"));
    write_proto(&root.join("a/hidden/h.proto"));
    write_proto(&root.join("b/y.proto"));

    let provider = file_provider().with_config_data("lint:\n  group: uber2\n");
    let proto_sets = provider.get_multiple_for_dir(&root, root.join("a")).await.unwrap();

    assert_eq!(proto_sets.len(), 1);
    let proto_set = &proto_sets[0];
    assert_eq!(proto_set.config.dir_path, root);
    assert_eq!(proto_set.config.lint.group, "uber2");
    // The on-disk exclude in a/ is ignored too.
    assert_eq!(
        file_names(proto_set),
        vec!["a/hidden/h.proto", "a/x.proto", "b/y.proto"]
    );
    assert_eq!(proto_set.dir_path, root.join("a"));
}

#[tokio::test]
async fn test_config_data_excludes() {
    let (_temp_dir, root) = create_test_tree();
    write_proto(&root.join("gen/x.proto"));
    write_proto(&root.join("src/y.proto"));

    let provider = file_provider().with_config_data(r#"{"excludes": ["gen"]}"#);
    let proto_set = provider.get_for_dir(&root, &root).await.unwrap();
    assert_eq!(file_names(&proto_set), vec!["src/y.proto"]);
}

#[tokio::test]
async fn test_scan_root_raised_to_owning_config() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "");
    write_proto(&root.join("common/types.proto"));
    write_proto(&root.join("api/v1/service.proto"));

    let proto_set = file_provider()
        .get_for_dir(&root, root.join("api/v1"))
        .await
        .unwrap();

    assert_eq!(proto_set.dir_path, root.join("api/v1"));
    assert_eq!(
        file_names(&proto_set),
        vec!["api/v1/service.proto", "common/types.proto"]
    );
}

#[tokio::test]
async fn test_display_paths_relative_to_work_dir() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root.join("protos"), "");
    write_proto(&root.join("protos/foo/bar.proto"));
    fs::create_dir_all(root.join("tools")).unwrap();

    let proto_set = file_provider()
        .get_for_dir(root.join("tools"), root.join("protos/foo"))
        .await
        .unwrap();
    assert_eq!(file_names(&proto_set), vec!["../protos/foo/bar.proto"]);
}

#[tokio::test]
async fn test_no_files_found() {
    let (_temp_dir, root) = create_test_tree();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("empty/readme.md"), "nothing here").unwrap();

    let err = file_provider()
        .get_for_dir(&root, root.join("empty"))
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::NoFilesFound(dir) if dir == root.join("empty")));
}

#[tokio::test]
async fn test_invalid_config_surfaces_verbatim() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "excludes: [/etc]\n");
    write_proto(&root.join("a.proto"));

    let err = file_provider().get_for_dir(&root, &root).await.unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::Config(ConfigError::AbsolutePath { .. })
    ));
}

#[tokio::test]
async fn test_repeated_resolution_is_stable() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root, "");
    write_config(&root.join("sub"), "");
    for name in ["c", "a", "b"] {
        write_proto(&root.join(format!("{}.proto", name)));
        write_proto(&root.join("sub").join(format!("{}.proto", name)));
    }

    let provider = file_provider();
    let first = provider.get_multiple_for_dir(&root, &root).await.unwrap();
    let second = provider.get_multiple_for_dir(&root, &root).await.unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.dir_path, b.dir_path);
        assert_eq!(a.config, b.config);
        assert_eq!(a.dir_path_to_files, b.dir_path_to_files);
    }
    assert_eq!(file_names(&first[0]), vec!["a.proto", "b.proto", "c.proto"]);
}

#[tokio::test]
async fn test_sets_partition_walked_files() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root.join("one"), "");
    write_config(&root.join("one/two"), "");
    let files = [
        "loose.proto",
        "one/a.proto",
        "one/x/b.proto",
        "one/two/c.proto",
        "one/two/y/d.proto",
        "other/e.proto",
    ];
    for file in files {
        write_proto(&root.join(file));
    }

    let proto_sets = file_provider()
        .get_multiple_for_dir(&root, &root)
        .await
        .unwrap();
    assert_eq!(proto_sets.len(), 3);

    let grouped: Vec<Utf8PathBuf> = proto_sets
        .iter()
        .flat_map(|s| s.files().map(|f| f.path.clone()))
        .collect();
    let unique: HashSet<Utf8PathBuf> = grouped.iter().cloned().collect();
    assert_eq!(grouped.len(), files.len());
    assert_eq!(unique.len(), files.len());
    for file in files {
        assert!(unique.contains(&root.join(file)));
    }
}

#[test]
fn test_get_for_files_groups_without_walking() {
    let (_temp_dir, root) = create_test_tree();
    write_config(&root.join("a"), "");
    write_config(&root.join("b"), "");
    write_proto(&root.join("a/x.proto"));
    write_proto(&root.join("b/y.proto"));
    write_proto(&root.join("b/not_listed.proto"));

    let files = vec![
        root.join("b/y.proto"),
        root.join("a/x.proto"),
        root.join("a/./x.proto"),
    ];
    let proto_sets = file_provider().get_for_files(&root, &files).unwrap();

    assert_eq!(proto_sets.len(), 2);
    assert_eq!(proto_sets[0].config.dir_path, root.join("a"));
    assert_eq!(file_names(&proto_sets[0]), vec!["a/x.proto"]);
    assert_eq!(file_names(&proto_sets[1]), vec!["b/y.proto"]);
    for proto_set in &proto_sets {
        assert_eq!(proto_set.dir_path, root);
    }
}

/// Unconfigured provider whose per-directory exclude lookup is slow.
struct SlowConfigProvider {
    delay: Duration,
}

impl ConfigProvider for SlowConfigProvider {
    fn file_path_for_dir(&self, _dir_path: &Utf8Path) -> Result<Option<Utf8PathBuf>, ConfigError> {
        Ok(None)
    }

    fn get(&self, _file_path: &Utf8Path) -> Result<Config, ConfigError> {
        Ok(Config::default())
    }

    fn get_for_data(&self, dir_path: &Utf8Path, _data: &str) -> Result<Config, ConfigError> {
        Ok(Config {
            dir_path: dir_path.to_path_buf(),
            ..Default::default()
        })
    }

    fn exclude_prefixes_for_dir(
        &self,
        _dir_path: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, ConfigError> {
        std::thread::sleep(self.delay);
        Ok(Vec::new())
    }

    fn exclude_prefixes_for_data(
        &self,
        _dir_path: &Utf8Path,
        _data: &str,
    ) -> Result<Vec<Utf8PathBuf>, ConfigError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_walk_timeout() {
    let (_temp_dir, root) = create_test_tree();
    for i in 0..40 {
        write_proto(&root.join(format!("dir{:02}/file.proto", i)));
    }

    let step = Duration::from_millis(25);
    let budget = Duration::from_millis(60);
    let provider = ProtoSetProvider::new(Arc::new(SlowConfigProvider { delay: step }))
        .with_walk_timeout(budget);

    let start = Instant::now();
    let err = provider.get_for_dir(&root, &root).await.unwrap_err();
    let elapsed = start.elapsed();

    match err {
        DiscoveryError::WalkTimeout { budget: reported, visited } => {
            assert_eq!(reported, budget);
            assert!(visited > 0);
            assert!(visited < 80, "walk kept going after timeout: {} entries", visited);
        }
        other => panic!("expected timeout, got: {:?}", other),
    }
    // Roughly the budget plus one traversal step, with slack for slow CI.
    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_zero_timeout_is_unbounded() {
    let (_temp_dir, root) = create_test_tree();
    for i in 0..4 {
        write_proto(&root.join(format!("dir{}/file.proto", i)));
    }

    let provider = ProtoSetProvider::new(Arc::new(SlowConfigProvider {
        delay: Duration::from_millis(20),
    }))
    .with_walk_timeout(Duration::ZERO);

    let proto_set = provider.get_for_dir(&root, &root).await.unwrap();
    assert_eq!(proto_set.len(), 4);
}

#[tokio::test]
async fn test_walk_completing_after_deadline_is_internal_error() {
    let (_temp_dir, root) = create_test_tree();

    // Empty root: the single exclude lookup overruns the budget and the walk
    // then runs out of entries before it can notice the deadline.
    let provider = ProtoSetProvider::new(Arc::new(SlowConfigProvider {
        delay: Duration::from_millis(200),
    }))
    .with_walk_timeout(Duration::from_millis(50));

    let err = provider.get_multiple_for_dir(&root, &root).await.unwrap_err();
    assert!(
        matches!(err, DiscoveryError::InternalInconsistency),
        "expected internal error, got: {:?}",
        err
    );
}
