//! Layered configuration loading

use roguefs::config::{workspace_config_path, ConfigLoader};
use roguefs::WorldError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn loader(root: &std::path::Path) -> ConfigLoader {
    ConfigLoader::new(root)
        .with_global_file(None)
        .with_environment(false)
}

#[test]
fn test_explicit_file_beats_workspace_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join(".roguefs")).unwrap();
    fs::write(
        workspace_config_path(root),
        "[layout]\nmin_dist = 1.0\nfill_ratio = 0.8\n\n[logging]\nlevel = \"info\"\n",
    )
    .unwrap();
    let explicit = root.join("override.toml");
    fs::write(&explicit, "[layout]\nmin_dist = 4.0\n").unwrap();

    let config = loader(root).with_file(Some(explicit)).load().unwrap();
    assert_eq!(config.layout.min_dist, 4.0);
    assert_eq!(config.layout.fill_ratio, 0.8);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_scan_and_storage_sections() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join(".roguefs")).unwrap();
    fs::write(
        workspace_config_path(root),
        "[scan]\nignore_names = [\".git\"]\n\n[storage]\nfallback_path = \"/srv/rfs\"\n",
    )
    .unwrap();

    let config = loader(root).load_validated().unwrap();
    assert_eq!(config.storage.fallback_path, Some(PathBuf::from("/srv/rfs")));
    let ignored = config.scan.scanner_config().ignore_names;
    assert!(ignored.contains(&".git".to_string()));
    assert!(ignored.contains(&".rogueos".to_string()));

    let (_, fallback) = config.storage.resolve(root);
    assert_eq!(fallback, PathBuf::from("/srv/rfs"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join(".roguefs")).unwrap();
    fs::write(
        workspace_config_path(root),
        "[layout]\nfill_ratio = 1.5\n\n[logging]\noutput = \"syslog\"\n",
    )
    .unwrap();

    match loader(root).load_validated() {
        Err(WorldError::ConfigError(message)) => {
            assert!(message.contains("fill_ratio"));
            assert!(message.contains("Invalid log output"));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_malformed_workspace_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join(".roguefs")).unwrap();
    fs::write(workspace_config_path(root), "[layout\nmin_dist = ").unwrap();
    assert!(loader(root).load().is_err());
}
