//! Configuration resolution tests
//!
//! Tests that touch DAISY_* environment variables are marked #[serial]
//! so they never run in parallel with each other.

use daisy_common::config::{
    load_toml_config, ConfigOverrides, PortalConfig, TomlConfig, DEFAULT_BIND_ADDRESS,
    DEFAULT_MEDIA_BASE_URL, ENV_BIND_ADDRESS, ENV_DATABASE_PATH, ENV_MEDIA_API_KEY,
    ENV_MEDIA_API_SECRET, ENV_MEDIA_BASE_URL, ENV_MEDIA_CLOUD_NAME, ENV_ROOT_FOLDER,
    ENV_ROSTER_PATH,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    for key in [
        ENV_ROOT_FOLDER,
        ENV_ROSTER_PATH,
        ENV_DATABASE_PATH,
        ENV_BIND_ADDRESS,
        ENV_MEDIA_CLOUD_NAME,
        ENV_MEDIA_API_KEY,
        ENV_MEDIA_API_SECRET,
        ENV_MEDIA_BASE_URL,
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_derive_paths_from_root_folder() {
    clear_env();
    let overrides = ConfigOverrides {
        root_folder: Some(PathBuf::from("/srv/daisy")),
        ..Default::default()
    };

    let config = PortalConfig::from_sources(&overrides, &TomlConfig::default());

    assert_eq!(config.root_folder, PathBuf::from("/srv/daisy"));
    assert_eq!(config.roster_path, PathBuf::from("/srv/daisy/students.csv"));
    assert_eq!(config.database_path, PathBuf::from("/srv/daisy/portal.db"));
    assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    assert_eq!(config.media_host.base_url, DEFAULT_MEDIA_BASE_URL);
    assert!(!config.media_host.is_configured());
}

#[test]
#[serial]
fn test_cli_beats_env_beats_toml() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/from/env");
    env::set_var(ENV_BIND_ADDRESS, "0.0.0.0:8080");

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        bind_address: Some("0.0.0.0:9090".to_string()),
        roster_path: Some(PathBuf::from("/from/toml/roster.csv")),
        ..Default::default()
    };

    let no_cli = PortalConfig::from_sources(&ConfigOverrides::default(), &toml_config);
    assert_eq!(no_cli.root_folder, PathBuf::from("/from/env"));
    assert_eq!(no_cli.bind_address, "0.0.0.0:8080");
    assert_eq!(no_cli.roster_path, PathBuf::from("/from/toml/roster.csv"));

    let cli = ConfigOverrides {
        root_folder: Some(PathBuf::from("/from/cli")),
        ..Default::default()
    };
    let with_cli = PortalConfig::from_sources(&cli, &toml_config);
    assert_eq!(with_cli.root_folder, PathBuf::from("/from/cli"));

    clear_env();
}

#[test]
#[serial]
fn test_media_credentials_from_env_override_toml() {
    clear_env();
    env::set_var(ENV_MEDIA_API_SECRET, "env-secret");

    let toml_config: TomlConfig = toml::from_str(
        r#"
        [media_host]
        cloud_name = "daisy"
        api_key = "12345"
        api_secret = "toml-secret"
        "#,
    )
    .unwrap();

    let config = PortalConfig::from_sources(&ConfigOverrides::default(), &toml_config);
    assert_eq!(config.media_host.cloud_name, "daisy");
    assert_eq!(config.media_host.api_secret, "env-secret");
    assert!(config.media_host.is_configured());
    assert!(!format!("{:?}", config.media_host).contains("env-secret"));

    clear_env();
}

#[test]
fn test_missing_toml_file_uses_defaults() {
    let config = load_toml_config(&PathBuf::from("/nonexistent/daisy/config.toml")).unwrap();
    assert!(config.root_folder.is_none());
    assert!(config.media_host.api_key.is_none());
}

#[test]
fn test_malformed_toml_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, daisy_common::Error::Config(_)));
}

#[test]
fn test_toml_file_round_trip_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "root_folder = \"/data/daisy\"\nbind_address = \"0.0.0.0:5000\"\n",
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/data/daisy")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:5000"));
}
