use series_journal::core::config::{BackendKind, Config};

#[test]
fn test_storage_config_parsing() {
    let config_toml = r#"
[storage]
backend = "remote"
data_dir = "/var/lib/series"

[remote]
base_url = "https://api.example.com"
timeout_seconds = 10
"#;

    let config: Config = toml::from_str(config_toml).expect("Failed to parse config");

    assert_eq!(config.storage.backend, BackendKind::Remote);
    assert_eq!(config.storage.data_dir, "/var/lib/series");
    assert_eq!(config.remote.base_url, "https://api.example.com");
    assert_eq!(config.remote.timeout_seconds, 10);
}

#[test]
fn test_storage_config_defaults() {
    let config: Config = toml::from_str("").expect("Failed to parse config");

    // Defaults apply when sections are omitted
    assert_eq!(config.storage.backend, BackendKind::File);
    assert_eq!(config.storage.data_dir, "./data");
    assert_eq!(config.remote.base_url, "http://localhost:5000");
    assert_eq!(config.remote.timeout_seconds, 30);
}
