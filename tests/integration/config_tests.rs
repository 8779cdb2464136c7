use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use filedup::cli::OutputFormat;
use filedup::config::Config;
use filedup::scanner::HashAlgorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.threads, 0);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
threads = 6
algorithm = "blake3"
skip_hash = true
follow_symlinks = true
dedupe_roots = true
strict = true
output = "json"
progress = false
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.threads, 6);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert!(config.skip_hash);
    assert!(config.follow_symlinks);
    assert!(config.dedupe_roots);
    assert!(config.strict);
    assert_eq!(config.output, OutputFormat::Json);
    assert!(!config.progress);
}

#[test]
fn test_config_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "threads = 2\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.threads, 2);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
    assert!(config.progress);
}

#[test]
fn test_config_invalid_value_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"md5\"\n").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_malformed_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "threads = [unterminated").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_serializes_to_toml() {
    let config = Config {
        threads: 3,
        algorithm: HashAlgorithm::Blake3,
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config).unwrap();
    assert!(content.contains("threads = 3"));
    assert!(content.contains("algorithm = \"blake3\""));
    assert!(content.contains("output = \"text\""));

    let back: Config = toml::from_str(&content).unwrap();
    assert_eq!(back, config);
}
