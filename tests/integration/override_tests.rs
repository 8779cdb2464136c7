use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use filedup::cli::{Cli, OutputFormat};
use filedup::config::{Config, ENV_PREFIX};
use filedup::scanner::HashAlgorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_hierarchy_defaults_file_env_cli() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    // 1. Defaults
    let defaults = Config::default();
    assert_eq!(defaults.threads, 0);

    // 2. File overrides defaults
    fs::write(&config_path, "threads = 8\nalgorithm = \"blake3\"\n").unwrap();
    let from_file = Config::load(Some(&config_path)).unwrap();
    assert_eq!(from_file.threads, 8);
    assert_eq!(from_file.algorithm, HashAlgorithm::Blake3);

    // 3. Environment overrides the file. The variable name is unique to this
    //    test and never read by the scan tests.
    std::env::set_var("FILEDUP_OVERRIDE_TEST_THREADS", "12");
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("FILEDUP_OVERRIDE_TEST_"));
    let mut config: Config = figment.extract().unwrap();
    std::env::remove_var("FILEDUP_OVERRIDE_TEST_THREADS");
    assert_eq!(config.threads, 12);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);

    // 4. CLI overrides everything
    let cli = Cli::try_parse_from(["filedup", "-j", "1", "--algorithm", "sha256", "."]).unwrap();
    config.apply_cli(&cli);
    assert_eq!(config.threads, 1);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
}

#[test]
fn test_absent_cli_flags_keep_file_values() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "strict = true\noutput = \"json\"\nthreads = 5\n").unwrap();

    let mut config = Config::load(Some(&config_path)).unwrap();
    let cli = Cli::try_parse_from(["filedup", "."]).unwrap();
    config.apply_cli(&cli);

    assert!(config.strict);
    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.threads, 5);
}

#[test]
fn test_env_prefix() {
    assert_eq!(ENV_PREFIX, "FILEDUP_");
}
