// tests/config_test.rs
use semver_tags::config::{load_config, Config, ConfigOverrides, CONFIG_FILE_NAME};
use semver_tags::SemverTagsError;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

/// Runs `f` with the process working directory set to `dir`
fn in_dir<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir).unwrap();
    let result = f();
    env::set_current_dir(previous).unwrap();
    result
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
dry_run = true
remote = "upstream"
branch = "release"
pre_release_string = "rc"
directories = ["services/api", "web"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert!(config.dry_run);
    assert_eq!(config.remote, "upstream");
    assert_eq!(config.branch, "release");
    assert_eq!(config.pre_release_string, "rc");
    assert_eq!(config.directories, vec!["services/api", "web"]);
    assert!(config.atomic);
    assert!(config.output_json);
}

#[test]
fn test_invalid_file_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"atomic = \"sometimes\"\n").unwrap();
    temp_file.flush().unwrap();

    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    assert!(matches!(result, Err(SemverTagsError::Config(_))));
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let result = load_config(Some("/nonexistent/semver-tags.toml"));
    assert!(matches!(result, Err(SemverTagsError::Config(_))));
}

#[test]
#[serial]
fn test_local_file_is_found() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "github_action = true\noutput_json = false\n",
    )
    .unwrap();

    let config = in_dir(temp.path(), || load_config(None)).unwrap();
    assert!(config.github_action);
    assert!(!config.output_json);
}

#[test]
#[serial]
fn test_cli_overrides_file_values() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "remote = \"upstream\"\natomic = false\ndirectories = [\"api\"]\n",
    )
    .unwrap();

    let config = in_dir(temp.path(), || load_config(None)).unwrap();
    let merged = config.merge(ConfigOverrides {
        atomic: Some(true),
        directories: Some(vec!["web".to_string(), "".to_string()]),
        ..ConfigOverrides::default()
    });
    let args = merged.into_workflow_args(PathBuf::from("/work"));

    assert_eq!(args.remote, "upstream");
    assert!(args.atomic);
    assert_eq!(args.directories, vec!["web"]);
}

#[test]
fn test_defaults_match_workflow_defaults() {
    let args = Config::default().into_workflow_args(PathBuf::from("."));
    assert_eq!(args, semver_tags::cli::TaggingWorkflowArgs::default());
}
