// tests/config_loading.rs

mod common;
use crate::common::builders::MarkerConfigBuilder;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::time::Duration;

use labmark::config::template::{render, unknown_placeholders, TemplateVars};
use labmark::config::{
    load_and_validate, load_from_path, load_or_default, load_raw_or_default, validate_raw_config,
    LanguageCommands,
    MarkerConfig, RawMarkerConfig,
};
use labmark::errors::MarkerError;
use labmark::types::Language;

type TestResult = Result<(), Box<dyn Error>>;

fn config_error(raw: RawMarkerConfig) -> String {
    match MarkerConfig::try_from(raw) {
        Err(MarkerError::ConfigError(msg)) => msg,
        Err(other) => panic!("expected a config error, got {other}"),
        Ok(_) => panic!("expected a config error, got a valid config"),
    }
}

#[test]
fn defaults_match_lab_setup() {
    init_tracing();
    let cfg = MarkerConfig::default();

    assert_eq!(cfg.harness.poll_interval, Duration::from_millis(100));
    assert_eq!(cfg.harness.max_polls, 150);
    assert_eq!(cfg.harness.min_survival, Duration::from_secs(2));
    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.server.port, 12000);
    assert_eq!(cfg.target_name, "PingClient");

    let python = cfg.languages.commands(Language::Python);
    assert_eq!(python.build, None);
    assert_eq!(python.run.as_deref(), Some("python {name}.py {host} {port}"));

    let java = cfg.languages.commands(Language::Java);
    assert_eq!(java.build.as_deref(), Some("javac {name}.java"));
    assert_eq!(java.run.as_deref(), Some("java {name} {host} {port}"));

    assert_eq!(cfg.languages.commands(Language::C), &LanguageCommands::default());
}

#[test]
fn default_raw_config_is_valid() {
    init_tracing();
    assert!(validate_raw_config(&RawMarkerConfig::default()).is_ok());
}

#[test]
fn loads_partial_toml_with_defaults_for_missing_fields() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("labmark.toml");
    fs::write(
        &path,
        r#"
[harness]
max_polls = 20

[server]
port = 13000

[language.c]
build = "gcc -o {name} {name}.c"
run = "./{name} {host} {port}"
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.harness.max_polls, 20);
    assert_eq!(cfg.harness.poll_interval, Duration::from_millis(100));
    assert_eq!(cfg.server.host, "localhost");
    assert_eq!(cfg.server.port, 13000);
    assert_eq!(
        cfg.languages.commands(Language::C).run.as_deref(),
        Some("./{name} {host} {port}")
    );
    // Untouched languages keep their defaults.
    assert_eq!(
        cfg.languages.commands(Language::Java).build.as_deref(),
        Some("javac {name}.java")
    );
    Ok(())
}

#[test]
fn language_table_replaces_defaults_as_a_whole() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("labmark.toml");
    fs::write(&path, "[language.java]\nrun = \"java -jar {name}.jar {host} {port}\"\n")?;

    let cfg = load_and_validate(&path)?;
    let java = cfg.languages.commands(Language::Java);
    assert_eq!(java.build, None);
    assert_eq!(java.run.as_deref(), Some("java -jar {name}.jar {host} {port}"));
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[harness\nmax_polls = ")?;

    assert!(matches!(load_from_path(&path), Err(MarkerError::TomlError(_))));
    Ok(())
}

#[test]
fn wrong_value_type_is_a_toml_error() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("typed.toml");
    fs::write(&path, "[server]\nport = \"twelve thousand\"\n")?;

    assert!(matches!(load_from_path(&path), Err(MarkerError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_explicit_config_is_an_error() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.toml");

    assert!(load_from_path(&missing).is_err());
    assert!(load_or_default(Some(missing.as_path())).is_err());
    Ok(())
}

#[test]
fn explicit_config_is_validated() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("labmark.toml");
    fs::write(&path, "[harness]\npoll_interval_ms = 0\n")?;

    assert!(matches!(
        load_or_default(Some(path.as_path())),
        Err(MarkerError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn zero_timing_values_are_rejected() {
    init_tracing();
    let msg = config_error(MarkerConfigBuilder::new().poll_interval_ms(0).raw());
    assert!(msg.contains("poll_interval_ms"), "{msg}");

    let msg = config_error(MarkerConfigBuilder::new().max_polls(0).raw());
    assert!(msg.contains("max_polls"), "{msg}");
}

#[test]
fn zero_min_survival_is_allowed() {
    init_tracing();
    let cfg = MarkerConfigBuilder::new().min_survival_ms(0).build();
    assert_eq!(cfg.harness.min_survival, Duration::ZERO);
}

#[test]
fn bad_server_is_rejected() {
    init_tracing();
    let msg = config_error(MarkerConfigBuilder::new().server("  ", 12000).raw());
    assert!(msg.contains("[server].host"), "{msg}");

    let msg = config_error(MarkerConfigBuilder::new().server("localhost", 0).raw());
    assert!(msg.contains("[server].port"), "{msg}");
}

#[test]
fn hosts_that_would_break_the_shell_command_are_rejected() {
    init_tracing();
    for host in ["localhost; rm -rf ~", "local host", "$(hostname)", "a`b`", "h'q"] {
        let msg = config_error(MarkerConfigBuilder::new().server(host, 12000).raw());
        assert!(msg.contains("[server].host"), "host {host:?}: {msg}");
    }
    for host in ["localhost", "10.0.0.5", "lab-server.example.org", "[::1]", "ping_srv"] {
        assert!(
            MarkerConfig::try_from(MarkerConfigBuilder::new().server(host, 12000).raw()).is_ok(),
            "host {host:?} should be accepted"
        );
    }
}

#[test]
fn command_line_overrides_are_validated() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("labmark.toml");
    fs::write(&path, "[server]\nhost = \"10.0.0.5\"\nport = 12001\n")?;

    let mut raw = load_raw_or_default(Some(path.as_path()))?;
    raw.server.apply_overrides(None, Some(0));
    let msg = config_error(raw);
    assert!(msg.contains("[server].port"), "{msg}");

    let mut raw = load_raw_or_default(Some(path.as_path()))?;
    raw.server.apply_overrides(Some("evil;reboot"), None);
    let msg = config_error(raw);
    assert!(msg.contains("[server].host"), "{msg}");

    let mut raw = load_raw_or_default(Some(path.as_path()))?;
    raw.server.apply_overrides(Some("lab-server"), Some(13000));
    let cfg = MarkerConfig::try_from(raw)?;
    assert_eq!(cfg.server.host, "lab-server");
    assert_eq!(cfg.server.port, 13000);

    // Without overrides the file's values stand.
    let mut raw = load_raw_or_default(Some(path.as_path()))?;
    raw.server.apply_overrides(None, None);
    let cfg = MarkerConfig::try_from(raw)?;
    assert_eq!((cfg.server.host.as_str(), cfg.server.port), ("10.0.0.5", 12001));
    Ok(())
}

#[test]
fn bad_target_names_are_rejected() {
    init_tracing();
    for name in ["", "   ", "lab/PingClient", "PingClient.py"] {
        let msg = config_error(MarkerConfigBuilder::new().target(name).raw());
        assert!(msg.contains("[target].name"), "name {name:?}: {msg}");
    }
}

#[test]
fn unknown_placeholder_is_rejected() {
    init_tracing();
    let raw = MarkerConfigBuilder::new()
        .language(Language::Python, None, Some("python3 {file} {host} {port}"))
        .raw();
    let msg = config_error(raw);
    assert!(msg.contains("[language.python].run"), "{msg}");
    assert!(msg.contains("file"), "{msg}");
}

#[test]
fn empty_template_is_rejected() {
    init_tracing();
    let raw = MarkerConfigBuilder::new()
        .language(Language::Java, Some(" "), Some("java {name}"))
        .raw();
    let msg = config_error(raw);
    assert!(msg.contains("[language.java].build"), "{msg}");
}

#[test]
fn build_without_run_is_rejected() {
    init_tracing();
    let raw = MarkerConfigBuilder::new()
        .language(Language::C, Some("gcc {name}.c"), None)
        .raw();
    let msg = config_error(raw);
    assert!(msg.contains("no run command"), "{msg}");
}

#[test]
fn render_substitutes_every_placeholder() {
    let vars = TemplateVars {
        name: "PingClient",
        host: "10.0.0.5",
        port: 12001,
    };

    assert_eq!(
        render("java {name} {host} {port}", &vars),
        "java PingClient 10.0.0.5 12001"
    );
    assert_eq!(render("{name}-{name}", &vars), "PingClient-PingClient");
    assert_eq!(render("make", &vars), "make");
}

#[test]
fn unknown_placeholders_are_listed_in_order() {
    assert!(unknown_placeholders("python {name}.py {host} {port}").is_empty());
    assert_eq!(
        unknown_placeholders("{cwd}/run {name} {user} {"),
        vec!["cwd".to_string(), "user".to_string()]
    );
    assert!(unknown_placeholders("no braces at all").is_empty());
}

#[test]
fn marker_errors_are_config_toml_or_other() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("absent.toml");

    // An unreadable file surfaces through the anyhow context, not a bare
    // io variant.
    let err = load_from_path(&missing).expect_err("file does not exist");
    let kind = match &err {
        MarkerError::ConfigError(_) => "config",
        MarkerError::TomlError(_) => "toml",
        MarkerError::Other(_) => "other",
    };
    assert_eq!(kind, "other");
    assert!(format!("{err:#}").contains("absent.toml"), "{err:#}");
    Ok(())
}
