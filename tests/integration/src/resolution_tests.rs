//! End-to-end resolution: defaults, files, environment and options together

use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use strata_core::{ConfigManager, Error, ManagerOptions};
use strata_doc::{DocumentCodec, Format, Node};
use strata_test_utils::{fixtures, FixtureDir};

fn yaml(source: &str) -> Node {
    DocumentCodec::new().parse(source, Format::Yaml).unwrap()
}

fn sensor_manager(dir: &FixtureDir, files: &[(&str, &str)]) -> ConfigManager {
    let defaults = dir.write("defaults.yaml", fixtures::SENSOR_SCHEMA);
    let files: Vec<_> = files
        .iter()
        .map(|(name, content)| dir.write(name, content))
        .collect();
    ConfigManager::new(
        ManagerOptions::new()
            .with_default_file(defaults)
            .with_optional_files(files)
            .with_env_prefix("STRATA_IT"),
    )
    .unwrap()
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_later_sources_override_earlier_ones() {
    let dir = FixtureDir::new();
    let mut cm = sensor_manager(
        &dir,
        &[
            ("site.yaml", "ui:\n  port: 9090\n"),
            ("host.yaml", "ui:\n  port: 9191\n"),
        ],
    );
    assert_eq!(cm.get_cli_opt_value("ui--port").unwrap(), Node::from(9191));

    cm.config_from_vars([("STRATA_IT_UI__PORT", "7000")]).unwrap();
    assert_eq!(cm.get_cli_opt_value("ui--port").unwrap(), Node::from(7000));

    cm.config_from_cli_args(["--ui--port", "81"]).unwrap();
    assert_eq!(cm.get_env_var_value("STRATA_IT_UI__PORT").unwrap(), Node::from(81));

    // Untouched siblings still come from the defaults
    assert_eq!(cm.get_cli_opt_value("ui--addr").unwrap(), Node::from("0.0.0.0"));
    cm.validate().unwrap();
}

#[test]
#[serial]
fn test_process_environment_is_read() {
    temp_env::with_vars(
        [
            ("STRATA_IT_CONTROL_CONFIG__SENSOR_RESET_INTERVAL", Some("6")),
            ("STRATA_IT_GENERAL__LOG_LEVEL", Some("debug")),
        ],
        || {
            let dir = FixtureDir::new();
            let mut cm = sensor_manager(&dir, &[]);
            cm.config_from_env_vars().unwrap();

            assert_eq!(
                cm.get_cli_opt_value("control-config--sensor-reset-interval").unwrap(),
                Node::from(6)
            );
            assert_eq!(cm.get_cli_opt_value("general--log-level").unwrap(), Node::from("debug"));
            cm.validate().unwrap();
        },
    );
}

#[test]
fn test_failed_batch_leaves_configuration_untouched() {
    let dir = FixtureDir::new();
    let mut cm = sensor_manager(&dir, &[]);
    let before = cm.config();
    let layers = cm.overlay().layer_count();

    let err = cm
        .config_from_vars([
            ("STRATA_IT_UI__PORT", "7000"),
            ("STRATA_IT_UI__NOT_A_SETTING", "1"),
        ])
        .unwrap_err();

    assert!(matches!(err, Error::UnknownPath { .. }));
    assert_eq!(cm.config(), before);
    assert_eq!(cm.overlay().layer_count(), layers);
}

#[test]
fn test_cli_options_are_lenient() {
    let dir = FixtureDir::new();
    let mut cm = sensor_manager(&dir, &[]);

    cm.config_from_cli_args(["--no-such-option", "1", "--ui--port", "8181", "--dry-run"])
        .unwrap();

    assert_eq!(cm.get_cli_opt_value("ui--port").unwrap(), Node::from(8181));
}

#[rstest]
#[case("6", Node::from(6), true)]
#[case("30.1", Node::from("30.1"), false)]
fn test_integer_override_coercion(
    #[case] raw: &str,
    #[case] expected: Node,
    #[case] valid: bool,
) {
    let dir = FixtureDir::new();
    let mut cm = sensor_manager(&dir, &[]);

    cm.set_cli_opt_value("control-config--sensor-reset-interval", raw)
        .unwrap();

    assert_eq!(
        cm.get_cli_opt_value("control-config--sensor-reset-interval").unwrap(),
        expected
    );
    assert_eq!(cm.validate().is_ok(), valid);
}

#[test]
fn test_json_list_from_environment() {
    let dir = FixtureDir::new();
    let mut cm = sensor_manager(&dir, &[]);

    cm.config_from_vars([(
        "STRATA_IT_SENSOR_CONFIG__SENSORS",
        r#"[{"id": 5, "name": "front", "min_trigger_limit": 1, "max_trigger_limit": 2}]"#,
    )])
    .unwrap();

    let sensors = cm.get_cli_opt_value("sensor-config--sensors").unwrap();
    assert_eq!(sensors.len(), Some(1));
    cm.validate().unwrap();
}

// ============================================================================
// Export
// ============================================================================

fn export(cm: &ConfigManager) -> String {
    let mut out = Vec::new();
    cm.export_current_config(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[rstest]
#[case(fixtures::OVERLAY_BASIC)]
#[case(fixtures::OVERLAY_LONGER_LIST)]
#[case(fixtures::OVERLAY_SHORTER_LIST)]
fn test_exported_config_reloads_identically(#[case] overlay: &str) {
    let dir = FixtureDir::new();
    let cm = sensor_manager(&dir, &[("site.yaml", overlay)]);
    let exported = dir.write("exported.yaml", &export(&cm));

    let mut reloaded = sensor_manager(&FixtureDir::new(), &[]);
    reloaded.config_from_file(&exported).unwrap();

    assert_eq!(reloaded.config(), cm.config());
}

#[test]
fn test_export_of_lists_follows_resolved_length() {
    let dir = FixtureDir::new();
    let cm = sensor_manager(&dir, &[("site.yaml", fixtures::OVERLAY_LONGER_LIST)]);

    let exported = yaml(&export(&cm));
    let sensors = exported
        .get("sensor_config")
        .and_then(|c| c.get("sensors"))
        .and_then(Node::as_sequence)
        .unwrap();

    assert_eq!(sensors.len(), 3);
    assert_eq!(sensors[2].get("name"), Some(&Node::from("rear")));
    assert_eq!(sensors[2].get("oc_schema_id"), None);
}

// ============================================================================
// Other document formats
// ============================================================================

const TOML_SCHEMA: &str = r#"
[server.host]
oc_default = "localhost"
oc_schema = { type = "string" }

[server.port]
oc_default = 8080
oc_desc = "Listening port"
oc_schema = { type = "integer", min = 1 }
"#;

const JSON_SCHEMA: &str = r#"{
  "server": {
    "host": {"oc_default": "localhost", "oc_schema": {"type": "string"}},
    "port": {"oc_default": 8080, "oc_schema": {"type": "integer", "min": 1}}
  }
}"#;

#[rstest]
#[case("defaults.toml", TOML_SCHEMA, Format::Toml)]
#[case("defaults.json", JSON_SCHEMA, Format::Json)]
fn test_defaults_in_other_formats(
    #[case] name: &str,
    #[case] schema: &str,
    #[case] format: Format,
) {
    let dir = FixtureDir::new();
    let defaults = dir.write(name, schema);
    let mut cm = ConfigManager::new(
        ManagerOptions::new()
            .with_default_file(defaults)
            .with_env_prefix("SRV"),
    )
    .unwrap();
    assert_eq!(cm.format(), format);

    cm.config_from_vars([("SRV_SERVER__PORT", "9000")]).unwrap();
    cm.validate().unwrap();

    let exported = DocumentCodec::new().parse(&export(&cm), format).unwrap();
    assert_eq!(exported, yaml("server:\n  host: localhost\n  port: 9000\n"));

    cm.set_cli_opt_value("server--port", "0").unwrap();
    assert!(matches!(cm.validate(), Err(Error::Validation { .. })));
}

#[test]
fn test_self_referencing_schema_is_rejected() {
    let dir = FixtureDir::new();
    let defaults = dir.write("defaults.yaml", fixtures::SELF_REFERENCE_SCHEMA);
    let err = ConfigManager::new(ManagerOptions::new().with_default_file(defaults)).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(strata_schema::Error::SelfReference { .. })
    ));
}

const COMMENTED_TOML_SCHEMA: &str = r#"# Service defaults
[server]
# Address to bind
host = { oc_default = "localhost", oc_schema = { type = "string" } }
port = { oc_default = 8080, oc_schema = { type = "integer", min = 1 } } # proxy expects this
"#;

#[test]
fn test_toml_export_keeps_comments() {
    let dir = FixtureDir::new();
    let defaults = dir.write("defaults.toml", COMMENTED_TOML_SCHEMA);
    let mut cm = ConfigManager::new(
        ManagerOptions::new()
            .with_default_file(defaults)
            .with_env_prefix("SRV"),
    )
    .unwrap();
    cm.config_from_cli_args(["--server--port", "9000"]).unwrap();

    let text = export(&cm);

    assert!(text.contains("# Service defaults"));
    assert!(text.contains("# Address to bind"));
    assert!(text.contains("# proxy expects this"));
    assert!(!text.contains("oc_default"));
    let exported = DocumentCodec::new().parse(&text, Format::Toml).unwrap();
    assert_eq!(exported, cm.config());
    assert_eq!(
        exported.get("server").and_then(|s| s.get("port")),
        Some(&Node::from(9000))
    );
}
