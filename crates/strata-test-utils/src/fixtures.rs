//! Configuration documents shared by the test suites.
//!
//! The files live under `test-fixtures/configs` at the workspace root so the
//! CLI tests can pass them to the binary by path.

use std::path::PathBuf;

/// Annotated sensor-controller defaults used throughout the tests.
///
/// Environment keys use the `ONAC` prefix in the suites, e.g.
/// `ONAC_BOTTOM_SENSOR__PREACTIVATION_TIMEOUT`.
pub const SENSOR_SCHEMA: &str = include_str!("../../../test-fixtures/configs/sensor_schema.yaml");

/// [`SENSOR_SCHEMA`] with every annotation stripped.
pub const SENSOR_DEFAULTS: &str =
    include_str!("../../../test-fixtures/configs/sensor_defaults.yaml");

/// A mapping that registers itself under an id it also references.
pub const SELF_REFERENCE_SCHEMA: &str =
    include_str!("../../../test-fixtures/configs/schema_self_reference.yaml");

pub const INVALID_YAML_SCHEMA: &str =
    include_str!("../../../test-fixtures/configs/schema_invalid_yaml.yaml");

/// Sets `general.log_level` to `debug` and `ui.port` to 9090.
pub const OVERLAY_BASIC: &str = include_str!("../../../test-fixtures/configs/overlay_basic.yaml");

/// Three sensors where the defaults have two.
pub const OVERLAY_LONGER_LIST: &str =
    include_str!("../../../test-fixtures/configs/overlay_longer_list.yaml");

/// One sensor where the defaults have two.
pub const OVERLAY_SHORTER_LIST: &str =
    include_str!("../../../test-fixtures/configs/overlay_shorter_list.yaml");

/// Gives `bottom_sensor.preactivation_timeout` a string value.
pub const OVERLAY_INVALID_VALUE: &str =
    include_str!("../../../test-fixtures/configs/overlay_invalid_value.yaml");

/// Absolute path of a file under `test-fixtures/configs`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/configs")
        .join(name)
}
