//! UI descriptor rendering for host-driven configuration.
//!
//! The overlay is a JSON document a host configuration UI consumes to offer
//! a live device dropdown without hardcoding names. Shape: a `params` list
//! with one editable `deviceName` combo box whose options are the
//! default-device sentinel followed by every enumerable device name, in
//! enumeration order, with quoted-string values.

use serde_json::{json, Value};

/// Renders the device-selection overlay for the given device names.
///
/// The first option is always the `"Default Device"` sentinel with an empty
/// quoted-string value, so the list always holds one more entry than the
/// device count.
pub(crate) fn device_overlay(device_names: &[String]) -> String {
    let mut options = vec![json!({
        "name": "Default Device",
        "value": "\"\"",
    })];

    for name in device_names {
        options.push(json!({
            "name": name,
            "value": format!("\"{name}\""),
        }));
    }

    let overlay: Value = json!({
        "params": [{
            "key": "deviceName",
            "widgetType": "ComboBox",
            "widgetKwargs": {"editable": true},
            "options": options,
        }],
    });

    overlay.to_string()
}
