// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use serde_json::Value;

/// Rewrite legacy keys before deserializing.
///
/// Older files carried a top-level `console_help_command` flag; `false` or
/// `null` disabled the help command.
pub(super) fn migrate_on_load(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    if let Some(legacy) = map.remove("console_help_command") {
        let enabled = !matches!(legacy, Value::Null | Value::Bool(false));
        let help = map
            .entry("help")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(help) = help {
            help.entry("enabled").or_insert(Value::Bool(enabled));
        }
    }

    Value::Object(map)
}

/// Deep-merge two JSON values.
/// `base` is existing file content, `overlay` is serialized current struct.
/// Overlay values take priority.
pub(super) fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = if let Some(base_val) = base_map.remove(&key) {
                    deep_merge(base_val, overlay_val)
                } else {
                    overlay_val
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_base, overlay) => overlay,
    }
}
