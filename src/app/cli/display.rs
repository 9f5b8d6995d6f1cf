//! Terminal rendering of scanner records
//!
//! Tables are built with prettytable; colour specs are attached only when
//! colour is enabled, so the same table prints plain into pipes.

use prettytable::{format, Cell, Row, Table};
use serde::Serialize;

use crate::core::styles::StyleRole;
use crate::scanner::{Capabilities, Configuration, ScanError, ScanResult};

fn cell(text: &str, role: StyleRole, color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if color => cell.style_spec(&spec),
        _ => cell,
    }
}

fn key_value_table(rows: Vec<(&str, String)>, color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    for (key, value) in rows {
        table.add_row(Row::new(vec![
            cell(key, StyleRole::Key, color),
            cell(&value, StyleRole::Value, color),
        ]));
    }
    table
}

fn millimetres(value: f64) -> String {
    format!("{:.1} mm", value)
}

fn joined<T: ToString>(values: &[T]) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One row per device, numbered in enumeration order.
pub fn device_table(devices: &[String], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![
        cell("#", StyleRole::Header, color),
        cell("Device", StyleRole::Header, color),
    ]));
    for (index, device) in devices.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&index.to_string()),
            cell(device, StyleRole::Device, color),
        ]));
    }
    table
}

pub fn capabilities_table(capabilities: &Capabilities, color: bool) -> Table {
    key_value_table(
        vec![
            ("Min X", millimetres(capabilities.min_x)),
            ("Min Y", millimetres(capabilities.min_y)),
            ("Max X", millimetres(capabilities.max_x)),
            ("Max Y", millimetres(capabilities.max_y)),
            ("Resolutions (dpi)", joined(&capabilities.possible_resolutions_in_dpi)),
            ("Sources", joined(&capabilities.possible_sources)),
            ("Modes", joined(&capabilities.possible_modes)),
        ],
        color,
    )
}

pub fn configuration_table(configuration: &Configuration, color: bool) -> Table {
    key_value_table(
        vec![
            ("From X", millimetres(configuration.from_x)),
            ("From Y", millimetres(configuration.from_y)),
            ("To X", millimetres(configuration.to_x)),
            ("To Y", millimetres(configuration.to_y)),
            ("Resolution", format!("{} dpi", configuration.resolution_in_dpi)),
            ("Source", configuration.source.clone()),
            ("Mode", configuration.mode.clone()),
        ],
        color,
    )
}

/// Pretty-printed JSON, using the same camelCase keys as the host surface.
pub fn to_json<T: Serialize>(value: &T) -> ScanResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ScanError::Output {
        path: "<stdout>".into(),
        message: e.to_string(),
    })
}
