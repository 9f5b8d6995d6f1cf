//! Name-based host operations

use carbonpaper::scanner::{ConfigurationPatch, ScanError};
use serde_json::json;

use crate::common::{
    small_area, two_flatbed_host, FLATBED, FLATBED_DESCRIPTOR, SECOND_DESCRIPTOR,
};

#[test]
fn test_scanners_are_listed_by_descriptor() {
    let (_, mut host) = two_flatbed_host();
    assert_eq!(
        host.get_scanners().unwrap(),
        vec![FLATBED_DESCRIPTOR.to_string(), SECOND_DESCRIPTOR.to_string()]
    );
}

#[test]
fn test_devices_can_be_named_by_descriptor_or_backend_name() {
    let (backend, mut host) = two_flatbed_host();
    host.set_configuration(
        Some(FLATBED),
        &ConfigurationPatch {
            mode: Some("Gray".to_string()),
            ..ConfigurationPatch::default()
        },
    )
    .unwrap();

    assert_eq!(host.get_configuration(Some(FLATBED_DESCRIPTOR)).unwrap().mode, "Gray");
    assert_eq!(host.get_configuration(Some(SECOND_DESCRIPTOR)).unwrap().mode, "Color");
    assert_eq!(backend.stats().open_calls, 2);
}

#[test]
fn test_unknown_device_does_not_fall_back() {
    let (backend, mut host) = two_flatbed_host();
    assert!(matches!(
        host.scan_to_buffer(Some("memory:flatbed9")),
        Err(ScanError::DeviceNotFound { .. })
    ));
    assert_eq!(backend.stats().start_calls, 0);
}

#[test]
fn test_json_configuration_then_scan() {
    let (_, mut host) = two_flatbed_host();
    let written = host
        .set_configuration_value(
            Some(SECOND_DESCRIPTOR),
            &json!({"toX": 25.4, "toY": 25.4, "resolutionInDPI": 75, "mode": "Gray"}),
        )
        .unwrap();
    assert_eq!(written.mode, "Gray");

    let image = host.scan_to_buffer(Some(SECOND_DESCRIPTOR)).unwrap().unwrap();
    assert_eq!((image.width, image.height, image.bytes_per_pixel), (75, 75, 1));
}

#[test]
fn test_shutdown_closes_every_device() {
    let (backend, mut host) = two_flatbed_host();
    host.set_configuration(None, &small_area()).unwrap();
    host.get_capabilities(Some(SECOND_DESCRIPTOR)).unwrap();
    assert_eq!(backend.open_handles(), 2);

    host.shutdown().unwrap();

    assert_eq!(backend.open_handles(), 0);
    assert_eq!(backend.stats().shutdown_calls, 1);
    assert!(!backend.is_initialised());
}
