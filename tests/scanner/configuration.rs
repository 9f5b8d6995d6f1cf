//! Capabilities and configuration through the public service API

use carbonpaper::backend::{MemoryBackend, MemoryDevice, OptionValue};
use carbonpaper::scanner::{Configuration, ScanError, ScanService};

use crate::common::{FLATBED, FLATBED_DESCRIPTOR};

fn service() -> (MemoryBackend, ScanService) {
    let backend = MemoryBackend::new().with_device(MemoryDevice::flatbed(FLATBED));
    let service = ScanService::new(backend.clone()).unwrap();
    (backend, service)
}

#[test]
fn test_flatbed_capabilities() {
    let (_, mut service) = service();
    let capabilities = service.get_capabilities(None).unwrap();

    assert_eq!(capabilities.min_x, 0.0);
    assert!((capabilities.max_x - 215.9).abs() < 1e-4);
    assert_eq!(capabilities.max_y, 297.0);
    assert_eq!(capabilities.possible_resolutions_in_dpi, vec![75, 150, 300, 600]);
    assert!(capabilities.possible_modes.contains(&"Color".to_string()));
    assert!(capabilities.possible_modes.contains(&"Gray".to_string()));
    assert!(!capabilities.possible_sources.is_empty());
}

#[test]
fn test_written_configuration_reads_back() {
    let (backend, mut service) = service();
    let wanted = Configuration {
        from_x: 10.0,
        from_y: 20.0,
        to_x: 110.0,
        to_y: 220.0,
        resolution_in_dpi: 300,
        source: "Flatbed".to_string(),
        mode: "Gray".to_string(),
    };

    service.set_configuration(None, &wanted).unwrap();

    assert_eq!(service.get_configuration(None).unwrap(), wanted);
    assert_eq!(
        backend.option_value(FLATBED, "resolution"),
        Some(OptionValue::Int(300))
    );
    assert_eq!(service.opened_devices(), &[FLATBED_DESCRIPTOR.to_string()]);
}

#[test]
fn test_overlong_mode_is_rejected_before_writing() {
    let (backend, mut service) = service();
    let mut configuration = service.get_configuration(None).unwrap();
    configuration.mode = "M".repeat(129);

    assert!(matches!(
        service.set_configuration(None, &configuration),
        Err(ScanError::PreconditionViolation { .. })
    ));
    assert_eq!(backend.stats().write_calls, 0);
}

#[test]
fn test_device_without_mode_option_is_unsupported() {
    let backend = MemoryBackend::new()
        .with_device(MemoryDevice::flatbed("memory:sheetfed").without_option("mode"));
    let mut service = ScanService::new(backend).unwrap();

    match service.get_capabilities(None) {
        Err(ScanError::UnsupportedDevice { missing, .. }) => {
            assert_eq!(missing, vec!["mode".to_string()])
        }
        other => panic!("Expected UnsupportedDevice, got {:?}", other),
    }
}
