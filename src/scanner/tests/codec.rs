//! Tests for the capability / configuration codec

use crate::backend::{
    Fixed, MemoryDevice, OptionConstraint, OptionDescriptor, OptionValue, Status, ValueKind,
};
use crate::scanner::codec::{
    decode_string, encode_string, expand_range, fix, unfix, word_list_entries, OptionCodec,
    MAX_RANGE_ENTRIES,
};
use crate::scanner::error::ScanError;
use crate::scanner::tests::helpers::{
    opened_device, opened_flatbed, string_value, OpenedFlatbed, FLATBED,
    FLATBED_DESCRIPTOR,
};
use crate::scanner::types::Configuration;

fn codec(fixture: &mut OpenedFlatbed) -> OptionCodec<'_> {
    OptionCodec::new(
        &mut fixture.backend,
        fixture.handle,
        &fixture.map,
        FLATBED_DESCRIPTOR,
        128,
    )
}

fn a5_gray_feeder() -> Configuration {
    Configuration {
        from_x: 10.0,
        from_y: 20.0,
        to_x: 158.0,
        to_y: 230.0,
        resolution_in_dpi: 300,
        source: "ADF".to_string(),
        mode: "Gray".to_string(),
    }
}

#[test]
fn test_fixed_point_conversion() {
    assert_eq!(fix(1.0).raw(), 65536);
    assert_eq!(fix(-2.5).raw(), -163840);
    assert_eq!(fix(215.9).raw(), 14149222);
    assert_eq!(unfix(Fixed::from_raw(65536 * 297)), 297.0);
    assert!((unfix(fix(215.9)) - 215.9).abs() < 1.0 / 65536.0);
}

#[test]
fn test_word_list_entries() {
    assert_eq!(word_list_entries(&[3, 75, 150, 300]), &[75, 150, 300]);
    assert_eq!(word_list_entries(&[5, 75]), &[75]);
    assert_eq!(word_list_entries(&[-1, 75]), &[] as &[i32]);
    assert_eq!(word_list_entries(&[]), &[] as &[i32]);
}

#[test]
fn test_expand_range() {
    assert_eq!(expand_range(50, 200, 50), vec![50, 100, 150, 200]);
    assert_eq!(expand_range(50, 210, 50), vec![50, 100, 150, 200]);
    assert_eq!(expand_range(100, 1200, 0), vec![100, 1200]);
    assert_eq!(expand_range(300, 300, 0), vec![300]);
    assert!(expand_range(300, 100, 1).is_empty());
}

#[test]
fn test_fine_grained_range_is_not_expanded() {
    // 50..1200 dpi in steps of 1/65536
    let (min, max) = (fix(50.0).raw(), fix(1200.0).raw());
    assert_eq!(expand_range(min, max, 1), vec![min, max]);
    assert_eq!(expand_range(0, 1023, 1).len(), MAX_RANGE_ENTRIES);
    assert_eq!(expand_range(0, 1024, 1), vec![0, 1024]);
}

#[test]
fn test_string_buffers() {
    let buffer = encode_string("mode", "Color", 128).unwrap();
    assert_eq!(buffer.len(), 128);
    assert_eq!(&buffer[..6], b"Color\0");
    assert_eq!(decode_string(&buffer), "Color");
    assert_eq!(decode_string(b"Flatbed"), "Flatbed");

    let longest = "x".repeat(128);
    assert_eq!(encode_string("mode", &longest, 128).unwrap().len(), 128);
    assert!(matches!(
        encode_string("mode", &"x".repeat(129), 128),
        Err(ScanError::PreconditionViolation { .. })
    ));
}

#[test]
fn test_flatbed_capabilities() {
    let mut fixture = opened_flatbed();
    let capabilities = codec(&mut fixture).capabilities().unwrap();

    assert_eq!(capabilities.min_x, 0.0);
    assert_eq!(capabilities.min_y, 0.0);
    assert!((capabilities.max_x - 215.9).abs() < 1e-4);
    assert_eq!(capabilities.max_y, 297.0);
    assert_eq!(capabilities.possible_resolutions_in_dpi, vec![75, 150, 300, 600]);
    assert_eq!(capabilities.possible_sources, vec!["Flatbed", "ADF"]);
    assert_eq!(capabilities.possible_modes, vec!["Color", "Gray"]);
}

#[test]
fn test_range_resolution_and_unconstrained_source() {
    let device = MemoryDevice::flatbed(FLATBED)
        .without_option("resolution")
        .without_option("source")
        .with_option(
            OptionDescriptor::new(
                Some("resolution"),
                ValueKind::Int,
                4,
                OptionConstraint::Range {
                    min: 50,
                    max: 200,
                    quant: 50,
                },
            ),
            Some(OptionValue::Int(100)),
        )
        .with_option(
            OptionDescriptor::new(Some("source"), ValueKind::String, 128, OptionConstraint::None),
            Some(string_value("Flatbed")),
        );
    let mut fixture = opened_device(device);
    let capabilities = codec(&mut fixture).capabilities().unwrap();

    assert_eq!(capabilities.possible_resolutions_in_dpi, vec![50, 100, 150, 200]);
    assert!(capabilities.possible_sources.is_empty());
}

#[test]
fn test_fixed_point_resolutions_are_rounded() {
    let device = MemoryDevice::flatbed(FLATBED)
        .without_option("resolution")
        .with_option(
            OptionDescriptor::new(
                Some("resolution"),
                ValueKind::Fixed,
                4,
                OptionConstraint::WordList(vec![2, fix(75.0).raw(), fix(150.4).raw()]),
            ),
            Some(OptionValue::Fixed(fix(75.0))),
        );
    let mut fixture = opened_device(device);
    let mut codec = codec(&mut fixture);

    assert_eq!(
        codec.capabilities().unwrap().possible_resolutions_in_dpi,
        vec![75, 150]
    );
    assert_eq!(codec.configuration().unwrap().resolution_in_dpi, 75);
}

fn fixed_resolution_flatbed() -> MemoryDevice {
    MemoryDevice::flatbed(FLATBED)
        .without_option("resolution")
        .with_option(
            OptionDescriptor::new(
                Some("resolution"),
                ValueKind::Fixed,
                4,
                OptionConstraint::WordList(vec![2, fix(75.0).raw(), fix(150.0).raw()]),
            ),
            Some(OptionValue::Fixed(fix(75.0))),
        )
}

#[test]
fn test_fixed_point_resolution_is_written_as_fixed_point() {
    let mut fixture = opened_device(fixed_resolution_flatbed());
    let mut configuration = codec(&mut fixture).configuration().unwrap();
    configuration.mode = "Gray".to_string();

    codec(&mut fixture).apply(&configuration).unwrap();
    assert_eq!(
        fixture.backend.option_value(FLATBED, "resolution"),
        Some(OptionValue::Fixed(fix(75.0)))
    );
    assert_eq!(fixture.backend.option_value(FLATBED, "mode"), Some(string_value("Gray")));

    configuration.resolution_in_dpi = 150;
    codec(&mut fixture).apply(&configuration).unwrap();
    assert_eq!(
        fixture.backend.option_value(FLATBED, "resolution"),
        Some(OptionValue::Fixed(fix(150.0)))
    );
    assert_eq!(codec(&mut fixture).configuration().unwrap().resolution_in_dpi, 150);
}

#[test]
fn test_integer_geometry_is_written_in_whole_millimetres() {
    let device = MemoryDevice::flatbed(FLATBED)
        .without_option("br-x")
        .with_option(
            OptionDescriptor::new(
                Some("br-x"),
                ValueKind::Int,
                4,
                OptionConstraint::Range {
                    min: 0,
                    max: 215,
                    quant: 1,
                },
            ),
            Some(OptionValue::Int(215)),
        );
    let mut fixture = opened_device(device);

    assert_eq!(codec(&mut fixture).capabilities().unwrap().max_x, 215.0);
    let mut configuration = codec(&mut fixture).configuration().unwrap();
    assert_eq!(configuration.to_x, 215.0);

    configuration.to_x = 100.4;
    codec(&mut fixture).apply(&configuration).unwrap();
    assert_eq!(
        fixture.backend.option_value(FLATBED, "br-x"),
        Some(OptionValue::Int(100))
    );
}

#[test]
fn test_geometry_without_range_is_unsupported() {
    let device = MemoryDevice::flatbed(FLATBED)
        .without_option("br-y")
        .with_option(
            OptionDescriptor::new(Some("br-y"), ValueKind::Fixed, 4, OptionConstraint::None),
            Some(OptionValue::Fixed(fix(297.0))),
        );
    let mut fixture = opened_device(device);

    match codec(&mut fixture).capabilities() {
        Err(ScanError::UnsupportedDevice { missing, .. }) => {
            assert_eq!(missing, vec!["br-y range"])
        }
        other => panic!("Expected UnsupportedDevice, got {:?}", other),
    }
}

#[test]
fn test_read_default_configuration() {
    let mut fixture = opened_flatbed();
    let configuration = codec(&mut fixture).configuration().unwrap();

    assert_eq!(configuration.from_x, 0.0);
    assert_eq!(configuration.from_y, 0.0);
    assert!((configuration.to_x - 215.9).abs() < 1e-4);
    assert_eq!(configuration.to_y, 297.0);
    assert_eq!(configuration.resolution_in_dpi, 150);
    assert_eq!(configuration.source, "Flatbed");
    assert_eq!(configuration.mode, "Color");
}

#[test]
fn test_write_then_read_back() {
    let mut fixture = opened_flatbed();
    let wanted = a5_gray_feeder();

    codec(&mut fixture).apply(&wanted).unwrap();
    assert_eq!(fixture.backend.stats().write_calls, 7);

    let read_back = codec(&mut fixture).configuration().unwrap();
    assert_eq!(read_back, wanted);
}

#[test]
fn test_geometry_is_written_as_fixed_point() {
    let mut fixture = opened_flatbed();
    codec(&mut fixture).apply(&a5_gray_feeder()).unwrap();

    assert_eq!(
        fixture.backend.option_value(FLATBED, "tl-y"),
        Some(OptionValue::Fixed(fix(20.0)))
    );
    assert_eq!(
        fixture.backend.option_value(FLATBED, "resolution"),
        Some(OptionValue::Int(300))
    );
}

#[test]
fn test_oversized_string_writes_nothing() {
    let mut fixture = opened_flatbed();
    let mut configuration = a5_gray_feeder();
    configuration.mode = "m".repeat(129);

    assert!(matches!(
        codec(&mut fixture).apply(&configuration),
        Err(ScanError::PreconditionViolation { .. })
    ));
    assert_eq!(fixture.backend.stats().write_calls, 0);
    assert_eq!(
        fixture.backend.option_value(FLATBED, "tl-x"),
        Some(OptionValue::Fixed(fix(0.0)))
    );
}

#[test]
fn test_write_failure_leaves_earlier_fields_applied() {
    let device = MemoryDevice::flatbed(FLATBED).failing_write("source", Status::Invalid);
    let mut fixture = opened_device(device);

    match codec(&mut fixture).apply(&a5_gray_feeder()) {
        Err(ScanError::Native { operation, .. }) => assert_eq!(operation, "set option source"),
        other => panic!("Expected native write error, got {:?}", other),
    }

    // Geometry and resolution go out before source; mode comes after.
    assert_eq!(
        fixture.backend.option_value(FLATBED, "br-y"),
        Some(OptionValue::Fixed(fix(230.0)))
    );
    assert_eq!(
        fixture.backend.option_value(FLATBED, "resolution"),
        Some(OptionValue::Int(300))
    );
    assert_eq!(
        fixture.backend.option_value(FLATBED, "mode"),
        Some(string_value("Color"))
    );
    assert_eq!(fixture.backend.stats().write_calls, 6);
}

#[test]
fn test_value_outside_constraint_is_a_native_error() {
    let mut fixture = opened_flatbed();
    let mut configuration = a5_gray_feeder();
    configuration.mode = "Lineart".to_string();

    assert!(matches!(
        codec(&mut fixture).apply(&configuration),
        Err(ScanError::Native { .. })
    ));
}

