//! Acquisition through the public service API

use carbonpaper::backend::{FrameParameters, MemoryBackend, MemoryDevice};
use carbonpaper::scanner::{ScanService, ScanSettings};

use crate::common::{small_area, FLATBED};

fn scan_with_chunk_size(chunk_size: usize) -> Vec<u8> {
    let backend = MemoryBackend::new().with_device(MemoryDevice::flatbed(FLATBED));
    let settings = ScanSettings::default().with_chunk_size(chunk_size);
    let mut service = ScanService::with_settings(backend, settings).unwrap();
    service.update_configuration(None, &small_area()).unwrap();
    service.scan_to_buffer(None).unwrap().unwrap().pixels
}

#[test]
fn test_png_matches_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.png");
    let backend = MemoryBackend::new().with_device(MemoryDevice::flatbed(FLATBED));
    let mut service = ScanService::new(backend).unwrap();
    service.update_configuration(None, &small_area()).unwrap();

    let buffer = service.scan_to_buffer(None).unwrap().unwrap();
    assert!(service.scan_to_file(None, &path).unwrap());

    let decoded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (buffer.width, buffer.height));
    assert_eq!(&decoded.get_pixel(0, 0).0[..], buffer.pixel(0, 0).unwrap());
    assert_eq!(&decoded.get_pixel(74, 74).0[..], buffer.pixel(74, 74).unwrap());
}

#[test]
fn test_chunk_size_does_not_change_the_image() {
    let whole = scan_with_chunk_size(8 * 1024 * 1024);
    assert_eq!(whole.len(), 75 * 75 * 3);
    assert_eq!(scan_with_chunk_size(7), whole);
    assert_eq!(scan_with_chunk_size(1), whole);
}

#[test]
fn test_empty_scan_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.png");
    let device = MemoryDevice::flatbed(FLATBED).with_frame(FrameParameters::rgb(4, 4), vec![]);
    let backend = MemoryBackend::new().with_device(device);
    let mut service = ScanService::new(backend.clone()).unwrap();

    assert!(!service.scan_to_file(None, &path).unwrap());
    assert!(!path.exists());
    assert_eq!(backend.stats().cancel_calls, 1);
}
