//! Integration tests for the audio device block.
//!
//! All tests drive the public API over the mock backend, so they run
//! without audio hardware.

use std::time::Duration;

use audio_block::backend::mock::MockBackend;
use audio_block::{
    AudioBlockError, AudioDeviceBlock, BlockControl, BlockLifecycle, ChannelMode, ReportMode,
    SampleType,
};

fn block_over(backend: MockBackend, is_sink: bool) -> AudioDeviceBlock {
    AudioDeviceBlock::with_backend(
        Box::new(backend),
        if is_sink { "test-sink" } else { "test-source" },
        is_sink,
        SampleType::F32,
        2,
        ChannelMode::Interleaved,
    )
}

#[test]
fn test_empty_name_selects_default_input_for_source() {
    let backend = MockBackend::with_devices(["in", "out"])
        .default_input(Some(0))
        .default_output(Some(1));
    let mut block = block_over(backend, false);

    block.setup_device("").unwrap();
    assert_eq!(block.device_index(), Some(0));
}

#[test]
fn test_empty_name_selects_default_output_for_sink() {
    let backend = MockBackend::with_devices(["in", "out"])
        .default_input(Some(0))
        .default_output(Some(1));
    let mut block = block_over(backend, true);

    block.setup_device("").unwrap();
    assert_eq!(block.device_index(), Some(1));
}

#[test]
fn test_empty_name_without_default_device() {
    let backend = MockBackend::with_devices(["a"]).default_input(None);
    let mut block = block_over(backend, false);

    let err = block.setup_device("").unwrap_err();
    assert!(matches!(err, AudioBlockError::NoDefaultDevice));
}

#[test]
fn test_numeric_name_selects_index() {
    let mut block = block_over(MockBackend::with_devices(["a", "b", "c"]), false);

    block.setup_device("2").unwrap();
    assert_eq!(block.device_index(), Some(2));
}

#[test]
fn test_numeric_name_at_device_count_is_out_of_range() {
    let mut block = block_over(MockBackend::with_devices(["a", "b", "c"]), false);

    let err = block.setup_device("3").unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::DeviceIndexOutOfRange { ref index, count: 3 } if index == "3"
    ));
}

#[test]
fn test_huge_numeric_name_is_out_of_range() {
    let mut block = block_over(MockBackend::with_devices(["a"]), false);

    let err = block.setup_device("99999999999999999999999").unwrap_err();
    assert!(matches!(err, AudioBlockError::DeviceIndexOutOfRange { .. }));
}

#[test]
fn test_name_match_first_wins_in_enumeration_order() {
    let mut block = block_over(MockBackend::with_devices(["x", "dup", "dup"]), false);

    block.setup_device("dup").unwrap();
    assert_eq!(block.device_index(), Some(1));
}

#[test]
fn test_unmatched_name_is_not_found() {
    let mut block = block_over(MockBackend::with_devices(["a", "b"]), false);

    let err = block.setup_device("NoSuchDevice").unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::DeviceNotFound { ref name } if name == "NoSuchDevice"
    ));
}

#[test]
fn test_zero_devices_fails_regardless_of_input() {
    for selector in ["", "0", "anything"] {
        let mut block = block_over(MockBackend::empty(), false);
        let err = block.setup_device(selector).unwrap_err();
        assert!(matches!(err, AudioBlockError::NoDevicesAvailable));
    }
}

#[test]
fn test_failed_selection_keeps_previous_device() {
    let mut block = block_over(MockBackend::with_devices(["a", "b"]), false);

    block.setup_device("b").unwrap();
    assert!(block.setup_device("NoSuchDevice").is_err());
    assert_eq!(block.device_index(), Some(1));
}

#[test]
fn test_report_mode_is_validated_before_mutation() {
    let mut block = block_over(MockBackend::with_devices(["a"]), false);

    block.set_report_mode("LOGGER").unwrap();
    assert_eq!(block.report_mode(), ReportMode::Logger);

    let err = block.set_report_mode("VERBOSE").unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::UnknownReportMode { ref mode } if mode == "VERBOSE"
    ));
    assert_eq!(block.report_mode(), ReportMode::Logger);
}

#[test]
fn test_report_mode_idempotent_and_exclusive() {
    let mut block = block_over(MockBackend::with_devices(["a"]), false);

    block.set_report_mode("STDERROR").unwrap();
    block.set_report_mode("STDERROR").unwrap();
    assert_eq!(block.report_mode(), ReportMode::Stderror);

    block.set_report_mode("DISABLED").unwrap();
    assert_eq!(block.report_mode(), ReportMode::Disabled);

    // Reporting in any mode must not panic
    block.report_runtime_error("underflow detected");
}

#[test]
fn test_overlay_has_one_option_per_device_plus_sentinel() {
    let block = block_over(MockBackend::with_devices(["a", "b", "c"]), false);

    let doc: serde_json::Value = serde_json::from_str(&block.overlay()).unwrap();
    let options = doc["params"][0]["options"].as_array().unwrap();
    assert_eq!(options.len(), 4);
    assert_eq!(options[0]["name"], "Default Device");
    assert_eq!(options[0]["value"], "\"\"");
    assert_eq!(options[2]["name"], "b");
    assert_eq!(options[2]["value"], "\"b\"");
}

#[test]
fn test_overlay_with_no_devices_still_offers_sentinel() {
    let block = block_over(MockBackend::empty(), false);

    let doc: serde_json::Value = serde_json::from_str(&block.overlay()).unwrap();
    let options = doc["params"][0]["options"].as_array().unwrap();
    assert_eq!(options.len(), 1);
}

#[test]
fn test_backoff_round_trip() {
    let mut block = block_over(MockBackend::with_devices(["a"]), false);

    block.set_backoff_time(1234);
    assert_eq!(block.backoff(), Duration::from_millis(1234));
}

#[test]
fn test_setup_stream_requires_device() {
    let mut block = block_over(MockBackend::with_devices(["a"]), false);

    let err = block.setup_stream(48000.0).unwrap_err();
    assert!(matches!(err, AudioBlockError::NoDeviceSelected));
}

#[test]
fn test_unsupported_format_leaves_state_device_selected() {
    let backend = MockBackend::with_devices(["a"]).reject_formats("48000 Hz not supported");
    let probe = backend.probe();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();

    let err = block.setup_stream(48000.0).unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::UnsupportedFormat { ref reason } if reason.contains("48000")
    ));

    // No stream was opened, and the device selection is intact
    assert_eq!(probe.opened(), 0);
    assert_eq!(block.device_index(), Some(0));
    let err = block.activate().unwrap_err();
    assert!(matches!(err, AudioBlockError::StreamNotOpen));
}

#[test]
fn test_open_failure_carries_backend_diagnostic() {
    let backend = MockBackend::with_devices(["a"]).fail_open("device busy");
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();

    let err = block.setup_stream(48000.0).unwrap_err();
    assert!(matches!(err, AudioBlockError::Backend(_)));
    assert!(err.to_string().contains("device busy"));
}

#[test]
fn test_sample_size_mismatch_closes_stream() {
    // Block requests f32 (4 bytes), backend negotiates 2
    let backend = MockBackend::with_devices(["a"]).negotiated_sample_size(2);
    let probe = backend.probe();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();

    let err = block.setup_stream(48000.0).unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::SampleSizeMismatch {
            requested: 4,
            negotiated: 2,
        }
    ));
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 1);
}

#[test]
fn test_second_setup_stream_is_rejected() {
    let backend = MockBackend::with_devices(["a"]);
    let probe = backend.probe();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();
    block.setup_stream(48000.0).unwrap();

    let err = block.setup_stream(44100.0).unwrap_err();
    assert!(matches!(err, AudioBlockError::StreamAlreadyOpen));
    assert_eq!(probe.opened(), 1);
}

#[test]
fn test_activate_starts_and_arms_start_label() {
    let backend = MockBackend::with_devices(["a"]);
    let probe = backend.probe();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();
    block.setup_stream(48000.0).unwrap();

    assert!(block.ready_time().is_none());
    block.activate().unwrap();
    assert!(probe.is_running());
    assert!(block.ready_time().is_some());
    assert!(block.take_start_label());
    assert!(!block.take_start_label());
}

#[test]
fn test_deactivate_stops_but_does_not_close() {
    let backend = MockBackend::with_devices(["a"]);
    let probe = backend.probe();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();
    block.setup_stream(48000.0).unwrap();

    block.activate().unwrap();
    block.deactivate().unwrap();
    assert!(!probe.is_running());
    assert_eq!(probe.closed(), 0);

    // A second activation without a new setup_stream succeeds
    block.activate().unwrap();
    assert!(probe.is_running());
    assert!(block.take_start_label());
}

#[test]
fn test_start_failure_carries_diagnostic() {
    let backend = MockBackend::with_devices(["a"]).fail_start();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();
    block.setup_stream(48000.0).unwrap();

    let err = block.activate().unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::StreamStart { ref reason } if reason.contains("injected start failure")
    ));
}

#[test]
fn test_stop_failure_carries_diagnostic() {
    let backend = MockBackend::with_devices(["a"]).fail_stop();
    let mut block = block_over(backend, false);
    block.setup_device("a").unwrap();
    block.setup_stream(48000.0).unwrap();
    block.activate().unwrap();

    let err = block.deactivate().unwrap_err();
    assert!(matches!(
        err,
        AudioBlockError::StreamStop { ref reason } if reason.contains("injected stop failure")
    ));
}

#[test]
fn test_drop_never_raises_even_when_close_fails() {
    let backend = MockBackend::with_devices(["a"]).fail_close();
    let probe = backend.probe();
    {
        let mut block = block_over(backend, false);
        block.setup_device("a").unwrap();
        block.setup_stream(48000.0).unwrap();
        block.activate().unwrap();
        // Dropped while running, with a close failure injected
    }
    assert_eq!(probe.closed(), 1);
}

#[test]
fn test_transport_seam_loops_bytes_through_stream() {
    let mut block = block_over(MockBackend::with_devices(["a"]), true);
    block.setup_device("a").unwrap();
    block.setup_stream(48000.0).unwrap();
    block.activate().unwrap();

    let stream = block.stream_mut().unwrap();
    assert_eq!(stream.sample_size(), 4);
    assert_eq!(stream.write_bytes(&[9, 8, 7, 6]), 4);
    let mut out = [0u8; 4];
    assert_eq!(stream.read_bytes(&mut out), 4);
    assert_eq!(out, [9, 8, 7, 6]);
}
