//! Deterministic mock backend for testing without audio hardware.
//!
//! Tests configure a device list and failure injections up front, keep the
//! [`MockProbe`] handle, and assert against its atomic counters after
//! driving the block through the public API.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{
    AudioBackend, BackendResult, BackendStream, DeviceDescriptor, StreamRequest,
};
use crate::error::BackendError;

/// Observable state shared between a [`MockBackend`], its streams, and the
/// test that constructed them.
#[derive(Debug, Default)]
pub struct MockProbe {
    /// Number of streams opened so far.
    pub streams_opened: AtomicUsize,
    /// Number of streams closed so far.
    pub streams_closed: AtomicUsize,
    /// Whether the most recently opened stream is running.
    pub running: AtomicBool,
    /// Number of successful start calls.
    pub starts: AtomicUsize,
    /// Number of successful stop calls.
    pub stops: AtomicUsize,
}

impl MockProbe {
    /// Returns `true` if the last opened stream is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns how many streams have been opened.
    pub fn opened(&self) -> usize {
        self.streams_opened.load(Ordering::SeqCst)
    }

    /// Returns how many streams have been closed.
    pub fn closed(&self) -> usize {
        self.streams_closed.load(Ordering::SeqCst)
    }
}

/// A scripted audio backend.
///
/// Construct with [`MockBackend::with_devices`], then chain the builder
/// methods to set defaults and inject failures.
pub struct MockBackend {
    devices: Vec<String>,
    default_input: Option<usize>,
    default_output: Option<usize>,
    reject_format: Option<String>,
    fail_open: Option<String>,
    fail_start: bool,
    fail_stop: bool,
    fail_close: bool,
    negotiated_sample_size: Option<usize>,
    probe: Arc<MockProbe>,
}

impl MockBackend {
    /// Creates a backend enumerating the given device names, with the first
    /// device as both default input and default output.
    pub fn with_devices<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let devices: Vec<String> = names.into_iter().map(Into::into).collect();
        let default = if devices.is_empty() { None } else { Some(0) };
        Self {
            devices,
            default_input: default,
            default_output: default,
            reject_format: None,
            fail_open: None,
            fail_start: false,
            fail_stop: false,
            fail_close: false,
            negotiated_sample_size: None,
            probe: Arc::new(MockProbe::default()),
        }
    }

    /// Creates a backend with no devices at all.
    pub fn empty() -> Self {
        Self::with_devices(Vec::<String>::new())
    }

    /// Sets the default input device index (`None` for no default).
    #[must_use]
    pub fn default_input(mut self, index: Option<usize>) -> Self {
        self.default_input = index;
        self
    }

    /// Sets the default output device index (`None` for no default).
    #[must_use]
    pub fn default_output(mut self, index: Option<usize>) -> Self {
        self.default_output = index;
        self
    }

    /// Makes every format-support query fail with the given diagnostic.
    #[must_use]
    pub fn reject_formats(mut self, reason: impl Into<String>) -> Self {
        self.reject_format = Some(reason.into());
        self
    }

    /// Makes every stream open fail with the given diagnostic.
    #[must_use]
    pub fn fail_open(mut self, reason: impl Into<String>) -> Self {
        self.fail_open = Some(reason.into());
        self
    }

    /// Makes stream starts fail.
    #[must_use]
    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Makes stream stops fail.
    #[must_use]
    pub fn fail_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Makes stream closes fail (exercises the teardown logging path).
    #[must_use]
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Overrides the sample size streams report after negotiation.
    #[must_use]
    pub fn negotiated_sample_size(mut self, bytes: usize) -> Self {
        self.negotiated_sample_size = Some(bytes);
        self
    }

    /// Returns the shared probe for post-hoc assertions.
    pub fn probe(&self) -> Arc<MockProbe> {
        Arc::clone(&self.probe)
    }
}

impl AudioBackend for MockBackend {
    fn device_count(&self) -> BackendResult<usize> {
        Ok(self.devices.len())
    }

    fn device_descriptor(&self, index: usize) -> BackendResult<DeviceDescriptor> {
        let name = self
            .devices
            .get(index)
            .ok_or_else(|| BackendError::new(format!("device index {index} not enumerable")))?;
        Ok(DeviceDescriptor {
            name: name.clone(),
            host_api: "mock".to_string(),
            default_low_input_latency: Duration::from_millis(1),
            default_high_input_latency: Duration::from_millis(10),
            default_low_output_latency: Duration::from_millis(2),
            default_high_output_latency: Duration::from_millis(20),
        })
    }

    fn default_input_device(&self) -> Option<usize> {
        self.default_input
    }

    fn default_output_device(&self) -> Option<usize> {
        self.default_output
    }

    fn supports_format(&self, _request: &StreamRequest) -> BackendResult<()> {
        match &self.reject_format {
            Some(reason) => Err(BackendError::new(reason.clone())),
            None => Ok(()),
        }
    }

    fn open_stream(&self, request: &StreamRequest) -> BackendResult<Box<dyn BackendStream>> {
        if let Some(reason) = &self.fail_open {
            return Err(BackendError::new(reason.clone()));
        }
        self.probe.streams_opened.fetch_add(1, Ordering::SeqCst);
        self.probe.running.store(false, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            sample_size: self
                .negotiated_sample_size
                .unwrap_or_else(|| request.format.sample_type.size_bytes()),
            fail_start: self.fail_start,
            fail_stop: self.fail_stop,
            fail_close: self.fail_close,
            closed: false,
            buffer: VecDeque::new(),
            probe: Arc::clone(&self.probe),
        }))
    }
}

/// Stream produced by [`MockBackend`].
///
/// Bytes written with `write_bytes` loop back through `read_bytes` so
/// transport tests can run without a device.
struct MockStream {
    sample_size: usize,
    fail_start: bool,
    fail_stop: bool,
    fail_close: bool,
    closed: bool,
    buffer: VecDeque<u8>,
    probe: Arc<MockProbe>,
}

impl BackendStream for MockStream {
    fn start(&mut self) -> BackendResult<()> {
        if self.fail_start {
            return Err(BackendError::new("injected start failure"));
        }
        self.probe.running.store(true, Ordering::SeqCst);
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        if self.fail_stop {
            return Err(BackendError::new("injected stop failure"));
        }
        self.probe.running.store(false, Ordering::SeqCst);
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> BackendResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.probe.running.store(false, Ordering::SeqCst);
        self.probe.streams_closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(BackendError::new("injected close failure"));
        }
        Ok(())
    }

    fn sample_size(&self) -> usize {
        self.sample_size
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.buffer.len());
        for slot in buf.iter_mut().take(count) {
            // Length checked above, so the queue cannot be empty here.
            if let Some(byte) = self.buffer.pop_front() {
                *slot = byte;
            }
        }
        count
    }

    fn write_bytes(&mut self, buf: &[u8]) -> usize {
        self.buffer.extend(buf.iter().copied());
        buf.len()
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        // Count implicit closes too, but never surface the injected failure.
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StreamDirection;
    use crate::format::{ChannelMode, SampleType, StreamFormat};

    fn request() -> StreamRequest {
        StreamRequest {
            device: 0,
            direction: StreamDirection::Output,
            format: StreamFormat::new(SampleType::I16, 2, ChannelMode::Interleaved),
            sample_rate: 48000.0,
            suggested_latency: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_device_list() {
        let backend = MockBackend::with_devices(["a", "b", "c"]);
        assert_eq!(backend.device_count().unwrap(), 3);
        assert_eq!(backend.device_descriptor(1).unwrap().name, "b");
        assert!(backend.device_descriptor(3).is_err());
    }

    #[test]
    fn test_stream_lifecycle_via_probe() {
        let backend = MockBackend::with_devices(["a"]);
        let probe = backend.probe();

        let mut stream = backend.open_stream(&request()).unwrap();
        assert_eq!(probe.opened(), 1);
        assert!(!probe.is_running());

        stream.start().unwrap();
        assert!(probe.is_running());
        stream.stop().unwrap();
        assert!(!probe.is_running());

        stream.close().unwrap();
        assert_eq!(probe.closed(), 1);
        // close is idempotent
        stream.close().unwrap();
        drop(stream);
        assert_eq!(probe.closed(), 1);
    }

    #[test]
    fn test_loopback_bytes() {
        let backend = MockBackend::with_devices(["a"]);
        let mut stream = backend.open_stream(&request()).unwrap();

        assert_eq!(stream.write_bytes(&[1, 2, 3, 4]), 4);
        let mut out = [0u8; 8];
        assert_eq!(stream.read_bytes(&mut out), 4);
        assert_eq!(&out[..4], &[1, 2, 3, 4]);
        assert_eq!(stream.read_bytes(&mut out), 0);
    }

    #[test]
    fn test_negotiated_size_override() {
        let backend = MockBackend::with_devices(["a"]);
        let stream = backend.open_stream(&request()).unwrap();
        assert_eq!(stream.sample_size(), 2);

        let backend = MockBackend::with_devices(["a"]).negotiated_sample_size(7);
        let stream = backend.open_stream(&request()).unwrap();
        assert_eq!(stream.sample_size(), 7);
    }
}
