//! Pluggable audio backend abstraction.
//!
//! The block never talks to a platform audio API directly - it consumes the
//! [`AudioBackend`] and [`BackendStream`] traits. The default implementation
//! wraps cpal; [`MockBackend`](mock::MockBackend) provides a deterministic
//! backend for tests and CI machines without audio hardware.
//!
//! Backend construction is the subsystem-acquisition point: one backend is
//! acquired per block and released unconditionally when the block is dropped.
//! Cross-instance initialization bookkeeping is the platform library's own
//! concern and is trusted here.

pub mod cpal_backend;
pub mod mock;

use std::time::Duration;

use crate::error::{AudioBlockError, BackendError};
use crate::format::StreamFormat;

/// Convenience alias for backend call results.
pub type BackendResult<T> = Result<T, BackendError>;

/// Direction of an audio stream relative to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDirection {
    /// Capture from a device (source block).
    Input,
    /// Playback to a device (sink block).
    Output,
}

/// Static description of one enumerable device.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Human-facing device name, as shown in the overlay.
    pub name: String,
    /// Name of the host API providing the device (ALSA, CoreAudio, WASAPI...).
    pub host_api: String,
    /// Default low-latency bound for capture.
    pub default_low_input_latency: Duration,
    /// Default high-latency bound for capture.
    pub default_high_input_latency: Duration,
    /// Default low-latency bound for playback.
    pub default_low_output_latency: Duration,
    /// Default high-latency bound for playback.
    pub default_high_output_latency: Duration,
}

impl DeviceDescriptor {
    /// Returns the `(low, high)` default latency bounds for a direction.
    #[must_use]
    pub fn latency_bounds(&self, direction: StreamDirection) -> (Duration, Duration) {
        match direction {
            StreamDirection::Input => (
                self.default_low_input_latency,
                self.default_high_input_latency,
            ),
            StreamDirection::Output => (
                self.default_low_output_latency,
                self.default_high_output_latency,
            ),
        }
    }
}

/// Parameters for a format-support query or stream open.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Resolved device index, in enumeration order.
    pub device: usize,
    /// Stream direction.
    pub direction: StreamDirection,
    /// Requested sample format and channel layout.
    pub format: StreamFormat,
    /// Requested sample rate in Hz.
    pub sample_rate: f64,
    /// Suggested latency, typically the average of the device's default
    /// low/high bounds for the direction.
    pub suggested_latency: Duration,
}

/// An open (not necessarily running) audio stream.
///
/// Streams are opened stopped, toggled with [`start`](BackendStream::start)
/// and [`stop`](BackendStream::stop), and closed exactly once - explicitly
/// via [`close`](BackendStream::close) on the block's teardown path, or
/// implicitly on drop.
///
/// No callback crosses this boundary: the external transport loop moves
/// samples through [`read_bytes`](BackendStream::read_bytes) and
/// [`write_bytes`](BackendStream::write_bytes).
pub trait BackendStream {
    /// Starts the stream. The error carries the backend's diagnostic text.
    fn start(&mut self) -> BackendResult<()>;

    /// Stops the stream without closing it.
    fn stop(&mut self) -> BackendResult<()>;

    /// Releases the stream's native resources.
    ///
    /// Called on the block's teardown path so a failure can be logged;
    /// dropping the stream afterwards is a no-op. Must be idempotent.
    fn close(&mut self) -> BackendResult<()>;

    /// Bytes per sample the backend actually negotiated.
    fn sample_size(&self) -> usize;

    /// Pulls captured bytes into `buf`, returning how many were written.
    ///
    /// Non-blocking; returns 0 when no data is pending.
    fn read_bytes(&mut self, buf: &mut [u8]) -> usize;

    /// Pushes playback bytes from `buf`, returning how many were accepted.
    ///
    /// Non-blocking; bytes beyond the backend's buffering capacity are
    /// rejected, not queued.
    fn write_bytes(&mut self, buf: &[u8]) -> usize;
}

/// The native audio subsystem consumed by a block.
///
/// All device indices refer to the backend's current enumeration order.
pub trait AudioBackend {
    /// Number of currently enumerable devices.
    fn device_count(&self) -> BackendResult<usize>;

    /// Descriptor for the device at `index`.
    fn device_descriptor(&self, index: usize) -> BackendResult<DeviceDescriptor>;

    /// Index of the default capture device, if one is configured.
    fn default_input_device(&self) -> Option<usize>;

    /// Index of the default playback device, if one is configured.
    fn default_output_device(&self) -> Option<usize>;

    /// Checks whether the requested format/rate/channel combination is
    /// supported, returning the backend's diagnostic text if not.
    fn supports_format(&self, request: &StreamRequest) -> BackendResult<()>;

    /// Opens a stream for the request. The stream is not started.
    fn open_stream(&self, request: &StreamRequest) -> BackendResult<Box<dyn BackendStream>>;
}

/// Acquires the default backend for this platform.
///
/// # Errors
///
/// Returns [`AudioBlockError::Subsystem`] if the native audio subsystem
/// cannot be initialized.
pub fn default_backend() -> Result<Box<dyn AudioBackend>, AudioBlockError> {
    let backend = cpal_backend::CpalBackend::new().map_err(|err| AudioBlockError::Subsystem {
        reason: err.to_string(),
    })?;
    Ok(Box::new(backend))
}
