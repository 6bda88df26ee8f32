//! The audio device block.
//!
//! `AudioDeviceBlock` owns the configuration state for one capture or
//! playback endpoint and forwards setup and lifecycle calls into the audio
//! backend. It performs no threading of its own - the host runtime
//! serializes calls into a block, and the external transport loop moves
//! samples through the stream seam between `activate` and `deactivate`.

use std::time::{Duration, Instant};

use crate::backend::{
    default_backend, AudioBackend, BackendStream, StreamDirection, StreamRequest,
};
use crate::control::{BlockControl, BlockLifecycle};
use crate::error::AudioBlockError;
use crate::format::{ChannelMode, SampleType, StreamFormat};
use crate::overlay::device_overlay;
use crate::report::ReportMode;

/// A block binding the host runtime to one audio device endpoint.
///
/// Setup progresses `setup_device` → `setup_stream` → `activate`;
/// `deactivate` stops the stream without closing it, and dropping the block
/// closes the stream and releases the backend unconditionally.
///
/// # Example
///
/// ```ignore
/// use audio_block::{AudioDeviceBlock, BlockControl, BlockLifecycle, ChannelMode, SampleType};
///
/// let mut block = AudioDeviceBlock::new(
///     "speaker-out", true, SampleType::F32, 2, ChannelMode::Interleaved)?;
/// block.setup_device("")?;        // default output device
/// block.setup_stream(48000.0)?;
/// block.activate()?;
/// // ... transport loop runs ...
/// block.deactivate()?;
/// ```
pub struct AudioDeviceBlock {
    name: String,
    is_sink: bool,
    format: StreamFormat,
    backend: Box<dyn AudioBackend>,
    device: Option<usize>,
    stream: Option<Box<dyn BackendStream>>,
    report_logger: bool,
    report_stderror: bool,
    backoff: Duration,
    ready_time: Option<Instant>,
    send_label: bool,
}

impl AudioDeviceBlock {
    /// Creates a block over the platform's default backend.
    ///
    /// `is_sink` selects playback (true) or capture (false); the sample
    /// type, channel count, and layout are fixed for the block's lifetime.
    ///
    /// # Errors
    ///
    /// [`AudioBlockError::Subsystem`] if the native audio subsystem cannot
    /// be acquired.
    pub fn new(
        name: impl Into<String>,
        is_sink: bool,
        sample_type: SampleType,
        channels: u16,
        mode: ChannelMode,
    ) -> Result<Self, AudioBlockError> {
        Ok(Self::with_backend(
            default_backend()?,
            name,
            is_sink,
            sample_type,
            channels,
            mode,
        ))
    }

    /// Creates a block over an explicit backend.
    pub fn with_backend(
        backend: Box<dyn AudioBackend>,
        name: impl Into<String>,
        is_sink: bool,
        sample_type: SampleType,
        channels: u16,
        mode: ChannelMode,
    ) -> Self {
        Self {
            name: name.into(),
            is_sink,
            format: StreamFormat::new(sample_type, channels, mode),
            backend,
            device: None,
            stream: None,
            report_logger: false,
            report_stderror: true,
            backoff: Duration::ZERO,
            ready_time: None,
            send_label: false,
        }
    }

    /// The block's name, used for logging and error tagging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for playback blocks, `false` for capture blocks.
    pub fn is_sink(&self) -> bool {
        self.is_sink
    }

    /// The immutable stream format chosen at construction.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// The resolved device index, if `setup_device` has succeeded.
    pub fn device_index(&self) -> Option<usize> {
        self.device
    }

    /// The currently active report mode.
    pub fn report_mode(&self) -> ReportMode {
        if self.report_logger {
            ReportMode::Logger
        } else if self.report_stderror {
            ReportMode::Stderror
        } else {
            ReportMode::Disabled
        }
    }

    /// The configured backoff interval.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// The instant of the most recent activation, used by the transport's
    /// backoff logic to decide when the stream may resume after a stall.
    pub fn ready_time(&self) -> Option<Instant> {
        self.ready_time
    }

    /// Returns `true` exactly once after each activation, telling the
    /// transport to attach a start-of-stream label to the next sample.
    pub fn take_start_label(&mut self) -> bool {
        std::mem::take(&mut self.send_label)
    }

    /// The open stream's pull/push seam for the transport loop, if any.
    pub fn stream_mut(&mut self) -> Option<&mut (dyn BackendStream + 'static)> {
        self.stream.as_deref_mut()
    }

    /// Routes a downstream runtime condition (underrun, overrun) according
    /// to the report mode.
    pub fn report_runtime_error(&self, what: &str) {
        if self.report_logger {
            tracing::error!(block = %self.name, "{what}");
        } else if self.report_stderror {
            eprintln!("{}: {what}", self.name);
        }
    }

    fn direction(&self) -> StreamDirection {
        if self.is_sink {
            StreamDirection::Output
        } else {
            StreamDirection::Input
        }
    }

    fn device_names(&self) -> Vec<String> {
        let count = self.backend.device_count().unwrap_or(0);
        (0..count)
            .filter_map(|index| {
                self.backend
                    .device_descriptor(index)
                    .ok()
                    .map(|descriptor| descriptor.name)
            })
            .collect()
    }
}

impl BlockControl for AudioDeviceBlock {
    fn overlay(&self) -> String {
        device_overlay(&self.device_names())
    }

    fn setup_device(&mut self, device_name: &str) -> Result<(), AudioBlockError> {
        let count = self.backend.device_count()?;
        if count == 0 {
            return Err(AudioBlockError::NoDevicesAvailable);
        }

        // Empty name selects the direction's default device
        if device_name.is_empty() {
            let default = if self.is_sink {
                self.backend.default_output_device()
            } else {
                self.backend.default_input_device()
            };
            self.device = Some(default.ok_or(AudioBlockError::NoDefaultDevice)?);
            return Ok(());
        }

        // All-digit name is a direct index
        if device_name.chars().all(|c| c.is_ascii_digit()) {
            let index = device_name
                .parse::<usize>()
                .ok()
                .filter(|&index| index < count)
                .ok_or_else(|| AudioBlockError::DeviceIndexOutOfRange {
                    index: device_name.to_string(),
                    count,
                })?;
            self.device = Some(index);
            return Ok(());
        }

        // Otherwise the first exact name match, in enumeration order
        for index in 0..count {
            let Ok(descriptor) = self.backend.device_descriptor(index) else {
                continue;
            };
            if descriptor.name == device_name {
                self.device = Some(index);
                return Ok(());
            }
        }

        Err(AudioBlockError::DeviceNotFound {
            name: device_name.to_string(),
        })
    }

    fn setup_stream(&mut self, sample_rate: f64) -> Result<(), AudioBlockError> {
        if self.stream.is_some() {
            return Err(AudioBlockError::StreamAlreadyOpen);
        }
        let device = self.device.ok_or(AudioBlockError::NoDeviceSelected)?;

        let descriptor = self.backend.device_descriptor(device)?;
        tracing::info!(
            block = %self.name,
            device = %descriptor.name,
            host_api = %descriptor.host_api,
            "using audio device"
        );

        let (low, high) = descriptor.latency_bounds(self.direction());
        let request = StreamRequest {
            device,
            direction: self.direction(),
            format: self.format,
            sample_rate,
            suggested_latency: (low + high) / 2,
        };

        self.backend
            .supports_format(&request)
            .map_err(|err| AudioBlockError::UnsupportedFormat {
                reason: err.to_string(),
            })?;

        let stream = self.backend.open_stream(&request)?;

        let requested = self.format.sample_type.size_bytes();
        let negotiated = stream.sample_size();
        if negotiated != requested {
            // The stream drops (and closes) here, leaving no handle assigned
            return Err(AudioBlockError::SampleSizeMismatch {
                requested,
                negotiated,
            });
        }

        self.stream = Some(stream);
        Ok(())
    }

    fn set_report_mode(&mut self, mode: &str) -> Result<(), AudioBlockError> {
        // Parse first so a rejected mode leaves the previous flags intact
        let mode: ReportMode = mode.parse()?;
        self.report_logger = mode == ReportMode::Logger;
        self.report_stderror = mode == ReportMode::Stderror;
        Ok(())
    }

    fn set_backoff_time(&mut self, milliseconds: i64) {
        self.backoff = Duration::from_millis(milliseconds.max(0) as u64);
    }
}

impl BlockLifecycle for AudioDeviceBlock {
    fn activate(&mut self) -> Result<(), AudioBlockError> {
        self.ready_time = Some(Instant::now());
        let stream = self.stream.as_mut().ok_or(AudioBlockError::StreamNotOpen)?;
        stream
            .start()
            .map_err(|err| AudioBlockError::StreamStart {
                reason: err.to_string(),
            })?;
        self.send_label = true;
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), AudioBlockError> {
        let stream = self.stream.as_mut().ok_or(AudioBlockError::StreamNotOpen)?;
        stream.stop().map_err(|err| AudioBlockError::StreamStop {
            reason: err.to_string(),
        })
    }
}

impl Drop for AudioDeviceBlock {
    fn drop(&mut self) {
        // Teardown is unconditional: close failures are logged, never raised.
        // The backend itself is released when the box drops after this.
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.close() {
                tracing::error!(block = %self.name, error = %err, "failed to close audio stream");
            }
        }
    }
}
