//! cpal implementation of the backend traits.
//!
//! Device indices follow cpal's enumeration order. Streams bridge cpal's
//! real-time callback to a lock-free byte ring so the block side stays
//! pull/push: capture callbacks push sample bytes into the ring, playback
//! callbacks pop them, and the block's transport reads/writes the other end.
//! The callback never blocks; a full ring drops capture bytes and an empty
//! ring plays equilibrium (silence).

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, SizedSample, SupportedBufferSize};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::backend::{
    AudioBackend, BackendResult, BackendStream, DeviceDescriptor, StreamDirection, StreamRequest,
};
use crate::error::BackendError;
use crate::format::SampleType;

/// Backend over the platform's default cpal host.
pub struct CpalBackend {
    host: cpal::Host,
}

impl CpalBackend {
    /// Acquires the default cpal host.
    pub fn new() -> BackendResult<Self> {
        Ok(Self {
            host: cpal::default_host(),
        })
    }

    /// Builds a backend over a specific cpal host.
    pub fn with_host(host: cpal::Host) -> Self {
        Self { host }
    }

    fn nth_device(&self, index: usize) -> BackendResult<cpal::Device> {
        let mut devices = self.host.devices().map_err(BackendError::new)?;
        devices
            .nth(index)
            .ok_or_else(|| BackendError::new(format!("device index {index} not enumerable")))
    }

    fn default_device_index(&self, device: Option<cpal::Device>) -> Option<usize> {
        let wanted = device?.name().ok()?;
        let devices = self.host.devices().ok()?;
        devices.enumerate().find_map(|(index, candidate)| {
            let name = candidate.name().ok()?;
            (name == wanted).then_some(index)
        })
    }
}

/// Derives `(low, high)` latency bounds from a config's buffer-size range.
fn latency_bounds(config: &cpal::SupportedStreamConfig) -> (Duration, Duration) {
    let rate = f64::from(config.sample_rate().0.max(1));
    match config.buffer_size() {
        SupportedBufferSize::Range { min, max } => (
            Duration::from_secs_f64(f64::from(*min) / rate),
            Duration::from_secs_f64(f64::from(*max) / rate),
        ),
        SupportedBufferSize::Unknown => (Duration::ZERO, Duration::ZERO),
    }
}

fn cpal_sample_format(sample_type: SampleType) -> SampleFormat {
    match sample_type {
        SampleType::F32 => SampleFormat::F32,
        SampleType::I32 => SampleFormat::I32,
        SampleType::I16 => SampleFormat::I16,
        SampleType::I8 => SampleFormat::I8,
        SampleType::U8 => SampleFormat::U8,
    }
}

impl AudioBackend for CpalBackend {
    fn device_count(&self) -> BackendResult<usize> {
        Ok(self.host.devices().map_err(BackendError::new)?.count())
    }

    fn device_descriptor(&self, index: usize) -> BackendResult<DeviceDescriptor> {
        let device = self.nth_device(index)?;
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let (input_low, input_high) = device
            .default_input_config()
            .map(|config| latency_bounds(&config))
            .unwrap_or((Duration::ZERO, Duration::ZERO));
        let (output_low, output_high) = device
            .default_output_config()
            .map(|config| latency_bounds(&config))
            .unwrap_or((Duration::ZERO, Duration::ZERO));

        Ok(DeviceDescriptor {
            name,
            host_api: self.host.id().name().to_string(),
            default_low_input_latency: input_low,
            default_high_input_latency: input_high,
            default_low_output_latency: output_low,
            default_high_output_latency: output_high,
        })
    }

    fn default_input_device(&self) -> Option<usize> {
        self.default_device_index(self.host.default_input_device())
    }

    fn default_output_device(&self) -> Option<usize> {
        self.default_device_index(self.host.default_output_device())
    }

    fn supports_format(&self, request: &StreamRequest) -> BackendResult<()> {
        let device = self.nth_device(request.device)?;
        let wanted = cpal_sample_format(request.format.sample_type);

        let ranges: Vec<cpal::SupportedStreamConfigRange> = match request.direction {
            StreamDirection::Input => device
                .supported_input_configs()
                .map_err(BackendError::new)?
                .collect(),
            StreamDirection::Output => device
                .supported_output_configs()
                .map_err(BackendError::new)?
                .collect(),
        };

        let supported = ranges.iter().any(|range| {
            range.channels() == request.format.channels
                && range.sample_format() == wanted
                && f64::from(range.min_sample_rate().0) <= request.sample_rate
                && request.sample_rate <= f64::from(range.max_sample_rate().0)
        });

        if supported {
            Ok(())
        } else {
            Err(BackendError::new(format!(
                "{}ch {:?} at {} Hz not supported by device {}",
                request.format.channels, wanted, request.sample_rate, request.device
            )))
        }
    }

    fn open_stream(&self, request: &StreamRequest) -> BackendResult<Box<dyn BackendStream>> {
        let device = self.nth_device(request.device)?;
        let rate = request.sample_rate.round() as u32;
        let config = cpal::StreamConfig {
            channels: request.format.channels,
            sample_rate: SampleRate(rate),
            buffer_size: BufferSize::Default,
        };

        // Ring sized from the suggested latency, floored at one second so a
        // slow transport loop has headroom before bytes drop.
        let latency_frames = (request.suggested_latency.as_secs_f64() * f64::from(rate)) as usize;
        let capacity_frames = (latency_frames * 4).max(rate as usize).max(1);
        let ring = HeapRb::<u8>::new(capacity_frames * request.format.frame_size().max(1));
        let (producer, consumer) = ring.split();

        let sample_size = request.format.sample_type.size_bytes();

        match request.direction {
            StreamDirection::Input => {
                let stream = match request.format.sample_type {
                    SampleType::F32 => build_input::<f32>(&device, &config, producer),
                    SampleType::I32 => build_input::<i32>(&device, &config, producer),
                    SampleType::I16 => build_input::<i16>(&device, &config, producer),
                    SampleType::I8 => build_input::<i8>(&device, &config, producer),
                    SampleType::U8 => build_input::<u8>(&device, &config, producer),
                }?;
                Ok(Box::new(CpalStream {
                    stream: Some(stream),
                    end: RingEnd::Capture(consumer),
                    sample_size,
                }))
            }
            StreamDirection::Output => {
                let stream = match request.format.sample_type {
                    SampleType::F32 => build_output::<f32>(&device, &config, consumer),
                    SampleType::I32 => build_output::<i32>(&device, &config, consumer),
                    SampleType::I16 => build_output::<i16>(&device, &config, consumer),
                    SampleType::I8 => build_output::<i8>(&device, &config, consumer),
                    SampleType::U8 => build_output::<u8>(&device, &config, consumer),
                }?;
                Ok(Box::new(CpalStream {
                    stream: Some(stream),
                    end: RingEnd::Playback(producer),
                    sample_size,
                }))
            }
        }
    }
}

/// Sample types the byte ring can carry.
trait TransportSample: SizedSample + Send + 'static {
    /// Size of one sample in bytes.
    const BYTES: usize;

    /// Writes the sample's little-endian bytes into `out`.
    fn store(self, out: &mut [u8]);

    /// Reads a sample back from little-endian bytes.
    fn load(bytes: &[u8]) -> Self;
}

macro_rules! impl_transport_sample {
    ($ty:ty, $bytes:expr) => {
        impl TransportSample for $ty {
            const BYTES: usize = $bytes;

            fn store(self, out: &mut [u8]) {
                out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
            }

            fn load(bytes: &[u8]) -> Self {
                let mut raw = [0u8; $bytes];
                raw.copy_from_slice(&bytes[..Self::BYTES]);
                Self::from_le_bytes(raw)
            }
        }
    };
}

impl_transport_sample!(f32, 4);
impl_transport_sample!(i32, 4);
impl_transport_sample!(i16, 2);
impl_transport_sample!(i8, 1);
impl_transport_sample!(u8, 1);

fn build_input<T: TransportSample>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: HeapProd<u8>,
) -> BackendResult<cpal::Stream> {
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut scratch = [0u8; 8];
                for &sample in data {
                    sample.store(&mut scratch[..T::BYTES]);
                    // Non-blocking push - drops bytes if the ring is full
                    let _ = producer.push_slice(&scratch[..T::BYTES]);
                }
            },
            |err| {
                tracing::error!("audio stream error: {}", err);
            },
            None,
        )
        .map_err(BackendError::new)
}

fn build_output<T: TransportSample>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut consumer: HeapCons<u8>,
) -> BackendResult<cpal::Stream> {
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut scratch = [0u8; 8];
                for slot in data.iter_mut() {
                    *slot = if consumer.pop_slice(&mut scratch[..T::BYTES]) == T::BYTES {
                        T::load(&scratch[..T::BYTES])
                    } else {
                        T::EQUILIBRIUM
                    };
                }
            },
            |err| {
                tracing::error!("audio stream error: {}", err);
            },
            None,
        )
        .map_err(BackendError::new)
}

/// The block-facing end of the callback ring.
enum RingEnd {
    /// Capture stream: the block pulls bytes the callback pushed.
    Capture(HeapCons<u8>),
    /// Playback stream: the block pushes bytes the callback pulls.
    Playback(HeapProd<u8>),
}

/// An open cpal stream plus its ring end.
///
/// `close` releases the cpal stream; the ring end survives so a transport
/// loop holding buffered bytes can still drain them.
struct CpalStream {
    stream: Option<cpal::Stream>,
    end: RingEnd,
    sample_size: usize,
}

impl BackendStream for CpalStream {
    fn start(&mut self) -> BackendResult<()> {
        match &self.stream {
            Some(stream) => stream.play().map_err(BackendError::new),
            None => Err(BackendError::new("stream is closed")),
        }
    }

    fn stop(&mut self) -> BackendResult<()> {
        match &self.stream {
            Some(stream) => stream.pause().map_err(BackendError::new),
            None => Err(BackendError::new("stream is closed")),
        }
    }

    fn close(&mut self) -> BackendResult<()> {
        // Dropping the cpal stream releases it; idempotent by construction.
        self.stream.take();
        Ok(())
    }

    fn sample_size(&self) -> usize {
        self.sample_size
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        match &mut self.end {
            RingEnd::Capture(consumer) => consumer.pop_slice(buf),
            RingEnd::Playback(_) => 0,
        }
    }

    fn write_bytes(&mut self, buf: &[u8]) -> usize {
        match &mut self.end {
            RingEnd::Playback(producer) => producer.push_slice(buf),
            RingEnd::Capture(_) => 0,
        }
    }
}
