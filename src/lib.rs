//! # audio-block
//!
//! Host-pluggable audio device block over a native audio backend.
//!
//! `audio-block` binds a streaming runtime's block abstraction to the
//! platform audio layer: device enumeration, device selection, stream
//! negotiation, and start/stop control, exposed as explicit traits the host
//! runtime invokes. The block hands samples through a pull/push seam - no
//! audio callback ever crosses the block boundary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use audio_block::{AudioDeviceBlock, BlockControl, BlockLifecycle, ChannelMode, SampleType};
//!
//! // A stereo float32 capture block
//! let mut block = AudioDeviceBlock::new(
//!     "mic-in", false, SampleType::F32, 2, ChannelMode::Interleaved)?;
//!
//! // Host tooling renders the overlay to offer a live device dropdown
//! println!("{}", block.overlay());
//!
//! block.setup_device("")?;        // "" selects the default device
//! block.setup_stream(48000.0)?;
//! block.activate()?;
//! // ... the transport loop pulls bytes from block.stream_mut() ...
//! block.deactivate()?;
//! ```
//!
//! ## Architecture
//!
//! - **Block**: [`AudioDeviceBlock`] owns configuration state and the open
//!   stream, and implements the host-facing [`BlockControl`] and
//!   [`BlockLifecycle`] traits.
//! - **Backend**: the [`backend`] module abstracts the native subsystem;
//!   the default implementation wraps cpal and bridges its real-time
//!   callback to a lock-free byte ring, keeping the block side pull/push.
//! - **Mock**: [`backend::mock::MockBackend`] drives the full surface in
//!   tests and CI without audio hardware.
//!
//! The host runtime is assumed to serialize calls into a given block; the
//! block itself spawns no threads and suspends on nothing.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub mod backend;
mod block;
mod control;
mod error;
mod format;
mod overlay;
mod report;

pub use backend::{
    default_backend, AudioBackend, BackendResult, BackendStream, DeviceDescriptor,
    StreamDirection, StreamRequest,
};
pub use block::AudioDeviceBlock;
pub use control::{BlockControl, BlockLifecycle};
pub use error::{AudioBlockError, BackendError};
pub use format::{ChannelMode, SampleType, StreamFormat};
pub use report::ReportMode;
