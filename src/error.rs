//! Error types for audio-block.
//!
//! Every block operation fails synchronously with one of these variants.
//! Where the native backend produced diagnostic text, the variant carries it
//! verbatim. Teardown-path failures (closing a stream, releasing the
//! subsystem) are never surfaced through this type - they are logged and
//! swallowed, since destruction must not fail.

/// Diagnostic text from the native audio layer.
///
/// Backend implementations wrap their library's error strings in this
/// newtype so the block can append them to its own error variants without
/// knowing which backend produced them.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    /// Creates a backend error from any displayable value.
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self(reason.to_string())
    }
}

/// Errors raised by [`AudioDeviceBlock`](crate::AudioDeviceBlock) operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioBlockError {
    /// The native audio subsystem could not be acquired at construction.
    #[error("audio subsystem unavailable: {reason}")]
    Subsystem {
        /// The subsystem's own diagnostic text.
        reason: String,
    },

    /// The subsystem currently reports zero devices.
    #[error("no audio devices available")]
    NoDevicesAvailable,

    /// No device with the requested name is enumerable.
    #[error("no matching device: {name}")]
    DeviceNotFound {
        /// The name that failed to match.
        name: String,
    },

    /// A numeric device selector exceeded the current device count.
    #[error("device index {index} out of range ({count} devices)")]
    DeviceIndexOutOfRange {
        /// The requested index, as given by the caller.
        index: String,
        /// The device count at the time of the call.
        count: usize,
    },

    /// The default device was requested but the subsystem has none configured.
    #[error("no default device configured")]
    NoDefaultDevice,

    /// `setup_stream` was called before a device was resolved.
    #[error("no device selected (call setup_device first)")]
    NoDeviceSelected,

    /// The requested format/rate/channel combination was rejected.
    #[error("unsupported stream format: {reason}")]
    UnsupportedFormat {
        /// The subsystem's diagnostic for the rejection.
        reason: String,
    },

    /// The negotiated sample size differs from the requested format's size.
    #[error("negotiated sample size {negotiated} does not match requested size {requested}")]
    SampleSizeMismatch {
        /// Bytes per sample implied by the requested format.
        requested: usize,
        /// Bytes per sample the subsystem actually negotiated.
        negotiated: usize,
    },

    /// `setup_stream` was called while a stream is already open.
    #[error("stream already open (deactivate does not close it)")]
    StreamAlreadyOpen,

    /// `activate`/`deactivate` was called with no open stream.
    #[error("no open stream (call setup_stream first)")]
    StreamNotOpen,

    /// The subsystem failed to start the stream.
    #[error("stream start failed: {reason}")]
    StreamStart {
        /// The subsystem's diagnostic text.
        reason: String,
    },

    /// The subsystem failed to stop the stream.
    #[error("stream stop failed: {reason}")]
    StreamStop {
        /// The subsystem's diagnostic text.
        reason: String,
    },

    /// `set_report_mode` received a value other than
    /// `"LOGGER"`, `"STDERROR"`, or `"DISABLED"`.
    #[error("unknown report mode: {mode}")]
    UnknownReportMode {
        /// The rejected mode string.
        mode: String,
    },

    /// A sample type name did not match any supported logical type.
    #[error("unknown sample type: {name}")]
    UnknownSampleType {
        /// The rejected type name.
        name: String,
    },

    /// Any other error from the underlying audio library.
    #[error("audio backend error: {0}")]
    Backend(#[from] BackendError),
}
