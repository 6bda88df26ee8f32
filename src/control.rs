//! Host-facing call surface for device blocks.
//!
//! The host runtime drives a block through these two traits instead of a
//! reflective call registry: [`BlockControl`] carries the operations host
//! configuration tooling may invoke at any time, [`BlockLifecycle`] the
//! hooks the host scheduler invokes around stream-processing periods.

use crate::AudioBlockError;

/// Operations callable from configuration and host tooling.
///
/// All methods are synchronous and either fully succeed or leave prior
/// state unchanged.
pub trait BlockControl {
    /// Produces the serialized UI descriptor for host-driven configuration.
    fn overlay(&self) -> String;

    /// Resolves a device selector (name, numeric index string, or empty for
    /// the default device) to an internal device index.
    ///
    /// # Errors
    ///
    /// [`NoDevicesAvailable`](AudioBlockError::NoDevicesAvailable) when the
    /// subsystem reports zero devices,
    /// [`DeviceIndexOutOfRange`](AudioBlockError::DeviceIndexOutOfRange) for
    /// an out-of-bounds numeric selector, and
    /// [`DeviceNotFound`](AudioBlockError::DeviceNotFound) when no name
    /// matches.
    fn setup_device(&mut self, device_name: &str) -> Result<(), AudioBlockError>;

    /// Negotiates and opens the stream at the given sample rate.
    ///
    /// # Errors
    ///
    /// [`UnsupportedFormat`](AudioBlockError::UnsupportedFormat) when the
    /// subsystem rejects the format/rate/channel combination,
    /// [`SampleSizeMismatch`](AudioBlockError::SampleSizeMismatch) when the
    /// negotiated sample size differs from the requested one, and any
    /// subsystem error from the open itself.
    fn setup_stream(&mut self, sample_rate: f64) -> Result<(), AudioBlockError>;

    /// Sets the report mode: `"LOGGER"`, `"STDERROR"`, or `"DISABLED"`.
    ///
    /// # Errors
    ///
    /// [`UnknownReportMode`](AudioBlockError::UnknownReportMode) for any
    /// other value, with the previous mode left intact.
    fn set_report_mode(&mut self, mode: &str) -> Result<(), AudioBlockError>;

    /// Sets the backoff interval in milliseconds. Negative values saturate
    /// to zero.
    fn set_backoff_time(&mut self, milliseconds: i64);
}

/// Lifecycle hooks invoked by the host scheduler.
pub trait BlockLifecycle {
    /// Starts the opened stream and arms the start-of-stream label.
    ///
    /// # Errors
    ///
    /// [`StreamStart`](AudioBlockError::StreamStart) with the subsystem's
    /// diagnostic text when the start call fails.
    fn activate(&mut self) -> Result<(), AudioBlockError>;

    /// Stops the stream without closing it.
    ///
    /// # Errors
    ///
    /// [`StreamStop`](AudioBlockError::StreamStop) with the subsystem's
    /// diagnostic text when the stop call fails.
    fn deactivate(&mut self) -> Result<(), AudioBlockError>;
}
