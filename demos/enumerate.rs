//! Lists the enumerable audio devices and prints the device-selection
//! overlay a host configuration UI would consume.
//!
//! Run with: `cargo run --example enumerate`

use audio_block::{
    default_backend, AudioDeviceBlock, BlockControl, ChannelMode, SampleType, StreamDirection,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let backend = default_backend()?;
    let count = backend.device_count()?;
    println!("{count} device(s):");
    for index in 0..count {
        let descriptor = backend.device_descriptor(index)?;
        let (low, high) = descriptor.latency_bounds(StreamDirection::Output);
        println!(
            "  #{index}: {} [{}] output latency {:?}..{:?}",
            descriptor.name, descriptor.host_api, low, high
        );
    }

    let block = AudioDeviceBlock::new(
        "demo-out",
        true,
        SampleType::F32,
        2,
        ChannelMode::Interleaved,
    )?;
    println!("\noverlay: {}", block.overlay());

    Ok(())
}
