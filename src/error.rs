use std::io;
use std::path::PathBuf;

/// Errors reported by the controller and the wire decoder
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device sink could not be opened
    #[error("failed to open device {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing a chunk to the device sink failed; the frame is lost
    #[error("device write failed: {0}")]
    DeviceWrite(#[source] io::Error),
    /// Controller configuration rejected at construction
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("channel {channel} out of range ({channels} channels)")]
    ChannelOutOfRange { channel: usize, channels: usize },
    #[error("LED offset {offset} out of range ({len} LEDs per channel)")]
    OffsetOutOfRange { offset: usize, len: usize },
    /// Malformed chunk on the receiving side
    #[error("decode error: {0}")]
    Decode(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
