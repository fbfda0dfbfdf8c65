//! Host-side driver for parallel WS281x LED controllers
//!
//! Pixels are written into per-channel buffers, optionally through a
//! serpentine [`MatrixView`]. Each [`Controller::render`] gamma-maps the
//! frame, optionally reduces it to the bytes that changed, optionally
//! compresses it with a shared canonical Huffman code, and writes the result
//! to the device in chunks.

pub mod addressing;
pub mod channel;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod gamma;
pub mod huffman;
pub mod sink;
pub mod throughput;
pub mod wire;

pub use addressing::{MatrixView, PixelAddress, Surface, SurfaceCursor};
pub use config::{AddressWidth, CodeStatistics, ControllerConfig, RefreshPolicy};
pub use controller::{Controller, RenderReport};
pub use error::{Error, Result};
pub use gamma::GammaCorrector;
pub use huffman::{CanonicalCode, CanonicalDecoder, CodeTable};
pub use throughput::{ThroughputMeter, ThroughputReport};
pub use wire::FrameAssembler;

pub use color::{Rgb, rgb_from_u32, rgb_to_u32};
pub use embassy_time::{Duration, Instant};
