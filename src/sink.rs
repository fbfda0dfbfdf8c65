//! Device sink
//!
//! The downstream controller shows up as a write-only character device
//! (USB CDC, serial port). Any [`std::io::Write`] works as a sink; this module
//! opens the usual file-system path.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::{Error, Result};

/// Open the device at `path` for writing
///
/// The path must already exist; device nodes are never created.
pub fn open_device(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| Error::DeviceOpen {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("opened LED device {}", path.display());
    Ok(file)
}
