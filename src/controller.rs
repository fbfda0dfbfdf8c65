use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::addressing::{MatrixView, PixelAddress};
use crate::channel::Channel;
use crate::color::Rgb;
use crate::config::{CodeStatistics, ControllerConfig, RefreshPolicy};
use crate::error::{Error, Result};
use crate::huffman::{CanonicalCode, DICT_SIZE, Frequencies, accumulate_frequencies, encode_with_len};
use crate::sink::open_device;
use crate::wire::{self, ChunkHeader, FLAG_DIFF, FLAG_HUFFMAN, FLAG_LAST, HEADER_LEN};

/// Summary of one render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    /// Bytes written to the device, headers included
    pub bytes_written: usize,
    /// Chunks written to the device
    pub chunks: usize,
    /// Payload bytes before compression
    pub payload_len: usize,
    /// Frame bytes that differ from the last transmitted frame
    pub changed: usize,
    /// Payload went out Huffman coded
    pub compressed: bool,
    /// Huffman coding was requested but the code is the overflow sentinel
    pub fallback: bool,
}

/// LED controller - owns the channels, the shared code and the device sink
///
/// Pixel writes only touch the current buffers. [`Controller::render`] turns
/// them into chunks for the device and, once every chunk is written, records
/// what was sent so the next render can diff against it.
pub struct Controller<W: Write = File> {
    sink: W,
    config: ControllerConfig,
    channels: Vec<Channel>,

    code: Option<CanonicalCode>,
    statistics: Frequencies,
    frames_since_refresh: u32,
    /// The snapshot reflects the device only after the first successful render
    primed: bool,

    // Scratch buffers reused between renders
    frame: Vec<u8>,
    payload: Vec<u8>,
    chunk: Vec<u8>,
}

impl Controller<File> {
    /// Open the device at `path` and create a controller for it
    pub fn open(path: impl AsRef<Path>, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let sink = open_device(path)?;
        Ok(Self::build(sink, config))
    }
}

impl<W: Write> Controller<W> {
    /// Create a controller writing to an already opened sink
    pub fn with_sink(sink: W, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(sink, config))
    }

    /// Assemble a controller from a validated config
    fn build(sink: W, config: ControllerConfig) -> Self {
        log::info!(
            "controller: {} channels x {} LEDs, gamma={} diff={} huffman={}",
            config.channels,
            config.leds_per_channel,
            config.gamma.is_some(),
            config.data_reduction,
            config.huffman,
        );
        let channels = (0..config.channels)
            .map(|_| Channel::new(config.leds_per_channel))
            .collect();
        let frame_len = config.frame_len();
        Self {
            sink,
            channels,
            code: None,
            statistics: [0; DICT_SIZE],
            frames_since_refresh: 0,
            primed: false,
            frame: Vec::with_capacity(frame_len),
            payload: Vec::new(),
            chunk: Vec::with_capacity(config.max_chunk_len),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Tear the controller down, handing back the sink
    pub fn into_sink(self) -> W {
        log::info!("controller closed");
        self.sink
    }

    /// Current shared code, if one was built
    pub fn code(&self) -> Option<&CanonicalCode> {
        self.code.as_ref()
    }

    /// Set one LED, checking the channel and offset
    pub fn set_pixel(&mut self, channel: usize, offset: usize, color: Rgb) -> Result<()> {
        let channels = self.channels.len();
        let strip = self
            .channels
            .get_mut(channel)
            .ok_or(Error::ChannelOutOfRange { channel, channels })?;
        if offset >= strip.len() {
            return Err(Error::OffsetOutOfRange {
                offset,
                len: strip.len(),
            });
        }
        strip.set(offset, color);
        Ok(())
    }

    /// Set one LED without range checks
    ///
    /// Panics if the address is outside the layout.
    #[inline]
    pub fn set_pixel_at(&mut self, address: PixelAddress, color: Rgb) {
        self.channels[address.channel].set(address.offset, color);
    }

    /// Set `(x, y)` of a matrix view; coordinates must lie inside the view
    #[inline]
    pub fn set_pixel_xy(&mut self, view: &MatrixView, x: usize, y: usize, color: Rgb) {
        self.set_pixel_at(view.address(x, y), color);
    }

    pub fn pixel(&self, address: PixelAddress) -> Option<Rgb> {
        self.channels.get(address.channel)?.get(address.offset)
    }

    pub fn fill(&mut self, color: Rgb) {
        for channel in &mut self.channels {
            channel.fill(color);
        }
    }

    pub fn clear(&mut self) {
        self.fill(Rgb::default());
    }

    /// Current colors of all channels as one r,g,b byte stream
    pub fn frame_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.config.frame_len());
        for channel in &self.channels {
            channel.write_bytes(&mut bytes);
        }
        bytes
    }

    /// Rebuild the shared code from the current (pre-gamma) frame
    ///
    /// With [`CodeStatistics::Accumulated`] the frame's byte counts are added
    /// to those of earlier refreshes first.
    pub fn refresh_code(&mut self) -> &CanonicalCode {
        let bytes = self.frame_bytes();
        let code = match self.config.statistics {
            CodeStatistics::CurrentFrame => CanonicalCode::from_data(&bytes),
            CodeStatistics::Accumulated => {
                accumulate_frequencies(&mut self.statistics, &bytes);
                CanonicalCode::from_frequencies(&self.statistics)
            }
        };
        log::debug!(
            "refreshed code: {} lengths, fallback={}",
            code.histogram().len(),
            code.is_fallback()
        );
        self.frames_since_refresh = 0;
        self.code.insert(code)
    }

    /// Forget accumulated byte statistics
    pub fn reset_statistics(&mut self) {
        self.statistics = [0; DICT_SIZE];
    }

    /// Send the current frame to the device, returning the bytes written
    pub fn render(&mut self) -> Result<usize> {
        self.render_report().map(|report| report.bytes_written)
    }

    /// Send the current frame to the device
    ///
    /// On a write error the frame is dropped and the snapshots stay as they
    /// were, so the next diff covers everything that did not arrive.
    pub fn render_report(&mut self) -> Result<RenderReport> {
        if self.refresh_due() {
            self.refresh_code();
        }
        self.frames_since_refresh = self.frames_since_refresh.saturating_add(1);

        self.frame.clear();
        for channel in &self.channels {
            channel.write_bytes(&mut self.frame);
        }
        if let Some(gamma) = &self.config.gamma {
            gamma.apply_bytes(&mut self.frame);
        }

        let mut report = RenderReport::default();
        let mut flags = 0;
        if self.config.data_reduction {
            flags |= FLAG_DIFF;
            report.changed = self.collect_changes();
        } else {
            report.changed = self.frame.len();
        }
        let payload = if self.config.data_reduction {
            &self.payload
        } else {
            &self.frame
        };
        report.payload_len = payload.len();

        let code = self.code.as_ref().filter(|_| self.config.huffman);
        report.fallback = code.is_some_and(CanonicalCode::is_fallback);
        let code = code.filter(|code| !code.is_fallback() && !payload.is_empty());
        report.compressed = code.is_some();

        let mut writer = ChunkWriter {
            sink: &mut self.sink,
            buffer: &mut self.chunk,
            max_len: self.config.max_chunk_len,
            bytes_written: 0,
            chunks: 0,
        };
        let sent = match code {
            Some(code) => writer.send_compressed(flags | FLAG_HUFFMAN, payload, code),
            None => writer.send_raw(flags, payload),
        };
        let sent = sent.and_then(|()| writer.sink.flush().map_err(Error::DeviceWrite));
        report.bytes_written = writer.bytes_written;
        report.chunks = writer.chunks;
        if let Err(err) = sent {
            log::warn!("render aborted after {} chunks: {}", report.chunks, err);
            return Err(err);
        }

        let mut start = 0;
        for channel in &mut self.channels {
            let end = start + channel.byte_len();
            channel.commit(&self.frame[start..end]);
            start = end;
        }
        self.primed = true;

        log::debug!(
            "rendered {} payload bytes ({} changed) in {} chunks, {} bytes, compressed={}",
            report.payload_len,
            report.changed,
            report.chunks,
            report.bytes_written,
            report.compressed,
        );
        Ok(report)
    }

    fn refresh_due(&self) -> bool {
        if !self.config.huffman {
            return false;
        }
        if self.code.is_none() {
            return true;
        }
        match self.config.refresh {
            RefreshPolicy::Manual => false,
            RefreshPolicy::EveryFrame => true,
            RefreshPolicy::EveryNFrames(frames) => self.frames_since_refresh >= frames,
        }
    }

    /// Fill the payload with address/value pairs of changed bytes
    ///
    /// Returns the number of changed bytes.
    fn collect_changes(&mut self) -> usize {
        self.payload.clear();
        let width = self.config.address_width;
        let mut changed = 0;
        let mut position = 0;
        for channel in &self.channels {
            let len = channel.byte_len();
            let current = &self.frame[position..position + len];
            for (index, (&value, &sent)) in current.iter().zip(channel.snapshot()).enumerate() {
                if self.primed && value == sent {
                    continue;
                }
                width.write(position + index, &mut self.payload);
                self.payload.push(value);
                changed += 1;
            }
            position += len;
        }
        changed
    }
}

/// Splits a payload into device chunks and writes them
struct ChunkWriter<'a, W: Write> {
    sink: &'a mut W,
    buffer: &'a mut Vec<u8>,
    max_len: usize,
    bytes_written: usize,
    chunks: usize,
}

impl<W: Write> ChunkWriter<'_, W> {
    fn send_raw(&mut self, flags: u8, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return self.send_header_only(flags);
        }
        let capacity = self.max_len - HEADER_LEN;
        let mut offset = 0;
        for piece in payload.chunks(capacity) {
            let last = offset + piece.len() == payload.len();
            let header = chunk_header(flags, last, offset, piece.len());
            self.buffer.clear();
            header.write(self.buffer);
            self.buffer.extend_from_slice(piece);
            self.flush_chunk()?;
            offset += piece.len();
        }
        Ok(())
    }

    fn send_compressed(&mut self, flags: u8, payload: &[u8], code: &CanonicalCode) -> Result<()> {
        let body_start = HEADER_LEN + wire::code_tables_len(code);
        let capacity = self.max_len - body_start;
        let mut offset = 0;
        while offset < payload.len() {
            self.buffer.clear();
            self.buffer.resize(HEADER_LEN, 0);
            wire::write_code_tables(code, self.buffer);
            self.buffer.resize(body_start + capacity, 0);

            let encoded = encode_with_len(
                code.table(),
                payload,
                offset,
                &mut self.buffer[body_start..],
                capacity * 8,
            );
            if encoded.symbols == 0 {
                return Err(Error::InvalidConfig("chunk too small for a single codeword"));
            }
            self.buffer.truncate(body_start + encoded.bytes());

            let last = offset + encoded.symbols == payload.len();
            let header = chunk_header(flags, last, offset, encoded.symbols);
            self.buffer[..HEADER_LEN].copy_from_slice(&header.to_bytes());
            self.flush_chunk()?;
            offset += encoded.symbols;
        }
        Ok(())
    }

    /// Empty payload: a bare header still marks the frame boundary
    fn send_header_only(&mut self, flags: u8) -> Result<()> {
        self.buffer.clear();
        chunk_header(flags & !FLAG_HUFFMAN, true, 0, 0).write(self.buffer);
        self.flush_chunk()
    }

    fn flush_chunk(&mut self) -> Result<()> {
        self.sink.write_all(&self.buffer[..]).map_err(Error::DeviceWrite)?;
        log::trace!("chunk {}: {} bytes", self.chunks, self.buffer.len());
        self.bytes_written += self.buffer.len();
        self.chunks += 1;
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn chunk_header(flags: u8, last: bool, offset: usize, count: usize) -> ChunkHeader {
    // payload size is bounded to u32 by ControllerConfig::validate
    ChunkHeader {
        flags: if last { flags | FLAG_LAST } else { flags },
        payload_offset: offset as u32,
        symbol_count: count as u32,
    }
}

