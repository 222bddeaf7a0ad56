//! Reader and writer for the Sphinx `objects.inv` wire format.
//!
//! An inventory is four newline-terminated header lines followed by a zlib
//! stream of records:
//!
//! ```text
//! # Sphinx inventory version 2
//! # Project: discord.py
//! # Version: 2.4
//! # The remainder of this file is compressed using zlib.
//! <zlib body: "<name> <domain>:<role> <priority> <location> <display name>\n"...>
//! ```
//!
//! [`InventoryReader`] parses the header and hands back [`CompressedLines`],
//! a forward-only iterator that inflates the body one chunk at a time. Chunk
//! boundaries never need to line up with zlib blocks or with line breaks.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Decompress, FlushDecompress, Status};
use memchr::memchr;

use crate::types::{Compression, InventoryHeader, InventoryRecord};
use crate::{Error, Result};

/// The only supported format version line.
pub const INVENTORY_VERSION: &str = "# Sphinx inventory version 2";

/// Default number of compressed bytes fed to the inflater per step.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

const PROJECT_PREFIX: &str = "# Project: ";
const VERSION_PREFIX: &str = "# Version: ";
const ZLIB_MARKER_LINE: &str = "# The remainder of this file is compressed using zlib.";

/// Minimum output window handed to the inflater per call.
const MIN_OUTPUT_WINDOW: usize = 4 * 1024;

/// Cursor over a raw inventory buffer.
pub struct InventoryReader<'a> {
    buf: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> InventoryReader<'a> {
    /// Wrap a fetched inventory.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override how many compressed bytes are inflated per step.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Read and validate the four header lines.
    ///
    /// Fails with [`Error::Format`] if the version line is not
    /// [`INVENTORY_VERSION`], if the marker line does not mention zlib, or if
    /// the buffer ends before the header does.
    pub fn read_header(&mut self) -> Result<InventoryHeader> {
        let format_version = self.read_line("format version")?.to_string();
        if format_version != INVENTORY_VERSION {
            return Err(Error::Format(format!(
                "unsupported inventory version line '{format_version}'"
            )));
        }

        let project_name = strip_label(self.read_line("project name")?, PROJECT_PREFIX);
        let project_version = strip_label(self.read_line("project version")?, VERSION_PREFIX);

        let marker = self.read_line("compression marker")?;
        let compression = Compression::from_marker(marker);
        if compression != Compression::Zlib {
            return Err(Error::Format(format!(
                "inventory body is not zlib-compressed (marker line '{marker}')"
            )));
        }

        Ok(InventoryHeader {
            format_version,
            project_name,
            project_version,
            compression,
        })
    }

    /// Turn the remainder of the buffer into a stream of decoded lines.
    #[must_use]
    pub fn into_lines(self) -> CompressedLines<'a> {
        CompressedLines::new(&self.buf[self.pos..], self.chunk_size)
    }

    fn read_line(&mut self, what: &str) -> Result<&'a str> {
        let buf = self.buf;
        let rest = &buf[self.pos..];
        let end = memchr(b'\n', rest).ok_or_else(|| {
            Error::Format(format!("inventory header truncated before {what} line"))
        })?;
        self.pos += end + 1;

        let line = std::str::from_utf8(&rest[..end])
            .map_err(|e| Error::Format(format!("{what} line is not valid UTF-8: {e}")))?;
        Ok(line.trim_end())
    }
}

/// Decode the header of `buf` and return it with the lazy line stream.
pub fn decode(buf: &[u8], chunk_size: usize) -> Result<(InventoryHeader, CompressedLines<'_>)> {
    let mut reader = InventoryReader::new(buf).with_chunk_size(chunk_size);
    let header = reader.read_header()?;
    Ok((header, reader.into_lines()))
}

fn strip_label(line: &str, prefix: &str) -> String {
    line.strip_prefix(prefix)
        .unwrap_or(line)
        .trim()
        .to_string()
}

/// Forward-only iterator over the lines of a zlib-compressed body.
///
/// Yields each line without its trailing `\n`. Bytes left after the last
/// newline are emitted as a final line once the input is exhausted. A body
/// that runs out before the zlib trailer ends with [`Error::Decompression`].
/// After the first error the iterator is fused.
pub struct CompressedLines<'a> {
    input: &'a [u8],
    chunk_size: usize,
    inflater: Decompress,
    window: Vec<u8>,
    pending: Vec<u8>,
    start: usize,
    stream_ended: bool,
    exhausted: bool,
    done: bool,
}

impl<'a> CompressedLines<'a> {
    fn new(input: &'a [u8], chunk_size: usize) -> Self {
        Self {
            input,
            chunk_size,
            inflater: Decompress::new(true),
            window: Vec::with_capacity(chunk_size.max(MIN_OUTPUT_WINDOW)),
            pending: Vec::new(),
            start: 0,
            stream_ended: false,
            exhausted: false,
            done: false,
        }
    }

    /// Feed the next chunk of input, or flush the inflater once input runs out.
    fn fill(&mut self) -> Result<()> {
        if self.stream_ended {
            self.exhausted = true;
            return Ok(());
        }

        if self.input.is_empty() {
            self.inflate(&[], FlushDecompress::Finish)?;
            if !self.stream_ended {
                return Err(Error::Decompression("unexpected end of zlib stream".to_string()));
            }
            self.exhausted = true;
            return Ok(());
        }

        let take = self.chunk_size.min(self.input.len());
        let (chunk, rest) = self.input.split_at(take);
        self.input = rest;
        self.inflate(chunk, FlushDecompress::None)
    }

    /// Inflate `chunk` completely, appending the output to `pending`.
    fn inflate(&mut self, mut chunk: &[u8], flush: FlushDecompress) -> Result<()> {
        loop {
            self.window.clear();
            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();

            let status = self
                .inflater
                .decompress_vec(chunk, &mut self.window, flush)
                .map_err(|e| Error::Decompression(e.to_string()))?;

            let consumed =
                usize::try_from(self.inflater.total_in() - before_in).unwrap_or(chunk.len());
            let produced = self.inflater.total_out() - before_out;
            chunk = &chunk[consumed.min(chunk.len())..];
            self.pending.extend_from_slice(&self.window);

            if matches!(status, Status::StreamEnd) {
                self.stream_ended = true;
                return Ok(());
            }

            let window_full = self.window.len() == self.window.capacity();
            if (chunk.is_empty() && !window_full) || (consumed == 0 && produced == 0) {
                return Ok(());
            }
        }
    }

    fn take_line(&mut self) -> Option<Result<String>> {
        let offset = memchr(b'\n', &self.pending[self.start..])?;
        let end = self.start + offset;
        let line = decode_line(&self.pending[self.start..end]);
        self.start = end + 1;
        Some(line)
    }
}

impl Iterator for CompressedLines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Some(line) = self.take_line() {
                if line.is_err() {
                    self.done = true;
                }
                return Some(line);
            }

            if self.exhausted {
                self.done = true;
                if self.start < self.pending.len() {
                    let tail = decode_line(&self.pending[self.start..]);
                    self.start = self.pending.len();
                    return Some(tail);
                }
                return None;
            }

            self.pending.drain(..self.start);
            self.start = 0;

            if let Err(err) = self.fill() {
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}

fn decode_line(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Format(format!("inventory line is not valid UTF-8: {e}")))
}

/// Serialize a header and records into the `objects.inv` wire format.
///
/// Only zlib bodies can be written, matching what the reader accepts.
pub fn encode_inventory(header: &InventoryHeader, records: &[InventoryRecord]) -> Result<Vec<u8>> {
    if header.compression != Compression::Zlib {
        return Err(Error::Format(
            "only zlib-compressed inventories can be written".to_string(),
        ));
    }

    let mut out = format!(
        "{}\n{PROJECT_PREFIX}{}\n{VERSION_PREFIX}{}\n{ZLIB_MARKER_LINE}\n",
        header.format_version, header.project_name, header.project_version
    )
    .into_bytes();

    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    for record in records {
        writeln!(encoder, "{record}").map_err(|e| Error::Other(e.to_string()))?;
    }
    let body = encoder.finish().map_err(|e| Error::Other(e.to_string()))?;

    out.extend_from_slice(&body);
    Ok(out)
}
