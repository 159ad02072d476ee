//! Byte-oriented run-length codec for captured pixel buffers
//!
//! The stream is a sequence of records, each starting with a tag byte:
//! - `0..=127`: literal record, `tag + 1` raw bytes follow verbatim
//! - `128..=255`: repeat record, one fill byte follows and is written
//!   `tag - 128 + 3` times
//!
//! Captured BGRA frames are dominated by opaque alpha bytes and flat
//! backgrounds, so this two-mode scheme removes most of the redundancy.
//! Literal runs cost one tag byte per 128 input bytes at worst.

use crate::config::codec::{MAX_LITERAL_RUN, MAX_REPEAT_RUN, MIN_REPEAT_RUN, REPEAT_TAG_BASE};
use crate::image::{buffer_len, Image, PixelFormat};

/// Length of the run of bytes equal to `src[pos]`, capped at `cap`
fn run_length(src: &[u8], pos: usize, cap: usize) -> usize {
    let value = src[pos];
    src[pos..]
        .iter()
        .take(cap)
        .take_while(|&&b| b == value)
        .count()
}

/// Compress a byte buffer into the run-length stream
pub fn compress(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + src.len() / MAX_LITERAL_RUN + 1);
    let mut pos = 0;

    while pos < src.len() {
        let run = run_length(src, pos, MAX_REPEAT_RUN);
        if run >= MIN_REPEAT_RUN {
            out.push(REPEAT_TAG_BASE + (run - MIN_REPEAT_RUN) as u8);
            out.push(src[pos]);
            pos += run;
            continue;
        }

        // Accumulate literals until a repeat-worthy run starts
        let start = pos;
        while pos < src.len()
            && pos - start < MAX_LITERAL_RUN
            && run_length(src, pos, MIN_REPEAT_RUN) < MIN_REPEAT_RUN
        {
            pos += 1;
        }
        out.push((pos - start - 1) as u8);
        out.extend_from_slice(&src[start..pos]);
    }

    out
}

/// Decode `src` into `dst`, returning the number of bytes written
///
/// Records that do not fit are truncated to the remaining space, and a
/// record cut short by the end of `src` contributes what is available.
pub fn decompress_into(src: &[u8], dst: &mut [u8]) -> usize {
    let mut read = 0;
    let mut written = 0;

    while read < src.len() && written < dst.len() {
        let tag = src[read];
        read += 1;
        let room = dst.len() - written;

        if tag < REPEAT_TAG_BASE {
            let len = (tag as usize + 1).min(room).min(src.len() - read);
            dst[written..written + len].copy_from_slice(&src[read..read + len]);
            // Skip the whole literal even when the destination clamps it
            read += tag as usize + 1;
            written += len;
        } else {
            let Some(&value) = src.get(read) else {
                break;
            };
            read += 1;
            let len = ((tag - REPEAT_TAG_BASE) as usize + MIN_REPEAT_RUN).min(room);
            dst[written..written + len].fill(value);
            written += len;
        }
    }

    written
}

/// Decode a stream into a freshly allocated pixel buffer
///
/// Returns `None` when the layout is oversized or the destination cannot
/// be allocated. Malformed streams produce a zero-padded, partial buffer.
pub fn decompress(
    src: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
) -> Option<Image> {
    let len = buffer_len(stride, height)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).ok()?;
    data.resize(len, 0);

    let written = decompress_into(src, &mut data);
    if written < len {
        tracing::warn!(
            written = written,
            expected = len,
            "Compressed payload ended early, image is truncated"
        );
    }

    Image::from_data(width, height, stride, format, data).ok()
}

/// A pixel snapshot held in compressed form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
    /// Uncompressed byte length (diagnostics only)
    pub raw_size: usize,
    pub data: Vec<u8>,
}

impl CompressedImage {
    /// Compress the `stride * height` bytes of `image`
    pub fn encode(image: &Image) -> Self {
        let raw = image.data();
        Self {
            width: image.width(),
            height: image.height(),
            stride: image.stride(),
            format: image.format(),
            raw_size: raw.len(),
            data: compress(raw),
        }
    }

    /// Decompress into a new, independently owned image
    pub fn decode(&self) -> Option<Image> {
        decompress(&self.data, self.width, self.height, self.stride, self.format)
    }

    /// Size charged against the memory budget
    pub fn compressed_len(&self) -> usize {
        self.data.len()
    }

    pub fn compression_ratio(&self) -> f64 {
        if self.data.is_empty() {
            return 1.0;
        }
        self.raw_size as f64 / self.data.len() as f64
    }
}
