use std::io::Cursor;

use image::AnimationDecoder as _;

use crate::foundation::{
    core::Frame,
    error::{GifViewError, GifViewResult},
};

/// Frame delay used for GIF frames that declare a zero delay.
pub const ZERO_DELAY_FALLBACK_MS: u64 = 100;

/// Decoded animation: intrinsic size, total duration and a per-timestamp frame renderer.
pub trait Movie: Send {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Total duration of one loop in milliseconds. May be 0 for still images.
    fn duration_ms(&self) -> u64;

    /// Render the frame visible at `time_ms` (in `0..duration_ms`) into `target`.
    ///
    /// `target` always has the movie's intrinsic dimensions.
    fn draw(&mut self, time_ms: u64, target: &mut Frame) -> GifViewResult<()>;
}

/// Turns encoded bytes into a [`Movie`].
pub trait MovieDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> GifViewResult<Box<dyn Movie>>;
}

/// [`MovieDecoder`] backed by the `image` crate's GIF codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifMovieDecoder;

impl MovieDecoder for GifMovieDecoder {
    fn decode(&self, bytes: &[u8]) -> GifViewResult<Box<dyn Movie>> {
        Ok(Box::new(GifMovie::decode(bytes)?))
    }
}

/// Decode GIF bytes with [`GifMovieDecoder`].
pub fn decode_movie(bytes: &[u8]) -> GifViewResult<Box<dyn Movie>> {
    GifMovieDecoder.decode(bytes)
}

/// Fully composited GIF frames held in memory with their start timestamps.
pub struct GifMovie {
    width: u32,
    height: u32,
    frames: Vec<Vec<u8>>,
    starts_ms: Vec<u64>,
    duration_ms: u64,
}

impl std::fmt::Debug for GifMovie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifMovie")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frames", &self.frames.len())
            .field("duration_ms", &self.duration_ms)
            .finish()
    }
}

impl GifMovie {
    pub fn decode(bytes: &[u8]) -> GifViewResult<Self> {
        if bytes.is_empty() {
            return Err(GifViewError::decode("the input stream is empty"));
        }

        let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
            .map_err(|e| GifViewError::decode(format!("not a gif: {e}")))?;

        let mut width = 0u32;
        let mut height = 0u32;
        let mut frames = Vec::new();
        let mut starts_ms = Vec::new();
        let mut t = 0u64;
        for frame in decoder.into_frames() {
            let frame = frame.map_err(|e| GifViewError::decode(format!("gif frame: {e}")))?;

            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay_ms = if denom > 0 {
                u64::from(numer / denom)
            } else {
                0
            };
            let delay_ms = if delay_ms == 0 {
                ZERO_DELAY_FALLBACK_MS
            } else {
                delay_ms
            };

            let buffer = frame.into_buffer();
            (width, height) = buffer.dimensions();
            starts_ms.push(t);
            frames.push(buffer.into_raw());
            t += delay_ms;
        }

        if frames.is_empty() {
            return Err(GifViewError::decode("gif contains no frames"));
        }

        let duration_ms = if frames.len() == 1 { 0 } else { t };
        tracing::debug!(
            width,
            height,
            frames = frames.len(),
            duration_ms,
            "decoded gif"
        );

        Ok(Self {
            width,
            height,
            frames,
            starts_ms,
            duration_ms,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the frame visible at `time_ms`.
    pub fn frame_index_at(&self, time_ms: u64) -> usize {
        let t = if self.duration_ms == 0 {
            0
        } else {
            time_ms % self.duration_ms
        };
        self.starts_ms
            .partition_point(|&start| start <= t)
            .saturating_sub(1)
    }
}

impl Movie for GifMovie {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn draw(&mut self, time_ms: u64, target: &mut Frame) -> GifViewResult<()> {
        let idx = self.frame_index_at(time_ms);
        target.copy_from(&self.frames[idx])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/movie.rs"]
mod tests;
