use crate::foundation::error::{GifViewError, GifViewResult};

/// Default delay between two ticks, roughly 30 fps.
pub const DEFAULT_DELAY_MS: u32 = 33;

/// Positive delay in milliseconds between two animation ticks.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameDelay(u32);

impl FrameDelay {
    pub fn from_millis(ms: i64) -> GifViewResult<Self> {
        if ms <= 0 {
            return Err(GifViewError::configuration(format!(
                "delay in millis must be positive: {ms}"
            )));
        }
        let ms = u32::try_from(ms).map_err(|_| {
            GifViewError::configuration(format!("delay in millis is too large: {ms}"))
        })?;
        Ok(Self(ms))
    }

    pub fn as_millis(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.0))
    }
}

impl Default for FrameDelay {
    fn default() -> Self {
        Self(DEFAULT_DELAY_MS)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
}

/// Straight-alpha RGBA8 pixel buffer, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Transparent buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            data: vec![0u8; len],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite this buffer with `src`, which must have the same dimensions.
    pub fn copy_from(&mut self, src: &[u8]) -> GifViewResult<()> {
        if src.len() != self.data.len() {
            return Err(GifViewError::decode(format!(
                "frame size mismatch: got {} bytes, expected {}",
                src.len(),
                self.data.len()
            )));
        }
        self.data.copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
