//! 256x256 monochrome monitor framebuffer.

use crate::state::{IoBank, IoRegister};

/// Pixels per row and per column.
pub const MONITOR_SIDE: usize = 256;

/// Total framebuffer size in bytes.
pub const MONITOR_PIXELS: usize = MONITOR_SIDE * MONITOR_SIDE;

/// `monitorcmd` value that strobes `monitordata` into the framebuffer.
pub const MONITOR_CMD_WRITE: u32 = 1;

/// One luminance byte per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Monitor {
    pixels: Box<[u8]>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            pixels: vec![0; MONITOR_PIXELS].into_boxed_slice(),
        }
    }
}

impl Monitor {
    /// Applies a pending write strobe. Returns the pixel index written.
    ///
    /// `monitorcmd` is level-triggered: it is not cleared here, so the same
    /// pixel is rewritten every cycle until the program clears it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, io: &IoBank) -> Option<usize> {
        if io.get(IoRegister::MonitorCmd) != MONITOR_CMD_WRITE {
            return None;
        }
        let index = (io.get(IoRegister::MonitorAddr) & 0xFFFF) as usize;
        let value = (io.get(IoRegister::MonitorData) & 0xFF) as u8;
        let pixel = self.pixels.get_mut(index)?;
        *pixel = value;
        Some(index)
    }

    /// Pixel at `row`, `column`.
    #[must_use]
    pub fn pixel(&self, row: usize, column: usize) -> u8 {
        if row >= MONITOR_SIDE || column >= MONITOR_SIDE {
            return 0;
        }
        self.pixels.get(row * MONITOR_SIDE + column).copied().unwrap_or(0)
    }

    /// Raw framebuffer bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
