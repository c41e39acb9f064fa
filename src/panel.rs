use log::{trace, warn};

use crate::framebuffer::Surface;
use crate::hub75::{ControlWord, DisplayController};
use crate::palette::unpack_color;
use crate::pool::FramePool;

const FB_ADDR_SPAN: usize = 1 << 25;

/// Stand-in for the HUB75 scan engine when running on a desktop.
///
/// It latches control register writes and, when asked, reads the selected
/// surface out of the pool the way the DMA engine would.
pub struct SimulatedPanel {
    control: ControlWord,
    writes: u64,
}

impl SimulatedPanel {
    pub fn new() -> Self {
        SimulatedPanel {
            control: ControlWord::DISABLED,
            writes: 0,
        }
    }

    pub fn control(&self) -> ControlWord {
        self.control
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Copies the scanned surface into an RGBA8 frame of `WIDTH * HEIGHT * 4` bytes.
    /// A disabled panel shows black.
    pub fn scan_out(&self, pool: &FramePool, frame: &mut [u8]) {
        if !self.control.is_scanning() {
            frame.fill(0);
            return;
        }

        if self.control.base_addr() != pool.base_addr() % FB_ADDR_SPAN {
            warn!(
                "control register points at {:#x}, pool lives at {:#x}",
                self.control.base_addr(),
                pool.base_addr()
            );
        }

        let surface = pool.surface(self.control.frame());
        for (pixel, &color) in frame
            .chunks_exact_mut(4)
            .zip(surface.data.iter())
            .take(Surface::PIXELS)
        {
            let (r, g, b) = unpack_color(color);
            pixel.copy_from_slice(&[r, g, b, 0xFF]);
        }
    }
}

impl Default for SimulatedPanel {
    fn default() -> Self {
        SimulatedPanel::new()
    }
}

impl DisplayController for SimulatedPanel {
    fn write_control(&mut self, word: ControlWord) {
        trace!("hub75 ctl <- {:#010x}", word.bits());
        self.control = word;
        self.writes += 1;
    }
}
