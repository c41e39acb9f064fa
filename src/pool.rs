use std::ops::Range;

use log::{debug, info};

use crate::error::FireError;
use crate::framebuffer::Surface;
use crate::hub75::{CacheFlush, DisplayController};

pub const FRAME_COUNT: usize = 4;

/// A contiguous, aligned run of surfaces handed to the scan engine in turn.
///
/// The renderer always writes the surface after the one that was last
/// published, so the engine has `FRAME_COUNT - 1` frames to finish reading a
/// surface before it is drawn over again.
pub struct FramePool {
    surfaces: Vec<Surface>,
    current: usize,
    scanned: Option<usize>,
}

impl FramePool {
    pub fn new() -> Result<Self, FireError> {
        let mut surfaces = Vec::new();
        surfaces
            .try_reserve_exact(FRAME_COUNT)
            .map_err(|source| FireError::Alloc {
                bytes: FRAME_COUNT * Surface::BYTES,
                source,
            })?;
        surfaces.resize_with(FRAME_COUNT, Surface::new);

        let pool = FramePool {
            surfaces,
            current: 0,
            scanned: None,
        };
        info!(
            "frame pool: {} x {} bytes at {:#x}",
            FRAME_COUNT,
            Surface::BYTES,
            pool.base_addr()
        );
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn base_addr(&self) -> usize {
        self.surfaces.as_ptr() as usize
    }

    /// Byte range covered by every surface in the pool.
    pub fn range(&self) -> Range<usize> {
        let start = self.base_addr();
        start..start + self.len() * Surface::BYTES
    }

    pub fn surface_range(&self, index: usize) -> Range<usize> {
        let start = self.base_addr() + index * Surface::BYTES;
        start..start + Surface::BYTES
    }

    /// Index the scan engine was last told to show, if any.
    pub fn scanned(&self) -> Option<usize> {
        self.scanned
    }

    pub fn surface(&self, index: usize) -> &Surface {
        &self.surfaces[index]
    }

    pub fn surface_mut(&mut self, index: usize) -> &mut Surface {
        &mut self.surfaces[index]
    }

    pub fn flush_all<F: CacheFlush + ?Sized>(&self, flush: &mut F) {
        flush.flush(self.range());
    }

    /// Moves the rotation on by one and returns the surface index to draw into.
    pub fn next_write_target(&mut self) -> usize {
        self.current = (self.current + 1) % FRAME_COUNT;
        debug_assert_ne!(Some(self.current), self.scanned);
        self.current
    }

    /// Points the scan engine at `index`. The surface must already be flushed.
    pub fn publish<D: DisplayController + ?Sized>(&mut self, controller: &mut D, index: usize) {
        debug!("publish frame {}", index);
        controller.publish(index, self.base_addr());
        self.scanned = Some(index);
    }

    pub fn disable<D: DisplayController + ?Sized>(&mut self, controller: &mut D) {
        controller.disable();
        self.scanned = None;
    }
}
