use bitflags::bitflags;
use log::info;

use crate::error::FireError;
use crate::fire::FireRenderer;
use crate::hub75::{CacheFlush, DisplayController};
use crate::palette::Palette;
use crate::pool::FramePool;
use crate::rng::RandomSource;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Buttons: u8 {
        /// Leave the main loop.
        const A = 0b0000_0001;
        /// Toggle run/pause.
        const B = 0b0000_0010;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    Rendered(usize),
    Paused,
    Quit,
}

/// Everything the fire needs between frames, owned in one place.
pub struct FireLed<D, F, R> {
    palette: Palette,
    renderer: FireRenderer,
    pool: FramePool,
    controller: D,
    flush: F,
    rng: R,
    running: bool,
}

impl<D, F, R> FireLed<D, F, R>
where
    D: DisplayController,
    F: CacheFlush,
    R: RandomSource,
{
    pub fn new(controller: D, mut flush: F, rng: R) -> Result<Self, FireError> {
        let pool = FramePool::new()?;
        pool.flush_all(&mut flush);

        info!("fire ready, watch the LED panel");

        Ok(FireLed {
            palette: Palette::new(),
            renderer: FireRenderer::new(),
            pool,
            controller,
            flush,
            rng,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
        info!("fire {}", if self.running { "resumed" } else { "paused" });
    }

    /// Renders the next surface, flushes it and hands it to the scan engine.
    pub fn step(&mut self) -> usize {
        let index = self.pool.next_write_target();
        self.renderer.render_frame(
            &mut self.rng,
            &self.palette,
            self.pool.surface_mut(index),
            &mut self.flush,
        );
        self.pool.publish(&mut self.controller, index);
        index
    }

    /// One pass of the main loop with the buttons that were newly pressed.
    pub fn tick(&mut self, pressed: Buttons) -> Tick {
        if pressed.contains(Buttons::A) {
            return Tick::Quit;
        }
        if pressed.contains(Buttons::B) {
            self.toggle_running();
        }
        if !self.running {
            return Tick::Paused;
        }
        Tick::Rendered(self.step())
    }

    /// Stops the scan engine.
    pub fn shutdown(&mut self) {
        info!("shutting down after {} frames", self.renderer.frames());
        self.pool.disable(&mut self.controller);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn renderer(&self) -> &FireRenderer {
        &self.renderer
    }

    pub fn pool(&self) -> &FramePool {
        &self.pool
    }

    pub fn controller(&self) -> &D {
        &self.controller
    }
}
