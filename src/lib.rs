pub mod app;
pub mod error;
pub mod fire;
pub mod framebuffer;
pub mod hub75;
pub mod palette;
pub mod panel;
pub mod pool;
pub mod rng;

extern crate bitflags;

pub use app::{Buttons, FireLed, Tick};
pub use error::FireError;
pub use framebuffer::Surface;
pub use hub75::{CacheFlush, ControlWord, DisplayController, Fence};
pub use palette::Palette;
pub use panel::SimulatedPanel;
pub use pool::{FRAME_COUNT, FramePool};
pub use rng::RandomSource;
