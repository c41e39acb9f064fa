use std::time::{Duration, Instant};

use clap::Parser;
use error_iter::ErrorIter as _;
use log::{error, info};
use pixels::{Error, Pixels, SurfaceTexture};
use rand_xoshiro::Xoshiro256PlusPlus;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use fireled::{Buttons, Fence, FireLed, SimulatedPanel, Surface, Tick, rng};

const WIDTH: u32 = Surface::WIDTH as u32;
const HEIGHT: u32 = Surface::HEIGHT as u32;

#[derive(Parser, Debug)]
#[command(version, about = "Fire effect for a 64x64 HUB75 LED panel")]
struct Args {
    /// Window pixels per LED
    #[arg(short, long, default_value_t = 8)]
    scale: u32,

    /// Frames rendered per second
    #[arg(short, long, default_value_t = 60)]
    fps: u32,

    /// Seed for the ignition row; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Render this many frames without a window, then exit
    #[arg(long)]
    frames: Option<u64>,

    /// Start with the animation paused
    #[arg(long)]
    paused: bool,
}

type Panel = FireLed<SimulatedPanel, Fence, Xoshiro256PlusPlus>;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let rng = match args.seed {
        Some(seed) => rng::seeded(seed),
        None => rng::from_entropy(),
    };
    let mut app: Panel = FireLed::new(SimulatedPanel::new(), Fence, rng)
        .map_err(|e| Error::UserDefined(Box::new(e)))?;
    app.set_running(!args.paused);

    match args.frames {
        Some(frames) => {
            run_headless(&mut app, frames);
            Ok(())
        }
        None => run_window(app, &args),
    }
}

fn run_headless(app: &mut Panel, frames: u64) {
    for _ in 0..frames {
        if app.tick(Buttons::empty()) == Tick::Quit {
            break;
        }
    }

    let field = app.renderer().field();
    let total: u64 = (0..Surface::HEIGHT)
        .flat_map(move |y| field.row(y).iter())
        .map(|&h| h as u64)
        .sum();
    info!(
        "rendered {} frames, mean heat {:.1}, {} cold rows on top",
        app.renderer().frames(),
        total as f64 / Surface::PIXELS as f64,
        field.cold_rows()
    );
    app.shutdown();
}

fn run_window(mut app: Panel, args: &Args) -> Result<(), Error> {
    let event_loop = EventLoop::new().map_err(|e| Error::UserDefined(Box::new(e)))?;
    let mut input = WinitInputHelper::new();
    let window = {
        let size = LogicalSize::new((WIDTH * args.scale) as f64, (HEIGHT * args.scale) as f64);
        WindowBuilder::new()
            .with_title("fireled")
            .with_inner_size(size)
            .with_min_inner_size(LogicalSize::new(WIDTH as f64, HEIGHT as f64))
            .build(&event_loop)
            .map_err(|e| Error::UserDefined(Box::new(e)))?
    };

    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(WIDTH, HEIGHT, surface_texture)?
    };

    let frame_time = Duration::from_secs(1) / args.fps.max(1);
    let mut last_frame = Instant::now();
    let mut pending = Buttons::empty();

    let res = event_loop.run(|event, elwt| {
        if let Event::WindowEvent {
            event: WindowEvent::RedrawRequested,
            ..
        } = event
        {
            app.controller().scan_out(app.pool(), pixels.frame_mut());
            if let Err(err) = pixels.render() {
                log_error("pixels.render", err);
                app.shutdown();
                elwt.exit();
                return;
            }
        }

        if input.update(&event) {
            if input.key_pressed(KeyCode::Escape) || input.close_requested() {
                app.shutdown();
                elwt.exit();
                return;
            }

            if let Some(size) = input.window_resized() {
                if let Err(err) = pixels.resize_surface(size.width, size.height) {
                    log_error("pixels.resize_surface", err);
                    app.shutdown();
                    elwt.exit();
                    return;
                }
            }

            if input.key_pressed(KeyCode::KeyA) {
                pending |= Buttons::A;
            }
            if input.key_pressed(KeyCode::KeyB) || input.key_pressed(KeyCode::Space) {
                pending |= Buttons::B;
            }

            if last_frame.elapsed() >= frame_time {
                last_frame = Instant::now();
                if app.tick(pending) == Tick::Quit {
                    app.shutdown();
                    elwt.exit();
                    return;
                }
                pending = Buttons::empty();
                window.request_redraw();
            }

            elwt.set_control_flow(ControlFlow::WaitUntil(last_frame + frame_time));
        }
    });
    res.map_err(|e| Error::UserDefined(Box::new(e)))
}

fn log_error<E: std::error::Error + 'static>(method_name: &str, err: E) {
    error!("{method_name}() failed: {err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}
