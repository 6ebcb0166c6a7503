//! `termglass-demo` — interactive tour of the visualization engine
//!
//! Shows a procedurally coloured world with a random walker leaving a trail
//! on it. Every layer is in use: the sampled map, world-space overlays, the
//! rulers, a tooltip and host text in the status bar.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin termglass-demo
//! cargo run --bin termglass-demo -- --rate 20 --world 200x120
//! cargo run --bin termglass-demo -- --session
//! cargo run --bin termglass-demo -- --headless-smoke
//! ```
//!
//! Press F1 for the shortcut list, Esc or Ctrl+Q to quit.

use std::cell::RefCell;
use std::ffi::OsString;
use std::io;
use std::time::Duration;
use termglass::{
    Cell, ColorMode, Frame, GridWorld, MainLoop, Rgb, Session, Terminal, VizConfig, WorldSource,
};

const HELP_TEXT: &str = "termglass-demo - termglass demonstration binary

USAGE:
    termglass-demo [OPTIONS]

OPTIONS:
    -h, --help              Print this help message and exit
    --fps <N>               Cap frames per second (default: 30)
    --rate <N>              Autoplay steps per second, 0 starts paused (default: 10)
    --world <WxH>           World size in cells (default: 160x90)
    --seed <N>              Walker seed (default: 1)
    --console16             Start in 16-colour mode
    --session               Run the walker on a worker thread behind a step gate

    --headless-smoke        Render a few frames without a TTY and exit
";

/// Demo configuration parsed from command-line arguments.
#[derive(Clone, Debug)]
struct Config {
    fps: u32,
    rate: f64,
    world: (u32, u32),
    seed: u64,
    console16: bool,
    session: bool,
    headless_smoke: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 30,
            rate: 10.0,
            world: (160, 90),
            seed: 1,
            console16: false,
            session: false,
            headless_smoke: false,
        }
    }
}

enum ParseResult {
    Config(Config),
    Help,
    Error(String),
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String, String> {
    args.next()
        .map(|v| v.to_string_lossy().to_string())
        .ok_or_else(|| format!("{flag} requires a value"))
}

impl Config {
    fn from_args<I>(args: I) -> ParseResult
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        args.next();

        while let Some(arg) = args.next() {
            let arg = arg.to_string_lossy().to_string();
            let parsed = match arg.as_str() {
                "-h" | "--help" => return ParseResult::Help,
                "--fps" => next_value(&mut args, "--fps").and_then(|v| {
                    v.parse::<u32>()
                        .map(|n| config.fps = n)
                        .map_err(|_| format!("Invalid --fps value: {v}"))
                }),
                "--rate" => next_value(&mut args, "--rate").and_then(|v| match v.parse::<f64>() {
                    Ok(n) if n >= 0.0 => {
                        config.rate = n;
                        Ok(())
                    }
                    _ => Err(format!("Invalid --rate value: {v}")),
                }),
                "--world" => next_value(&mut args, "--world").and_then(|v| {
                    parse_size(&v)
                        .map(|size| config.world = size)
                        .ok_or_else(|| format!("Invalid --world: {v} (use WxH, e.g. 160x90)"))
                }),
                "--seed" => next_value(&mut args, "--seed").and_then(|v| {
                    v.parse::<u64>()
                        .map(|n| config.seed = n)
                        .map_err(|_| format!("Invalid --seed value: {v}"))
                }),
                "--console16" => {
                    config.console16 = true;
                    Ok(())
                }
                "--session" => {
                    config.session = true;
                    Ok(())
                }
                "--headless-smoke" => {
                    config.headless_smoke = true;
                    Ok(())
                }
                other => Err(format!("Unknown option: {other}")),
            };
            if let Err(msg) = parsed {
                return ParseResult::Error(msg);
            }
        }
        ParseResult::Config(config)
    }

    fn viz_config(&self) -> VizConfig {
        let mut viz = VizConfig::default().with_target_fps(self.fps);
        if self.rate > 0.0 {
            viz = viz.with_autoplay(self.rate);
        }
        if self.console16 {
            viz = viz.with_color_mode(ColorMode::Console16);
        }
        viz
    }
}

fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once('x')?;
    let w = w.parse::<u32>().ok()?;
    let h = h.parse::<u32>().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

// ============================================================================
// Simulation
// ============================================================================

/// Terrain colour for a world cell.
fn terrain(x: i64, y: i64, w: u32, h: u32) -> Cell {
    let fx = x as f64 / f64::from(w.max(1));
    let fy = y as f64 / f64::from(h.max(1));
    let wave = ((fx * 9.0).sin() + (fy * 7.0).cos()) * 0.25 + 0.5;
    let water = Rgb::new(30, 60, 140);
    let grass = Rgb::new(40, 140, 70);
    let rock = Rgb::new(130, 120, 110);
    let bg = if wave < 0.5 {
        water.lerp(grass, wave * 2.0)
    } else {
        grass.lerp(rock, (wave - 0.5) * 2.0)
    };
    let ch = if (x + y) % 7 == 0 { '.' } else { ' ' };
    Cell::new(ch, Rgb::new(200, 200, 200), bg)
}

/// Random walker with a fading trail.
#[derive(Clone, Debug)]
struct Walker {
    world: GridWorld,
    x: i64,
    y: i64,
    rng: u64,
    steps: u64,
}

impl Walker {
    fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            world: GridWorld::from_fn(width, height, |x, y| terrain(x, y, width, height)),
            x: i64::from(width / 2),
            y: i64::from(height / 2),
            rng: seed.max(1),
            steps: 0,
        }
    }

    fn next_random(&mut self) -> u64 {
        // xorshift64
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 7;
        self.rng ^= self.rng << 17;
        self.rng
    }

    fn step(&mut self) -> bool {
        if let Some(cell) = self.world.cell(self.x, self.y) {
            let trail = cell.bg.lerp(Rgb::YELLOW, 0.35);
            self.world.set(self.x, self.y, cell.with_bg(trail));
        }
        let (dx, dy) = match self.next_random() % 4 {
            0 => (1, 0),
            1 => (-1, 0),
            2 => (0, 1),
            _ => (0, -1),
        };
        self.x = (self.x + dx).clamp(0, self.world.width() - 1);
        self.y = (self.y + dy).clamp(0, self.world.height() - 1);
        self.steps += 1;
        true
    }

    fn draw(&self, frame: &mut Frame<'_, '_>, done: bool) {
        frame.draw_world(&self.world);
        let x = self.x as f64;
        let y = self.y as f64;
        frame.draw_circle_world(x + 0.5, y + 0.5, 3.0, Cell::new(' ', Rgb::WHITE, Rgb::new(90, 70, 20)));
        frame.draw_cell_world(x, y, Cell::new('@', Rgb::BLACK, Rgb::YELLOW));
        if done {
            frame.draw_text(2, 2, " finished ", Rgb::BLACK, Rgb::GREEN);
        }
    }

    fn describe(&self, x: i64, y: i64) -> Option<String> {
        let cell = self.world.cell(x, y)?;
        let here = if (x, y) == (self.x, self.y) { "\nwalker" } else { "" };
        Some(format!(
            "cell {x},{y}\nrgb {},{},{}{here}",
            cell.bg.r, cell.bg.g, cell.bg.b
        ))
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> io::Result<()> {
    match Config::from_args(std::env::args_os()) {
        ParseResult::Config(config) => {
            let result = if config.headless_smoke {
                run_headless_smoke(&config)
            } else if config.session {
                run_session(&config)
            } else {
                run_interactive(&config)
            };
            result.map_err(io::Error::other)
        }
        ParseResult::Help => {
            print!("{HELP_TEXT}");
            Ok(())
        }
        ParseResult::Error(msg) => {
            eprintln!("Error: {msg}");
            eprintln!("Run with --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn run_interactive(config: &Config) -> termglass::Result<()> {
    let (w, h) = config.world;
    let walker = RefCell::new(Walker::new(w, h, config.seed));
    termglass::run_with(
        config.viz_config(),
        || walker.borrow_mut().step(),
        |frame, done| walker.borrow().draw(frame, done),
        |x, y| walker.borrow().describe(x, y),
        || format!("walker {} steps", walker.borrow().steps),
    )
}

fn run_session(config: &Config) -> termglass::Result<()> {
    let (w, h) = config.world;
    let seed = config.seed;
    Session::run_visualized(config.viz_config(), move |session| {
        let mut walker = Walker::new(w, h, seed);
        loop {
            let snapshot = walker.clone();
            session.draw(move |frame| snapshot.draw(frame, false));
            session.set_status(format!("session {} steps", walker.steps));
            if !session.gate() {
                return;
            }
            walker.step();
        }
    })
}

/// Render a handful of frames into memory; no TTY required.
fn run_headless_smoke(config: &Config) -> termglass::Result<()> {
    let (w, h) = config.world;
    eprintln!("Running headless smoke test (80x24)...");
    let walker = RefCell::new(Walker::new(w, h, config.seed));
    let mut main = MainLoop::new(
        Terminal::headless(Vec::new(), 80, 24),
        config.viz_config().with_autoplay(config.rate.max(1.0)),
        || walker.borrow_mut().step(),
        |frame, done| walker.borrow().draw(frame, done),
    )
    .with_tooltip(|x, y| walker.borrow().describe(x, y));

    let mut frames = 0;
    for _ in 0..10 {
        if main.tick(Duration::from_millis(100))?.rendered {
            frames += 1;
        }
    }
    eprintln!(
        "Rendered {frames} frames, {} bytes, walker at {} steps",
        main.terminal().writer().len(),
        walker.borrow().steps
    );
    Ok(())
}
