//! E2E tests for the render cycle.
//!
//! Drives the main loop against a headless terminal and checks the emitted
//! byte stream through a VT100 emulator: world sampling, chrome placement
//! and colour output.

mod common;

use std::time::Duration;
use termglass::{
    Cell, ColorMode, GridWorld, MainLoop, Rgb, Terminal, UiLayers, VizConfig, Window,
};

const W: u16 = 80;
const H: u16 = 14;

fn tile() -> Cell {
    Cell::new('#', Rgb::new(250, 250, 250), Rgb::new(10, 80, 30))
}

fn render_once(config: VizConfig) -> vt100::Parser {
    let world = GridWorld::new(10, 10, tile());
    let mut main = MainLoop::new(
        Terminal::headless(Vec::new(), W, H),
        config,
        || true,
        |frame, _| frame.draw_world(&world),
    );
    let outcome = main.tick(Duration::ZERO).unwrap();
    assert!(outcome.rendered);
    common::screen(main.terminal().writer(), W, H)
}

/// A 10x10 world at zoom 1 lands one cell per world cell after the rulers.
#[test]
fn test_e2e_uniform_world_at_zoom_one() {
    let parser = render_once(VizConfig::default().with_layers(UiLayers::MAP));
    let screen = parser.screen();

    for y in 1..11 {
        for x in 4..14 {
            let cell = screen.cell(y, x).unwrap();
            assert_eq!(cell.contents(), "#", "cell ({x}, {y})");
            assert_eq!(cell.bgcolor(), vt100::Color::Rgb(10, 80, 30));
        }
        // past the world's right edge nothing is drawn
        assert_eq!(screen.cell(y, 14).unwrap().bgcolor(), vt100::Color::Rgb(0, 0, 0));
    }
    assert_eq!(common::row(&parser, 11).trim(), "");
    eprintln!("[TEST] PASS: uniform world sampled 1:1");
}

/// Rulers and the status bar frame the world.
#[test]
fn test_e2e_chrome_layout() {
    let parser = render_once(VizConfig::default());

    let top = common::row(&parser, 0);
    // column 10 is world x 6
    assert_eq!(&top[10..11], "6");
    assert_eq!(&top[20..22], "16");

    let left = common::row(&parser, 2);
    assert_eq!(&left[..3], "  1");
    assert_eq!(&left[4..5], "#");

    let status = common::row(&parser, H - 1);
    assert!(status.starts_with("F1 Help |  TrueColor | All | Zoom 1.00 | Auto off"), "{status:?}");
    assert_eq!(
        parser.screen().cell(H - 1, W - 1).unwrap().bgcolor(),
        vt100::Color::Rgb(180, 180, 180)
    );
    eprintln!("[TEST] PASS: rulers and status bar placed");
}

/// Console16 output carries no 24-bit colour sequences.
#[test]
fn test_e2e_console16_output() {
    let world = GridWorld::new(10, 10, tile());
    let mut main = MainLoop::new(
        Terminal::headless(Vec::new(), W, H),
        VizConfig::default().with_color_mode(ColorMode::Console16),
        || true,
        |frame, _| frame.draw_world(&world),
    );
    main.tick(Duration::ZERO).unwrap();
    let out = String::from_utf8_lossy(main.terminal().writer()).to_string();
    assert!(!out.contains("38;2;"));
    assert!(!out.contains("48;2;"));
    assert!(!main.buffer().alpha_blend_enabled());
    eprintln!("[TEST] PASS: 16-colour output");
}

/// Windows are drawn over the scene with their border and title.
#[test]
fn test_e2e_window_over_scene() {
    let world = GridWorld::new(10, 10, tile());
    let mut main = MainLoop::new(
        Terminal::headless(Vec::new(), W, H),
        VizConfig::default(),
        || true,
        |frame, _| frame.draw_world(&world),
    );
    main.windows_mut()
        .create(Window::new(6, 3, 14, 5).with_bg(Rgb::new(20, 20, 60), 255).with_title("Info"));
    main.tick(Duration::ZERO).unwrap();

    let parser = common::screen(main.terminal().writer(), W, H);
    let title_row = common::row(&parser, 3);
    assert!(title_row[6..20].contains("Info"), "{title_row:?}");
    // inside the window the scene is covered by the opaque background
    let inner = parser.screen().cell(5, 10).unwrap();
    assert_eq!(inner.bgcolor(), vt100::Color::Rgb(20, 20, 60));
    assert!(inner.contents().trim().is_empty(), "{:?}", inner.contents());
    assert_eq!(main.buffer().get(10, 5).unwrap().ch, ' ');
    // outside it the world still shows
    assert_eq!(common::row(&parser, 9)[4..14].to_string(), "##########");
    eprintln!("[TEST] PASS: window composited over scene");
}
