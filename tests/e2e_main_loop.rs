//! E2E tests for main loop scheduling and interaction.
//!
//! Input arrives as raw terminal bytes decoded into the loop's shared input
//! state, exactly as the background reader delivers it.

mod common;

use common::{feed, sgr};
use std::cell::Cell as Counter;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use termglass::{
    MainLoop, Rgb, Terminal, VizConfig, Window, clear_event_callback, set_event_callback,
};

fn counting_loop<'h>(config: VizConfig, steps: &'h Counter<u32>) -> MainLoop<'h, Vec<u8>> {
    MainLoop::new(
        Terminal::headless(Vec::new(), 60, 20),
        config,
        move || {
            steps.set(steps.get() + 1);
            true
        },
        |_, _| {},
    )
}

/// At most 64 keys are handled per tick; the rest wait for the next one.
#[test]
fn test_e2e_key_drain_per_tick() {
    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default(), &steps);
    // 64 unbound keys, then a step and a quit
    let mut bytes = vec![b'x'; 64];
    bytes.extend(b" \x11");
    feed(main.input(), &bytes);

    let first = main.tick(Duration::ZERO).unwrap();
    assert!(first.running);
    assert_eq!(first.steps, 0);

    let second = main.tick(Duration::ZERO).unwrap();
    assert!(!second.running);
    assert_eq!(second.steps, 1);
    eprintln!("[TEST] PASS: key drain bounded per tick");
}

/// Autoplay at rate R over total time T runs floor(T * R) steps.
#[test]
fn test_e2e_autoplay_step_count() {
    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default().with_autoplay(8.0), &steps);
    // 40 ticks of 33 ms = 1.32 s
    let mut total = 0;
    for _ in 0..40 {
        total += main.tick(Duration::from_millis(33)).unwrap().steps;
    }
    assert_eq!(total, 10);
    assert_eq!(steps.get(), 10);
    eprintln!("[TEST] PASS: autoplay runs floor(T*R) steps");
}

/// Turning autoplay off with `1` stops stepping; `2` restarts at 5/s.
#[test]
fn test_e2e_autoplay_presets() {
    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default().with_autoplay(8.0), &steps);
    feed(main.input(), b"1");
    assert_eq!(main.tick(Duration::from_secs(2)).unwrap().steps, 0);

    feed(main.input(), b"2");
    main.tick(Duration::ZERO).unwrap();
    assert_eq!(main.tick(Duration::from_millis(1000)).unwrap().steps, 5);
    eprintln!("[TEST] PASS: autoplay presets");
}

/// Dragging a window moves it by the mouse delta and leaves the camera.
#[test]
fn test_e2e_window_drag_moves_window_only() {
    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default(), &steps);
    let id = main
        .windows_mut()
        .create(Window::new(10, 5, 20, 8).with_bg(Rgb::BLUE, 200).with_title("Panel"));
    main.tick(Duration::ZERO).unwrap();
    let camera = *main.viewport();

    // grab at cell (15, 7), move by (+6, +3) in two reports
    feed(main.input(), &sgr(0, 16, 8, true));
    main.tick(Duration::ZERO).unwrap();
    feed(main.input(), &sgr(32, 19, 9, true));
    main.tick(Duration::ZERO).unwrap();
    feed(main.input(), &sgr(32, 22, 11, true));
    main.tick(Duration::ZERO).unwrap();
    feed(main.input(), &sgr(0, 22, 11, false));
    main.tick(Duration::ZERO).unwrap();

    let window = main.windows().get(id).unwrap();
    assert_eq!((window.x, window.y), (16, 8));
    assert_eq!(*main.viewport(), camera);
    assert!(!main.windows().is_dragging());
    eprintln!("[TEST] PASS: window drag moves only the window");
}

/// A press, drag and release that all land before one tick still move only
/// the window.
#[test]
fn test_e2e_window_drag_within_one_tick() {
    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default(), &steps);
    let id = main
        .windows_mut()
        .create(Window::new(10, 5, 20, 8).with_bg(Rgb::BLUE, 200).with_title("Panel"));
    main.tick(Duration::ZERO).unwrap();
    let camera = *main.viewport();

    let mut bytes = sgr(0, 16, 8, true);
    bytes.extend(sgr(32, 22, 11, true));
    bytes.extend(sgr(0, 22, 11, false));
    feed(main.input(), &bytes);
    main.tick(Duration::ZERO).unwrap();

    let window = main.windows().get(id).unwrap();
    assert_eq!((window.x, window.y), (16, 8));
    assert_eq!(*main.viewport(), camera);
    assert_eq!(main.input().consume_drag_delta(), (0, 0));
    eprintln!("[TEST] PASS: single-tick window drag leaves the camera");
}

/// Dragging empty space pans the camera against the mouse.
#[test]
fn test_e2e_scene_drag_pans() {
    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default().with_pan_speed(1.0), &steps);
    main.tick(Duration::ZERO).unwrap();
    let (ox, oy) = (main.viewport().offset_x(), main.viewport().offset_y());

    feed(main.input(), &sgr(0, 30, 10, true));
    feed(main.input(), &sgr(32, 34, 12, true));
    main.tick(Duration::ZERO).unwrap();

    assert!((main.viewport().offset_x() - (ox - 4.0)).abs() < 1e-9);
    assert!((main.viewport().offset_y() - (oy - 2.0)).abs() < 1e-9);
    eprintln!("[TEST] PASS: scene drag pans");
}

/// Clicking a close button destroys the help window and reports it.
#[test]
fn test_e2e_help_close_button() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    set_event_callback(move |name, data| {
        sink.lock().unwrap().push(format!("{name}:{data}"));
    });

    let steps = Counter::new(0);
    let mut main = counting_loop(VizConfig::default(), &steps);
    feed(main.input(), b"\x1bOP");
    main.tick(Duration::ZERO).unwrap();
    let id = main.help_window().expect("help window");
    let (bx, by, _) = main.windows().get(id).unwrap().close_button_span().unwrap();

    let x = u16::try_from(bx + 2).unwrap();
    let y = u16::try_from(by + 1).unwrap();
    feed(main.input(), &sgr(0, x, y, true));
    main.tick(Duration::ZERO).unwrap();
    clear_event_callback();

    assert!(main.help_window().is_none());
    assert!(main.windows().is_empty());
    let closed = format!("window_closed:{id}");
    assert!(events.lock().unwrap().iter().any(|e| *e == closed));
    eprintln!("[TEST] PASS: help window closes from its button");
}
