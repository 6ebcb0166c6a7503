//! Step-through mode for simulations that run on their own thread.
//!
//! The worker calls [`Session::gate`] between steps and blocks there until
//! the main loop hands it a proceed token through a [`StepGate`]. Draw
//! closures queued with [`Session::draw`] are published as the current scene
//! at every gate, so the screen always shows a complete step.

use crate::config::VizConfig;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::frame::Frame;
use crate::terminal::{Terminal, is_tty};
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// How long one loop step waits for the worker to reach its next gate.
pub const STEP_WAIT: Duration = Duration::from_millis(100);

/// How long shutdown waits for the worker to leave.
pub const JOIN_TIMEOUT: Duration = Duration::from_millis(250);

type SceneFn = Arc<dyn Fn(&mut Frame<'_, '_>) + Send + Sync>;

/// Tooltip provider shared with the worker.
pub type SessionTooltip = Arc<dyn Fn(i64, i64) -> Option<String> + Send + Sync>;

/// Result of handing the worker one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The worker took the token.
    Stepped,
    /// The worker is still inside a previous step.
    Busy,
    /// The worker returned or the gate was closed.
    Finished,
}

#[derive(Debug, Default)]
struct GateState {
    token: bool,
    parked: bool,
    finished: bool,
    closed: bool,
}

/// Single-slot rendezvous between the loop thread and a worker.
#[derive(Clone, Debug, Default)]
pub struct StepGate {
    inner: Arc<(Mutex<GateState>, Condvar)>,
}

impl StepGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_until<'a>(
        &self,
        mut state: MutexGuard<'a, GateState>,
        deadline: Instant,
        mut done: impl FnMut(&GateState) -> bool,
    ) -> MutexGuard<'a, GateState> {
        while !done(&state) {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            state = self
                .inner
                .1
                .wait_timeout(state, left)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        state
    }

    /// Worker side: park until a step is handed out.
    ///
    /// Returns false once the gate is closed; the worker should return.
    pub fn wait(&self) -> bool {
        let cvar = &self.inner.1;
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        state.parked = true;
        cvar.notify_all();
        while !state.token && !state.closed {
            state = cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.parked = false;
        if state.closed {
            return false;
        }
        state.token = false;
        cvar.notify_all();
        true
    }

    /// Worker side: no more steps will be taken.
    pub fn finish(&self) {
        let mut state = self.lock();
        state.finished = true;
        state.parked = false;
        self.inner.1.notify_all();
    }

    /// Loop side: release a parked worker for good.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.inner.1.notify_all();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        let state = self.lock();
        state.finished || state.closed
    }

    #[must_use]
    pub fn is_parked(&self) -> bool {
        self.lock().parked
    }

    /// Loop side: pass one token and wait, at most `timeout` in total, for
    /// the worker to park again or finish.
    pub fn step(&self, timeout: Duration) -> StepOutcome {
        let deadline = Instant::now() + timeout;
        let state = self.lock();
        let mut state = self.wait_until(state, deadline, |s| {
            (s.parked && !s.token) || s.finished || s.closed
        });
        if state.finished || state.closed {
            return StepOutcome::Finished;
        }
        if !state.parked || state.token {
            return StepOutcome::Busy;
        }

        state.token = true;
        self.inner.1.notify_all();
        let _state = self.wait_until(state, deadline, |s| {
            (!s.token && s.parked) || s.finished || s.closed
        });
        StepOutcome::Stepped
    }
}

#[derive(Default)]
struct Scene {
    pending: Vec<SceneFn>,
    current: Vec<SceneFn>,
    status: String,
    tooltip: Option<SessionTooltip>,
}

/// Worker handle: queue drawing, set status and tooltip, and gate steps.
#[derive(Clone)]
pub struct Session {
    scene: Arc<Mutex<Scene>>,
    gate: StepGate,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene: Arc::new(Mutex::new(Scene::default())),
            gate: StepGate::new(),
        }
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn step_gate(&self) -> &StepGate {
        &self.gate
    }

    /// Queue a draw closure for the scene being built.
    ///
    /// It becomes visible at the next [`gate`](Self::gate) and is replayed
    /// every frame until the one after.
    pub fn draw<F>(&self, draw: F)
    where
        F: Fn(&mut Frame<'_, '_>) + Send + Sync + 'static,
    {
        self.scene().pending.push(Arc::new(draw));
    }

    /// Text shown at the right of the status bar.
    pub fn set_status(&self, status: impl Into<String>) {
        self.scene().status = status.into();
    }

    pub fn set_tooltip<F>(&self, tooltip: F)
    where
        F: Fn(i64, i64) -> Option<String> + Send + Sync + 'static,
    {
        self.scene().tooltip = Some(Arc::new(tooltip));
    }

    pub fn clear_tooltip(&self) {
        self.scene().tooltip = None;
    }

    /// Publish the queued scene and block until the next step.
    ///
    /// Returns false when the visualization is shutting down.
    pub fn gate(&self) -> bool {
        self.publish();
        self.gate.wait()
    }

    /// Stop stepping. Draws queued since the last gate are published;
    /// with none queued the last scene stays.
    pub fn finish(&self) {
        {
            let mut scene = self.scene();
            if !scene.pending.is_empty() {
                scene.current = std::mem::take(&mut scene.pending);
            }
        }
        self.gate.finish();
    }

    fn publish(&self) {
        let mut scene = self.scene();
        scene.current = std::mem::take(&mut scene.pending);
    }

    /// Replay the published scene into `frame`.
    pub fn replay(&self, frame: &mut Frame<'_, '_>) {
        // Clone the list so worker calls never wait on a draw
        let current = self.scene().current.clone();
        for draw in &current {
            draw(frame);
        }
    }

    #[must_use]
    pub fn status(&self) -> String {
        self.scene().status.clone()
    }

    #[must_use]
    pub fn tooltip_at(&self, x: i64, y: i64) -> Option<String> {
        let tooltip = self.scene().tooltip.clone()?;
        tooltip(x, y)
    }

    /// Run `worker` on its own thread and visualize it on stdout until the
    /// user quits.
    ///
    /// Each due step lets the worker through one [`gate`](Self::gate). When
    /// the worker returns, stepping ends and the last published scene stays
    /// on screen.
    pub fn run_visualized<F>(config: VizConfig, worker: F) -> Result<()>
    where
        F: FnOnce(Session) + Send + 'static,
    {
        if !is_tty(&io::stdout()) {
            return Err(Error::NotATerminal);
        }

        let session = Session::new();
        let handle = session.spawn_worker(worker)?;

        let gate = session.gate.clone();
        let result = crate::app::MainLoop::new(
            Terminal::new(io::stdout()),
            config,
            || gate.step(STEP_WAIT) != StepOutcome::Finished,
            |frame, _| session.replay(frame),
        )
        .with_status(|| session.status())
        .with_tooltip(|x, y| session.tooltip_at(x, y))
        .run();

        session.gate.close();
        let joined = join_worker(handle, JOIN_TIMEOUT);
        result.and(joined)
    }

    fn spawn_worker<F>(&self, worker: F) -> Result<thread::JoinHandle<()>>
    where
        F: FnOnce(Session) + Send + 'static,
    {
        let worker_session = self.clone();
        thread::Builder::new()
            .name("termglass-session".to_string())
            .spawn(move || {
                let _guard = FinishGuard(worker_session.clone());
                worker(worker_session);
            })
            .map_err(|e| Error::Session(e.to_string()))
    }
}

/// Finishes the session when the worker returns or unwinds.
struct FinishGuard(Session);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

fn join_worker(handle: thread::JoinHandle<()>, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            emit_log(LogLevel::Warn, "session worker still running at exit; detaching");
            return Ok(());
        }
        thread::sleep(Duration::from_millis(5));
    }
    handle
        .join()
        .map_err(|_| Error::Session("worker panicked".to_string()))
}
