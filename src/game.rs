//! Game lifecycle and frame loop ownership
//!
//! `Game` owns the simulation, the high score store and exactly one scheduled
//! loop at a time: the running loop (which advances the simulation) while a
//! round is in progress, or the idle loop (presentation only) otherwise.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::feedback::{FeedbackSink, NullFeedback};
use crate::highscores::ScoreStore;
use crate::platform::{FrameHandle, KeyValueStore, Scheduler};
use crate::settings::Settings;
use crate::sim::{
    Action, CollisionResult, Laser, Meteor, Ship, SimulationState, TickInput, Viewport, resolve,
    update,
};

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Nothing played yet
    Idle,
    /// Round in progress
    Running,
    /// Ship destroyed, waiting for a new start
    Over,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Idle => "idle",
            GameStatus::Running => "running",
            GameStatus::Over => "over",
        }
    }
}

/// Callback fired on every status transition
pub type StatusListener = Box<dyn FnMut(GameStatus)>;

/// Read-only view handed to the renderer each frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot<'a> {
    pub ship: &'a Ship,
    pub meteors: &'a [Meteor],
    pub lasers: &'a [Laser],
    pub score: u32,
    /// Best score seen this session (including persisted history)
    pub best: u32,
    pub status: GameStatus,
    /// Vertical hover offset for the idle ship
    pub hover_offset: f32,
    /// Play the spawn-in effect (see [`Game::take_spawn_in`])
    pub spawn_in: bool,
    /// Leaderboard rank reached by the last finished round
    pub last_rank: Option<usize>,
}

/// The loop currently scheduled. Holding at most one of these makes running
/// both loops at once unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveLoop {
    Running(FrameHandle),
    Idle(FrameHandle),
}

impl ActiveLoop {
    fn handle(&self) -> FrameHandle {
        match self {
            ActiveLoop::Running(h) | ActiveLoop::Idle(h) => *h,
        }
    }
}

/// The game: state machine, loop owner and single writer of all game state
pub struct Game<S: Scheduler, K: KeyValueStore> {
    status: GameStatus,
    sim: SimulationState,
    viewport: Viewport,
    input: TickInput,
    scheduler: S,
    active: Option<ActiveLoop>,
    last_frame_ms: Option<f64>,
    scores: ScoreStore<K>,
    best: u32,
    last_rank: Option<usize>,
    feedback: Box<dyn FeedbackSink>,
    on_status: Option<StatusListener>,
    spawn_in: bool,
    hover_time: f32,
    hover_enabled: bool,
}

impl<S: Scheduler, K: KeyValueStore> Game<S, K> {
    /// Create an idle game and schedule the idle loop
    pub fn new(viewport: Viewport, scheduler: S, scores: ScoreStore<K>, seed: u64) -> Self {
        let best = scores
            .load_board()
            .top_score()
            .map(|s| s as u32)
            .unwrap_or(0);

        let mut sim = SimulationState::new(seed);
        sim.ship.reset_at(viewport.ship_rest(), &viewport);

        let mut game = Self {
            status: GameStatus::Idle,
            sim,
            viewport,
            input: TickInput::default(),
            scheduler,
            active: None,
            last_frame_ms: None,
            scores,
            best,
            last_rank: None,
            feedback: Box::new(NullFeedback),
            on_status: None,
            spawn_in: false,
            hover_time: 0.0,
            hover_enabled: true,
        };
        game.schedule(false);
        log::info!("Game ready (seed {}, best {})", seed, best);
        game
    }

    /// Replace the feedback sink
    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Register the status-change callback
    pub fn set_status_listener(&mut self, listener: impl FnMut(GameStatus) + 'static) {
        self.on_status = Some(Box::new(listener));
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.hover_enabled = settings.effective_hover();
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.sim.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn sim(&self) -> &SimulationState {
        &self.sim
    }

    pub fn scores(&self) -> &ScoreStore<K> {
        &self.scores
    }

    /// Whether a loop is currently scheduled, and which
    pub fn running_loop_active(&self) -> bool {
        matches!(self.active, Some(ActiveLoop::Running(_)))
    }

    pub fn idle_loop_active(&self) -> bool {
        matches!(self.active, Some(ActiveLoop::Idle(_)))
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            ship: &self.sim.ship,
            meteors: &self.sim.meteors,
            lasers: &self.sim.lasers,
            score: self.sim.score,
            best: self.best,
            status: self.status,
            hover_offset: self.hover_offset(),
            spawn_in: self.spawn_in,
            last_rank: self.last_rank,
        }
    }

    /// Consume the one-shot spawn-in flag armed by `start`
    pub fn take_spawn_in(&mut self) -> bool {
        std::mem::take(&mut self.spawn_in)
    }

    fn hover_offset(&self) -> f32 {
        if !self.hover_enabled || self.status == GameStatus::Running {
            return 0.0;
        }
        (self.hover_time * HOVER_FREQUENCY).sin() * HOVER_AMPLITUDE
    }

    /// Key pressed. `Start` starts a round; everything else is held input.
    pub fn press(&mut self, action: Action) {
        match action {
            Action::Start => {
                self.start();
            }
            other => self.input.set(other, true),
        }
    }

    /// Key released
    pub fn release(&mut self, action: Action) {
        self.input.set(action, false);
    }

    /// Replace the held input wholesale (autopilot, replays)
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Viewport changed; keep the ship on screen
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.sim.ship.clamp_to(&self.viewport);
        log::debug!("Viewport resized to {}x{}", width, height);
    }

    /// Start a round. Only valid from Idle or Over; returns false otherwise.
    pub fn start(&mut self) -> bool {
        if self.status == GameStatus::Running {
            log::debug!("Start ignored: round already running");
            return false;
        }

        self.sim.reset(&self.viewport);
        self.spawn_in = true;
        self.last_rank = None;
        self.set_status(GameStatus::Running);
        self.feedback.medium();
        self.schedule(true);
        true
    }

    /// Advance one running frame by `dt` seconds. Ignored unless Running.
    pub fn tick(&mut self, dt: f32) -> CollisionResult {
        if self.status != GameStatus::Running {
            return CollisionResult::default();
        }

        update(&mut self.sim, &self.input, dt, &self.viewport);
        let result = resolve(&mut self.sim);

        if !result.destroyed.is_empty() {
            self.feedback.light();
        }
        if let Some(id) = result.ship_hit_by {
            log::debug!("Ship hit by meteor #{}", id);
            self.end();
        }
        result
    }

    /// End the round: persist the score and fall back to the idle loop.
    /// Ignored unless Running, so a round ends exactly once.
    pub fn end(&mut self) {
        if self.status != GameStatus::Running {
            return;
        }

        let score = self.sim.score;
        self.last_rank = self.scores.load_board().potential_rank(score as f64);
        self.scores.save(score as f64);
        self.best = self.best.max(score);

        self.sim.meteors.clear();
        self.sim.lasers.clear();
        self.sim
            .ship
            .reset_at(self.viewport.ship_rest(), &self.viewport);

        log::info!(
            "Round over: score {} (best {}, rank {:?})",
            score,
            self.best,
            self.last_rank
        );
        self.set_status(GameStatus::Over);
        self.feedback.heavy();
        self.schedule(false);
    }

    /// Deliver a fired frame. Frames for handles this game no longer owns
    /// (cancelled, superseded or from a previous loop) are dropped.
    pub fn frame(&mut self, handle: FrameHandle, now_ms: f64) {
        let Some(active) = self.active.filter(|a| a.handle() == handle) else {
            log::trace!("Ignoring stale frame {:?}", handle);
            return;
        };
        self.active = None;
        let dt = self.frame_delta(now_ms);

        match active {
            ActiveLoop::Running(_) => {
                self.tick(dt);
                if self.status == GameStatus::Running {
                    self.active = Some(ActiveLoop::Running(self.scheduler.request_frame()));
                }
            }
            ActiveLoop::Idle(_) => {
                self.hover_time =
                    (self.hover_time + dt).rem_euclid(std::f32::consts::TAU / HOVER_FREQUENCY);
                self.active = Some(ActiveLoop::Idle(self.scheduler.request_frame()));
            }
        }
    }

    /// Cancel whatever loop is scheduled. Frames already in flight are
    /// ignored when they arrive.
    pub fn shutdown(&mut self) {
        self.cancel_active();
        log::debug!("Game loops stopped");
    }

    fn frame_delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        }
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.scheduler.cancel(active.handle());
        }
    }

    /// Switch to the running (`true`) or idle loop, cancelling the other
    fn schedule(&mut self, running: bool) {
        self.cancel_active();
        self.last_frame_ms = None;
        let handle = self.scheduler.request_frame();
        self.active = Some(if running {
            ActiveLoop::Running(handle)
        } else {
            ActiveLoop::Idle(handle)
        });
    }

    fn set_status(&mut self, status: GameStatus) {
        log::info!("Game {} -> {}", self.status.as_str(), status.as_str());
        self.status = status;
        if let Some(listener) = self.on_status.as_mut() {
            listener(status);
        }
    }
}

impl<S: Scheduler, K: KeyValueStore> Drop for Game<S, K> {
    fn drop(&mut self) {
        self.cancel_active();
    }
}
