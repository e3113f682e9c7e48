use std::{collections::VecDeque, time::Duration};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::{
    CommandError, ConfigError, PaletteChangeError,
    core::{
        connectivity::Group,
        grid::Grid,
        pair::{PuyoPair, RotateDirection},
    },
};

use super::{
    chain::{ChainController, ChainStep},
    command::Command,
    config::{SessionConfig, session_palette},
    event::GameEvent,
    game_stats::GameStats,
    pair_generator::{PairGenerator, Palette},
    snapshot::SessionSnapshot,
};

/// Maximum number of undrained events; older ones are dropped first.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Where a session is in its lifecycle.
///
/// ```text
/// Ready ──start──▶ Playing ◀──pause/resume──▶ Paused
///                   │   ▲
///              lock │   │ resolution finished
///                   ▼   │
///                 Resolving ──spawn blocked──▶ GameOver
/// ```
///
/// `reset` returns any state to `Ready`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Freshly created or reset; waiting for the first start.
    #[display("ready")]
    Ready,
    #[display("playing")]
    Playing,
    #[display("paused")]
    Paused,
    /// A locked pair's chain resolution is running.
    #[display("resolving")]
    Resolving,
    #[display("game over")]
    GameOver,
}

impl SessionState {
    #[must_use]
    pub const fn flags(self) -> SessionFlags {
        SessionFlags {
            paused: matches!(self, Self::Ready | Self::Paused),
            resolving: matches!(self, Self::Resolving),
            game_over: matches!(self, Self::GameOver),
        }
    }
}

/// The session state as independent flags, for renderers that want booleans.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    pub paused: bool,
    pub resolving: bool,
    pub game_over: bool,
}

/// A single game: grid, pairs, chain resolution, score and timing.
///
/// All player input goes through methods returning `Result`; a rejected
/// command leaves the session untouched. Time only advances through
/// [`Self::tick`], which both drives the automatic fall and paces chain
/// resolutions with the configured presentation delays.
///
/// # Example
///
/// ```
/// use rensa_engine::{GameSession, SessionConfig, SessionState};
///
/// let mut session = GameSession::new(SessionConfig::default()).unwrap();
/// assert_eq!(session.state(), SessionState::Ready);
///
/// session.start().unwrap();
/// session.issue_move(-1, 0).unwrap();
/// session.hard_drop().unwrap();
/// assert_eq!(session.state(), SessionState::Resolving);
///
/// session.finish_resolution().unwrap();
/// assert_eq!(session.state(), SessionState::Playing);
/// assert_eq!(session.stats().locked_pairs(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    palette: Palette,
    generator: PairGenerator,
    grid: Grid,
    current: Option<PuyoPair>,
    next: PuyoPair,
    stats: GameStats,
    state: SessionState,
    chain: Option<ChainController>,
    resolve_wait: Duration,
    fall_timer: Duration,
    soft_drop: bool,
    events: VecDeque<GameEvent>,
}

impl GameSession {
    /// Creates a session whose pairs come from the configured seed, or a random one.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let generator = config
            .seed
            .map_or_else(PairGenerator::new, PairGenerator::with_seed);
        Self::with_generator(config, generator)
    }

    /// Like [`Self::new`], but draws pairs from `generator`.
    pub fn with_generator(
        config: SessionConfig,
        mut generator: PairGenerator,
    ) -> Result<Self, ConfigError> {
        let palette = config.palette()?;
        let next = draw_pair(&mut generator, palette);
        let mut this = Self {
            config,
            palette,
            generator,
            grid: Grid::EMPTY,
            current: None,
            next,
            stats: GameStats::new(),
            state: SessionState::Ready,
            chain: None,
            resolve_wait: Duration::ZERO,
            fall_timer: Duration::ZERO,
            soft_drop: false,
            events: VecDeque::with_capacity(EVENT_QUEUE_CAPACITY),
        };
        this.spawn_pair();
        this.state = SessionState::Ready;
        Ok(this)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The falling pair; `None` while a resolution runs.
    #[must_use]
    pub fn current_pair(&self) -> Option<&PuyoPair> {
        self.current.as_ref()
    }

    /// The pair that spawns after the current one, at its spawn position.
    #[must_use]
    pub fn next_pair(&self) -> &PuyoPair {
        &self.next
    }

    /// Chain count of the running resolution, `0` outside one.
    #[must_use]
    pub fn chain_count(&self) -> u32 {
        self.chain.as_ref().map_or(0, ChainController::chain_count)
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.stats.score()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.state.flags()
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    #[must_use]
    pub fn is_soft_drop(&self) -> bool {
        self.soft_drop
    }

    /// Groups highlighted by the running resolution, about to be cleared.
    #[must_use]
    pub fn pending_clear(&self) -> &[Group] {
        match &self.chain {
            Some(chain) => chain.pending_groups(),
            None => &[],
        }
    }

    /// Where the current pair would land on a hard drop.
    #[must_use]
    pub fn drop_preview(&self) -> Option<PuyoPair> {
        if self.state.is_game_over() {
            return None;
        }
        self.current.map(|pair| pair.drop_position(&self.grid))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn start(&mut self) -> Result<(), CommandError> {
        self.transition(SessionState::Ready, SessionState::Playing)
    }

    pub fn pause(&mut self) -> Result<(), CommandError> {
        self.transition(SessionState::Playing, SessionState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), CommandError> {
        self.transition(SessionState::Paused, SessionState::Playing)
    }

    /// Pauses a running game, or starts/resumes a paused one.
    pub fn toggle_pause(&mut self) -> Result<(), CommandError> {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Ready => self.start(),
            SessionState::Paused => self.resume(),
            state @ (SessionState::Resolving | SessionState::GameOver) => {
                Err(CommandError::NotAccepting { state })
            }
        }
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> Result<(), CommandError> {
        if self.state != from {
            return Err(CommandError::NotAccepting { state: self.state });
        }
        if to.is_playing() {
            self.fall_timer = Duration::ZERO;
        }
        trace!(%from, %to, "session state changed");
        self.state = to;
        Ok(())
    }

    fn ensure_playing(&self) -> Result<(), CommandError> {
        if self.state.is_playing() && self.current.is_some() {
            Ok(())
        } else {
            Err(CommandError::NotAccepting { state: self.state })
        }
    }

    /// Applies `op` to the falling pair, mapping a failed operation to [`CommandError::Blocked`].
    fn update_pair<F>(&mut self, op: F) -> Result<(), CommandError>
    where
        F: FnOnce(&mut PuyoPair, &Grid) -> bool,
    {
        self.ensure_playing()?;
        let state = self.state;
        let pair = self
            .current
            .as_mut()
            .ok_or(CommandError::NotAccepting { state })?;
        if op(pair, &self.grid) {
            Ok(())
        } else {
            Err(CommandError::Blocked)
        }
    }

    /// Moves the pair one cell left `(-1, 0)`, right `(1, 0)` or down `(0, 1)`.
    pub fn issue_move(&mut self, dx: i32, dy: i32) -> Result<(), CommandError> {
        self.ensure_playing()?;
        if !matches!((dx, dy), (-1, 0) | (1, 0) | (0, 1)) {
            return Err(CommandError::InvalidDirection { dx, dy });
        }
        self.update_pair(|pair, grid| pair.move_by(dx, dy, grid))
    }

    /// Rotates the pair clockwise (`1`) or counterclockwise (`-1`).
    pub fn issue_rotate(&mut self, direction: i32) -> Result<(), CommandError> {
        self.ensure_playing()?;
        let direction = RotateDirection::from_delta(direction)
            .ok_or(CommandError::InvalidRotation { direction })?;
        self.update_pair(|pair, grid| pair.rotate(direction, grid))
    }

    /// Drops the pair as far as it goes and locks it.
    pub fn hard_drop(&mut self) -> Result<(), CommandError> {
        self.update_pair(|pair, grid| {
            while pair.move_by(0, 1, grid) {}
            true
        })?;
        self.lock_current();
        Ok(())
    }

    /// Switches between the normal and the fast fall interval.
    ///
    /// Every newly spawned pair starts at the normal interval.
    pub fn set_soft_drop(&mut self, held: bool) -> Result<(), CommandError> {
        self.ensure_playing()?;
        self.soft_drop = held;
        Ok(())
    }

    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::MoveLeft => self.issue_move(-1, 0),
            Command::MoveRight => self.issue_move(1, 0),
            Command::SoftDrop => self.issue_move(0, 1),
            Command::HoldFastFall => self.set_soft_drop(true),
            Command::ReleaseFastFall => self.set_soft_drop(false),
            Command::RotateLeft => self.issue_rotate(-1),
            Command::RotateRight => self.issue_rotate(1),
            Command::HardDrop => self.hard_drop(),
            Command::TogglePause => self.toggle_pause(),
        }
    }

    /// Advances the session clock by `elapsed`.
    ///
    /// While playing, the pair falls one row each time the accumulated time
    /// exceeds the fall interval, locking when it cannot. While resolving,
    /// chain steps run as their presentation delays elapse. Other states
    /// ignore the tick.
    pub fn tick(&mut self, elapsed: Duration) {
        match self.state {
            SessionState::Playing => self.tick_fall(elapsed),
            SessionState::Resolving => self.run_resolution(elapsed),
            SessionState::Ready | SessionState::Paused | SessionState::GameOver => {}
        }
    }

    /// Runs the rest of the current resolution without waiting.
    pub fn finish_resolution(&mut self) -> Result<(), CommandError> {
        if !self.state.is_resolving() {
            return Err(CommandError::NotAccepting { state: self.state });
        }
        self.resolve_wait = Duration::ZERO;
        self.run_resolution(Duration::MAX);
        Ok(())
    }

    /// Changes the number of colors and starts a new game.
    pub fn set_palette(&mut self, size: u8) -> Result<(), PaletteChangeError> {
        if self.state.is_resolving() {
            return Err(PaletteChangeError::Command(CommandError::NotAccepting {
                state: self.state,
            }));
        }
        self.palette = session_palette(size).map_err(PaletteChangeError::Config)?;
        self.config.palette_size = size;
        self.reset();
        Ok(())
    }

    /// Discards the current game and prepares a new one in [`SessionState::Ready`].
    pub fn reset(&mut self) {
        info!(score = self.stats.score(), "session reset");
        self.grid.clear();
        self.stats = GameStats::new();
        self.chain = None;
        self.resolve_wait = Duration::ZERO;
        self.events.clear();
        self.next = draw_pair(&mut self.generator, self.palette);
        self.spawn_pair();
        self.state = SessionState::Ready;
    }

    fn fall_interval(&self) -> Duration {
        if self.soft_drop {
            self.config.fast_fall_interval
        } else {
            self.config.fall_interval
        }
    }

    fn tick_fall(&mut self, elapsed: Duration) {
        self.fall_timer = self.fall_timer.saturating_add(elapsed);
        if self.fall_timer <= self.fall_interval() {
            return;
        }
        self.fall_timer = Duration::ZERO;
        let grid = &self.grid;
        let moved = self
            .current
            .as_mut()
            .is_some_and(|pair| pair.move_by(0, 1, grid));
        if !moved {
            self.lock_current();
        }
    }

    fn lock_current(&mut self) {
        let Some(pair) = self.current.take() else {
            return;
        };
        let written = pair.lock_into(&mut self.grid);
        debug!(
            x = pair.pivot().position.x,
            y = pair.pivot().position.y,
            written,
            "pair locked"
        );
        self.stats.record_lock();
        self.push_event(GameEvent::PairLocked);
        self.chain = Some(ChainController::new());
        self.resolve_wait = Duration::ZERO;
        self.state = SessionState::Resolving;
    }

    fn run_resolution(&mut self, mut budget: Duration) {
        while let Some(chain) = self.chain.as_mut() {
            if budget < self.resolve_wait {
                self.resolve_wait -= budget;
                return;
            }
            budget -= self.resolve_wait;

            let step = chain.step(&mut self.grid);
            let finished = chain.is_finished();
            let chain_count = chain.chain_count();
            self.resolve_wait = self.config.delays.after(&step);

            if let ChainStep::Cleared(clear) = step {
                debug!(
                    chain = clear.chain,
                    cleared = clear.cleared,
                    score = clear.score,
                    "groups cleared"
                );
                self.stats.record_clear(&clear);
                self.push_event(GameEvent::GroupsCleared {
                    chain: clear.chain,
                    cleared: clear.cleared,
                    score: clear.score,
                });
            }
            if finished {
                self.chain = None;
                self.resolve_wait = Duration::ZERO;
                self.stats.complete_resolution(chain_count);
                if self.spawn_pair() {
                    self.state = SessionState::Playing;
                }
            }
        }
    }

    /// Promotes the next pair to the falling one, ending the game if it has no room.
    fn spawn_pair(&mut self) -> bool {
        let upcoming = draw_pair(&mut self.generator, self.palette);
        let pair = std::mem::replace(&mut self.next, upcoming);
        self.current = Some(pair);
        self.soft_drop = false;
        self.fall_timer = Duration::ZERO;

        if !pair.can_occupy(0, 0, &self.grid) {
            let score = self.stats.score();
            info!(score, locked_pairs = self.stats.locked_pairs(), "game over");
            self.state = SessionState::GameOver;
            self.push_event(GameEvent::GameOver { score });
            return false;
        }
        trace!(
            pivot = ?pair.pivot().color,
            secondary = ?pair.secondary().color,
            "pair spawned"
        );
        true
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.len() == EVENT_QUEUE_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

fn draw_pair(generator: &mut PairGenerator, palette: Palette) -> PuyoPair {
    let (pivot, secondary) = generator.next_pair(palette);
    PuyoPair::new(pivot, secondary)
}
