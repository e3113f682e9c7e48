use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use rensa_engine::{
    Command, GameEvent, GameSession, GameStats, PairSeed, SessionConfig, SessionSnapshot,
};
use serde::Serialize;
use tracing::info;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Stop after this many pairs have locked
    #[arg(long, default_value_t = 100)]
    pairs: usize,
    /// Seed for both the pair sequence and the random inputs
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds between inputs
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct CommandCounts {
    accepted: usize,
    rejected: usize,
}

#[derive(Debug, Default, Serialize)]
struct EventCounts {
    pair_locked: usize,
    groups_cleared: usize,
    game_over: usize,
    /// Clears announced as a chain (2 or more).
    chain_banners: usize,
}

impl EventCounts {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PairLocked => self.pair_locked += 1,
            GameEvent::GroupsCleared { .. } => self.groups_cleared += 1,
            GameEvent::GameOver { .. } => self.game_over += 1,
        }
        if event.banner().is_some() {
            self.chain_banners += 1;
        }
    }
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    seed: u64,
    config: SessionConfig,
    ticks: u64,
    commands: CommandCounts,
    events: EventCounts,
    stats: GameStats,
    final_state: SessionSnapshot,
}

pub(crate) fn run(mut config: SessionConfig, arg: &SimulateArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    config.seed = Some(PairSeed::from_u128(u128::from(seed)));

    let mut session = GameSession::new(config.clone()).context("Failed to create session")?;
    session.start().context("Failed to start session")?;

    let mut rng = Pcg32::seed_from_u64(seed);
    let inputs: Vec<Command> = Command::ALL
        .into_iter()
        .filter(|command| command.is_movement())
        .collect();
    let tick = Duration::from_millis(arg.tick_ms);
    // Guards against a zero tick never advancing the fall timer.
    let max_ticks = u64::try_from(arg.pairs)
        .unwrap_or(u64::MAX)
        .saturating_mul(1_000)
        .max(1_000);

    let mut ticks = 0;
    let mut commands = CommandCounts::default();
    let mut events = EventCounts::default();

    while session.stats().locked_pairs() < arg.pairs
        && !session.state().is_game_over()
        && ticks < max_ticks
    {
        if session.state().is_playing()
            && let Some(command) = inputs.choose(&mut rng)
        {
            match session.apply(*command) {
                Ok(()) => commands.accepted += 1,
                Err(_) => commands.rejected += 1,
            }
        }
        session.tick(tick);
        ticks += 1;
        for event in session.drain_events() {
            events.record(&event);
        }
    }

    info!(
        seed,
        ticks,
        score = session.score(),
        locked_pairs = session.stats().locked_pairs(),
        "simulation finished"
    );

    let report = SimulationReport {
        seed,
        config,
        ticks,
        commands,
        events,
        stats: session.stats().clone(),
        final_state: session.snapshot(),
    };
    Output::save_json(&report, arg.output.clone())
}
