use serde::Serialize;

use crate::{Group, PuyoPair};

use super::game_session::{GameSession, SessionFlags, SessionState};

/// Column whose spawn cell a renderer marks as the danger spot.
///
/// Purely cosmetic: legality checks never consult it.
pub const SPAWN_MARK_COLUMN: i32 = 2;

/// Everything a renderer needs to draw one frame, in a serializable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Grid rows top to bottom, `.` for empty and `R`/`B`/`G`/`Y` for colors.
    pub rows: Vec<String>,
    pub current_pair: Option<PuyoPair>,
    pub next_pair: PuyoPair,
    /// Where the current pair would land on a hard drop.
    pub drop_preview: Option<PuyoPair>,
    /// Groups found by the running resolution and about to be removed.
    pub pending_clear: Vec<Group>,
    pub score: u64,
    pub chain_count: u32,
    pub state: SessionState,
    pub flags: SessionFlags,
    pub palette_size: u8,
    pub spawn_mark_column: i32,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(session: &GameSession) -> Self {
        Self {
            rows: session.grid().to_rows(),
            current_pair: session.current_pair().copied(),
            next_pair: *session.next_pair(),
            drop_preview: session.drop_preview(),
            pending_clear: session.pending_clear().to_vec(),
            score: session.score(),
            chain_count: session.chain_count(),
            state: session.state(),
            flags: session.flags(),
            palette_size: session.palette().size(),
            spawn_mark_column: SPAWN_MARK_COLUMN,
        }
    }
}
