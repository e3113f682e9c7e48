use serde::Serialize;

/// Something a presentation layer may want to react to.
///
/// Events are queued by the session and pulled with
/// [`GameSession::drain_events`](crate::GameSession::drain_events); the game
/// behaves the same whether or not anyone drains them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    /// The active pair was merged into the grid.
    PairLocked,
    /// One chain step removed `cleared` puyos.
    GroupsCleared { chain: u32, cleared: usize, score: u64 },
    /// A new pair could not spawn.
    GameOver { score: u64 },
}

impl GameEvent {
    /// Sound effect to play for this event, if any.
    ///
    /// ```
    /// use rensa_engine::{ChainTier, GameEvent, SoundCue};
    ///
    /// let first = GameEvent::GroupsCleared { chain: 1, cleared: 4, score: 40 };
    /// let fifth = GameEvent::GroupsCleared { chain: 5, cleared: 4, score: 640 };
    /// assert_eq!(first.sound_cue(), Some(SoundCue::Erase));
    /// assert_eq!(fifth.sound_cue(), Some(SoundCue::Chain(ChainTier::Mid)));
    /// ```
    #[must_use]
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match *self {
            Self::GroupsCleared { chain, .. } => Some(SoundCue::for_chain(chain)),
            Self::PairLocked | Self::GameOver { .. } => None,
        }
    }

    /// Chain banner to announce, for clears that continue a chain.
    ///
    /// ```
    /// use rensa_engine::{BannerEmphasis, GameEvent};
    ///
    /// let event = GameEvent::GroupsCleared { chain: 7, cleared: 4, score: 2560 };
    /// let banner = event.banner().unwrap();
    /// assert_eq!(banner.chain, 7);
    /// assert_eq!(banner.emphasis, BannerEmphasis::Strong);
    /// ```
    #[must_use]
    pub fn banner(&self) -> Option<ChainBanner> {
        match *self {
            Self::GroupsCleared { chain, .. } if chain >= 2 => Some(ChainBanner {
                chain,
                emphasis: BannerEmphasis::for_chain(chain),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainBanner {
    pub chain: u32,
    pub emphasis: BannerEmphasis,
}

/// How loudly a chain banner is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BannerEmphasis {
    Normal,
    /// 7 chains or more.
    Strong,
    /// 10 chains or more.
    Strongest,
}

impl BannerEmphasis {
    #[must_use]
    pub const fn for_chain(chain: u32) -> Self {
        match chain {
            0..=6 => Self::Normal,
            7..=9 => Self::Strong,
            _ => Self::Strongest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    /// A single clear that does not continue a chain.
    Erase,
    Chain(ChainTier),
}

impl SoundCue {
    #[must_use]
    pub const fn for_chain(chain: u32) -> Self {
        match chain {
            0 | 1 => Self::Erase,
            2..=3 => Self::Chain(ChainTier::Low),
            4..=6 => Self::Chain(ChainTier::Mid),
            _ => Self::Chain(ChainTier::High),
        }
    }
}

/// Intensity bucket for chain sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ChainTier {
    Low,
    Mid,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleared(chain: u32) -> GameEvent {
        GameEvent::GroupsCleared {
            chain,
            cleared: 4,
            score: 0,
        }
    }

    #[test]
    fn test_sound_cue_tiers() {
        let expected = [
            (1, SoundCue::Erase),
            (2, SoundCue::Chain(ChainTier::Low)),
            (3, SoundCue::Chain(ChainTier::Low)),
            (4, SoundCue::Chain(ChainTier::Mid)),
            (6, SoundCue::Chain(ChainTier::Mid)),
            (7, SoundCue::Chain(ChainTier::High)),
            (19, SoundCue::Chain(ChainTier::High)),
        ];
        for (chain, cue) in expected {
            assert_eq!(cleared(chain).sound_cue(), Some(cue), "chain {chain}");
        }
        assert_eq!(GameEvent::PairLocked.sound_cue(), None);
        assert_eq!(GameEvent::GameOver { score: 10 }.sound_cue(), None);
    }

    #[test]
    fn test_banner_only_for_multi_chains() {
        assert_eq!(cleared(1).banner(), None);
        assert_eq!(GameEvent::PairLocked.banner(), None);
        assert_eq!(GameEvent::GameOver { score: 0 }.banner(), None);
        assert_eq!(cleared(2).banner().map(|b| b.chain), Some(2));
    }

    #[test]
    fn test_banner_emphasis_tiers() {
        let expected = [
            (2, BannerEmphasis::Normal),
            (6, BannerEmphasis::Normal),
            (7, BannerEmphasis::Strong),
            (9, BannerEmphasis::Strong),
            (10, BannerEmphasis::Strongest),
            (15, BannerEmphasis::Strongest),
        ];
        for (chain, emphasis) in expected {
            assert_eq!(
                cleared(chain).banner(),
                Some(ChainBanner { chain, emphasis }),
                "chain {chain}"
            );
        }
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(cleared(3)).unwrap();
        assert_eq!(json["kind"], "groups_cleared");
        assert_eq!(json["chain"], 3);
        let json = serde_json::to_value(GameEvent::PairLocked).unwrap();
        assert_eq!(json["kind"], "pair_locked");
    }
}
