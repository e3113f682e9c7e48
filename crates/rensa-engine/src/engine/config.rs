use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    chain::ChainStep,
    pair_generator::{PairSeed, Palette},
};
use crate::ConfigError;

/// Smallest palette a session can be played with.
pub const MIN_SESSION_COLORS: u8 = 3;

/// Largest palette a session can be played with.
pub const MAX_SESSION_COLORS: u8 = 4;

/// Session settings, applied when a session is created or reset.
///
/// Durations are stored as whole milliseconds. Missing fields fall back to
/// their defaults, so `{}` is a valid configuration.
///
/// ```
/// use std::time::Duration;
/// use rensa_engine::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "palette_size": 3 }"#).unwrap();
/// assert_eq!(config.palette_size, 3);
/// assert_eq!(config.fall_interval, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of colors in play (3 or 4).
    pub palette_size: u8,
    /// Time between automatic one-row falls.
    #[serde(with = "millis")]
    pub fall_interval: Duration,
    /// Fall interval while soft drop is held.
    #[serde(with = "millis")]
    pub fast_fall_interval: Duration,
    pub delays: ResolveDelays,
    /// Fixed seed for the pair sequence; a fresh one is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<PairSeed>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            palette_size: MAX_SESSION_COLORS,
            fall_interval: Duration::from_millis(500),
            fast_fall_interval: Duration::from_millis(50),
            delays: ResolveDelays::default(),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Checks the palette size against what a session supports.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        session_palette(self.palette_size)
    }
}

pub(crate) fn session_palette(size: u8) -> Result<Palette, ConfigError> {
    let palette = Palette::new(size)?;
    if !(MIN_SESSION_COLORS..=MAX_SESSION_COLORS).contains(&size) {
        return Err(ConfigError::UnsupportedPaletteSize {
            size,
            min: MIN_SESSION_COLORS,
            max: MAX_SESSION_COLORS,
        });
    }
    Ok(palette)
}

/// Pauses inserted between chain steps so a renderer can animate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolveDelays {
    /// After the settle that follows a lock.
    #[serde(with = "millis")]
    pub first_drop: Duration,
    /// After every later settle.
    #[serde(with = "millis")]
    pub drop: Duration,
    /// While found groups are highlighted, before they are removed.
    #[serde(with = "millis")]
    pub clear: Duration,
}

impl Default for ResolveDelays {
    fn default() -> Self {
        Self {
            first_drop: Duration::from_millis(100),
            drop: Duration::from_millis(50),
            clear: Duration::from_millis(200),
        }
    }
}

impl ResolveDelays {
    /// All delays zero: resolutions finish within a single tick.
    pub const NONE: Self = Self {
        first_drop: Duration::ZERO,
        drop: Duration::ZERO,
        clear: Duration::ZERO,
    };

    /// How long to wait after `step` before taking the next one.
    #[must_use]
    pub fn after(&self, step: &ChainStep) -> Duration {
        match step {
            ChainStep::Settled { first: true, .. } => self.first_drop,
            ChainStep::Settled { first: false, .. } => self.drop,
            ChainStep::GroupsFound => self.clear,
            ChainStep::Cleared(_) | ChainStep::Stable => Duration::ZERO,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
