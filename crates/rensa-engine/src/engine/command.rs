use serde::{Deserialize, Serialize};

/// A player input, already mapped from whatever device produced it.
///
/// Parses from the variant name:
///
/// ```
/// use rensa_engine::Command;
///
/// let command: Command = "HardDrop".parse().unwrap();
/// assert_eq!(command, Command::HardDrop);
/// assert!("Hold".parse::<Command>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::FromStr,
)]
pub enum Command {
    MoveLeft,
    MoveRight,
    /// Moves the pair down one row immediately.
    SoftDrop,
    /// Down key pressed: fall at the fast interval until released.
    HoldFastFall,
    ReleaseFastFall,
    RotateLeft,
    RotateRight,
    HardDrop,
    TogglePause,
}

impl Command {
    pub const ALL: [Self; 9] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::SoftDrop,
        Self::HoldFastFall,
        Self::ReleaseFastFall,
        Self::RotateLeft,
        Self::RotateRight,
        Self::HardDrop,
        Self::TogglePause,
    ];

    /// Whether the command manipulates the falling pair.
    #[must_use]
    pub const fn is_movement(self) -> bool {
        !matches!(self, Self::TogglePause)
    }
}
