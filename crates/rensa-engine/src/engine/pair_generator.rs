use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ConfigError, PuyoColor};

/// The set of colors pairs are drawn from: the first `size` colors of [`PuyoColor::ALL`].
///
/// ```
/// use rensa_engine::{Palette, PuyoColor};
///
/// let palette = Palette::new(3).unwrap();
/// assert_eq!(palette.colors(), [PuyoColor::Red, PuyoColor::Blue, PuyoColor::Green]);
/// assert!(Palette::new(0).is_err());
/// assert!(Palette::new(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Palette {
    size: u8,
}

impl Default for Palette {
    fn default() -> Self {
        Self::FULL
    }
}

impl Palette {
    /// All four colors.
    #[allow(clippy::cast_possible_truncation)]
    pub const FULL: Self = Self {
        size: PuyoColor::LEN as u8,
    };

    pub fn new(size: u8) -> Result<Self, ConfigError> {
        if size == 0 || usize::from(size) > PuyoColor::LEN {
            return Err(ConfigError::PaletteSize {
                size,
                max: PuyoColor::LEN,
            });
        }
        Ok(Self { size })
    }

    #[must_use]
    pub const fn size(self) -> u8 {
        self.size
    }

    #[must_use]
    pub fn colors(self) -> &'static [PuyoColor] {
        &PuyoColor::ALL[..usize::from(self.size)]
    }

    #[must_use]
    pub fn contains(self, color: PuyoColor) -> bool {
        self.colors().contains(&color)
    }
}

impl TryFrom<u8> for Palette {
    type Error = ConfigError;

    fn try_from(size: u8) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<Palette> for u8 {
    fn from(palette: Palette) -> Self {
        palette.size
    }
}

/// Seed for deterministic pair generation.
///
/// A 128-bit seed for the generator's RNG; the same seed always yields the
/// same color sequence for the same palette. Serialized as a 32-character hex
/// string.
///
/// ```
/// use rensa_engine::{PairGenerator, PairSeed, Palette};
/// use rand::Rng as _;
///
/// let seed: PairSeed = rand::rng().random();
/// let mut a = PairGenerator::with_seed(seed);
/// let mut b = PairGenerator::with_seed(seed);
/// assert_eq!(a.next_pair(Palette::FULL), b.next_pair(Palette::FULL));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSeed([u8; 16]);

impl PairSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl Serialize for PairSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PairSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<PairSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PairSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PairSeed(seed)
    }
}

#[derive(Debug, Clone)]
enum ColorSource {
    Random(Pcg32),
    Scripted { colors: Vec<PuyoColor>, cursor: usize },
}

/// Produces the colors of each new pair.
///
/// In random mode both colors are independent uniform draws from the palette.
/// Scripted mode cycles through a fixed color list, two entries per pair, and
/// ignores the palette; it exists for fixtures and drills.
///
/// ```
/// use rensa_engine::{PairGenerator, Palette, PuyoColor};
///
/// let mut generator =
///     PairGenerator::scripted([PuyoColor::Red, PuyoColor::Blue, PuyoColor::Green]).unwrap();
/// let palette = Palette::FULL;
/// assert_eq!(generator.next_pair(palette), (PuyoColor::Red, PuyoColor::Blue));
/// assert_eq!(generator.next_pair(palette), (PuyoColor::Green, PuyoColor::Red));
/// ```
#[derive(Debug, Clone)]
pub struct PairGenerator {
    source: ColorSource,
}

impl Default for PairGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PairGenerator {
    /// Creates a random generator with a fresh seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PairSeed) -> Self {
        Self {
            source: ColorSource::Random(Pcg32::from_seed(seed.0)),
        }
    }

    /// Creates a generator replaying `colors` in a loop.
    ///
    /// Returns `None` when `colors` is empty.
    pub fn scripted<I>(colors: I) -> Option<Self>
    where
        I: IntoIterator<Item = PuyoColor>,
    {
        let colors: Vec<_> = colors.into_iter().collect();
        if colors.is_empty() {
            return None;
        }
        Some(Self {
            source: ColorSource::Scripted { colors, cursor: 0 },
        })
    }

    #[must_use]
    pub fn is_scripted(&self) -> bool {
        matches!(self.source, ColorSource::Scripted { .. })
    }

    /// Draws the (pivot, secondary) colors of the next pair.
    pub fn next_pair(&mut self, palette: Palette) -> (PuyoColor, PuyoColor) {
        (self.next_color(palette), self.next_color(palette))
    }

    fn next_color(&mut self, palette: Palette) -> PuyoColor {
        match &mut self.source {
            ColorSource::Random(rng) => {
                let colors = palette.colors();
                colors[rng.random_range(0..colors.len())]
            }
            ColorSource::Scripted { colors, cursor } => {
                let color = colors[*cursor];
                *cursor = (*cursor + 1) % colors.len();
                color
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_bounds() {
        for size in 1..=4 {
            let palette = Palette::new(size).unwrap();
            assert_eq!(palette.colors().len(), usize::from(size));
        }
        assert_eq!(
            Palette::new(0),
            Err(ConfigError::PaletteSize { size: 0, max: 4 })
        );
        assert_eq!(
            Palette::new(7),
            Err(ConfigError::PaletteSize { size: 7, max: 4 })
        );
        assert_eq!(Palette::default(), Palette::FULL);
    }

    #[test]
    fn test_palette_serde() {
        let palette: Palette = serde_json::from_str("3").unwrap();
        assert_eq!(palette.size(), 3);
        assert_eq!(serde_json::to_string(&palette).unwrap(), "3");
        assert!(serde_json::from_str::<Palette>("9").is_err());
    }

    #[test]
    fn test_random_pairs_stay_in_palette() {
        let palette = Palette::new(3).unwrap();
        let mut generator = PairGenerator::with_seed(PairSeed::from_u128(42));
        for _ in 0..500 {
            let (a, b) = generator.next_pair(palette);
            assert!(palette.contains(a));
            assert!(palette.contains(b));
            assert!(!palette.contains(PuyoColor::Yellow));
        }
    }

    #[test]
    fn test_random_pairs_use_every_color() {
        let palette = Palette::FULL;
        let mut generator = PairGenerator::with_seed(PairSeed::from_u128(7));
        let mut seen = [false; PuyoColor::LEN];
        for _ in 0..200 {
            let (a, b) = generator.next_pair(palette);
            seen[a as usize] = true;
            seen[b as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_single_color_palette() {
        let palette = Palette::new(1).unwrap();
        let mut generator = PairGenerator::new();
        for _ in 0..20 {
            assert_eq!(
                generator.next_pair(palette),
                (PuyoColor::Red, PuyoColor::Red)
            );
        }
    }

    #[test]
    fn test_scripted_cycles() {
        assert!(PairGenerator::scripted([]).is_none());

        let mut generator = PairGenerator::scripted([PuyoColor::Yellow]).unwrap();
        assert!(generator.is_scripted());
        // Scripted colors bypass the palette.
        let palette = Palette::new(2).unwrap();
        for _ in 0..3 {
            assert_eq!(
                generator.next_pair(palette),
                (PuyoColor::Yellow, PuyoColor::Yellow)
            );
        }
    }

    mod pair_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: PairSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: PairSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = PairSeed::from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
            assert_eq!(seed, PairSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210));
        }

        #[test]
        fn test_deserialize_uppercase_hex() {
            let json = "\"0123456789ABCDEFFEDCBA9876543210\"";
            let deserialized: PairSeed = serde_json::from_str(json).unwrap();
            assert_eq!(
                deserialized,
                PairSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210)
            );
        }

        #[test]
        fn test_invalid_strings() {
            for json in [
                "\"ghijklmnopqrstuvwxyzghijklmnopqr\"",
                "\"0123456789abcdef0123456789abcde\"",
                "\"0123456789abcdef0123456789abcdef0\"",
                "\"\"",
            ] {
                let err = serde_json::from_str::<PairSeed>(json).unwrap_err();
                assert!(err.to_string().contains("invalid hex"), "{json}: {err}");
            }
        }

        #[test]
        fn test_same_seed_same_sequence() {
            let seed = PairSeed::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788);
            let mut a = PairGenerator::with_seed(seed);
            let mut b = PairGenerator::with_seed(seed);
            for _ in 0..20 {
                assert_eq!(a.next_pair(Palette::FULL), b.next_pair(Palette::FULL));
            }
        }
    }
}
