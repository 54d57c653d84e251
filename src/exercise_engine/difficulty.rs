//! Difficulty taxonomies and tier-keyed fallback tables.
//!
//! Internally every lookup is keyed by [`Tier`].  Callers speak one of two
//! boundary taxonomies:
//!
//! | Core            | Casual    | Tier         |
//! |-----------------|-----------|--------------|
//! | `basico`        | `facil`   | `Basico`     |
//! | `intermedio`    | `media`   | `Intermedio` |
//! | `avanzado`      | `dificil` | `Avanzado`   |
//! | `Legendario`    | `dificil` | `Avanzado`   |
//! | `Divino`        | `dificil` | `Avanzado`   |
//!
//! [`Difficulty::tier`] is the single normalization step; a generator calls it
//! once and uses the result for every range, operation and rule lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::exercise_engine::error::EngineError;

/// Inclusive `[min, max]` pair.
pub type Range = (i64, i64);

/// Fit `(min, max)` inside `[floor, ceiling]`, keeping `min <= max`.
pub fn clamp_range((min, max): Range, floor: i64, ceiling: i64) -> Range {
    let lo = min.clamp(floor, ceiling);
    (lo, max.clamp(lo, ceiling))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basico,
    Intermedio,
    Avanzado,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basico, Tier::Intermedio, Tier::Avanzado];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Basico     => "basico",
            Tier::Intermedio => "intermedio",
            Tier::Avanzado   => "avanzado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreDifficulty {
    #[serde(rename = "basico")]
    Basico,
    #[serde(rename = "intermedio")]
    Intermedio,
    #[serde(rename = "avanzado")]
    Avanzado,
    Legendario,
    Divino,
}

impl CoreDifficulty {
    pub const ALL: [CoreDifficulty; 5] = [
        CoreDifficulty::Basico,
        CoreDifficulty::Intermedio,
        CoreDifficulty::Avanzado,
        CoreDifficulty::Legendario,
        CoreDifficulty::Divino,
    ];

    pub fn tier(self) -> Tier {
        match self {
            CoreDifficulty::Basico     => Tier::Basico,
            CoreDifficulty::Intermedio => Tier::Intermedio,
            CoreDifficulty::Avanzado
            | CoreDifficulty::Legendario
            | CoreDifficulty::Divino   => Tier::Avanzado,
        }
    }

    /// Position in the core ordering, `basico` = 0 up to `Divino` = 4.
    pub fn rank(self) -> u8 {
        match self {
            CoreDifficulty::Basico     => 0,
            CoreDifficulty::Intermedio => 1,
            CoreDifficulty::Avanzado   => 2,
            CoreDifficulty::Legendario => 3,
            CoreDifficulty::Divino     => 4,
        }
    }

    pub fn is_at_least(self, minimum: CoreDifficulty) -> bool {
        self.rank() >= minimum.rank()
    }

    /// Multiplier applied by [`CoreDifficulty::scale_range`].
    pub fn scale_factor(self) -> f64 {
        match self {
            CoreDifficulty::Basico     => 0.8,
            CoreDifficulty::Intermedio => 1.0,
            CoreDifficulty::Avanzado   => 1.2,
            CoreDifficulty::Legendario => 1.4,
            CoreDifficulty::Divino     => 1.6,
        }
    }

    /// Scale a base range by this difficulty, never dropping below `min_floor`
    /// and never producing `max < min`.
    pub fn scale_range(self, min: i64, max: i64, min_floor: i64) -> Range {
        let factor = self.scale_factor();
        let lo = ((min as f64) * factor).round() as i64;
        let lo = lo.max(min_floor);
        let hi = ((max as f64) * factor).round() as i64;
        (lo, hi.max(lo))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoreDifficulty::Basico     => "basico",
            CoreDifficulty::Intermedio => "intermedio",
            CoreDifficulty::Avanzado   => "avanzado",
            CoreDifficulty::Legendario => "Legendario",
            CoreDifficulty::Divino     => "Divino",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasualDifficulty {
    Facil,
    Media,
    Dificil,
}

impl CasualDifficulty {
    pub const ALL: [CasualDifficulty; 3] =
        [CasualDifficulty::Facil, CasualDifficulty::Media, CasualDifficulty::Dificil];

    pub fn tier(self) -> Tier {
        match self {
            CasualDifficulty::Facil   => Tier::Basico,
            CasualDifficulty::Media   => Tier::Intermedio,
            CasualDifficulty::Dificil => Tier::Avanzado,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CasualDifficulty::Facil   => "facil",
            CasualDifficulty::Media   => "media",
            CasualDifficulty::Dificil => "dificil",
        }
    }
}

/// A difficulty as received at the boundary, in either taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Difficulty {
    Core(CoreDifficulty),
    Casual(CasualDifficulty),
}

impl Difficulty {
    pub fn tier(self) -> Tier {
        match self {
            Difficulty::Core(c)   => c.tier(),
            Difficulty::Casual(c) => c.tier(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Core(c)   => c.as_str(),
            Difficulty::Casual(c) => c.as_str(),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Core(CoreDifficulty::Basico)
    }
}

impl From<CoreDifficulty> for Difficulty {
    fn from(d: CoreDifficulty) -> Self {
        Difficulty::Core(d)
    }
}

impl From<CasualDifficulty> for Difficulty {
    fn from(d: CasualDifficulty) -> Self {
        Difficulty::Casual(d)
    }
}

impl From<Tier> for Difficulty {
    fn from(t: Tier) -> Self {
        Difficulty::Core(tier_to_core(t))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = match s {
            "basico"     => CoreDifficulty::Basico.into(),
            "intermedio" => CoreDifficulty::Intermedio.into(),
            "avanzado"   => CoreDifficulty::Avanzado.into(),
            "Legendario" => CoreDifficulty::Legendario.into(),
            "Divino"     => CoreDifficulty::Divino.into(),
            "facil"      => CasualDifficulty::Facil.into(),
            "media"      => CasualDifficulty::Media.into(),
            "dificil"    => CasualDifficulty::Dificil.into(),
            other => return Err(EngineError::UnknownDifficulty(other.to_string())),
        };
        Ok(d)
    }
}

fn tier_to_core(t: Tier) -> CoreDifficulty {
    match t {
        Tier::Basico     => CoreDifficulty::Basico,
        Tier::Intermedio => CoreDifficulty::Intermedio,
        Tier::Avanzado   => CoreDifficulty::Avanzado,
    }
}

/// Casual values map onto their core tier; core values pass through.
pub fn to_core(d: Difficulty) -> CoreDifficulty {
    match d {
        Difficulty::Core(c)   => c,
        Difficulty::Casual(c) => tier_to_core(c.tier()),
    }
}

/// Lossy: both legendary tiers become `dificil`.
pub fn to_casual(d: Difficulty) -> CasualDifficulty {
    match d.tier() {
        Tier::Basico     => CasualDifficulty::Facil,
        Tier::Intermedio => CasualDifficulty::Media,
        Tier::Avanzado   => CasualDifficulty::Dificil,
    }
}

// ---------------------------------------------------------------------------
// Tier-keyed tables
// ---------------------------------------------------------------------------

/// One value per canonical tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable<T> {
    pub basico: T,
    pub intermedio: T,
    pub avanzado: T,
}

impl<T> TierTable<T> {
    pub const fn new(basico: T, intermedio: T, avanzado: T) -> Self {
        TierTable { basico, intermedio, avanzado }
    }

    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Basico     => &self.basico,
            Tier::Intermedio => &self.intermedio,
            Tier::Avanzado   => &self.avanzado,
        }
    }
}

impl<T: Clone> TierTable<T> {
    /// Shallow merge: each override present replaces its tier wholesale.
    pub fn merged(&self, overrides: &TierOverrides<T>) -> TierTable<T> {
        TierTable {
            basico: overrides.basico.clone().unwrap_or_else(|| self.basico.clone()),
            intermedio: overrides.intermedio.clone().unwrap_or_else(|| self.intermedio.clone()),
            avanzado: overrides.avanzado.clone().unwrap_or_else(|| self.avanzado.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOverrides<T> {
    pub basico: Option<T>,
    pub intermedio: Option<T>,
    pub avanzado: Option<T>,
}

impl<T> Default for TierOverrides<T> {
    fn default() -> Self {
        TierOverrides { basico: None, intermedio: None, avanzado: None }
    }
}

/// Overrides keyed by the casual names, for callers that think in
/// `facil`/`media`/`dificil`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasualOverrides<T> {
    pub facil: Option<T>,
    pub media: Option<T>,
    pub dificil: Option<T>,
}

impl<T> Default for CasualOverrides<T> {
    fn default() -> Self {
        CasualOverrides { facil: None, media: None, dificil: None }
    }
}

impl<T> From<CasualOverrides<T>> for TierOverrides<T> {
    fn from(c: CasualOverrides<T>) -> Self {
        TierOverrides { basico: c.facil, intermedio: c.media, avanzado: c.dificil }
    }
}

/// Built-in casual defaults: facil [1,20], media [1,100], dificil [1,999].
pub const CASUAL_DEFAULT_RANGES: TierTable<Range> = TierTable::new((1, 20), (1, 100), (1, 999));

/// Range for `difficulty` from the casual default table, shallow-merged with
/// `overrides`.
pub fn range_for_casual(difficulty: Difficulty, overrides: &CasualOverrides<Range>) -> Range {
    let merged = CASUAL_DEFAULT_RANGES.merged(&overrides.clone().into());
    *merged.get(difficulty.tier())
}

/// Range for `difficulty` from a caller-supplied core table, shallow-merged
/// with `overrides`.
pub fn range_for_core(
    difficulty: Difficulty,
    defaults: &TierTable<Range>,
    overrides: &TierOverrides<Range>,
) -> Range {
    *defaults.merged(overrides).get(difficulty.tier())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_round_trip_is_identity_on_base_tiers() {
        for core in [CoreDifficulty::Basico, CoreDifficulty::Intermedio, CoreDifficulty::Avanzado] {
            let casual = to_casual(core.into());
            assert_eq!(to_core(casual.into()), core);
        }
    }

    #[test]
    fn casual_round_trip_is_identity() {
        for casual in CasualDifficulty::ALL {
            let core = to_core(casual.into());
            assert_eq!(to_casual(core.into()), casual);
        }
    }

    #[test]
    fn legendary_tiers_collapse_to_dificil() {
        assert_eq!(to_casual(CoreDifficulty::Legendario.into()), CasualDifficulty::Dificil);
        assert_eq!(to_casual(CoreDifficulty::Divino.into()), CasualDifficulty::Dificil);
        assert_eq!(Difficulty::from(CoreDifficulty::Divino).tier(), Tier::Avanzado);
        // lossy: the round trip lands on avanzado, not on the legendary value
        let back = to_core(to_casual(CoreDifficulty::Legendario.into()).into());
        assert_eq!(back, CoreDifficulty::Avanzado);
    }

    #[test]
    fn to_core_is_identity_on_core_values() {
        for core in CoreDifficulty::ALL {
            assert_eq!(to_core(core.into()), core);
        }
    }

    #[test]
    fn parses_and_serializes_boundary_strings() {
        for s in ["basico", "intermedio", "avanzado", "Legendario", "Divino", "facil", "media", "dificil"] {
            let d: Difficulty = s.parse().unwrap();
            assert_eq!(d.to_string(), s);
            let json = serde_json::to_string(&d).unwrap();
            assert_eq!(json, format!("\"{s}\""));
            let back: Difficulty = serde_json::from_str(&json).unwrap();
            assert_eq!(back, d);
        }
        assert!(matches!("extremo".parse::<Difficulty>(), Err(EngineError::UnknownDifficulty(_))));
    }

    #[test]
    fn casual_ranges_use_defaults_then_overrides() {
        let none = CasualOverrides::default();
        assert_eq!(range_for_casual(CasualDifficulty::Facil.into(), &none), (1, 20));
        assert_eq!(range_for_casual(CoreDifficulty::Intermedio.into(), &none), (1, 100));
        assert_eq!(range_for_casual(CoreDifficulty::Divino.into(), &none), (1, 999));

        let some = CasualOverrides { media: Some((1, 50)), ..Default::default() };
        assert_eq!(range_for_casual(CasualDifficulty::Media.into(), &some), (1, 50));
        assert_eq!(range_for_casual(CasualDifficulty::Facil.into(), &some), (1, 20));
    }

    #[test]
    fn core_ranges_merge_shallowly() {
        let defaults = TierTable::new((2, 20), (3, 40), (4, 60));
        let overrides = TierOverrides { avanzado: Some((10, 11)), ..Default::default() };
        assert_eq!(range_for_core(CasualDifficulty::Facil.into(), &defaults, &overrides), (2, 20));
        assert_eq!(range_for_core(CoreDifficulty::Legendario.into(), &defaults, &overrides), (10, 11));
    }

    #[test]
    fn clamp_range_stays_inside_bounds() {
        assert_eq!(clamp_range((100, 200), 2, 50), (50, 50));
        assert_eq!(clamp_range((-5, 8), 2, 50), (2, 8));
        assert_eq!(clamp_range((30, 10), 2, 50), (30, 30));
        assert_eq!(clamp_range((3, 9), 2, 50), (3, 9));
    }

    #[test]
    fn scale_range_respects_floor_and_order() {
        assert_eq!(CoreDifficulty::Basico.scale_range(1, 10, 1), (1, 8));
        assert_eq!(CoreDifficulty::Divino.scale_range(10, 100, 1), (16, 160));
        let (lo, hi) = CoreDifficulty::Basico.scale_range(5, 5, 10);
        assert_eq!((lo, hi), (10, 10));
        assert!(CoreDifficulty::Divino.is_at_least(CoreDifficulty::Legendario));
        assert!(!CoreDifficulty::Intermedio.is_at_least(CoreDifficulty::Avanzado));
    }
}
