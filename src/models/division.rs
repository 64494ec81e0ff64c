//! Division model.
//!
//! A division identifies a group of players: league, age tier and
//! division number. Event identifiers carry their division, and most
//! automatic incompatibilities are derived from division equality.

use serde::{Deserialize, Serialize};

/// Division marker meaning "every division of the tier".
pub const ALL_DIVISIONS: &str = "all";

/// League whose U12T1/U13T1 tiers carry special practices.
pub const SPECIAL_LEAGUE: &str = "CMSA";

/// Tiers paired with their special-practice tier inside [`SPECIAL_LEAGUE`].
const SPECIAL_TIERS: [(&str, &str); 2] = [("U12T1", "U12T1S"), ("U13T1", "U13T1S")];

/// A division of players.
///
/// # Example
///
/// ```
/// use league_schedule::models::Division;
///
/// let d1 = Division::new("CMSA", "U13T3", "01");
/// let all = Division::new("CMSA", "U13T3", "all");
/// assert!(d1.same(&all));
/// assert!(!d1.same(&Division::new("CMSA", "U13T3", "02")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Division {
    /// League name (e.g., "CMSA").
    pub league: String,
    /// Age tier (e.g., "U13T3").
    pub tier: String,
    /// Division number, or `"all"`.
    pub div: String,
}

impl Division {
    /// Creates a division.
    pub fn new(league: impl Into<String>, tier: impl Into<String>, div: impl Into<String>) -> Self {
        Self {
            league: league.into(),
            tier: tier.into(),
            div: div.into(),
        }
    }

    /// Evening divisions are numbered from 9.
    pub fn is_evening(&self) -> bool {
        self.div.starts_with('9')
    }

    /// Whether the tier is one of U15 through U19.
    pub fn is_u15_to_u19(&self) -> bool {
        ["U15", "U16", "U17", "U18", "U19"]
            .iter()
            .any(|prefix| self.tier.starts_with(prefix))
    }

    /// Whether this division covers every division of its tier.
    pub fn is_all_divisions(&self) -> bool {
        self.div == ALL_DIVISIONS
    }

    /// Whether both divisions share a tier.
    pub fn same_tier(&self, other: &Division) -> bool {
        self.tier == other.tier
    }

    /// Whether both refer to the same group of players.
    ///
    /// League and tier must match; divisions match when equal or when
    /// either side is `"all"`. Inside CMSA, `U12T1`/`U12T1S` and
    /// `U13T1`/`U13T1S` are treated as the same division.
    pub fn same(&self, other: &Division) -> bool {
        if self.league == SPECIAL_LEAGUE && other.league == SPECIAL_LEAGUE {
            let linked = SPECIAL_TIERS.iter().any(|&(base, special)| {
                (self.tier == base && other.tier == special)
                    || (self.tier == special && other.tier == base)
            });
            if linked {
                return true;
            }
        }

        self.league == other.league
            && self.tier == other.tier
            && (self.div == other.div || self.is_all_divisions() || other.is_all_divisions())
    }

    /// Special-practice tier for a base tier, if the league has one.
    pub(crate) fn special_practice_tier(&self) -> Option<&'static str> {
        if self.league != SPECIAL_LEAGUE {
            return None;
        }
        SPECIAL_TIERS
            .iter()
            .find(|(base, _)| self.tier == *base)
            .map(|&(_, special)| special)
    }

    /// Whether this is a CMSA special-practice tier.
    pub(crate) fn is_special_practice_tier(&self) -> bool {
        self.league == SPECIAL_LEAGUE
            && SPECIAL_TIERS.iter().any(|(_, special)| self.tier == *special)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_requires_league_and_tier() {
        let a = Division::new("CMSA", "U13T3", "01");
        assert!(a.same(&Division::new("CMSA", "U13T3", "01")));
        assert!(!a.same(&Division::new("CUSA", "U13T3", "01")));
        assert!(!a.same(&Division::new("CMSA", "U12T3", "01")));
        assert!(!a.same(&Division::new("CMSA", "U13T3", "02")));
    }

    #[test]
    fn test_same_with_all_wildcard() {
        let a = Division::new("CMSA", "U13T3", "01");
        let all = Division::new("CMSA", "U13T3", "all");
        assert!(a.same(&all));
        assert!(all.same(&a));
        assert!(!all.same(&Division::new("CMSA", "U14T3", "01")));
    }

    #[test]
    fn test_special_practice_tiers_are_linked() {
        let game = Division::new("CMSA", "U12T1", "01");
        let special = Division::new("CMSA", "U12T1S", "all");
        assert!(game.same(&special));
        assert!(special.same(&game));

        let u13 = Division::new("CMSA", "U13T1", "03");
        assert!(u13.same(&Division::new("CMSA", "U13T1S", "all")));
        assert!(!u13.same(&special));

        // Only inside CMSA
        let other = Division::new("CUSA", "U12T1", "01");
        assert!(!other.same(&Division::new("CUSA", "U12T1S", "all")));
    }

    #[test]
    fn test_evening_and_age_band() {
        assert!(Division::new("CMSA", "U13T3", "91").is_evening());
        assert!(!Division::new("CMSA", "U13T3", "01").is_evening());
        assert!(!Division::new("CMSA", "U13T3", "all").is_evening());

        assert!(Division::new("CMSA", "U17T1", "01").is_u15_to_u19());
        assert!(Division::new("CMSA", "U19T2", "01").is_u15_to_u19());
        assert!(!Division::new("CMSA", "U14T1", "01").is_u15_to_u19());
    }

    #[test]
    fn test_special_practice_tier_lookup() {
        assert_eq!(
            Division::new("CMSA", "U12T1", "01").special_practice_tier(),
            Some("U12T1S")
        );
        assert_eq!(Division::new("CMSA", "U12T2", "01").special_practice_tier(), None);
        assert_eq!(Division::new("CUSA", "U13T1", "01").special_practice_tier(), None);
        assert!(Division::new("CMSA", "U13T1S", "all").is_special_practice_tier());
    }
}
