//! Officer catalog: hireable specialists paid in dark matter.

use serde::{Deserialize, Serialize};

use crate::math::Fixed;
use crate::time::MS_PER_DAY;

/// Length of one hire term in days.
pub const OFFICER_TERM_DAYS: i64 = 30;

/// Every hireable officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OfficerKind {
    /// Adds construction queue slots and speeds up building.
    Commander,
    /// Adds fleet slots and speeds up fleets.
    Admiral,
    /// Boosts energy output and defense strength.
    Engineer,
    /// Boosts mine yields and storage capacity.
    Geologist,
    /// Speeds up research.
    Technocrat,
    /// Boosts dark matter income and cuts fuel burn.
    DarkMatterSpecialist,
}

impl OfficerKind {
    /// All officers in persisted field order.
    pub const ALL: [Self; 6] = [
        Self::Commander,
        Self::Admiral,
        Self::Engineer,
        Self::Geologist,
        Self::Technocrat,
        Self::DarkMatterSpecialist,
    ];

    /// Stable identifier matching the persisted field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Commander => "commander",
            Self::Admiral => "admiral",
            Self::Engineer => "engineer",
            Self::Geologist => "geologist",
            Self::Technocrat => "technocrat",
            Self::DarkMatterSpecialist => "darkMatterSpecialist",
        }
    }

    /// Dark matter cost for one term.
    #[must_use]
    pub fn term_cost(self) -> Fixed {
        let cost = match self {
            Self::Commander => 2_500,
            Self::Admiral => 2_000,
            Self::Engineer => 2_000,
            Self::Geologist => 2_500,
            Self::Technocrat => 1_500,
            Self::DarkMatterSpecialist => 3_000,
        };
        Fixed::from_num(cost)
    }

    /// Term length in milliseconds.
    #[must_use]
    pub const fn term_ms(self) -> i64 {
        OFFICER_TERM_DAYS * MS_PER_DAY
    }
}
