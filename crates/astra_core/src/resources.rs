//! Resource bundles and the arithmetic gameplay performs on them.
//!
//! `Resources` covers the three transportable resources. Dark matter is
//! account-scoped and energy is a per-planet balance, so both live as
//! plain [`Fixed`] scalars on their owners rather than in the bundle.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};

/// Identifies a single resource channel in reports and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Metal, the bulk construction resource.
    Metal,
    /// Crystal, the advanced construction resource.
    Crystal,
    /// Deuterium, fuel and high-tech component.
    Deuterium,
    /// Dark matter, the account-scoped premium resource.
    DarkMatter,
    /// Energy, the per-planet production balance.
    Energy,
}

impl ResourceKind {
    /// Stable lower-case name used in errors and persisted reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Metal => "metal",
            Self::Crystal => "crystal",
            Self::Deuterium => "deuterium",
            Self::DarkMatter => "darkMatter",
            Self::Energy => "energy",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bundle of the three transportable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resources {
    /// Metal amount.
    #[serde(with = "fixed_serde")]
    pub metal: Fixed,
    /// Crystal amount.
    #[serde(with = "fixed_serde")]
    pub crystal: Fixed,
    /// Deuterium amount.
    #[serde(with = "fixed_serde")]
    pub deuterium: Fixed,
}

impl Resources {
    /// Empty bundle.
    pub const ZERO: Self = Self {
        metal: Fixed::ZERO,
        crystal: Fixed::ZERO,
        deuterium: Fixed::ZERO,
    };

    /// Build a bundle from whole-unit amounts.
    #[must_use]
    pub fn new(metal: i64, crystal: i64, deuterium: i64) -> Self {
        Self {
            metal: Fixed::from_num(metal),
            crystal: Fixed::from_num(crystal),
            deuterium: Fixed::from_num(deuterium),
        }
    }

    /// Sum of all three channels.
    #[must_use]
    pub fn total(self) -> Fixed {
        self.metal
            .saturating_add(self.crystal)
            .saturating_add(self.deuterium)
    }

    /// Whether every channel is zero or less.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.metal <= Fixed::ZERO && self.crystal <= Fixed::ZERO && self.deuterium <= Fixed::ZERO
    }

    /// Whether this bundle covers `cost` on every channel.
    #[must_use]
    pub fn can_afford(self, cost: Self) -> bool {
        self.metal >= cost.metal && self.crystal >= cost.crystal && self.deuterium >= cost.deuterium
    }

    /// Deduct `cost`, or report the first short channel without mutating.
    ///
    /// Spends are all-or-nothing: on `Err` the bundle is unchanged.
    pub fn checked_spend(&mut self, cost: Self) -> Result<()> {
        for (kind, have, need) in [
            (ResourceKind::Metal, self.metal, cost.metal),
            (ResourceKind::Crystal, self.crystal, cost.crystal),
            (ResourceKind::Deuterium, self.deuterium, cost.deuterium),
        ] {
            if have < need {
                return Err(GameError::InsufficientResources {
                    resource: kind.name().to_string(),
                    required: need.to_num::<i64>(),
                    available: have.to_num::<i64>(),
                });
            }
        }
        self.metal -= cost.metal;
        self.crystal -= cost.crystal;
        self.deuterium -= cost.deuterium;
        Ok(())
    }

    /// Subtract per channel, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        let clamp = |v: Fixed| if v < Fixed::ZERO { Fixed::ZERO } else { v };
        Self {
            metal: clamp(self.metal - other.metal),
            crystal: clamp(self.crystal - other.crystal),
            deuterium: clamp(self.deuterium - other.deuterium),
        }
    }

    /// Per-channel minimum of two bundles.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self {
            metal: self.metal.min(other.metal),
            crystal: self.crystal.min(other.crystal),
            deuterium: self.deuterium.min(other.deuterium),
        }
    }

    /// Scale every channel by a fixed-point factor.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self {
            metal: self.metal.saturating_mul(factor),
            crystal: self.crystal.saturating_mul(factor),
            deuterium: self.deuterium.saturating_mul(factor),
        }
    }

    /// Read one transportable channel.
    #[must_use]
    pub fn get(self, kind: ResourceKind) -> Fixed {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
            ResourceKind::DarkMatter | ResourceKind::Energy => Fixed::ZERO,
        }
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            metal: self.metal.saturating_add(rhs.metal),
            crystal: self.crystal.saturating_add(rhs.crystal),
            deuterium: self.deuterium.saturating_add(rhs.deuterium),
        }
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
