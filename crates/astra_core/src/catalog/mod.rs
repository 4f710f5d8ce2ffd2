//! Static game rules: unit kinds, costs, stats and prerequisites.
//!
//! Pure data and lookup tables, no game state. Everything here is
//! total over the kind enums, so adding a variant without its table
//! entries fails to compile.

pub mod buildings;
pub mod defense;
pub mod officers;
pub mod ships;
pub mod technologies;

pub use buildings::{BuildingKind, BuildingLevels};
pub use defense::{DefenseCounts, DefenseKind};
pub use officers::{OfficerKind, OFFICER_TERM_DAYS};
pub use ships::{CombatStats, FleetComposition, ShipKind};
pub use technologies::{TechnologyKind, TechnologyLevels};

/// A single prerequisite for a building, technology or unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Requires a building at or above the given level.
    Building(BuildingKind, u32),
    /// Requires a technology at or above the given level.
    Technology(TechnologyKind, u32),
}

impl Requirement {
    /// Whether this requirement is satisfied by the given state.
    #[must_use]
    pub fn satisfied_by(&self, buildings: &BuildingLevels, technologies: &TechnologyLevels) -> bool {
        match *self {
            Self::Building(kind, level) => buildings.level(kind) >= level,
            Self::Technology(kind, level) => technologies.level(kind) >= level,
        }
    }

    /// Human-readable description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match *self {
            Self::Building(kind, level) => format!("{} level {level}", kind.name()),
            Self::Technology(kind, level) => format!("{} level {level}", kind.name()),
        }
    }
}

/// Check a requirement list, naming the first unmet entry.
pub fn check_requirements(
    requirements: &[Requirement],
    buildings: &BuildingLevels,
    technologies: &TechnologyLevels,
) -> Result<(), String> {
    for requirement in requirements {
        if !requirement.satisfied_by(buildings, technologies) {
            return Err(requirement.describe());
        }
    }
    Ok(())
}

/// Everything currently unlocked by a planet's buildings and the
/// owner's technologies.
///
/// Snapshots taken before and after a completion diff into the
/// newly-available entries that drive unlock notifications.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnlockSet {
    /// Buildings whose prerequisites are met.
    pub buildings: Vec<BuildingKind>,
    /// Technologies whose prerequisites are met.
    pub technologies: Vec<TechnologyKind>,
    /// Ships whose prerequisites are met.
    pub ships: Vec<ShipKind>,
    /// Defense whose prerequisites are met.
    pub defense: Vec<DefenseKind>,
}

impl UnlockSet {
    /// Snapshot the unlock state for one planet and its owner.
    #[must_use]
    pub fn snapshot(buildings: &BuildingLevels, technologies: &TechnologyLevels) -> Self {
        let met = |reqs: &[Requirement]| {
            reqs.iter()
                .all(|r| r.satisfied_by(buildings, technologies))
        };
        Self {
            buildings: BuildingKind::ALL
                .into_iter()
                .filter(|k| met(k.requirements()))
                .collect(),
            technologies: TechnologyKind::ALL
                .into_iter()
                .filter(|k| met(k.requirements()))
                .collect(),
            ships: ShipKind::ALL
                .into_iter()
                .filter(|k| met(k.requirements()))
                .collect(),
            defense: DefenseKind::ALL
                .into_iter()
                .filter(|k| met(k.requirements()))
                .collect(),
        }
    }

    /// Entries present in `after` but not in this snapshot.
    #[must_use]
    pub fn newly_unlocked(&self, after: &Self) -> Self {
        Self {
            buildings: after
                .buildings
                .iter()
                .copied()
                .filter(|k| !self.buildings.contains(k))
                .collect(),
            technologies: after
                .technologies
                .iter()
                .copied()
                .filter(|k| !self.technologies.contains(k))
                .collect(),
            ships: after
                .ships
                .iter()
                .copied()
                .filter(|k| !self.ships.contains(k))
                .collect(),
            defense: after
                .defense
                .iter()
                .copied()
                .filter(|k| !self.defense.contains(k))
                .collect(),
        }
    }

    /// Whether nothing is contained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
            && self.technologies.is_empty()
            && self.ships.is_empty()
            && self.defense.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_requirements_reports_first_unmet() {
        let buildings = BuildingLevels {
            shipyard: 1,
            ..Default::default()
        };
        let technologies = TechnologyLevels::default();
        let reqs = [
            Requirement::Building(BuildingKind::Shipyard, 1),
            Requirement::Technology(TechnologyKind::CombustionDrive, 1),
        ];
        let err = check_requirements(&reqs, &buildings, &technologies).unwrap_err();
        assert_eq!(err, "combustionDrive level 1");
    }

    #[test]
    fn test_unlock_diff_detects_new_entries() {
        let technologies = TechnologyLevels::default();
        let before_buildings = BuildingLevels {
            robotics_factory: 1,
            ..Default::default()
        };
        let before = UnlockSet::snapshot(&before_buildings, &technologies);
        assert!(!before.buildings.contains(&BuildingKind::Shipyard));

        let after_buildings = BuildingLevels {
            robotics_factory: 2,
            ..Default::default()
        };
        let after = UnlockSet::snapshot(&after_buildings, &technologies);
        let fresh = before.newly_unlocked(&after);
        assert_eq!(fresh.buildings, vec![BuildingKind::Shipyard]);
        assert!(fresh.technologies.is_empty());
    }

    #[test]
    fn test_no_requirements_means_always_unlocked() {
        let snapshot = UnlockSet::snapshot(&BuildingLevels::default(), &TechnologyLevels::default());
        assert!(snapshot.buildings.contains(&BuildingKind::MetalMine));
        assert!(snapshot.defense.is_empty());
    }
}
