//! Officer roster and the bonuses active officers grant.
//!
//! Officers are hired for fixed terms with dark matter. Each grants a
//! small set of additive bonuses while active; when the term runs out
//! the officer goes inactive and the bonuses vanish until rehired.

use serde::{Deserialize, Serialize};

use crate::catalog::OfficerKind;
use crate::math::{percent, Fixed};
use crate::time::Timestamp;

/// Contract state for one officer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OfficerRecord {
    /// Whether the officer is currently on the payroll.
    pub active: bool,
    /// When the current engagement began.
    pub hired_at: Option<Timestamp>,
    /// When the current term runs out.
    pub expires_at: Option<Timestamp>,
}

impl OfficerRecord {
    /// Whether the officer contributes bonuses at `now`.
    ///
    /// A record can be flagged active while its term has already
    /// lapsed between engine runs; the expiry check makes bonuses
    /// stop at the right instant regardless of when the sweep runs.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.active && self.expires_at.map_or(true, |expiry| expiry > now)
    }
}

/// All six officer slots of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OfficerRoster {
    /// Construction oversight.
    pub commander: OfficerRecord,
    /// Fleet logistics.
    pub admiral: OfficerRecord,
    /// Power grid and fortifications.
    pub engineer: OfficerRecord,
    /// Mining operations.
    pub geologist: OfficerRecord,
    /// Research direction.
    pub technocrat: OfficerRecord,
    /// Dark matter handling.
    pub dark_matter_specialist: OfficerRecord,
}

impl OfficerRoster {
    /// The record for one officer.
    #[must_use]
    pub fn record(&self, kind: OfficerKind) -> &OfficerRecord {
        match kind {
            OfficerKind::Commander => &self.commander,
            OfficerKind::Admiral => &self.admiral,
            OfficerKind::Engineer => &self.engineer,
            OfficerKind::Geologist => &self.geologist,
            OfficerKind::Technocrat => &self.technocrat,
            OfficerKind::DarkMatterSpecialist => &self.dark_matter_specialist,
        }
    }

    fn record_mut(&mut self, kind: OfficerKind) -> &mut OfficerRecord {
        match kind {
            OfficerKind::Commander => &mut self.commander,
            OfficerKind::Admiral => &mut self.admiral,
            OfficerKind::Engineer => &mut self.engineer,
            OfficerKind::Geologist => &mut self.geologist,
            OfficerKind::Technocrat => &mut self.technocrat,
            OfficerKind::DarkMatterSpecialist => &mut self.dark_matter_specialist,
        }
    }

    /// Whether `kind` contributes bonuses at `now`.
    #[must_use]
    pub fn is_active(&self, kind: OfficerKind, now: Timestamp) -> bool {
        self.record(kind).is_active(now)
    }

    /// Engage or extend an officer for one term.
    ///
    /// Extending a running contract adds the term onto the current
    /// expiry, so paying early never loses time. Payment is the
    /// caller's concern.
    pub fn hire(&mut self, kind: OfficerKind, now: Timestamp) {
        let term = kind.term_ms();
        let record = self.record_mut(kind);
        let base = match record.expires_at {
            Some(expiry) if record.active && expiry > now => expiry,
            _ => {
                record.hired_at = Some(now);
                now
            }
        };
        record.active = true;
        record.expires_at = Some(base.saturating_add(term));
    }

    /// Deactivate officers whose terms have lapsed.
    ///
    /// Returns the kinds that expired on this sweep, each at most
    /// once per engagement.
    pub fn sweep_expired(&mut self, now: Timestamp) -> Vec<OfficerKind> {
        let mut expired = Vec::new();
        for kind in OfficerKind::ALL {
            let record = self.record_mut(kind);
            if record.active && record.expires_at.is_some_and(|expiry| expiry <= now) {
                record.active = false;
                expired.push(kind);
            }
        }
        expired
    }

    /// Officers active at `now`.
    pub fn active_kinds(&self, now: Timestamp) -> impl Iterator<Item = OfficerKind> + '_ {
        OfficerKind::ALL
            .into_iter()
            .filter(move |&kind| self.is_active(kind, now))
    }
}

// ============================================================================
// Bonuses
// ============================================================================

/// Aggregate of every bonus channel the active officers grant.
///
/// Channels are additive across officers. Percentages are stored as
/// fractions, so `0.10` means ten percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BonusSet {
    /// Construction time reduction.
    pub building_speed: Fixed,
    /// Research time reduction.
    pub research_speed: Fixed,
    /// Mine output increase.
    pub resource_production: Fixed,
    /// Dark matter collector output increase.
    pub dark_matter_production: Fixed,
    /// Power plant output increase.
    pub energy_production: Fixed,
    /// Fleet travel speed increase.
    pub fleet_speed: Fixed,
    /// Deuterium consumption reduction.
    pub fuel_reduction: Fixed,
    /// Defensive installation strength increase.
    pub defense: Fixed,
    /// Storage capacity increase.
    pub storage_capacity: Fixed,
    /// Extra concurrent construction queue slots.
    pub extra_build_queue: u32,
    /// Extra concurrent fleet mission slots.
    pub extra_fleet_slots: u32,
}

impl BonusSet {
    /// Bonuses granted by the officers active at `now`.
    #[must_use]
    pub fn from_roster(roster: &OfficerRoster, now: Timestamp) -> Self {
        let mut bonuses = Self::default();
        for kind in roster.active_kinds(now) {
            bonuses.add_officer(kind);
        }
        bonuses
    }

    fn add_officer(&mut self, kind: OfficerKind) {
        match kind {
            OfficerKind::Commander => {
                self.extra_build_queue += 2;
                self.building_speed += percent(10);
            }
            OfficerKind::Admiral => {
                self.extra_fleet_slots += 2;
                self.fleet_speed += percent(10);
            }
            OfficerKind::Engineer => {
                self.energy_production += percent(10);
                self.defense += percent(10);
            }
            OfficerKind::Geologist => {
                self.resource_production += percent(10);
                self.storage_capacity += percent(20);
            }
            OfficerKind::Technocrat => {
                self.research_speed += percent(25);
            }
            OfficerKind::DarkMatterSpecialist => {
                self.dark_matter_production += percent(50);
                self.fuel_reduction += percent(10);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::time::MS_PER_DAY;

    use super::*;

    #[test]
    fn test_fresh_hire_sets_term() {
        let mut roster = OfficerRoster::default();
        roster.hire(OfficerKind::Geologist, 1_000);
        let record = roster.record(OfficerKind::Geologist);
        assert!(record.active);
        assert_eq!(record.hired_at, Some(1_000));
        assert_eq!(record.expires_at, Some(1_000 + 30 * MS_PER_DAY));
        assert!(roster.is_active(OfficerKind::Geologist, 1_000));
    }

    #[test]
    fn test_renewal_extends_from_expiry_not_now() {
        let mut roster = OfficerRoster::default();
        roster.hire(OfficerKind::Technocrat, 0);
        // Renew halfway through the running term
        roster.hire(OfficerKind::Technocrat, 15 * MS_PER_DAY);
        let record = roster.record(OfficerKind::Technocrat);
        assert_eq!(record.expires_at, Some(60 * MS_PER_DAY));
        // The original engagement date is kept
        assert_eq!(record.hired_at, Some(0));
    }

    #[test]
    fn test_rehire_after_lapse_restarts() {
        let mut roster = OfficerRoster::default();
        roster.hire(OfficerKind::Admiral, 0);
        let lapsed = 45 * MS_PER_DAY;
        assert!(!roster.is_active(OfficerKind::Admiral, lapsed));
        roster.hire(OfficerKind::Admiral, lapsed);
        let record = roster.record(OfficerKind::Admiral);
        assert_eq!(record.hired_at, Some(lapsed));
        assert_eq!(record.expires_at, Some(lapsed + 30 * MS_PER_DAY));
    }

    #[test]
    fn test_sweep_reports_each_expiry_once() {
        let mut roster = OfficerRoster::default();
        roster.hire(OfficerKind::Commander, 0);
        roster.hire(OfficerKind::Engineer, 0);
        assert!(roster.sweep_expired(MS_PER_DAY).is_empty());
        let expired = roster.sweep_expired(31 * MS_PER_DAY);
        assert_eq!(expired, vec![OfficerKind::Commander, OfficerKind::Engineer]);
        assert!(roster.sweep_expired(32 * MS_PER_DAY).is_empty());
    }

    #[test]
    fn test_expiry_instant_is_inactive() {
        let mut roster = OfficerRoster::default();
        roster.hire(OfficerKind::Geologist, 0);
        let expiry = 30 * MS_PER_DAY;
        assert!(roster.is_active(OfficerKind::Geologist, expiry - 1));
        assert!(!roster.is_active(OfficerKind::Geologist, expiry));
    }

    #[test]
    fn test_bonuses_accumulate_additively() {
        let mut roster = OfficerRoster::default();
        roster.hire(OfficerKind::Commander, 0);
        roster.hire(OfficerKind::Geologist, 0);
        roster.hire(OfficerKind::DarkMatterSpecialist, 0);
        let bonuses = BonusSet::from_roster(&roster, 1_000);
        assert_eq!(bonuses.building_speed, percent(10));
        assert_eq!(bonuses.resource_production, percent(10));
        assert_eq!(bonuses.storage_capacity, percent(20));
        assert_eq!(bonuses.dark_matter_production, percent(50));
        assert_eq!(bonuses.fuel_reduction, percent(10));
        assert_eq!(bonuses.extra_build_queue, 2);
        assert_eq!(bonuses.extra_fleet_slots, 0);
    }

    #[test]
    fn test_inactive_roster_grants_nothing() {
        let roster = OfficerRoster::default();
        let bonuses = BonusSet::from_roster(&roster, 1_000);
        assert_eq!(bonuses, BonusSet::default());
    }
}
