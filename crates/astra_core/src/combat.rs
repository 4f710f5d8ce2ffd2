//! Deterministic multi-round battle resolution.
//!
//! Both sides fire simultaneously from their start-of-round counts.
//! Damage bleeds through the receiving side's shield pool, then
//! destroys a proportional share of every stack's hull. The same seed
//! against the same sides always produces the same outcome, so replays
//! of a saved mission resolve identically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::{DefenseCounts, DefenseKind, FleetComposition, ShipKind, TechnologyKind, TechnologyLevels};
use crate::config::EngineConfig;
use crate::math::{percent, Fixed};
use crate::resources::Resources;

/// Who held the field when the battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleWinner {
    /// The attacker eliminated the defense.
    Attacker,
    /// The defense eliminated the attacker.
    Defender,
    /// Neither side was eliminated before the fighting stopped.
    Draw,
}

/// One side of a battle.
#[derive(Debug, Clone, Default)]
pub struct Combatant {
    /// Ships committed to the fight.
    pub fleet: FleetComposition,
    /// Stationary defense, empty for an attacking fleet.
    pub defense: DefenseCounts,
    /// Military technology levels of the owner.
    pub technologies: TechnologyLevels,
    /// Additional defensive strength, from officers.
    pub defense_bonus: Fixed,
}

/// Everything a battle produced.
#[derive(Debug, Clone)]
pub struct BattleOutcome {
    /// Final verdict.
    pub winner: BattleWinner,
    /// Rounds actually fought.
    pub rounds: u8,
    /// Attacker ships that survived.
    pub attacker_remaining: FleetComposition,
    /// Attacker ships destroyed.
    pub attacker_losses: FleetComposition,
    /// Defender ships that survived.
    pub defender_fleet_remaining: FleetComposition,
    /// Defender ships destroyed.
    pub defender_fleet_losses: FleetComposition,
    /// Defense units left standing.
    pub defender_defense_remaining: DefenseCounts,
    /// Defense units destroyed, before rematerialization.
    pub defender_defense_losses: DefenseCounts,
    /// Destroyed defense units that rematerialized after the battle.
    pub defender_defense_restored: DefenseCounts,
    /// Resources seized from the defender's stores.
    pub plunder: Resources,
    /// Metal drifting at the battle position afterwards.
    pub debris_metal: Fixed,
    /// Crystal drifting at the battle position afterwards.
    pub debris_crystal: Fixed,
    /// Rolled moon chance, in percent.
    pub moon_chance: u32,
    /// Whether the wreckage coalesced into a new moon.
    pub moon_formed: bool,
}

/// Result of a missile strike after interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissileStrikeOutcome {
    /// Warheads shot down by anti-ballistic missiles.
    pub intercepted: u32,
    /// Anti-ballistic missiles expended intercepting.
    pub interceptors_used: u32,
    /// Defense units destroyed by the warheads that got through.
    pub defense_losses: DefenseCounts,
}

#[derive(Clone, Copy)]
enum UnitRef {
    Ship(ShipKind),
    Defense(DefenseKind),
}

struct Stack {
    unit: UnitRef,
    count: u32,
    weapon: Fixed,
    shield: Fixed,
    armor: Fixed,
}

struct Side {
    stacks: Vec<Stack>,
}

impl Side {
    fn from_combatant(combatant: &Combatant) -> Self {
        let weapons = tech_multiplier(&combatant.technologies, TechnologyKind::WeaponsTechnology);
        let shielding =
            tech_multiplier(&combatant.technologies, TechnologyKind::ShieldingTechnology);
        let armour = tech_multiplier(&combatant.technologies, TechnologyKind::ArmourTechnology);
        let fortification = Fixed::ONE + combatant.defense_bonus.max(Fixed::ZERO);

        let mut stacks = Vec::new();
        for (kind, count) in combatant.fleet.iter_present() {
            let stats = kind.combat_stats();
            stacks.push(Stack {
                unit: UnitRef::Ship(kind),
                count,
                weapon: Fixed::from_num(stats.weapon).saturating_mul(weapons),
                shield: Fixed::from_num(stats.shield).saturating_mul(shielding),
                armor: Fixed::from_num(stats.armor).saturating_mul(armour),
            });
        }
        for (kind, count) in combatant.defense.iter_present() {
            // Silo stock does not stand on the battlefield
            if kind.is_missile() {
                continue;
            }
            let stats = kind.combat_stats();
            stacks.push(Stack {
                unit: UnitRef::Defense(kind),
                count,
                weapon: Fixed::from_num(stats.weapon).saturating_mul(weapons),
                shield: Fixed::from_num(stats.shield)
                    .saturating_mul(shielding)
                    .saturating_mul(fortification),
                armor: Fixed::from_num(stats.armor)
                    .saturating_mul(armour)
                    .saturating_mul(fortification),
            });
        }
        Self { stacks }
    }

    fn alive(&self) -> bool {
        self.stacks.iter().any(|stack| stack.count > 0)
    }

    fn firepower(&self, jitter: Fixed) -> Fixed {
        let mut total = Fixed::ZERO;
        for stack in &self.stacks {
            total = total.saturating_add(stack.weapon.saturating_mul_int(i64::from(stack.count)));
        }
        total.saturating_mul(jitter)
    }

    fn shield_pool(&self) -> Fixed {
        let mut total = Fixed::ZERO;
        for stack in &self.stacks {
            total = total.saturating_add(stack.shield.saturating_mul_int(i64::from(stack.count)));
        }
        total
    }

    fn hull_pool(&self) -> Fixed {
        let mut total = Fixed::ZERO;
        for stack in &self.stacks {
            total = total.saturating_add(stack.armor.saturating_mul_int(i64::from(stack.count)));
        }
        total
    }

    /// Destroy a proportional share of every stack. Returns how many
    /// units died in total.
    fn take_damage(&mut self, incoming: Fixed) -> u32 {
        let hull = self.hull_pool();
        if hull <= Fixed::ZERO {
            return 0;
        }
        let breach = incoming.saturating_sub(self.shield_pool()).max(Fixed::ZERO);
        if breach <= Fixed::ZERO {
            return 0;
        }
        let fraction = (breach / hull).min(Fixed::ONE);
        let mut destroyed_total = 0;
        for stack in &mut self.stacks {
            let destroyed: u32 = Fixed::from_num(stack.count)
                .saturating_mul(fraction)
                .to_num();
            let destroyed = destroyed.min(stack.count);
            stack.count -= destroyed;
            destroyed_total += destroyed;
        }
        destroyed_total
    }

    fn into_counts(self) -> (FleetComposition, DefenseCounts) {
        let mut fleet = FleetComposition::default();
        let mut defense = DefenseCounts::default();
        for stack in self.stacks {
            match stack.unit {
                UnitRef::Ship(kind) => *fleet.count_mut(kind) += stack.count,
                UnitRef::Defense(kind) => *defense.count_mut(kind) += stack.count,
            }
        }
        (fleet, defense)
    }
}

fn tech_multiplier(technologies: &TechnologyLevels, kind: TechnologyKind) -> Fixed {
    Fixed::ONE + percent(10).saturating_mul_int(i64::from(technologies.level(kind)))
}

fn jitter(rng: &mut StdRng) -> Fixed {
    percent(100 + rng.gen_range(-10..=10))
}

fn ship_losses(before: &FleetComposition, after: &FleetComposition) -> FleetComposition {
    let mut losses = *before;
    losses.subtract(after);
    losses
}

fn defense_losses(before: &DefenseCounts, after: &DefenseCounts) -> DefenseCounts {
    let mut losses = DefenseCounts::default();
    for (kind, count) in before.iter_present() {
        *losses.count_mut(kind) = count.saturating_sub(after.count(kind));
    }
    losses
}

/// Resolve a battle between an attacking fleet and a defended position.
///
/// `defender_resources` is the stock available for plunder and
/// `defender_has_moon` gates moon formation. All randomness comes from
/// `seed`; the draw sequence is fixed, so outcomes are reproducible.
#[must_use]
pub fn simulate_battle(
    attacker: &Combatant,
    defender: &Combatant,
    defender_resources: Resources,
    defender_has_moon: bool,
    seed: u64,
    cfg: &EngineConfig,
) -> BattleOutcome {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut attacking = Side::from_combatant(attacker);
    let mut defending = Side::from_combatant(defender);

    let mut rounds: u8 = 0;
    while u32::from(rounds) < cfg.max_battle_rounds && attacking.alive() && defending.alive() {
        let attacker_fire = attacking.firepower(jitter(&mut rng));
        let defender_fire = defending.firepower(jitter(&mut rng));
        let defender_dead = defending.take_damage(attacker_fire);
        let attacker_dead = attacking.take_damage(defender_fire);
        rounds += 1;
        if defender_dead == 0 && attacker_dead == 0 {
            break;
        }
    }

    let attacker_alive = attacking.alive();
    let defender_alive = defending.alive();
    let winner = match (attacker_alive, defender_alive) {
        (true, false) => BattleWinner::Attacker,
        (false, true) => BattleWinner::Defender,
        _ => BattleWinner::Draw,
    };

    let (attacker_remaining, _) = attacking.into_counts();
    let (defender_fleet_remaining, defender_defense_remaining) = defending.into_counts();
    let attacker_losses = ship_losses(&attacker.fleet, &attacker_remaining);
    let defender_fleet_losses = ship_losses(&defender.fleet, &defender_fleet_remaining);
    let defender_defense_losses =
        defense_losses(&defender.defense, &defender_defense_remaining);

    // Only ships leave wreckage; shattered defense is buried in the crust
    let mut debris_source = attacker_losses.build_cost();
    debris_source += defender_fleet_losses.build_cost();
    let debris_metal = debris_source.metal.saturating_mul(cfg.debris_fraction);
    let debris_crystal = debris_source.crystal.saturating_mul(cfg.debris_fraction);

    let restore_percent: i64 = cfg.defense_restore_chance.saturating_mul_int(100).to_num();
    let mut defender_defense_restored = DefenseCounts::default();
    for (kind, destroyed) in defender_defense_losses.iter_present() {
        let mut restored = 0;
        for _ in 0..destroyed {
            if rng.gen_range(0..100_i64) < restore_percent {
                restored += 1;
            }
        }
        *defender_defense_restored.count_mut(kind) = restored;
    }

    let debris_total = debris_metal.saturating_add(debris_crystal);
    let moon_chance = (debris_total.to_num::<i64>() / cfg.moon_chance_divisor.max(1))
        .clamp(0, i64::from(cfg.moon_chance_cap)) as u32;
    let moon_roll = rng.gen_range(0..100);
    let moon_formed = !defender_has_moon && moon_chance > 0 && moon_roll < moon_chance;

    let plunder = if winner == BattleWinner::Attacker {
        let wanted = defender_resources.scale(cfg.plunder_fraction);
        let capacity = attacker_remaining.cargo_capacity();
        let total = wanted.total();
        if total > capacity && total > Fixed::ZERO {
            wanted.scale(capacity / total)
        } else {
            wanted
        }
    } else {
        Resources::ZERO
    };

    BattleOutcome {
        winner,
        rounds,
        attacker_remaining,
        attacker_losses,
        defender_fleet_remaining,
        defender_fleet_losses,
        defender_defense_remaining,
        defender_defense_losses,
        defender_defense_restored,
        plunder,
        debris_metal,
        debris_crystal,
        moon_chance,
        moon_formed,
    }
}

/// Resolve an interplanetary missile strike against a defended planet.
///
/// Anti-ballistic missiles intercept one warhead each. Warheads that
/// get through grind down defense units in catalog order until their
/// combined damage is spent. Silo stock itself is never a target.
#[must_use]
pub fn simulate_missile_strike(
    warheads: u32,
    defender_defense: &DefenseCounts,
    attacker_weapons_level: u32,
    defender_armour_level: u32,
) -> MissileStrikeOutcome {
    let interceptors = defender_defense.count(DefenseKind::AntiBallisticMissile);
    let intercepted = warheads.min(interceptors);
    let surviving = warheads - intercepted;

    let warhead_power = Fixed::from_num(
        DefenseKind::InterplanetaryMissile.combat_stats().weapon,
    );
    let weapons = Fixed::ONE + percent(10).saturating_mul_int(i64::from(attacker_weapons_level));
    let armour = Fixed::ONE + percent(10).saturating_mul_int(i64::from(defender_armour_level));
    let mut damage = warhead_power
        .saturating_mul(weapons)
        .saturating_mul_int(i64::from(surviving));

    let mut defense_losses = DefenseCounts::default();
    for kind in DefenseKind::ALL {
        if kind.is_missile() {
            continue;
        }
        let standing = defender_defense.count(kind);
        if standing == 0 || damage <= Fixed::ZERO {
            continue;
        }
        let hull = Fixed::from_num(kind.combat_stats().armor).saturating_mul(armour);
        if hull <= Fixed::ZERO {
            continue;
        }
        let destroyed: u32 = (damage / hull).to_num::<i64>().min(i64::from(standing)) as u32;
        *defense_losses.count_mut(kind) = destroyed;
        damage = damage.saturating_sub(hull.saturating_mul_int(i64::from(destroyed)));
    }

    MissileStrikeOutcome {
        intercepted,
        interceptors_used: intercepted,
        defense_losses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raiders(light_fighter: u32, small_cargo: u32) -> Combatant {
        Combatant {
            fleet: FleetComposition {
                light_fighter,
                small_cargo,
                ..FleetComposition::default()
            },
            ..Combatant::default()
        }
    }

    fn garrison(rocket_launcher: u32, light_laser: u32) -> Combatant {
        Combatant {
            defense: DefenseCounts {
                rocket_launcher,
                light_laser,
                ..DefenseCounts::default()
            },
            ..Combatant::default()
        }
    }

    #[test]
    fn test_undefended_target_falls_without_a_shot() {
        let cfg = EngineConfig::default();
        let outcome = simulate_battle(
            &raiders(10, 5),
            &Combatant::default(),
            Resources::new(1_000, 500, 0),
            false,
            1,
            &cfg,
        );
        assert_eq!(outcome.winner, BattleWinner::Attacker);
        assert_eq!(outcome.rounds, 0);
        assert!(outcome.attacker_losses.is_empty());
        assert_eq!(outcome.plunder, Resources::new(500, 250, 0));
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let cfg = EngineConfig::default();
        let a = simulate_battle(
            &raiders(120, 0),
            &garrison(60, 30),
            Resources::new(10_000, 8_000, 2_000),
            false,
            42,
            &cfg,
        );
        let b = simulate_battle(
            &raiders(120, 0),
            &garrison(60, 30),
            Resources::new(10_000, 8_000, 2_000),
            false,
            42,
            &cfg,
        );
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.rounds, b.rounds);
        assert_eq!(a.attacker_remaining, b.attacker_remaining);
        assert_eq!(a.defender_defense_remaining, b.defender_defense_remaining);
        assert_eq!(a.plunder, b.plunder);
        assert_eq!(a.debris_metal, b.debris_metal);
    }

    #[test]
    fn test_overwhelming_force_wins() {
        let cfg = EngineConfig::default();
        let attacker = Combatant {
            fleet: FleetComposition {
                battleship: 200,
                ..FleetComposition::default()
            },
            ..Combatant::default()
        };
        let outcome = simulate_battle(
            &attacker,
            &garrison(20, 10),
            Resources::new(50_000, 30_000, 10_000),
            false,
            7,
            &cfg,
        );
        assert_eq!(outcome.winner, BattleWinner::Attacker);
        assert!(outcome.defender_defense_remaining.is_empty());
        assert!(!outcome.plunder.is_empty());
    }

    #[test]
    fn test_battle_never_exceeds_round_cap() {
        let cfg = EngineConfig::default();
        let outcome = simulate_battle(
            &raiders(40, 0),
            &garrison(40, 20),
            Resources::ZERO,
            false,
            3,
            &cfg,
        );
        assert!(outcome.rounds <= cfg.max_battle_rounds as u8);
    }

    #[test]
    fn test_defense_leaves_no_debris() {
        let cfg = EngineConfig::default();
        let attacker = Combatant {
            fleet: FleetComposition {
                deathstar: 5,
                ..FleetComposition::default()
            },
            ..Combatant::default()
        };
        let outcome = simulate_battle(
            &attacker,
            &garrison(50, 50),
            Resources::ZERO,
            false,
            11,
            &cfg,
        );
        assert!(outcome.attacker_losses.is_empty());
        assert_eq!(outcome.debris_metal, Fixed::ZERO);
        assert_eq!(outcome.debris_crystal, Fixed::ZERO);
    }

    #[test]
    fn test_ship_losses_feed_debris() {
        let cfg = EngineConfig::default();
        let defender = Combatant {
            fleet: FleetComposition {
                cruiser: 80,
                ..FleetComposition::default()
            },
            defense: DefenseCounts {
                plasma_turret: 20,
                ..DefenseCounts::default()
            },
            ..Combatant::default()
        };
        let outcome = simulate_battle(
            &raiders(300, 0),
            &defender,
            Resources::ZERO,
            false,
            5,
            &cfg,
        );
        assert!(
            outcome.debris_metal > Fixed::ZERO || outcome.debris_crystal > Fixed::ZERO,
            "destroyed ships should leave wreckage"
        );
    }

    #[test]
    fn test_plunder_capped_by_surviving_cargo() {
        let cfg = EngineConfig::default();
        // One small cargo hold is 5000; loot on offer far exceeds it
        let outcome = simulate_battle(
            &raiders(0, 1),
            &Combatant::default(),
            Resources::new(100_000, 100_000, 100_000),
            false,
            2,
            &cfg,
        );
        assert_eq!(outcome.winner, BattleWinner::Attacker);
        let hauled = outcome.plunder.total();
        assert!(hauled <= Fixed::from_num(5_000));
        assert!(hauled > Fixed::ZERO);
    }

    #[test]
    fn test_weapons_tech_tips_a_close_fight() {
        let cfg = EngineConfig::default();
        let plain = simulate_battle(
            &raiders(50, 0),
            &garrison(50, 0),
            Resources::ZERO,
            false,
            9,
            &cfg,
        );
        let mut veteran = raiders(50, 0);
        veteran
            .technologies
            .set_level(TechnologyKind::WeaponsTechnology, 10);
        veteran
            .technologies
            .set_level(TechnologyKind::ArmourTechnology, 10);
        let upgraded = simulate_battle(
            &veteran,
            &garrison(50, 0),
            Resources::ZERO,
            false,
            9,
            &cfg,
        );
        let plain_survivors = plain.attacker_remaining.total();
        let upgraded_survivors = upgraded.attacker_remaining.total();
        assert!(upgraded_survivors >= plain_survivors);
    }

    #[test]
    fn test_restored_defense_never_exceeds_losses() {
        let cfg = EngineConfig::default();
        let attacker = Combatant {
            fleet: FleetComposition {
                bomber: 60,
                ..FleetComposition::default()
            },
            ..Combatant::default()
        };
        let outcome = simulate_battle(
            &attacker,
            &garrison(100, 40),
            Resources::ZERO,
            false,
            13,
            &cfg,
        );
        for (kind, restored) in outcome.defender_defense_restored.iter_present() {
            assert!(restored <= outcome.defender_defense_losses.count(kind));
        }
    }

    #[test]
    fn test_moon_needs_wreckage_and_a_free_orbit() {
        let cfg = EngineConfig::default();
        let outcome = simulate_battle(
            &raiders(10, 0),
            &Combatant::default(),
            Resources::ZERO,
            true,
            17,
            &cfg,
        );
        assert!(!outcome.moon_formed, "occupied orbit can never form a moon");
        assert_eq!(outcome.moon_chance, 0);
    }

    #[test]
    fn test_missile_strike_interception() {
        let defense = DefenseCounts {
            rocket_launcher: 50,
            anti_ballistic_missile: 8,
            ..DefenseCounts::default()
        };
        let outcome = simulate_missile_strike(5, &defense, 0, 0);
        assert_eq!(outcome.intercepted, 5);
        assert_eq!(outcome.interceptors_used, 5);
        assert!(outcome.defense_losses.is_empty());
    }

    #[test]
    fn test_missile_strike_grinds_down_defense() {
        let defense = DefenseCounts {
            rocket_launcher: 40,
            anti_ballistic_missile: 2,
            ..DefenseCounts::default()
        };
        let outcome = simulate_missile_strike(10, &defense, 0, 0);
        assert_eq!(outcome.intercepted, 2);
        // 8 warheads at 12000 power against 200-hull launchers
        assert_eq!(outcome.defense_losses.count(DefenseKind::RocketLauncher), 40);
        assert_eq!(
            outcome
                .defense_losses
                .count(DefenseKind::AntiBallisticMissile),
            0
        );
    }

    #[test]
    fn test_missile_damage_respects_armour_tech() {
        let defense = DefenseCounts {
            plasma_turret: 30,
            ..DefenseCounts::default()
        };
        let plain = simulate_missile_strike(3, &defense, 0, 0);
        let hardened = simulate_missile_strike(3, &defense, 0, 10);
        assert!(
            hardened.defense_losses.count(DefenseKind::PlasmaTurret)
                <= plain.defense_losses.count(DefenseKind::PlasmaTurret)
        );
    }
}
