//! Resource production, the energy grid, and storage caps.
//!
//! Rates are derived from building levels and scaled by the energy
//! factor, officer bonuses, and universe speed. Accrual multiplies a
//! per-millisecond rate by the elapsed interval, so advancing a
//! planet in one step or in many steps lands on the same stockpiles
//! bit for bit as long as deposit efficiency stays flat.

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingKind, BuildingLevels, ShipKind, TechnologyKind, TechnologyLevels};
use crate::config::EngineConfig;
use crate::deposits::OreDeposits;
use crate::math::{from_u64_saturating, pow_growth, Fixed};
use crate::officers::BonusSet;
use crate::planet::Planet;
use crate::resources::ResourceKind;
use crate::time::{Timestamp, MS_PER_HOUR};

// ============================================================================
// Rates
// ============================================================================

/// Hourly production profile of one planet.
///
/// Mine rates are already scaled by the energy factor, production
/// bonuses, and universe speed; deposit efficiency is applied at
/// accrual time because it can change as the deposit drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductionRates {
    /// Metal mined per hour, drawn from the metal deposit.
    pub mine_metal: Fixed,
    /// Crystal mined per hour, drawn from the crystal deposit.
    pub mine_crystal: Fixed,
    /// Deuterium synthesized per hour, drawn from the deposit.
    pub mine_deuterium: Fixed,
    /// Planetary base income per hour; does not touch deposits.
    pub base_metal: Fixed,
    /// Planetary base income per hour; does not touch deposits.
    pub base_crystal: Fixed,
    /// Deuterium burned per hour by the fusion reactor.
    pub fusion_deuterium: Fixed,
    /// Dark matter collected per hour, credited to the account.
    pub dark_matter: Fixed,
    /// Energy the grid supplies.
    pub energy_produced: Fixed,
    /// Energy the mines demand.
    pub energy_consumed: Fixed,
    /// `min(1, produced / consumed)`; scales all mine output.
    pub energy_factor: Fixed,
}

/// Level curve shared by mines and plants: `level * 1.1^level`.
fn mine_curve(level: u32) -> Fixed {
    if level == 0 {
        return Fixed::ZERO;
    }
    let growth = Fixed::from_num(11) / Fixed::from_num(10);
    Fixed::from_num(level).saturating_mul(pow_growth(growth, level))
}

/// Derive the hourly production profile of a planet.
#[must_use]
pub fn production_rates(
    planet: &Planet,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
) -> ProductionRates {
    let speed = Fixed::from_num(cfg.universe_speed);
    let metal_level = planet.buildings.level(BuildingKind::MetalMine);
    let crystal_level = planet.buildings.level(BuildingKind::CrystalMine);
    let deuterium_level = planet.buildings.level(BuildingKind::DeuteriumSynthesizer);
    let solar_level = planet.buildings.level(BuildingKind::SolarPlant);
    let fusion_level = planet.buildings.level(BuildingKind::FusionReactor);
    let collector_level = planet.buildings.level(BuildingKind::DarkMatterCollector);
    let max_temp = planet.temperature.max;

    // Grid supply
    let energy_bonus = Fixed::ONE + bonuses.energy_production;
    let solar = Fixed::from_num(20).saturating_mul(mine_curve(solar_level));
    let fusion_growth = Fixed::from_num(105) / Fixed::from_num(100)
        + Fixed::from_num(technologies.level(TechnologyKind::EnergyTechnology))
            / Fixed::from_num(100);
    let fusion = Fixed::from_num(30)
        .saturating_mul(Fixed::from_num(fusion_level))
        .saturating_mul(pow_growth(fusion_growth, fusion_level));
    let per_satellite =
        (Fixed::from_num(max_temp) / Fixed::from_num(4) + Fixed::from_num(20)).max(Fixed::ZERO);
    let satellites = per_satellite
        .saturating_mul(Fixed::from_num(planet.fleet.count(ShipKind::SolarSatellite)));
    let energy_produced = solar
        .saturating_add(fusion)
        .saturating_add(satellites)
        .saturating_mul(energy_bonus);

    // Grid demand
    let energy_consumed = Fixed::from_num(10)
        .saturating_mul(mine_curve(metal_level))
        .saturating_add(Fixed::from_num(10).saturating_mul(mine_curve(crystal_level)))
        .saturating_add(Fixed::from_num(20).saturating_mul(mine_curve(deuterium_level)));

    let energy_factor = if energy_consumed <= Fixed::ZERO {
        Fixed::ONE
    } else {
        (energy_produced / energy_consumed).min(Fixed::ONE)
    };

    // Mines run at the energy factor; underpowered grids slow
    // everything down proportionally rather than blacking out.
    let mine_scale = energy_factor
        .saturating_mul(Fixed::ONE + bonuses.resource_production)
        .saturating_mul(speed);
    let temp_factor = (Fixed::from_num(144) / Fixed::from_num(100)
        - (Fixed::from_num(4) / Fixed::from_num(1000)).saturating_mul(Fixed::from_num(max_temp)))
    .max(Fixed::ZERO);

    ProductionRates {
        mine_metal: Fixed::from_num(30)
            .saturating_mul(mine_curve(metal_level))
            .saturating_mul(mine_scale),
        mine_crystal: Fixed::from_num(20)
            .saturating_mul(mine_curve(crystal_level))
            .saturating_mul(mine_scale),
        mine_deuterium: Fixed::from_num(10)
            .saturating_mul(mine_curve(deuterium_level))
            .saturating_mul(temp_factor)
            .saturating_mul(mine_scale),
        base_metal: cfg.base_income.metal.saturating_mul(speed),
        base_crystal: cfg.base_income.crystal.saturating_mul(speed),
        fusion_deuterium: Fixed::from_num(10)
            .saturating_mul(mine_curve(fusion_level))
            .saturating_mul(speed),
        dark_matter: mine_curve(collector_level)
            .saturating_mul(Fixed::ONE + bonuses.dark_matter_production)
            .saturating_mul(speed),
        energy_produced,
        energy_consumed,
        energy_factor,
    }
}

/// Storage cap for a resource on a planet: doubles per storage level.
///
/// Energy is a live balance, not a stock, so it is never capped.
#[must_use]
pub fn storage_capacity(
    buildings: &BuildingLevels,
    kind: ResourceKind,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
) -> Fixed {
    let level = match kind {
        ResourceKind::Metal => buildings.level(BuildingKind::MetalStorage),
        ResourceKind::Crystal => buildings.level(BuildingKind::CrystalStorage),
        ResourceKind::Deuterium => buildings.level(BuildingKind::DeuteriumTank),
        ResourceKind::DarkMatter => buildings.level(BuildingKind::DarkMatterTank),
        ResourceKind::Energy => return Fixed::MAX,
    };
    let base = match kind {
        ResourceKind::DarkMatter => cfg.dark_matter_base_capacity,
        _ => cfg.storage_base_capacity,
    };
    from_u64_saturating(base.max(0).unsigned_abs())
        .saturating_mul(pow_growth(Fixed::from_num(2), level))
        .saturating_mul(Fixed::ONE + bonuses.storage_capacity)
}

// ============================================================================
// Accrual
// ============================================================================

/// Threshold notice raised while accruing production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionEvent {
    /// An ore deposit crossed its warning level.
    DepositWarning {
        /// Which ore is running out.
        resource: ResourceKind,
    },
    /// An ore deposit ran dry.
    DepositDepleted {
        /// Which ore is gone.
        resource: ResourceKind,
    },
}

/// What one accrual pass produced beyond the planet's own stockpiles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductionOutcome {
    /// Dark matter to credit to the owner's account.
    pub dark_matter: Fixed,
    /// Deposit notices raised during the pass.
    pub events: Vec<ProductionEvent>,
}

/// Accrue production on a planet up to `to`.
///
/// A `to` at or before the planet's bookkeeping mark is a no-op, so
/// replaying an old timestamp never double-pays.
pub fn apply_production(
    planet: &mut Planet,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    to: Timestamp,
) -> ProductionOutcome {
    let mut outcome = ProductionOutcome::default();
    if to <= planet.last_update {
        return outcome;
    }
    let rates = production_rates(planet, technologies, bonuses, cfg);
    let elapsed = to - planet.last_update;
    let hour = Fixed::from_num(MS_PER_HOUR);
    // Per-millisecond rate times an integer interval is exact, which
    // is what lets split and direct accrual agree bit for bit.
    let accrue = |per_hour: Fixed| (per_hour / hour).saturating_mul_int(elapsed);

    let metal_cap = storage_capacity(&planet.buildings, ResourceKind::Metal, bonuses, cfg);
    let crystal_cap = storage_capacity(&planet.buildings, ResourceKind::Crystal, bonuses, cfg);
    let deuterium_cap = storage_capacity(&planet.buildings, ResourceKind::Deuterium, bonuses, cfg);

    let mined_metal = extract(
        planet.ore_deposits.as_mut(),
        ResourceKind::Metal,
        accrue(rates.mine_metal),
        cfg,
    );
    add_capped(
        &mut planet.resources.metal,
        mined_metal.saturating_add(accrue(rates.base_metal)),
        metal_cap,
    );

    let mined_crystal = extract(
        planet.ore_deposits.as_mut(),
        ResourceKind::Crystal,
        accrue(rates.mine_crystal),
        cfg,
    );
    add_capped(
        &mut planet.resources.crystal,
        mined_crystal.saturating_add(accrue(rates.base_crystal)),
        crystal_cap,
    );

    let mined_deuterium = extract(
        planet.ore_deposits.as_mut(),
        ResourceKind::Deuterium,
        accrue(rates.mine_deuterium),
        cfg,
    );
    add_capped(&mut planet.resources.deuterium, mined_deuterium, deuterium_cap);
    let fusion_draw = accrue(rates.fusion_deuterium);
    if fusion_draw > Fixed::ZERO {
        planet.resources.deuterium =
            (planet.resources.deuterium - fusion_draw).max(Fixed::ZERO);
    }

    outcome.dark_matter = accrue(rates.dark_matter);

    if let Some(deposits) = planet.ore_deposits.as_mut() {
        for kind in [
            ResourceKind::Metal,
            ResourceKind::Crystal,
            ResourceKind::Deuterium,
        ] {
            if let Some(state) = deposits.state_mut(kind) {
                if state.check_warning(cfg.deposits.warning_threshold) {
                    outcome
                        .events
                        .push(ProductionEvent::DepositWarning { resource: kind });
                }
                if state.check_depleted() {
                    outcome
                        .events
                        .push(ProductionEvent::DepositDepleted { resource: kind });
                }
            }
        }
    }

    planet.energy_produced = rates.energy_produced;
    planet.energy_consumed = rates.energy_consumed;
    planet.last_update = to;
    outcome
}

/// Draw mined ore out of the deposit at its current efficiency.
/// Worlds without deposit surveys mine unconstrained.
fn extract(
    deposits: Option<&mut OreDeposits>,
    kind: ResourceKind,
    requested: Fixed,
    cfg: &EngineConfig,
) -> Fixed {
    let Some(deposits) = deposits else {
        return requested;
    };
    let Some(state) = deposits.state_mut(kind) else {
        return requested;
    };
    let efficiency = state.efficiency(cfg.deposits.decay_threshold);
    state.consume(requested.saturating_mul(efficiency))
}

/// Add a gain to a stockpile without crossing the cap. A stockpile
/// already above cap is left alone rather than truncated.
fn add_capped(stock: &mut Fixed, gain: Fixed, cap: Fixed) {
    if gain <= Fixed::ZERO || *stock >= cap {
        return;
    }
    *stock = stock.saturating_add(gain).min(cap);
}
