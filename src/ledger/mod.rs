//! Population & mortality ledger
//!
//! Authoritative bookkeeping for the global population stock and every
//! categorized death. All other subsystems report deaths exclusively
//! through [`MortalitySink::add_crisis_deaths`]; the ledger enforces
//! the monthly death cap and keeps category and root-cause accounts
//! that reconcile exactly with the cumulative total.

mod demographics;

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{DeathCategory, Month, RootCause};
use crate::state::{EnvironmentState, SocietyState, TechnologyState};

/// Hard ceiling on deaths in any single month, as a fraction of the
/// population at the start of that month. Even a full nuclear exchange
/// plus an active cascade cannot kill faster than this.
pub const MONTHLY_DEATH_CAP_FRACTION: f64 = 0.20;

/// Below this stock (billions) the species is considered extinct.
pub const EXTINCTION_THRESHOLD: f64 = 0.001;

/// Below this stock the population has passed through a genetic
/// bottleneck; recovery is possible but the outcome is scarred.
pub const BOTTLENECK_THRESHOLD: f64 = 1.0;

/// Below this stock industrial civilization is no longer sustainable.
pub const CRITICAL_THRESHOLD: f64 = 4.0;

/// A heterogeneous slice of the population with its own exposure profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSegment {
    pub name: String,
    /// Fraction of the total stock in this segment (shares sum to 1)
    pub share: f64,
    /// How much harder crises hit this segment (1.0 = average)
    pub vulnerability_multiplier: f64,
    /// Access to shelter, medicine, infrastructure (1.0 = fully served)
    pub survival_rate: f64,
}

/// Outcome of one crisis-death request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrisisOutcome {
    pub requested: f64,
    pub applied: f64,
    /// The request was scaled down by the monthly cap
    pub capped: bool,
    /// The request failed validation; nothing was mutated
    pub rejected: bool,
}

impl CrisisOutcome {
    fn rejected() -> Self {
        Self { requested: 0.0, applied: 0.0, capped: false, rejected: true }
    }
}

/// Narrow capability interface the crisis subsystems depend on.
///
/// Cascade models and phases take `&mut dyn MortalitySink` rather than
/// the concrete ledger, so they cannot reach any bookkeeping detail
/// beyond the single sanctioned entry point.
pub trait MortalitySink {
    /// Report crisis deaths with no cause attribution (booked under
    /// [`RootCause::Other`]).
    fn add_crisis_deaths(
        &mut self,
        mortality_rate: f64,
        reason: &str,
        exposed_fraction: f64,
        category: DeathCategory,
    ) -> CrisisOutcome;

    /// Report crisis deaths with a root-cause mix; weights are
    /// normalized, so any positive scale works.
    fn add_crisis_deaths_attributed(
        &mut self,
        mortality_rate: f64,
        reason: &str,
        exposed_fraction: f64,
        category: DeathCategory,
        cause_mix: &[(RootCause, f64)],
    ) -> CrisisOutcome;
}

/// Everything `update_month` decided, for the caller to turn into events
#[derive(Debug, Clone)]
pub struct MonthUpdate {
    pub carrying_capacity: f64,
    pub birth_rate: f64,
    pub death_rate: f64,
    pub births: f64,
    pub deaths: f64,
    pub environmental_deaths: f64,
    pub overshoot: Option<CrisisOutcome>,
    /// Computations that hit a zero/NaN guard and used the fallback
    pub guards: Vec<&'static str>,
}

/// The population stock and all death accounting for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationLedger {
    /// Current stock in billions, never negative
    pub population: f64,
    pub peak_population: f64,
    /// Snapshot taken by `begin_month`; base of the monthly death cap
    pub month_start_population: f64,
    /// Effective monthly birth rate after all modifiers
    pub adjusted_birth_rate: f64,
    /// Effective monthly death rate after all modifiers
    pub adjusted_death_rate: f64,
    pub monthly_deaths_applied: f64,
    pub monthly_death_cap_reached: bool,
    pub cumulative_crisis_deaths: f64,
    pub deaths_by_category: BTreeMap<DeathCategory, f64>,
    pub deaths_by_root_cause: BTreeMap<RootCause, f64>,
    pub segments: Vec<PopulationSegment>,
    // Demographic aggregates
    pub fertility_rate: f64,
    pub dependency_ratio: f64,
    pub median_age: f64,
    /// Last good carrying capacity, the guard fallback decays from it
    prev_carrying_capacity: f64,
}

impl PopulationLedger {
    pub fn new(start_population: f64) -> Self {
        let deaths_by_category =
            DeathCategory::ALL.iter().map(|c| (*c, 0.0)).collect();
        let deaths_by_root_cause = RootCause::ALL.iter().map(|c| (*c, 0.0)).collect();
        Self {
            population: start_population,
            peak_population: start_population,
            month_start_population: start_population,
            adjusted_birth_rate: 0.0,
            adjusted_death_rate: 0.0,
            monthly_deaths_applied: 0.0,
            monthly_death_cap_reached: false,
            cumulative_crisis_deaths: 0.0,
            deaths_by_category,
            deaths_by_root_cause,
            segments: Vec::new(),
            fertility_rate: 2.2,
            dependency_ratio: 0.54,
            median_age: 30.5,
            prev_carrying_capacity: start_population,
        }
    }

    /// Reset the monthly counters and snapshot the cap base.
    ///
    /// The scheduler calls this once at the top of every month, before
    /// any phase runs.
    pub fn begin_month(&mut self) {
        self.month_start_population = self.population;
        self.monthly_deaths_applied = 0.0;
        self.monthly_death_cap_reached = false;
    }

    /// Remaining death budget for this month
    pub fn remaining_death_budget(&self) -> f64 {
        let cap = MONTHLY_DEATH_CAP_FRACTION * self.month_start_population;
        (cap - self.monthly_deaths_applied).max(0.0)
    }

    /// Monthly demographic update: capacity, births, deaths, overshoot.
    ///
    /// Environmental mortality arrives precomputed on [`EnvironmentState`]
    /// and is *added* to the baseline death rate, dampened by the
    /// resilience floor so repeated shocks cannot compound without bound.
    pub fn update_month(
        &mut self,
        env: &EnvironmentState,
        society: &SocietyState,
        technology: &TechnologyState,
        config: &SimulationConfig,
        month: Month,
        rng: &mut ChaCha8Rng,
    ) -> MonthUpdate {
        let mut guards = Vec::new();

        let climate = guard01(env.climate_stability, "climate_stability", &mut guards);
        let food = guard01(env.food_security, "food_security", &mut guards);
        let water = guard01(env.water_security, "water_security", &mut guards);
        let eco = guard01(env.ecosystem_health, "ecosystem_health", &mut guards);
        let meaning = guard01(society.meaning, "meaning", &mut guards);
        let econ = guard01(society.economic_security, "economic_security", &mut guards);
        let healthcare = guard01(society.healthcare_quality, "healthcare_quality", &mut guards);
        let stability = guard01(society.social_stability, "social_stability", &mut guards);
        let war = guard01(society.war_intensity, "war_intensity", &mut guards);

        // --- Carrying capacity ---
        let m_climate = 0.30 + 0.70 * climate;
        let m_food = 0.20 + 0.80 * food.min(water);
        let m_eco = 0.40 + 0.60 * eco;
        let m_tech = if technology.capability.is_finite() {
            (0.85 + 0.15 * technology.capability.clamp(0.0, 3.0)).min(1.3)
        } else {
            guards.push("technology_capability");
            1.0
        };
        let mut capacity = config.base_carrying_capacity * m_climate * m_food * m_eco * m_tech;
        if !capacity.is_finite() || capacity <= 0.0 {
            guards.push("carrying_capacity");
            capacity = self.prev_carrying_capacity * 0.99;
        }
        self.prev_carrying_capacity = capacity;

        let pressure = if capacity > 0.0 {
            (self.population / capacity).min(2.0)
        } else {
            guards.push("population_pressure");
            1.0
        };

        // --- Birth rate ---
        let season = TAU * f64::from(month % 12) / 12.0;
        let m_meaning = 0.85 + 0.30 * meaning;
        let m_econ = 0.80 + 0.40 * econ;
        let m_health = 0.90 + 0.20 * healthcare;
        let m_stability = 0.90 + 0.20 * stability;
        let m_pressure = (1.25 - 0.50 * pressure).clamp(0.40, 1.25);
        let seasonal_births = 1.0 + config.birth_seasonal_amplitude * season.sin();
        let noise = 1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * config.birth_noise_amplitude;
        let birth_rate = (config.baseline_birth_rate
            * m_meaning
            * m_econ
            * m_health
            * m_stability
            * m_pressure
            * seasonal_births
            * noise)
            .clamp(0.0, 0.004);

        // --- Death rate ---
        let healthcare_reduction = 1.0 - 0.35 * healthcare;
        let war_multiplier = 1.0 + 2.0 * war;
        let seasonal_deaths = 1.0 + config.death_seasonal_amplitude * season.cos();
        let baseline_component =
            config.baseline_death_rate * healthcare_reduction * war_multiplier * seasonal_deaths;

        let env_rate = if env.environmental_mortality_rate.is_finite() {
            env.environmental_mortality_rate.clamp(0.0, 1.0)
        } else {
            guards.push("environmental_mortality_rate");
            0.0
        };
        let floor = self.resilience_floor(config);
        let death_rate = baseline_component + env_rate * floor;

        // --- Apply net growth ---
        let births = self.population * birth_rate;
        let deaths = self.population * death_rate;
        let environmental_deaths = self.population * env_rate * floor;
        self.population = (self.population + births - deaths).max(0.0);
        self.adjusted_birth_rate = birth_rate;
        self.adjusted_death_rate = death_rate;

        // Environmental mortality is excess mortality; book it so the
        // category accounts reconcile with the cumulative total.
        if environmental_deaths > 0.0 {
            self.cumulative_crisis_deaths += environmental_deaths;
            *self.deaths_by_category.entry(DeathCategory::Ecosystem).or_insert(0.0) +=
                environmental_deaths;
            *self.deaths_by_root_cause.entry(RootCause::ClimateChange).or_insert(0.0) +=
                environmental_deaths;
        }

        // --- Malthusian overshoot correction ---
        let overshoot = if self.population > capacity {
            let excess = self.population - capacity;
            let requested = config.overshoot_dieoff_rate * excess;
            // Attribute by whichever constraint was binding.
            let mix = [
                (RootCause::ClimateChange, 1.0 - climate),
                (RootCause::Poverty, 1.0 - food.min(water)),
                (RootCause::Governance, 1.0 - stability),
            ];
            Some(self.apply_capped(requested, DeathCategory::Famine, &mix))
        } else {
            None
        };

        self.peak_population = self.peak_population.max(self.population);
        self.update_demographics(healthcare, birth_rate);

        MonthUpdate {
            carrying_capacity: capacity,
            birth_rate,
            death_rate,
            births,
            deaths,
            environmental_deaths,
            overshoot,
            guards,
        }
    }

    /// `max(0, 1 - cumulative_mortality_fraction * coefficient)`
    ///
    /// Applied only to mortality beyond the demographic baseline:
    /// survivor populations grow progressively more resistant to
    /// further shocks.
    fn resilience_floor(&self, config: &SimulationConfig) -> f64 {
        if self.peak_population <= 0.0 {
            return 0.0;
        }
        let fraction = (self.cumulative_crisis_deaths / self.peak_population).clamp(0.0, 1.0);
        (1.0 - fraction * config.resilience_floor_coefficient).max(0.0)
    }

    /// Deaths a request would produce before the cap, honoring segments.
    fn requested_deaths(&self, mortality_rate: f64, exposed_fraction: f64) -> f64 {
        if self.segments.is_empty() {
            return self.population * exposed_fraction * mortality_rate;
        }
        self.segments
            .iter()
            .map(|segment| {
                let segment_rate = (mortality_rate
                    * segment.vulnerability_multiplier
                    * (2.0 - segment.survival_rate))
                    .clamp(0.0, 1.0);
                self.population * segment.share.clamp(0.0, 1.0) * exposed_fraction * segment_rate
            })
            .sum()
    }

    /// Apply deaths under the monthly cap with fair-share scale-down.
    fn apply_capped(
        &mut self,
        requested: f64,
        category: DeathCategory,
        cause_mix: &[(RootCause, f64)],
    ) -> CrisisOutcome {
        let remaining = self.remaining_death_budget();
        let capped = requested > remaining + 1e-12;
        if capped {
            self.monthly_death_cap_reached = true;
        }
        let applied = requested.min(remaining);
        if applied <= 0.0 {
            return CrisisOutcome { requested, applied: 0.0, capped, rejected: false };
        }

        self.population = (self.population - applied).max(0.0);
        self.monthly_deaths_applied += applied;
        self.cumulative_crisis_deaths += applied;
        *self.deaths_by_category.entry(category).or_insert(0.0) += applied;

        let weight_total: f64 = cause_mix
            .iter()
            .filter(|(_, w)| w.is_finite() && *w > 0.0)
            .map(|(_, w)| w)
            .sum();
        if weight_total > 0.0 {
            for (cause, weight) in cause_mix {
                if weight.is_finite() && *weight > 0.0 {
                    *self.deaths_by_root_cause.entry(*cause).or_insert(0.0) +=
                        applied * weight / weight_total;
                }
            }
        } else {
            *self.deaths_by_root_cause.entry(RootCause::Other).or_insert(0.0) += applied;
        }

        CrisisOutcome { requested, applied, capped, rejected: false }
    }
}

impl MortalitySink for PopulationLedger {
    fn add_crisis_deaths(
        &mut self,
        mortality_rate: f64,
        reason: &str,
        exposed_fraction: f64,
        category: DeathCategory,
    ) -> CrisisOutcome {
        self.add_crisis_deaths_attributed(
            mortality_rate,
            reason,
            exposed_fraction,
            category,
            &[(RootCause::Other, 1.0)],
        )
    }

    fn add_crisis_deaths_attributed(
        &mut self,
        mortality_rate: f64,
        reason: &str,
        exposed_fraction: f64,
        category: DeathCategory,
        cause_mix: &[(RootCause, f64)],
    ) -> CrisisOutcome {
        let rate_valid = mortality_rate.is_finite() && (0.0..=1.0).contains(&mortality_rate);
        let fraction_valid =
            exposed_fraction.is_finite() && (0.0..=1.0).contains(&exposed_fraction);
        if !rate_valid || !fraction_valid {
            tracing::warn!(
                reason,
                mortality_rate,
                exposed_fraction,
                "rejected invalid crisis death request"
            );
            return CrisisOutcome::rejected();
        }

        let requested = self.requested_deaths(mortality_rate, exposed_fraction);
        self.apply_capped(requested, category, cause_mix)
    }
}

fn guard01(value: f64, component: &'static str, guards: &mut Vec<&'static str>) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        guards.push(component);
        0.5
    }
}
