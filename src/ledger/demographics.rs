//! Demographic aggregates derived from the monthly update
//!
//! These feed reporting and the society phase; nothing in the death
//! accounting depends on them.

use super::PopulationLedger;

impl PopulationLedger {
    /// Update fertility, dependency ratio and median age.
    ///
    /// Fertility follows an inverse healthcare curve: poor healthcare
    /// correlates with high fertility (replacement insurance), good
    /// healthcare with low fertility. The other two aggregates drift
    /// slowly toward what the current rates imply.
    pub(crate) fn update_demographics(&mut self, healthcare: f64, birth_rate: f64) {
        self.fertility_rate =
            (1.1 + 4.2 * (1.0 - healthcare).powf(1.4)).clamp(1.0, 6.8);

        // Low fertility ages the population; high fertility rejuvenates it.
        let aging_pressure = (2.1 - self.fertility_rate) * 0.012;
        self.median_age = (self.median_age + 0.008 + aging_pressure).clamp(16.0, 60.0);

        let young_load = (self.fertility_rate - 2.1).max(0.0) * 0.05;
        let old_load = (self.median_age - 30.0).max(0.0) * 0.012;
        let target = (0.30 + young_load + old_load).clamp(0.20, 1.20);
        // Exponential approach; dependency structure shifts over decades.
        self.dependency_ratio += (target - self.dependency_ratio) * 0.02;

        // A collapsing birth rate shows up as an aging shock.
        if birth_rate < 0.0005 {
            self.median_age = (self.median_age + 0.01).min(60.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fertility_inverse_to_healthcare() {
        let mut poor = PopulationLedger::new(8.0);
        poor.update_demographics(0.2, 0.0012);
        let mut rich = PopulationLedger::new(8.0);
        rich.update_demographics(0.95, 0.0012);

        assert!(poor.fertility_rate > rich.fertility_rate);
        assert!(rich.fertility_rate >= 1.0);
        assert!(poor.fertility_rate <= 6.8);
    }

    #[test]
    fn test_low_fertility_ages_population() {
        let mut ledger = PopulationLedger::new(8.0);
        let start = ledger.median_age;
        for _ in 0..120 {
            ledger.update_demographics(0.95, 0.0012);
        }
        assert!(ledger.median_age > start);
    }
}
