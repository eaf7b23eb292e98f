//! Synthetic lottery datasets
//!
//! Generates observations with the structure of the lottery data: one row
//! per cohort and draft number, eligibility decided by a per-cohort cutoff
//! on the draft number, service drawn with different probabilities for
//! eligible and exempt draftees, and a crime rate shifted by a known service
//! effect. Actual service is only recorded for the cohorts of the service
//! window, as in the real data.

use std::fmt;

use arrow::record_batch::RecordBatch;
use rand::prelude::*;

use crate::error::Result;
use crate::models::columns::DISTRICT_COUNT;
use crate::models::{
    CORE_COHORTS, CohortRange, FULL_SPAN, Observation, Origin, observations_to_batch,
};

/// Highest draft number of the lottery
pub const MAX_DRAFT_NUMBER: i32 = 1000;

/// Share of the crime rate attributed to each crime type, in table order
const CRIME_SHARES: [f64; 7] = [0.12, 0.45, 0.04, 0.02, 0.08, 0.09, 0.20];

/// Cohorts whose eligible draftees could be sent to the Falklands war
const WAR_COHORTS: CohortRange = CohortRange::new(1962, 1963);

/// Draft numbers assigned to the navy, which served two years
const NAVY_CUTOFF: i32 = 900;

/// Parameters of the synthetic data generator
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Seed for reproducible datasets; a random seed is used when `None`
    pub random_seed: Option<u64>,
    /// Cohorts to generate
    pub cohorts: CohortRange,
    /// Cohorts for which actual service is recorded
    pub service_window: CohortRange,
    /// Draft numbers drawn per cohort (one row each)
    pub rows_per_cohort: usize,
    /// Probability that an eligible draftee serves
    pub eligible_compliance: f64,
    /// Probability that an exempt draftee serves anyway
    pub exempt_compliance: f64,
    /// Crime rate of a draftee who did not serve
    pub base_crime_rate: f64,
    /// Increase of the crime rate caused by service
    pub service_effect: f64,
    /// Spread of the uniform noise added to the crime rate
    pub noise: f64,
    /// Probability that cohort or crime rate is missing for a row
    pub missing_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            random_seed: Some(1958),
            cohorts: FULL_SPAN,
            service_window: CORE_COHORTS,
            rows_per_cohort: 1000,
            eligible_compliance: 0.66,
            exempt_compliance: 0.04,
            base_crime_rate: 0.07,
            service_effect: 0.003,
            noise: 0.02,
            missing_rate: 0.0,
        }
    }
}

impl fmt::Display for SyntheticConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Synthetic Dataset:")?;
        writeln!(f, "  Cohorts: {}", self.cohorts)?;
        writeln!(f, "  Service Window: {}", self.service_window)?;
        writeln!(f, "  Rows per Cohort: {}", self.rows_per_cohort)?;
        writeln!(
            f,
            "  Compliance: {:.2} eligible, {:.2} exempt",
            self.eligible_compliance, self.exempt_compliance
        )?;
        writeln!(f, "  Service Effect: {}", self.service_effect)?;
        if let Some(seed) = self.random_seed {
            writeln!(f, "  Seed: {seed}")?;
        }
        Ok(())
    }
}

/// Eligibility cutoff of a cohort: draft numbers above it are eligible
#[must_use]
pub fn eligibility_cutoff(cohort: i32) -> i32 {
    match cohort {
        1958 => 175,
        1959 | 1961 => 320,
        1960 => 341,
        1962 => 319,
        c if c < 1958 => 300,
        _ => 350,
    }
}

/// Generate typed observations
#[must_use]
pub fn generate_observations(config: &SyntheticConfig) -> Vec<Observation> {
    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let missing = config.missing_rate.clamp(0.0, 1.0);

    let mut observations = Vec::with_capacity(config.cohorts.len() * config.rows_per_cohort);
    for cohort in config.cohorts.years() {
        let cutoff = eligibility_cutoff(cohort);
        for _ in 0..config.rows_per_cohort {
            let draftnumber = rng.random_range(1..=MAX_DRAFT_NUMBER);
            let eligible = draftnumber > cutoff;
            let compliance = if eligible {
                config.eligible_compliance
            } else {
                config.exempt_compliance
            };
            let served = rng.random_bool(compliance.clamp(0.0, 1.0));
            let service = if served { 1.0 } else { 0.0 };

            let noise = (rng.random::<f64>() - 0.5) * config.noise;
            let crime =
                (config.base_crime_rate + config.service_effect * service + noise).max(0.0);
            let crimerate = (!rng.random_bool(missing)).then_some(crime);

            let mut obs = Observation {
                cohort: (!rng.random_bool(missing)).then_some(cohort),
                draftnumber: Some(draftnumber),
                highnumber: Some(if eligible { 1.0 } else { 0.0 }),
                sm: config.service_window.contains(cohort).then_some(service),
                crimerate,
                malvinas: Some(if WAR_COHORTS.contains(cohort) { 1.0 } else { 0.0 }),
                navy: Some(if draftnumber > NAVY_CUTOFF { 1.0 } else { 0.0 }),
                origin: Some(draw_origin(&mut rng)),
                district: Some(rng.random_range(1..=DISTRICT_COUNT)),
                ..Default::default()
            };
            assign_crime_types(&mut obs, crimerate);

            if config.service_window.contains(cohort) {
                let formal = 0.6 - 0.02 * service + (rng.random::<f64>() - 0.5) * 0.1;
                let unemployment = 0.08 + (rng.random::<f64>() - 0.5) * 0.04;
                let income = 4.5 - 0.1 * service + (rng.random::<f64>() - 0.5);
                obs.formal = Some(formal.clamp(0.0, 1.0));
                obs.unemployment = Some(unemployment.max(0.0));
                obs.income = Some(income.max(0.0));
            }
            observations.push(obs);
        }
    }

    log::debug!(
        "Generated {} synthetic observations for cohorts {}",
        observations.len(),
        config.cohorts
    );
    observations
}

/// Generate a dataset in the input encoding
///
/// # Errors
/// Returns an error if the records cannot be converted to Arrow
pub fn generate_dataset(config: &SyntheticConfig) -> Result<RecordBatch> {
    observations_to_batch(&generate_observations(config))
}

fn draw_origin(rng: &mut StdRng) -> Origin {
    let u = rng.random::<f64>();
    if u < 0.01 {
        Origin::Indigenous
    } else if u < 0.04 {
        Origin::Naturalized
    } else {
        Origin::Argentine
    }
}

fn assign_crime_types(obs: &mut Observation, crimerate: Option<f64>) {
    let [arms, property, sexual, murder, threat, drug, whitecollar] =
        CRIME_SHARES.map(|share| crimerate.map(|rate| rate * share));
    obs.arms = arms;
    obs.property = property;
    obs.sexual = sexual;
    obs.murder = murder;
    obs.threat = threat;
    obs.drug = drug;
    obs.whitecollar = whitecollar;
}
