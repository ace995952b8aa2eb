//! Synthetic monthly distribution of turnover.
//!
//! The workbook carries no date column, so the chart series is fabricated:
//! uploaded turnover is spread over the first eleven months with seeded random
//! weights, and demo mode draws unseeded magnitudes. The closing month is
//! always zero, leaving room for the portfolio bar drawn on top of it.

use crate::schema::{MonthlyPoint, PortfolioProjection};
use crate::utils::{cumulative_sum, MONTHS_PER_YEAR, MONTH_LABELS};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Months that receive an allocation; the last one is left empty.
pub const ALLOCATED_MONTHS: usize = MONTHS_PER_YEAR - 1;

pub const DEMO_MONTHLY_MIN: u32 = 50_000;
pub const DEMO_MONTHLY_MAX: u32 = 200_000;

/// Eleven strictly positive weights summing to 1, reproducible for a given seed.
pub fn seeded_weights(seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(f64::MIN_POSITIVE, 1.0);
    let raw: Vec<f64> = (0..ALLOCATED_MONTHS).map(|_| rng.sample(dist)).collect();
    normalize_weights(&raw)
}

fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return vec![1.0 / weights.len() as f64; weights.len()];
    }
    weights.iter().map(|w| w / sum).collect()
}

/// Spreads `turnover` over months 1..=11 and appends the zero closing month.
pub fn allocate_turnover(turnover: f64, seed: u64) -> Vec<f64> {
    let mut values: Vec<f64> = seeded_weights(seed)
        .into_iter()
        .map(|w| w * turnover)
        .collect();
    values.push(0.0);
    values
}

/// Demo magnitudes drawn from `rng`; not tied to any total.
pub fn demo_turnover<R: Rng>(rng: &mut R) -> Vec<f64> {
    let dist = Uniform::new(DEMO_MONTHLY_MIN, DEMO_MONTHLY_MAX);
    let mut values: Vec<f64> = (0..ALLOCATED_MONTHS)
        .map(|_| f64::from(rng.sample(dist)))
        .collect();
    values.push(0.0);
    values
}

/// Pairs monthly turnover with the flat budget and both running totals.
pub fn build_monthly_series(monthly_turnover: &[f64], monthly_budget: f64) -> Vec<MonthlyPoint> {
    let budgets = vec![monthly_budget; monthly_turnover.len()];
    let cumulative_turnover = cumulative_sum(monthly_turnover);
    let cumulative_budget = cumulative_sum(&budgets);

    MONTH_LABELS
        .iter()
        .zip(monthly_turnover)
        .enumerate()
        .map(|(idx, (label, &turnover))| MonthlyPoint {
            month: idx as u32 + 1,
            label: label.to_string(),
            turnover,
            budget: monthly_budget,
            cumulative_turnover: cumulative_turnover[idx],
            cumulative_budget: cumulative_budget[idx],
        })
        .collect()
}

pub fn portfolio_projection(portfolio: f64) -> PortfolioProjection {
    PortfolioProjection {
        month: MONTHS_PER_YEAR as u32,
        label: MONTH_LABELS[MONTHS_PER_YEAR - 1].to_string(),
        amount: portfolio,
    }
}
