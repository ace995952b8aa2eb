use crate::schema::{BusinessComposition, Kpis, SalesData};

pub const DEMO_TURNOVER: f64 = 1_530_000.0;
pub const DEMO_PORTFOLIO: f64 = 450_000.0;

pub fn total_turnover(data: &SalesData) -> f64 {
    data.turnover.iter().map(|r| r.turnover).sum()
}

pub fn total_portfolio(data: &SalesData) -> f64 {
    data.portfolio.iter().map(|r| r.net_amount).sum()
}

/// Sums over every row; without data the fixed demo figures are used.
pub fn compute_kpis(data: Option<&SalesData>, annual_budget: f64) -> Kpis {
    let (turnover, portfolio) = match data {
        Some(data) => (total_turnover(data), total_portfolio(data)),
        None => (DEMO_TURNOVER, DEMO_PORTFOLIO),
    };
    kpis_from_totals(turnover, portfolio, annual_budget)
}

pub fn kpis_from_totals(turnover: f64, portfolio: f64, annual_budget: f64) -> Kpis {
    let total_forecast = turnover + portfolio;

    Kpis {
        turnover,
        portfolio,
        total_forecast,
        annual_budget,
        monthly_budget: annual_budget / 12.0,
        budget_delta: total_forecast - annual_budget,
        budget_variance_pct: budget_variance_pct(total_forecast, annual_budget),
    }
}

/// `None` when the budget is zero: the ratio is undefined.
pub fn budget_variance_pct(total_forecast: f64, annual_budget: f64) -> Option<f64> {
    if annual_budget == 0.0 {
        return None;
    }
    Some((total_forecast / annual_budget - 1.0) * 100.0)
}

pub fn business_composition(kpis: &Kpis) -> BusinessComposition {
    let total = kpis.turnover + kpis.portfolio;
    let share = |part: f64| if total == 0.0 { None } else { Some(part / total) };

    BusinessComposition {
        turnover: kpis.turnover,
        portfolio: kpis.portfolio,
        total,
        turnover_share: share(kpis.turnover),
        portfolio_share: share(kpis.portfolio),
    }
}
