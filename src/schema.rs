use crate::error::{DashboardError, Result};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ANNUAL_BUDGET: f64 = 2_500_000.0;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_ALLOCATION_SEED: u64 = 42;

/// One invoiced sales row from the `Source_Turnover` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TurnoverRecord {
    /// `None` when the customer cell is blank; such rows still count toward the totals.
    pub customer: Option<String>,
    pub turnover: f64,
    pub margin: f64,
}

impl TurnoverRecord {
    pub fn new(customer: impl Into<String>, turnover: f64, margin: f64) -> Self {
        Self {
            customer: Some(customer.into()),
            turnover,
            margin,
        }
    }
}

/// One backlog row from the `Source_Portfolio` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioRecord {
    pub customer: Option<String>,
    pub net_amount: f64,
}

impl PortfolioRecord {
    pub fn new(customer: impl Into<String>, net_amount: f64) -> Self {
        Self {
            customer: Some(customer.into()),
            net_amount,
        }
    }
}

/// Both record sets of an uploaded workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SalesData {
    pub turnover: Vec<TurnoverRecord>,
    pub portfolio: Vec<PortfolioRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DashboardConfig {
    #[schemars(description = "Annual budget target in currency units. Must be finite and non-negative.")]
    pub annual_budget: f64,

    #[schemars(description = "Number of customers kept in the ranked rollup.")]
    pub top_n: usize,

    #[schemars(
        description = "Seed for the synthetic monthly distribution of uploaded turnover. The same seed always yields the same distribution."
    )]
    pub allocation_seed: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            annual_budget: DEFAULT_ANNUAL_BUDGET,
            top_n: DEFAULT_TOP_N,
            allocation_seed: DEFAULT_ALLOCATION_SEED,
        }
    }
}

impl DashboardConfig {
    pub fn with_budget(annual_budget: f64) -> Self {
        Self {
            annual_budget,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.annual_budget.is_finite() || self.annual_budget < 0.0 {
            return Err(DashboardError::InvalidBudget(self.annual_budget));
        }
        if self.top_n == 0 {
            return Err(DashboardError::InvalidTopN);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Kpis {
    #[schemars(description = "Sum of invoiced turnover over every uploaded row.")]
    pub turnover: f64,

    #[schemars(description = "Sum of backlog net amounts over every uploaded row.")]
    pub portfolio: f64,

    #[schemars(description = "Year-end estimate: turnover plus portfolio.")]
    pub total_forecast: f64,

    pub annual_budget: f64,

    pub monthly_budget: f64,

    #[schemars(description = "Forecast minus annual budget.")]
    pub budget_delta: f64,

    #[schemars(
        description = "Forecast vs budget in percent. Null when the annual budget is zero and the ratio is undefined."
    )]
    pub budget_variance_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyPoint {
    #[schemars(description = "Calendar month, 1 = January.")]
    pub month: u32,
    pub label: String,
    #[schemars(description = "Turnover allocated to this month. Always zero for the last month.")]
    pub turnover: f64,
    pub budget: f64,
    pub cumulative_turnover: f64,
    pub cumulative_budget: f64,
}

/// Backlog bar overlaid on the closing month of the main chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioProjection {
    pub month: u32,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BusinessComposition {
    pub turnover: f64,
    pub portfolio: f64,
    pub total: f64,
    #[schemars(description = "Turnover share of the total in [0, 1] for non-negative inputs. Null when the total is zero.")]
    pub turnover_share: Option<f64>,
    pub portfolio_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CustomerRollup {
    pub customer: String,
    pub turnover: f64,
    pub margin: f64,
    pub portfolio: f64,
    #[schemars(description = "Turnover plus portfolio; the ranking key.")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Uploaded {
        #[schemars(description = "Lowercase hex SHA-256 of the uploaded workbook bytes.")]
        content_hash: String,
    },
    Demo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No workbook supplied; demo figures are shown.
    AwaitingUpload,
    /// The workbook was rejected; demo figures are shown.
    ReadFailure { message: String },
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardState {
    pub generated_at: DateTime<Utc>,
    pub source: DataSource,
    pub notice: Option<Notice>,
    pub kpis: Kpis,
    pub monthly: Vec<MonthlyPoint>,
    pub portfolio_projection: PortfolioProjection,
    pub composition: BusinessComposition,
    #[schemars(description = "Ranked head of the customer rollup. Null in demo mode.")]
    pub top_customers: Option<Vec<CustomerRollup>>,
    #[schemars(description = "Full merged customer table for raw inspection. Null in demo mode.")]
    pub customers: Option<Vec<CustomerRollup>>,
}

impl DashboardState {
    pub fn is_demo(&self) -> bool {
        self.source == DataSource::Demo
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn dashboard_state_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(DashboardState);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}
