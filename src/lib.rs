//! # Sales Dashboard Core
//!
//! KPI and aggregation pipeline behind an executive sales dashboard. A workbook
//! with a `Source_Turnover` sheet (invoiced sales) and a `Source_Portfolio`
//! sheet (order backlog) goes in; a presentation-agnostic [`DashboardState`]
//! comes out.
//!
//! ## Core Concepts
//!
//! - **Turnover**: invoiced amount, summed over every uploaded row
//! - **Portfolio**: backlog of orders received but not yet invoiced
//! - **Forecast**: turnover plus portfolio, compared against the annual budget
//! - **Monthly allocation**: a synthetic twelve-month series for charting; the
//!   workbook has no dates, so turnover is spread with seeded random weights
//! - **Customer rollup**: outer join of both sheets on `Customer`, ranked by
//!   turnover plus portfolio
//! - **Demo mode**: without a usable upload, fixed demo figures are shown and
//!   the rollup is skipped
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_dashboard_core::*;
//!
//! let bytes = std::fs::read("Executive_Sales_Dashboard.xlsx")?;
//! let mut pipeline = DashboardPipeline::new();
//!
//! let state = pipeline.compute(Some(bytes.as_slice()), &DashboardConfig::default())?;
//! println!("forecast: {}", state.kpis.total_forecast);
//!
//! // Same bytes, new budget: the workbook is not parsed again.
//! let state = pipeline.compute(Some(bytes.as_slice()), &DashboardConfig::with_budget(3_000_000.0))?;
//! ```

pub mod allocation;
pub mod cache;
pub mod error;
pub mod ingestion;
pub mod kpi;
pub mod rollup;
pub mod schema;
pub mod utils;

pub use allocation::{allocate_turnover, build_monthly_series, demo_turnover, seeded_weights};
pub use cache::{content_hash, IngestionCache};
pub use error::{DashboardError, DataFormatError, Result};
pub use ingestion::{load_data, parse_workbook, PORTFOLIO_SHEET, TURNOVER_SHEET};
pub use kpi::{budget_variance_pct, business_composition, compute_kpis};
pub use rollup::{customer_rollup, merge_customers, top_customers};
pub use schema::*;

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

/// Runs ingestion, KPIs, allocation and rollup, memoizing parsed uploads.
#[derive(Debug, Default)]
pub struct DashboardPipeline {
    cache: IngestionCache,
}

impl DashboardPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &IngestionCache {
        &self.cache
    }

    pub fn compute(
        &mut self,
        input: Option<&[u8]>,
        config: &DashboardConfig,
    ) -> Result<DashboardState> {
        config.validate()?;

        let Some(bytes) = input else {
            info!("No workbook supplied; showing demo data");
            return Ok(demo_state(config, Notice::AwaitingUpload));
        };

        let (content_hash, parsed) = self.cache.get_or_parse(bytes);
        match parsed {
            Ok(data) => Ok(uploaded_state(content_hash, data, config)),
            Err(e) => {
                warn!("Rejected uploaded workbook {}: {}", &content_hash[..12], e);
                Ok(demo_state(
                    config,
                    Notice::ReadFailure {
                        message: read_failure_message(&e),
                    },
                ))
            }
        }
    }
}

/// One-shot run without a cache.
pub fn compute(input: Option<&[u8]>, config: &DashboardConfig) -> Result<DashboardState> {
    DashboardPipeline::new().compute(input, config)
}

fn uploaded_state(
    content_hash: String,
    data: Arc<SalesData>,
    config: &DashboardConfig,
) -> DashboardState {
    let kpis = compute_kpis(Some(data.as_ref()), config.annual_budget);
    let monthly_turnover = allocate_turnover(kpis.turnover, config.allocation_seed);
    let (customers, top) = customer_rollup(&data, config.top_n);

    debug!(
        "Uploaded data: turnover {}, portfolio {}, forecast {}",
        kpis.turnover, kpis.portfolio, kpis.total_forecast
    );

    DashboardState {
        generated_at: Utc::now(),
        source: DataSource::Uploaded { content_hash },
        notice: None,
        monthly: build_monthly_series(&monthly_turnover, kpis.monthly_budget),
        portfolio_projection: allocation::portfolio_projection(kpis.portfolio),
        composition: business_composition(&kpis),
        top_customers: Some(top),
        customers: Some(customers),
        kpis,
    }
}

fn demo_state(config: &DashboardConfig, notice: Notice) -> DashboardState {
    let kpis = compute_kpis(None, config.annual_budget);
    let monthly_turnover = demo_turnover(&mut rand::thread_rng());

    DashboardState {
        generated_at: Utc::now(),
        source: DataSource::Demo,
        notice: Some(notice),
        monthly: build_monthly_series(&monthly_turnover, kpis.monthly_budget),
        portfolio_projection: allocation::portfolio_projection(kpis.portfolio),
        composition: business_composition(&kpis),
        top_customers: None,
        customers: None,
        kpis,
    }
}

fn read_failure_message(error: &DataFormatError) -> String {
    format!(
        "Could not read the uploaded file: {}. Make sure the workbook has the '{}' and '{}' sheets.",
        error, TURNOVER_SHEET, PORTFOLIO_SHEET
    )
}
