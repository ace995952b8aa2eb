use rust_xlsxwriter::{Workbook, Worksheet};
use sales_dashboard_core::*;

const TURNOVER_HEADERS: [&str; 3] = ["Customer", "Turnover", "Margin"];
const PORTFOLIO_HEADERS: [&str; 2] = ["Customer", "Net amount"];

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
}

fn build_workbook(turnover: &[(&str, f64, f64)], portfolio: &[(&str, f64)]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(TURNOVER_SHEET).unwrap();
    write_headers(sheet, &TURNOVER_HEADERS);
    for (idx, (customer, amount, margin)) in turnover.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *customer).unwrap();
        sheet.write_number(row, 1, *amount).unwrap();
        sheet.write_number(row, 2, *margin).unwrap();
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(PORTFOLIO_SHEET).unwrap();
    write_headers(sheet, &PORTFOLIO_HEADERS);
    for (idx, (customer, amount)) in portfolio.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *customer).unwrap();
        sheet.write_number(row, 1, *amount).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

fn sample_workbook() -> Vec<u8> {
    build_workbook(
        &[("A", 100.0, 10.0), ("B", 200.0, 20.0)],
        &[("A", 50.0), ("C", 30.0)],
    )
}

#[test]
fn test_sample_workbook_end_to_end() {
    let bytes = sample_workbook();
    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();

    assert!(!state.is_demo());
    assert_eq!(state.notice, None);
    assert_eq!(state.kpis.turnover, 300.0);
    assert_eq!(state.kpis.portfolio, 80.0);
    assert_eq!(state.kpis.total_forecast, 380.0);
    assert_eq!(
        state.kpis.total_forecast,
        state.kpis.turnover + state.kpis.portfolio
    );

    let top = state.top_customers.expect("rollup present for uploaded data");
    let ranked: Vec<(&str, f64)> = top.iter().map(|r| (r.customer.as_str(), r.total)).collect();
    assert_eq!(ranked, vec![("B", 200.0), ("A", 150.0), ("C", 30.0)]);

    let customers = state.customers.expect("merged table present");
    assert_eq!(customers.len(), 3);
}

#[test]
fn test_portfolio_only_customer_has_zero_turnover_and_margin() {
    let bytes = sample_workbook();
    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();

    let c = state
        .top_customers
        .unwrap()
        .into_iter()
        .find(|r| r.customer == "C")
        .expect("portfolio-only customer is kept");
    assert_eq!(c.turnover, 0.0);
    assert_eq!(c.margin, 0.0);
    assert_eq!(c.portfolio, 30.0);
}

#[test]
fn test_cumulative_turnover_reaches_total_in_last_month() {
    let bytes = build_workbook(
        &[("A", 1_000_000.0, 100.0), ("B", 234_567.89, 10.0)],
        &[("A", 10.0)],
    );
    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();

    assert_eq!(state.monthly.len(), 12);
    assert_eq!(state.monthly[11].turnover, 0.0);
    let last = state.monthly.last().unwrap();
    assert!((last.cumulative_turnover - state.kpis.turnover).abs() < 1e-6);
    assert!((last.cumulative_budget - 2_500_000.0).abs() < 1e-6);
    assert_eq!(state.portfolio_projection.amount, 10.0);
}

#[test]
fn test_allocation_is_reproducible_for_the_same_seed() {
    let bytes = sample_workbook();
    let config = DashboardConfig::default();

    let first = compute(Some(bytes.as_slice()), &config).unwrap();
    let second = compute(Some(bytes.as_slice()), &config).unwrap();
    assert_eq!(first.monthly, second.monthly);

    let reseeded = DashboardConfig {
        allocation_seed: 7,
        ..DashboardConfig::default()
    };
    let third = compute(Some(bytes.as_slice()), &reseeded).unwrap();
    assert_ne!(first.monthly, third.monthly);
}

#[test]
fn test_pipeline_parses_identical_upload_once() {
    let bytes = sample_workbook();
    let mut pipeline = DashboardPipeline::new();

    let first = pipeline
        .compute(Some(bytes.as_slice()), &DashboardConfig::default())
        .unwrap();
    let second = pipeline
        .compute(Some(bytes.as_slice()), &DashboardConfig::with_budget(380.0))
        .unwrap();

    assert_eq!(pipeline.cache().parse_count(), 1);
    assert_eq!(first.kpis.turnover, second.kpis.turnover);
    assert_eq!(second.kpis.budget_delta, 0.0);
    assert_eq!(second.kpis.budget_variance_pct, Some(0.0));

    let other = build_workbook(&[("Z", 1.0, 0.0)], &[]);
    pipeline
        .compute(Some(other.as_slice()), &DashboardConfig::default())
        .unwrap();
    assert_eq!(pipeline.cache().parse_count(), 2);
}

#[test]
fn test_source_reports_content_hash() {
    let bytes = sample_workbook();
    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();
    assert_eq!(
        state.source,
        DataSource::Uploaded {
            content_hash: content_hash(&bytes)
        }
    );
}

#[test]
fn test_missing_sheet_is_reported_and_falls_back_to_demo() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(TURNOVER_SHEET).unwrap();
    write_headers(sheet, &TURNOVER_HEADERS);
    let bytes = workbook.save_to_buffer().unwrap();

    assert_eq!(
        parse_workbook(&bytes),
        Err(DataFormatError::MissingSheet {
            sheet: PORTFOLIO_SHEET.to_string()
        })
    );

    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();
    assert!(state.is_demo());
    assert!(state.top_customers.is_none());
    assert_eq!(state.kpis.turnover, 1_530_000.0);
    match state.notice {
        Some(Notice::ReadFailure { message }) => assert!(message.contains(PORTFOLIO_SHEET)),
        other => panic!("expected read failure, got {:?}", other),
    }
}

#[test]
fn test_missing_column_is_a_format_error() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(TURNOVER_SHEET).unwrap();
    write_headers(sheet, &["Customer", "Turnover"]);
    let sheet = workbook.add_worksheet();
    sheet.set_name(PORTFOLIO_SHEET).unwrap();
    write_headers(sheet, &PORTFOLIO_HEADERS);
    let bytes = workbook.save_to_buffer().unwrap();

    assert_eq!(
        load_data(Some(bytes.as_slice())),
        Err(DataFormatError::MissingColumn {
            sheet: TURNOVER_SHEET.to_string(),
            column: "Margin".to_string(),
        })
    );
}

#[test]
fn test_rollup_keeps_ten_customers_in_descending_order() {
    let rows: Vec<(String, f64, f64)> = (0..15)
        .map(|i| (format!("Customer {:02}", i), (i * 7 % 13) as f64 * 1000.0, 0.0))
        .collect();
    let turnover: Vec<(&str, f64, f64)> = rows
        .iter()
        .map(|(c, t, m)| (c.as_str(), *t, *m))
        .collect();
    let bytes = build_workbook(&turnover, &[("Customer 00", 50_000.0)]);

    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();
    let top = state.top_customers.unwrap();

    assert_eq!(top.len(), 10);
    assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
    assert_eq!(top[0].customer, "Customer 00");
    assert_eq!(state.customers.unwrap().len(), 15);
}

#[test]
fn test_top_n_is_configurable() {
    let bytes = sample_workbook();
    let config = DashboardConfig {
        top_n: 1,
        ..DashboardConfig::default()
    };
    let state = compute(Some(bytes.as_slice()), &config).unwrap();
    let top = state.top_customers.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].customer, "B");
}

#[test]
fn test_loose_cells_blank_customers_and_credit_notes() {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(TURNOVER_SHEET).unwrap();
    write_headers(sheet, &["Region", "Customer", "Turnover", "Margin"]);
    sheet.write_string(1, 0, "North").unwrap();
    sheet.write_string(1, 1, "Acme").unwrap();
    sheet.write_string(1, 2, "1,000.50").unwrap();
    sheet.write_number(1, 3, 100.0).unwrap();
    // Credit note without a customer: counted in totals only.
    sheet.write_number(2, 2, -200.0).unwrap();
    sheet.write_number(2, 3, -20.0).unwrap();
    sheet.write_string(3, 1, "acme").unwrap();
    sheet.write_number(3, 2, 10.0).unwrap();

    let sheet = workbook.add_worksheet();
    sheet.set_name(PORTFOLIO_SHEET).unwrap();
    write_headers(sheet, &PORTFOLIO_HEADERS);
    sheet.write_string(1, 0, "Acme").unwrap();
    sheet.write_number(1, 1, -50.0).unwrap();

    let bytes = workbook.save_to_buffer().unwrap();
    let data = parse_workbook(&bytes).unwrap();
    assert_eq!(data.turnover.len(), 3);
    assert_eq!(data.turnover[1].customer, None);
    assert_eq!(data.turnover[2].margin, 0.0);

    let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();
    assert!((state.kpis.turnover - 810.5).abs() < 1e-9);
    assert_eq!(state.kpis.portfolio, -50.0);

    let customers = state.customers.unwrap();
    let names: Vec<&str> = customers.iter().map(|r| r.customer.as_str()).collect();
    assert_eq!(names, vec!["Acme", "acme"]);
    assert!((customers[0].total - 950.5).abs() < 1e-9);
}

#[test]
fn test_zero_budget_reports_no_variance() {
    let bytes = sample_workbook();
    let state = compute(Some(bytes.as_slice()), &DashboardConfig::with_budget(0.0)).unwrap();
    assert_eq!(state.kpis.budget_variance_pct, None);
    assert_eq!(state.kpis.budget_delta, 380.0);
    assert!(state.monthly.iter().all(|p| p.budget == 0.0));
}

#[test]
fn test_demo_mode_when_nothing_uploaded() {
    assert_eq!(load_data(None), Ok(None));

    let state = compute(None, &DashboardConfig::default()).unwrap();
    assert!(state.is_demo());
    assert_eq!(state.notice, Some(Notice::AwaitingUpload));
    assert_eq!(state.kpis.turnover, 1_530_000.0);
    assert_eq!(state.kpis.portfolio, 450_000.0);
    assert!(state.top_customers.is_none());
    for point in &state.monthly[..11] {
        assert!(point.turnover >= 50_000.0 && point.turnover < 200_000.0);
    }
    assert_eq!(state.monthly[11].turnover, 0.0);
}

#[test]
fn test_non_finite_or_locale_amounts_fall_back_to_demo() {
    for text in ["NaN", "inf", "1.234,56"] {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(TURNOVER_SHEET).unwrap();
        write_headers(sheet, &TURNOVER_HEADERS);
        sheet.write_string(1, 0, "Acme").unwrap();
        sheet.write_string(1, 1, text).unwrap();
        sheet.write_number(1, 2, 10.0).unwrap();
        let sheet = workbook.add_worksheet();
        sheet.set_name(PORTFOLIO_SHEET).unwrap();
        write_headers(sheet, &PORTFOLIO_HEADERS);
        let bytes = workbook.save_to_buffer().unwrap();

        assert_eq!(
            parse_workbook(&bytes),
            Err(DataFormatError::InvalidNumber {
                sheet: TURNOVER_SHEET.to_string(),
                row: 2,
                column: "Turnover".to_string(),
                value: text.to_string(),
            })
        );

        let state = compute(Some(bytes.as_slice()), &DashboardConfig::default()).unwrap();
        assert!(state.is_demo());
        assert!(state.kpis.turnover.is_finite());
        assert!(matches!(state.notice, Some(Notice::ReadFailure { .. })));
    }
}
