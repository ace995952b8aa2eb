use crate::error::DataFormatError;
use crate::schema::{PortfolioRecord, SalesData, TurnoverRecord};
use calamine::{Data, Range, Reader, Xlsx};
use log::{debug, info};
use regex::Regex;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::OnceLock;

pub const TURNOVER_SHEET: &str = "Source_Turnover";
pub const PORTFOLIO_SHEET: &str = "Source_Portfolio";

pub const CUSTOMER_COLUMN: &str = "Customer";
pub const TURNOVER_COLUMN: &str = "Turnover";
pub const MARGIN_COLUMN: &str = "Margin";
pub const NET_AMOUNT_COLUMN: &str = "Net amount";

type IngestResult<T> = std::result::Result<T, DataFormatError>;

/// Returns `Ok(None)` when nothing was uploaded; callers fall back to demo figures.
pub fn load_data(input: Option<&[u8]>) -> IngestResult<Option<SalesData>> {
    match input {
        Some(bytes) => parse_workbook(bytes).map(Some),
        None => Ok(None),
    }
}

pub fn parse_workbook(bytes: &[u8]) -> IngestResult<SalesData> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| DataFormatError::Workbook(e.to_string()))?;

    let turnover_range = read_sheet(&mut workbook, TURNOVER_SHEET)?;
    let portfolio_range = read_sheet(&mut workbook, PORTFOLIO_SHEET)?;

    let turnover = parse_turnover_rows(&turnover_range)?;
    let portfolio = parse_portfolio_rows(&portfolio_range)?;

    info!(
        "Parsed workbook: {} turnover rows, {} portfolio rows",
        turnover.len(),
        portfolio.len()
    );

    Ok(SalesData {
        turnover,
        portfolio,
    })
}

fn read_sheet(
    workbook: &mut Xlsx<Cursor<&[u8]>>,
    sheet: &str,
) -> IngestResult<Range<Data>> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(DataFormatError::MissingSheet {
            sheet: sheet.to_string(),
        });
    }

    workbook
        .worksheet_range(sheet)
        .map_err(|e| DataFormatError::Workbook(format!("sheet '{}': {}", sheet, e)))
}

/// Header cells of the first row, keyed by their trimmed text.
struct SheetLayout<'a> {
    sheet: &'a str,
    columns: HashMap<String, usize>,
    first_row: usize,
}

impl<'a> SheetLayout<'a> {
    fn from_range(sheet: &'a str, range: &Range<Data>) -> IngestResult<Self> {
        let header = range.rows().next().ok_or_else(|| DataFormatError::EmptySheet {
            sheet: sheet.to_string(),
        })?;

        let mut columns = HashMap::new();
        for (idx, cell) in header.iter().enumerate() {
            if let Some(name) = cell_str(cell) {
                let name = name.trim().to_string();
                if !name.is_empty() {
                    columns.entry(name).or_insert(idx);
                }
            }
        }

        if columns.is_empty() {
            return Err(DataFormatError::EmptySheet {
                sheet: sheet.to_string(),
            });
        }

        // 1-based spreadsheet row of the header.
        let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        Ok(Self {
            sheet,
            columns,
            first_row,
        })
    }

    fn require(&self, column: &str) -> IngestResult<usize> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| DataFormatError::MissingColumn {
                sheet: self.sheet.to_string(),
                column: column.to_string(),
            })
    }

    fn data_rows<'r>(
        &self,
        range: &'r Range<Data>,
    ) -> impl Iterator<Item = (usize, &'r [Data])> + 'r {
        let first_row = self.first_row;
        range
            .rows()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| !row.iter().all(|cell| matches!(cell, Data::Empty)))
            .map(move |(idx, row)| (first_row + idx, row))
    }

    fn customer(&self, row: &[Data], row_number: usize, idx: usize) -> IngestResult<Option<String>> {
        match row.get(idx) {
            Some(cell) => customer_key(cell).map_err(|value| DataFormatError::InvalidCustomer {
                sheet: self.sheet.to_string(),
                row: row_number,
                value,
            }),
            None => Ok(None),
        }
    }

    fn number(&self, row: &[Data], row_number: usize, column: &str, idx: usize) -> IngestResult<f64> {
        parse_amount(row.get(idx)).map_err(|value| DataFormatError::InvalidNumber {
            sheet: self.sheet.to_string(),
            row: row_number,
            column: column.to_string(),
            value,
        })
    }
}

fn parse_turnover_rows(range: &Range<Data>) -> IngestResult<Vec<TurnoverRecord>> {
    let layout = SheetLayout::from_range(TURNOVER_SHEET, range)?;
    let customer_idx = layout.require(CUSTOMER_COLUMN)?;
    let turnover_idx = layout.require(TURNOVER_COLUMN)?;
    let margin_idx = layout.require(MARGIN_COLUMN)?;

    let mut records = Vec::new();
    for (row_number, row) in layout.data_rows(range) {
        records.push(TurnoverRecord {
            customer: layout.customer(row, row_number, customer_idx)?,
            turnover: layout.number(row, row_number, TURNOVER_COLUMN, turnover_idx)?,
            margin: layout.number(row, row_number, MARGIN_COLUMN, margin_idx)?,
        });
    }

    debug!("{}: {} data rows", TURNOVER_SHEET, records.len());
    Ok(records)
}

fn parse_portfolio_rows(range: &Range<Data>) -> IngestResult<Vec<PortfolioRecord>> {
    let layout = SheetLayout::from_range(PORTFOLIO_SHEET, range)?;
    let customer_idx = layout.require(CUSTOMER_COLUMN)?;
    let amount_idx = layout.require(NET_AMOUNT_COLUMN)?;

    let mut records = Vec::new();
    for (row_number, row) in layout.data_rows(range) {
        records.push(PortfolioRecord {
            customer: layout.customer(row, row_number, customer_idx)?,
            net_amount: layout.number(row, row_number, NET_AMOUNT_COLUMN, amount_idx)?,
        });
    }

    debug!("{}: {} data rows", PORTFOLIO_SHEET, records.len());
    Ok(records)
}

fn cell_str(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        other => Some(other.to_string()),
    }
}

/// Customer keys are kept verbatim; only a blank cell yields no key.
/// Spreadsheet error cells (`#N/A`, `#REF!`, ...) are rejected.
fn customer_key(cell: &Data) -> std::result::Result<Option<String>, String> {
    match cell {
        Data::String(s) if s.is_empty() => Ok(None),
        Data::Error(e) => Err(e.to_string()),
        other => Ok(cell_str(other)),
    }
}

/// Plain decimals, or decimals with comma thousands groups ("1,250.75").
fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-+]?(\d+|\d{1,3}(,\d{3})+)(\.\d+)?$").unwrap())
}

/// Empty cells count as zero. The error carries the offending text.
/// Amounts must be finite.
fn parse_amount(cell: Option<&Data>) -> std::result::Result<f64, String> {
    let Some(c) = cell else {
        return Ok(0.0);
    };

    let value = match c {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::Empty => return Ok(0.0),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            if !amount_pattern().is_match(trimmed) {
                return Err(s.clone());
            }
            trimmed
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| s.clone())?
        }
        other => return Err(other.to_string()),
    };

    if !value.is_finite() {
        return Err(c.to_string());
    }
    Ok(value)
}
