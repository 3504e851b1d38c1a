use crate::error::{Result, SimError};
use crate::models::UploadedRow;
use csv::{ReaderBuilder, Trim};
use tracing::debug;

/// Shown to the user whenever an upload is rejected.
pub const EXPECTED_COLUMNS: &str = "Expected columns: week,impressions,clicks,installs,spend,cpi,cvr (minimum). \
Optional: budget,network,actions,reactivations,first_transactions,target_cpi,target_cpa,target_cprt,target_cpft";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Week,
    Campaign,
    Impressions,
    Clicks,
    Installs,
    Spend,
    Cpi,
    Cvr,
    Ctr,
    Budget,
    Network,
    Reactivations,
    FirstTransactions,
    Actions,
    TargetCpi,
    TargetCpa,
    TargetCprt,
    TargetCpft,
    Cpa,
    Cprt,
    Cpft,
}

fn classify(header: &str) -> Option<Column> {
    let h = header;
    let column = if h.contains("week") || h.contains("date") {
        Column::Week
    } else if h.contains("campaign") {
        Column::Campaign
    } else if h.contains("impression") {
        Column::Impressions
    } else if h.contains("click") {
        Column::Clicks
    } else if h.contains("install") && !h.contains("cost") {
        Column::Installs
    } else if h.contains("spend") || (h.contains("cost") && h.len() < 6) {
        Column::Spend
    } else if h == "cpi" || h.contains("cost_per_install") {
        Column::Cpi
    } else if h.contains("cvr") || h.contains("conversion_rate") {
        Column::Cvr
    } else if h.contains("ctr") {
        Column::Ctr
    } else if h.contains("budget") {
        Column::Budget
    } else if h.contains("network") || h.contains("channel") {
        Column::Network
    } else if h.contains("reactivat") {
        Column::Reactivations
    } else if h.contains("first_transaction") || h.contains("ftxn") {
        // "transactions" contains "action", so this must run before the actions rule
        Column::FirstTransactions
    } else if h.contains("action") && !h.contains("cost") {
        Column::Actions
    } else if h.contains("target_cpi") {
        Column::TargetCpi
    } else if h.contains("target_cpa") {
        Column::TargetCpa
    } else if h.contains("target_cprt") {
        Column::TargetCprt
    } else if h.contains("target_cpft") {
        Column::TargetCpft
    } else if h == "cpa" || h.contains("cost_per_action") {
        Column::Cpa
    } else if h == "cprt" {
        Column::Cprt
    } else if h == "cpft" {
        Column::Cpft
    } else {
        return None;
    };
    Some(column)
}

/// Parses CSV text into uploaded rows.
///
/// Fails when there is no data row at all, or when no row carries both a
/// week label and a positive install count. Callers should treat either
/// error as an invalid upload and leave their current data untouched.
pub fn parse(text: &str) -> Result<Vec<UploadedRow>> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(SimError::EmptyUpload);
    }

    let cleaned = lines.join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(cleaned.as_bytes());

    let columns: Vec<Option<Column>> = reader
        .headers()?
        .iter()
        .map(|header| classify(&header.to_lowercase()))
        .collect();

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = result?;
        let mut row = UploadedRow::default();

        for (idx, column) in columns.iter().enumerate() {
            let Some(column) = column else { continue };
            let value = record.get(idx).unwrap_or("");
            apply(&mut row, *column, value);
        }

        fill_derived_costs(&mut row);

        if !row.week.is_empty() && row.installs > 0 {
            rows.push(row);
        } else {
            dropped += 1;
        }
    }

    debug!(accepted = rows.len(), dropped, "parsed csv upload");

    if rows.is_empty() {
        return Err(SimError::NoValidRows);
    }

    Ok(rows)
}

fn apply(row: &mut UploadedRow, column: Column, value: &str) {
    match column {
        Column::Week => row.week = value.to_string(),
        Column::Campaign => row.campaign = text(value),
        Column::Impressions => row.impressions = count(value).unwrap_or(0),
        Column::Clicks => row.clicks = count(value).unwrap_or(0),
        Column::Installs => row.installs = count(value).unwrap_or(0),
        Column::Spend => row.spend = number(value).unwrap_or(0.0),
        Column::Cpi => row.cpi = number(value),
        Column::Cvr => row.cvr = number(value).unwrap_or(0.0),
        Column::Ctr => row.ctr = number(value).unwrap_or(0.0),
        Column::Budget => row.budget = number(value),
        Column::Network => row.network = text(value),
        Column::Reactivations => row.reactivations = count(value),
        Column::FirstTransactions => row.first_transactions = count(value),
        Column::Actions => row.actions = count(value),
        Column::TargetCpi => row.target_cpi = number(value),
        Column::TargetCpa => row.target_cpa = number(value),
        Column::TargetCprt => row.target_cprt = number(value),
        Column::TargetCpft => row.target_cpft = number(value),
        Column::Cpa => row.cpa = number(value),
        Column::Cprt => row.cprt = number(value),
        Column::Cpft => row.cpft = number(value),
    }
}

fn fill_derived_costs(row: &mut UploadedRow) {
    let spend = row.spend;
    row.cpa = row.cpa.or_else(|| unit_cost(spend, row.actions));
    row.cprt = row.cprt.or_else(|| unit_cost(spend, row.reactivations));
    row.cpft = row.cpft.or_else(|| unit_cost(spend, row.first_transactions));
}

fn unit_cost(spend: f64, events: Option<u64>) -> Option<f64> {
    match events {
        Some(events) if events > 0 && spend > 0.0 => Some((spend / events as f64).round()),
        _ => None,
    }
}

fn text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole-number cells; fractional input is truncated.
fn count(value: &str) -> Option<u64> {
    value.parse::<u64>().ok().or_else(|| {
        number(value)
            .filter(|v| *v >= 0.0)
            .map(|v| v.trunc() as u64)
    })
}
