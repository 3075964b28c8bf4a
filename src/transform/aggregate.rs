//! Sheet Aggregator: groups per-person rows within each sheet, then
//! merges the per-sheet summaries into one wide table.
//!
//! Input tables follow a positional contract rather than a named one:
//! column 0 is the person, column 1 the detail text, column 2 the points,
//! column 3 the amount, and column 4, when present, the weight. Extra
//! columns are ignored.

use crate::table::{Table, Value};
use crate::transform::{weight, TransformError};
use std::collections::{BTreeMap, HashMap, HashSet};

pub(crate) const PERSON_FIELD: &str = "person";
pub(crate) const DETAIL_FIELD: &str = "detail";
pub(crate) const POINTS_FIELD: &str = "points";
pub(crate) const AMOUNT_FIELD: &str = "amount";
pub(crate) const WEIGHT_FIELD: &str = "weight";
pub(crate) const SHARE_FIELD: &str = "share";
pub(crate) const TOTAL_AMOUNT_FIELD: &str = "total_amount";
pub(crate) const TOTAL_SHARE_FIELD: &str = "total_share";

/// Joins one person's detail texts within a sheet.
const DETAIL_SEPARATOR: &str = "，";

const PERSON_POSITION: usize = 0;
const DETAIL_POSITION: usize = 1;
const POINTS_POSITION: usize = 2;
const AMOUNT_POSITION: usize = 3;
const WEIGHT_POSITION: usize = 4;
/// A sheet must carry at least person, detail, points and amount.
const REQUIRED_COLUMNS: usize = 4;

/// One person's aggregated rows within a single sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonSummary {
    pub person: String,
    pub detail: String,
    pub points: f64,
    pub amount: f64,
    /// None when the sheet has no weight column at all.
    pub weight: Option<f64>,
}

/// One sheet reduced to its per-person summaries, sorted by person name.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetSummary {
    pub sheet: String,
    pub persons: Vec<PersonSummary>,
    pub has_weight: bool,
}

impl SheetSummary {
    /// Sum of all aggregated weights in the sheet.
    pub fn total_weight(&self) -> f64 {
        self.persons.iter().filter_map(|person| person.weight).sum()
    }
}

/// Groups a sheet's rows by trimmed person name.
///
/// Sheets with no data rows, and sheets narrower than the positional
/// contract allows, contribute nothing and are reported accordingly.
/// Rows whose person cell is blank are dropped, not grouped under an
/// empty key. Numeric columns are summed leniently: blanks and
/// non-numeric text count as zero.
pub fn summarize_sheet(sheet: &str, table: &Table) -> Option<SheetSummary> {
    if table.is_empty() {
        log::debug!("skipping sheet '{}': no data rows", sheet);
        return None;
    }
    if table.column_count() < REQUIRED_COLUMNS {
        log::warn!(
            "skipping sheet '{}': expected at least {} columns, found {}",
            sheet,
            REQUIRED_COLUMNS,
            table.column_count()
        );
        return None;
    }

    let has_weight = table.column_count() > WEIGHT_POSITION;
    let mut groups: BTreeMap<String, PersonSummary> = BTreeMap::new();
    for row in table.rows() {
        let Some(person) = person_key(&row[PERSON_POSITION]) else {
            continue;
        };
        let entry = groups.entry(person.clone()).or_insert_with(|| PersonSummary {
            person,
            detail: String::new(),
            points: 0.0,
            amount: 0.0,
            weight: has_weight.then_some(0.0),
        });
        if let Some(detail) = detail_text(&row[DETAIL_POSITION]) {
            if !entry.detail.is_empty() {
                entry.detail.push_str(DETAIL_SEPARATOR);
            }
            entry.detail.push_str(&detail);
        }
        entry.points += row[POINTS_POSITION].coerce_number();
        entry.amount += row[AMOUNT_POSITION].coerce_number();
        if let Some(weight) = entry.weight.as_mut() {
            *weight += row[WEIGHT_POSITION].coerce_number();
        }
    }

    Some(SheetSummary {
        sheet: sheet.to_string(),
        persons: groups.into_values().collect(),
        has_weight,
    })
}

/// Merges per-sheet summaries into one wide table keyed by person.
///
/// The merge is a full outer join: every person from every sheet gets a
/// row, in first-seen order, and a person absent from a sheet gets blank
/// cells for that sheet's columns rather than zeros. Each sheet
/// contributes a prefixed column block, followed by a grand amount total
/// and, when shares were computed, a grand share total. Shares are only
/// computed for weighted sheets when a positive total amount is supplied;
/// a weighted sheet whose weights sum to zero keeps its share column
/// blank throughout.
pub fn merge_summaries(
    summaries: &[SheetSummary],
    total_amount: Option<f64>,
) -> Result<Table, TransformError> {
    let total_amount = total_amount.filter(|amount| *amount > 0.0);

    let mut order: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for summary in summaries {
        for person in &summary.persons {
            if seen.insert(person.person.as_str()) {
                order.push(person.person.clone());
            }
        }
    }
    if order.is_empty() {
        return Err(TransformError::NothingToCombine);
    }

    let mut columns = vec![PERSON_FIELD.to_string()];
    for summary in summaries {
        let prefix = column_prefix(&summary.sheet);
        columns.push(format!("{}_{}", prefix, DETAIL_FIELD));
        columns.push(format!("{}_{}", prefix, POINTS_FIELD));
        columns.push(format!("{}_{}", prefix, AMOUNT_FIELD));
        if summary.has_weight {
            columns.push(format!("{}_{}", prefix, WEIGHT_FIELD));
            if total_amount.is_some() {
                columns.push(format!("{}_{}", prefix, SHARE_FIELD));
            }
        }
    }

    let indexes: Vec<HashMap<&str, &PersonSummary>> = summaries
        .iter()
        .map(|summary| {
            summary
                .persons
                .iter()
                .map(|person| (person.person.as_str(), person))
                .collect()
        })
        .collect();
    let sheet_totals: Vec<f64> = summaries.iter().map(SheetSummary::total_weight).collect();

    let mut merged = Table::new(columns);
    for person in &order {
        let mut row = vec![Value::text(person.as_str())];
        for (position, summary) in summaries.iter().enumerate() {
            match indexes[position].get(person.as_str()) {
                Some(entry) => {
                    row.push(Value::text(entry.detail.as_str()));
                    row.push(Value::Number(entry.points));
                    row.push(Value::Number(entry.amount));
                    if summary.has_weight {
                        let weighed = entry.weight.unwrap_or(0.0);
                        row.push(Value::Number(weighed));
                        if let Some(amount) = total_amount {
                            let share =
                                weight::proportional_share(weighed, sheet_totals[position], amount);
                            row.push(share.map(Value::Number).unwrap_or(Value::Blank));
                        }
                    }
                }
                None => {
                    let mut span = 3;
                    if summary.has_weight {
                        span += 1;
                        if total_amount.is_some() {
                            span += 1;
                        }
                    }
                    row.extend(std::iter::repeat(Value::Blank).take(span));
                }
            }
        }
        merged.push_row(row);
    }

    Ok(append_totals(&merged))
}

/// Appends the grand amount total and, when share columns exist, the
/// grand share total. Blank cells count as zero in both sums.
fn append_totals(merged: &Table) -> Table {
    let amount_columns = merged.columns_ending_with(&format!("_{}", AMOUNT_FIELD));
    let share_columns = merged.columns_ending_with(&format!("_{}", SHARE_FIELD));

    let mut columns = merged.columns().to_vec();
    columns.push(TOTAL_AMOUNT_FIELD.to_string());
    if !share_columns.is_empty() {
        columns.push(TOTAL_SHARE_FIELD.to_string());
    }

    let mut table = Table::new(columns);
    for row in merged.rows() {
        let mut values = row.clone();
        let amount: f64 = amount_columns
            .iter()
            .map(|&index| row[index].coerce_number())
            .sum();
        values.push(Value::Number(amount));
        if !share_columns.is_empty() {
            let share: f64 = share_columns
                .iter()
                .map(|&index| row[index].coerce_number())
                .sum();
            values.push(Value::Number(weight::round_to(share, 3)));
        }
        table.push_row(values);
    }
    table
}

/// Column prefix for one sheet's block. The grand total columns reserve
/// the "total" prefix, so a sheet with that exact name is written out as
/// "total sheet" to keep the merged header names unique.
fn column_prefix(sheet: &str) -> String {
    if sheet == "total" {
        log::warn!("sheet 'total' collides with the grand total columns; writing it as 'total sheet'");
        "total sheet".to_string()
    } else {
        sheet.to_string()
    }
}

fn person_key(value: &Value) -> Option<String> {
    match value {
        Value::Blank => None,
        Value::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
    }
}

fn detail_text(value: &Value) -> Option<String> {
    match value {
        Value::Blank => None,
        Value::Text(text) if text.is_empty() => None,
        Value::Text(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
    }
}
