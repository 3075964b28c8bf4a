//! Row Extractor: walks the data rows of a summary sheet and condenses
//! each qualifying row into one per-person purchase record.

use crate::spreadsheet::{Cell, Grid};
use crate::transform::cell_text;
use crate::transform::layout::{SheetLayout, AMOUNT_COLUMN, DATA_START_ROW, DEFAULT_CATEGORY, PERSON_COLUMN};

/// One data row condensed to its purchase summary.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseRecord {
    /// Trimmed person name from the name column.
    pub person: String,
    /// Purchased items as `product×count` tokens joined by " / ",
    /// category-prefixed outside the default category.
    pub detail: String,
    /// Sum of the row's truncated purchase counts.
    pub points: i64,
    /// The amount cell's display text, passed through untouched.
    pub amount: String,
}

/// Extracts purchase records from the data rows of a scanned sheet.
///
/// A row qualifies only when both its amount cell and its name cell are
/// non-blank. Within a qualifying row, a product participates when its
/// count cell holds a typed number strictly greater than zero; text that
/// merely looks numeric does not count. Rows whose products all fail the
/// count test are dropped entirely.
pub fn extract_records(grid: &Grid, layout: &SheetLayout) -> Vec<PurchaseRecord> {
    let mut records = Vec::new();
    for row in DATA_START_ROW..grid.height() {
        let amount = cell_text(grid.get(row, AMOUNT_COLUMN));
        let person = cell_text(grid.get(row, PERSON_COLUMN));
        let (Some(amount), Some(person)) = (amount, person) else {
            continue;
        };

        let mut tokens = Vec::new();
        let mut points: i64 = 0;
        for product in layout.products() {
            let count = grid
                .get(row, product.column)
                .and_then(Cell::as_number)
                .filter(|count| *count > 0.0);
            let Some(count) = count else {
                continue;
            };
            // Fractional counts render and score as their truncated value.
            let count = count as i64;
            points += count;
            tokens.push(token(layout.category(product.column), &product.name, count));
        }

        if tokens.is_empty() {
            continue;
        }
        records.push(PurchaseRecord {
            person,
            detail: tokens.join(" / "),
            points,
            amount,
        });
    }
    records
}

fn token(category: &str, product: &str, count: i64) -> String {
    if category == DEFAULT_CATEGORY {
        format!("{}×{}", product, count)
    } else {
        format!("({}){}×{}", category, product, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    // Column 1 doubles as the person column and the first scanned header
    // column; its "name" header is collected as a product but person cells
    // are text, so it never produces a count. Real products start at
    // column 2: tea (default category), cake and nuts (snacks).
    fn summary_grid(data_rows: Vec<Vec<Data>>) -> Grid {
        let mut rows = vec![
            vec![s("June order")],
            vec![Data::Empty, Data::Empty, Data::Empty, s("snacks")],
            vec![Data::Empty, s("name"), s("tea"), s("cake"), s("nuts")],
            vec![Data::Empty],
            vec![Data::Empty],
        ];
        rows.extend(data_rows);
        Grid::from_rows(rows)
    }

    #[test]
    fn mixed_counts_keep_only_typed_positive_numbers() {
        let grid = summary_grid(vec![vec![
            Data::Float(12.5),
            s(" Alice "),
            Data::Int(2), // counted
            s("3"),       // numeric-looking text, ignored
            Data::Int(0), // not positive, ignored
        ]]);
        let layout = SheetLayout::scan(&grid);
        let records = extract_records(&grid, &layout);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].person, "Alice");
        assert_eq!(records[0].detail, "tea×2");
        assert_eq!(records[0].points, 2);
        assert_eq!(records[0].amount, "12.5");
    }

    #[test]
    fn categories_prefix_tokens_outside_the_default() {
        let grid = summary_grid(vec![vec![
            Data::Int(30),
            s("Bob"),
            Data::Int(1),
            Data::Int(2),
            Data::Int(1),
        ]]);
        let layout = SheetLayout::scan(&grid);
        let records = extract_records(&grid, &layout);
        assert_eq!(
            records[0].detail,
            "tea×1 / (snacks)cake×2 / (snacks)nuts×1"
        );
        assert_eq!(records[0].points, 4);
    }

    #[test]
    fn rows_missing_amount_or_name_are_skipped() {
        let grid = summary_grid(vec![
            vec![Data::Empty, s("Alice"), Data::Int(1)],
            vec![Data::Int(10), s("   "), Data::Int(1)],
            vec![Data::Int(10), s("Bob"), Data::Int(1)],
        ]);
        let layout = SheetLayout::scan(&grid);
        let records = extract_records(&grid, &layout);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].person, "Bob");
    }

    #[test]
    fn rows_with_no_counted_items_are_dropped() {
        let grid = summary_grid(vec![vec![Data::Int(10), s("Alice"), s("two"), Data::Empty]]);
        let layout = SheetLayout::scan(&grid);
        assert!(extract_records(&grid, &layout).is_empty());
    }

    #[test]
    fn fractional_counts_truncate_in_detail_and_points() {
        let grid = summary_grid(vec![vec![
            Data::Float(5.0),
            s("Dana"),
            Data::Float(2.9),
            Data::Float(0.5),
        ]]);
        let layout = SheetLayout::scan(&grid);
        let records = extract_records(&grid, &layout);
        assert_eq!(records[0].detail, "tea×2 / (snacks)cake×0");
        assert_eq!(records[0].points, 2);
    }

    #[test]
    fn extraction_is_deterministic() {
        let grid = summary_grid(vec![
            vec![Data::Int(10), s("Alice"), Data::Int(1), Data::Int(2)],
            vec![Data::Int(20), s("Bob"), Data::Int(3)],
        ]);
        let first = extract_records(&grid, &SheetLayout::scan(&grid));
        let second = extract_records(&grid, &SheetLayout::scan(&grid));
        assert_eq!(first, second);
    }
}
