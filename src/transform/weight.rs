//! Weight Calculator: dot product of a sheet's per-product weight vector
//! with each person's quantity row, plus the share arithmetic that splits
//! an external amount in proportion to those weights.

use crate::spreadsheet::Grid;
use crate::transform::cell_text;
use crate::transform::layout::{CATEGORY_ROW, DATA_START_ROW, PERSON_COLUMN, QUANTITY_START_COLUMN};

/// Weights share the category header row of the summary layout.
const WEIGHT_ROW: usize = CATEGORY_ROW;

/// One person's total weight within a sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonWeight {
    pub person: String,
    pub weight: f64,
}

/// True when the grid is tall and wide enough to hold the weight layout:
/// at least one data row and at least one quantity column.
pub fn covers_weight_block(grid: &Grid) -> bool {
    grid.height() > DATA_START_ROW && grid.width() > QUANTITY_START_COLUMN
}

/// Computes each named person's total weight.
///
/// The weight vector is read leniently from the weight row: typed
/// numbers pass through, numeric-looking text parses, and anything else
/// counts as zero instead of failing the sheet. Quantities are read the
/// same way. Rows without a person name are skipped; totals round to
/// two decimal places.
pub fn weigh_grid(grid: &Grid) -> Vec<PersonWeight> {
    let columns: Vec<usize> = (QUANTITY_START_COLUMN..grid.width()).collect();
    let weights: Vec<f64> = columns
        .iter()
        .map(|&column| coerce_cell(grid, WEIGHT_ROW, column))
        .collect();

    let mut rows = Vec::new();
    for row in DATA_START_ROW..grid.height() {
        let Some(person) = cell_text(grid.get(row, PERSON_COLUMN)) else {
            continue;
        };
        let total: f64 = columns
            .iter()
            .zip(&weights)
            .map(|(&column, weight)| coerce_cell(grid, row, column) * weight)
            .sum();
        rows.push(PersonWeight {
            person,
            weight: round_to(total, 2),
        });
    }
    rows
}

/// Splits an external total in proportion to one person's weight within
/// a sheet, rounded to three decimal places. A sheet whose weights sum
/// to zero has no defined shares; None keeps that case distinct from a
/// share of zero.
pub fn proportional_share(weight: f64, sheet_total: f64, total_amount: f64) -> Option<f64> {
    if sheet_total == 0.0 {
        None
    } else {
        Some(round_to(weight / sheet_total * total_amount, 3))
    }
}

/// Rounds half away from zero at the given number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Lenient numeric read: typed numbers pass, numeric-looking text
/// parses, everything else counts as zero.
fn coerce_cell(grid: &Grid, row: usize, column: usize) -> f64 {
    let Some(cell) = grid.get(row, column) else {
        return 0.0;
    };
    if let Some(number) = cell.as_number() {
        return number;
    }
    match cell
        .display_text()
        .and_then(|text| text.trim().parse::<f64>().ok())
    {
        Some(number) => number,
        None => {
            if !cell.is_blank() {
                log::debug!("treating non-numeric cell {} as zero", cell.position());
            }
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    // Row 1 holds weights from column 2 on; rows 5+ hold one person per
    // row with quantities aligned under the weights.
    fn weight_grid(weights: Vec<Data>, data_rows: Vec<Vec<Data>>) -> Grid {
        let mut header = vec![Data::Empty, Data::Empty];
        header.extend(weights);
        let mut rows = vec![
            vec![s("shipment")],
            header,
            vec![Data::Empty, s("name"), s("tea"), s("cake")],
            vec![Data::Empty],
            vec![Data::Empty],
        ];
        rows.extend(data_rows);
        Grid::from_rows(rows)
    }

    #[test]
    fn totals_are_weight_dot_quantity() {
        let grid = weight_grid(
            vec![Data::Float(1.5), Data::Int(10)],
            vec![
                vec![Data::Empty, s("Alice"), Data::Int(2), Data::Int(1)],
                vec![Data::Empty, s("Bob"), Data::Int(4), Data::Empty],
            ],
        );
        let rows = weigh_grid(&grid);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], PersonWeight { person: "Alice".to_string(), weight: 13.0 });
        assert_eq!(rows[1], PersonWeight { person: "Bob".to_string(), weight: 6.0 });
    }

    #[test]
    fn text_weights_and_quantities_parse_or_count_as_zero() {
        let grid = weight_grid(
            vec![s("2.5"), s("n/a")],
            vec![vec![Data::Empty, s("Alice"), s("4"), Data::Int(100)]],
        );
        let rows = weigh_grid(&grid);
        // "n/a" weight zeroes its column, text "4" parses against "2.5"
        assert_eq!(rows[0].weight, 10.0);
    }

    #[test]
    fn unnamed_rows_are_skipped() {
        let grid = weight_grid(
            vec![Data::Int(1), Data::Int(1)],
            vec![
                vec![Data::Empty, Data::Empty, Data::Int(5), Data::Int(5)],
                vec![Data::Empty, s("  "), Data::Int(5), Data::Int(5)],
            ],
        );
        assert!(weigh_grid(&grid).is_empty());
    }

    #[test]
    fn totals_round_to_two_decimals() {
        let grid = weight_grid(
            vec![Data::Float(0.333)],
            vec![vec![Data::Empty, s("Alice"), Data::Int(2)]],
        );
        assert_eq!(weigh_grid(&grid)[0].weight, 0.67);
    }

    #[test]
    fn undersized_grids_do_not_cover_the_block() {
        let short = Grid::from_rows(vec![
            vec![s("x"), s("y"), s("z")],
            vec![Data::Empty, Data::Empty, Data::Int(1)],
        ]);
        assert!(!covers_weight_block(&short));

        let narrow = Grid::from_rows(vec![
            vec![s("x"), s("y")],
            vec![Data::Empty],
            vec![Data::Empty],
            vec![Data::Empty],
            vec![Data::Empty],
            vec![Data::Empty, s("Alice")],
        ]);
        assert!(!covers_weight_block(&narrow));
    }

    #[test]
    fn shares_split_the_amount_by_weight() {
        // 70 of 700 total at amount 1000 is exactly one tenth
        assert_eq!(proportional_share(70.0, 700.0, 1000.0), Some(100.0));
        assert_eq!(proportional_share(1.0, 3.0, 100.0), Some(33.333));
    }

    #[test]
    fn zero_sheet_total_has_no_share() {
        assert_eq!(proportional_share(0.0, 0.0, 1000.0), None);
    }
}
