//! Layout Scanner: turns the header rows of a summary sheet into a
//! column-to-category map and an ordered product-name run.
//!
//! The scanned convention is fixed: row 1 carries category labels, row 2
//! carries product names, data rows start at row 5, and column 0 is
//! reserved for the per-row amount. These are deliberate, layout-coupled
//! rules; keeping them behind this module lets an alternate layout replace
//! the scanner without touching the row extractor.

use crate::spreadsheet::Grid;
use crate::transform::cell_text;
use std::collections::HashMap;

/// Column 0 holds the row's total amount.
pub(crate) const AMOUNT_COLUMN: usize = 0;
/// Column 1 holds the person name.
pub(crate) const PERSON_COLUMN: usize = 1;
/// Row 1 carries category labels; weight sheets carry per-product weights here.
pub(crate) const CATEGORY_ROW: usize = 1;
/// Row 2 carries product display names.
pub(crate) const PRODUCT_ROW: usize = 2;
/// Data rows start here; rows 3 and 4 are skipped by the source convention.
pub(crate) const DATA_START_ROW: usize = 5;
/// Header scanning starts right after the amount column.
pub(crate) const FIRST_PRODUCT_COLUMN: usize = 1;
/// Weight sheets keep their quantity block from this column on.
pub(crate) const QUANTITY_START_COLUMN: usize = 2;

/// Category assigned to columns left of the first category label.
pub(crate) const DEFAULT_CATEGORY: &str = "default category";
/// Header text that introduces the category row itself; never a category.
const CATEGORY_LABEL: &str = "category";

/// One product column: its position and display name.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub column: usize,
    pub name: String,
}

/// The parsed header layout of one summary sheet.
pub struct SheetLayout {
    categories: HashMap<usize, String>,
    products: Vec<Product>,
}

impl SheetLayout {
    /// Scans the category and product-name header rows of a grid.
    ///
    /// Categories forward-fill: a non-blank label (other than the literal
    /// divider text) becomes the current category for its own column and
    /// every following column until the next label. Product names are read
    /// left to right and stop at the first blank cell, so the product run
    /// is always contiguous; an all-blank name row yields no products and
    /// downstream extraction yields no records.
    pub fn scan(grid: &Grid) -> SheetLayout {
        let width = grid.width();

        let mut categories = HashMap::new();
        let mut current = DEFAULT_CATEGORY.to_string();
        for column in FIRST_PRODUCT_COLUMN..width {
            if let Some(label) = cell_text(grid.get(CATEGORY_ROW, column)) {
                if label != CATEGORY_LABEL {
                    current = label;
                }
            }
            categories.insert(column, current.clone());
        }

        let mut products = Vec::new();
        for column in FIRST_PRODUCT_COLUMN..width {
            match cell_text(grid.get(PRODUCT_ROW, column)) {
                Some(name) => products.push(Product { column, name }),
                None => break,
            }
        }

        SheetLayout { categories, products }
    }

    /// The category covering a column; columns outside the scanned range
    /// fall back to the default category.
    pub fn category(&self, column: usize) -> &str {
        self.categories
            .get(&column)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Product columns in left-to-right order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn every_label_present_maps_identically() {
        let grid = Grid::from_rows(vec![
            vec![Data::Empty],
            vec![Data::Empty, s("tea"), s("coffee"), s("cocoa")],
            vec![Data::Empty, s("A"), s("B"), s("C")],
        ]);
        let layout = SheetLayout::scan(&grid);
        assert_eq!(layout.category(1), "tea");
        assert_eq!(layout.category(2), "coffee");
        assert_eq!(layout.category(3), "cocoa");
    }

    #[test]
    fn sparse_labels_forward_fill() {
        // labels at columns 2 and 5; columns 2..=4 take the column-2 label
        let grid = Grid::from_rows(vec![
            vec![Data::Empty],
            vec![
                Data::Empty,
                Data::Empty,
                s("tea"),
                Data::Empty,
                Data::Empty,
                s("coffee"),
            ],
            vec![Data::Empty, s("A"), s("B"), s("C"), s("D"), s("E")],
        ]);
        let layout = SheetLayout::scan(&grid);
        assert_eq!(layout.category(1), DEFAULT_CATEGORY);
        assert_eq!(layout.category(2), "tea");
        assert_eq!(layout.category(3), "tea");
        assert_eq!(layout.category(4), "tea");
        assert_eq!(layout.category(5), "coffee");
    }

    #[test]
    fn divider_text_is_not_a_category() {
        let grid = Grid::from_rows(vec![
            vec![Data::Empty],
            vec![Data::Empty, s("category"), s("tea")],
            vec![Data::Empty, s("A"), s("B")],
        ]);
        let layout = SheetLayout::scan(&grid);
        assert_eq!(layout.category(1), DEFAULT_CATEGORY);
        assert_eq!(layout.category(2), "tea");
    }

    #[test]
    fn product_run_stops_at_first_blank() {
        let grid = Grid::from_rows(vec![
            vec![Data::Empty],
            vec![Data::Empty],
            vec![Data::Empty, s("A"), s("B"), s("  "), s("D")],
        ]);
        let layout = SheetLayout::scan(&grid);
        let names: Vec<&str> = layout
            .products()
            .iter()
            .map(|product| product.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(layout.products()[0].column, 1);
    }

    #[test]
    fn blank_name_row_yields_no_products() {
        let grid = Grid::from_rows(vec![
            vec![s("x")],
            vec![Data::Empty, s("tea")],
            vec![Data::Empty],
        ]);
        let layout = SheetLayout::scan(&grid);
        assert!(layout.products().is_empty());
    }

    #[test]
    fn labels_are_trimmed() {
        let grid = Grid::from_rows(vec![
            vec![Data::Empty],
            vec![Data::Empty, s(" tea ")],
            vec![Data::Empty, s(" green A ")],
        ]);
        let layout = SheetLayout::scan(&grid);
        assert_eq!(layout.category(1), "tea");
        assert_eq!(layout.products()[0].name, "green A");
    }
}
