//! Reshapes hand-maintained purchase-summary workbooks into normalized
//! per-person tables.
//!
//! The crate reads xlsx/xlsb/xls/ods workbooks through [`spreadsheet`],
//! scans their fixed header layout, and offers three reshapes in
//! [`transform`]: itemized per-person purchase rows, per-person total
//! weights, and a combined cross-sheet summary that can split an external
//! amount in proportion to per-sheet weights. Results are plain
//! [`table::Table`] values, written out as styled xlsx workbooks by
//! [`writer`].

pub mod error;
pub mod spreadsheet;
pub mod table;
pub mod transform;
pub mod writer;
