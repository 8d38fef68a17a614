//! Result export and display formatting: the six-sheet campaign workbook
//! (XLSX or per-sheet CSV) and the compact number formats used in KPI
//! cards and chart axes.

pub mod format;
pub mod workbook;

pub use format::{
    format_compact, format_euro_compact, format_grouped, format_percent, KpiDisplay,
};
pub use workbook::{export_filename, CampaignWorkbook, Sheet};
