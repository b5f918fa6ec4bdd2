//! Batch classification of keyword tables.
//!
//! A batch run reads a table, classifies every keyword with the rules in
//! parallel, sends the review subset to the fallback classifier in chunks,
//! and produces a [`BatchReport`] with per-row results and summaries.

pub mod input;
pub mod orchestrator;
pub mod report;

pub use input::{KeywordTable, find_keyword_column, read_input_bytes, read_input_file};
pub use orchestrator::{BatchOptions, BatchOrchestrator};
pub use report::{
    BatchReport, BatchStats, CategorizedRow, ClassificationSource, SummaryCount, WORKBOOK_FILE_NAME,
};
