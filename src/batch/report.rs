//! Categorized rows, summaries and report writers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use rust_xlsxwriter::{ColNum, RowNum, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{KwcatError, Result};
use crate::fallback::FallbackItem;
use crate::policy::{Bucket, ClassificationResult};

/// Output columns appended to the input table, in order.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "Primary Bucket ID",
    "Intent (model)",
    "Stage (model)",
    "Paid Activation (suggested)",
    "SEO Asset (suggested)",
    "Is Negative (Y/N)",
    "Negative Type",
    "Negative Theme",
    "Confidence",
    "Notes",
];

/// File name of the workbook report.
pub const WORKBOOK_FILE_NAME: &str = "categorized_output.xlsx";

/// Sheet holding the input rows with their classification columns.
pub const CATEGORIZED_SHEET: &str = "Categorized";
/// Sheet counting keywords per bucket.
pub const BUCKET_SUMMARY_SHEET: &str = "Summary_Bucket";
/// Sheet counting keywords per intent.
pub const INTENT_SUMMARY_SHEET: &str = "Summary_Intent";

/// Which classifier produced a row's final values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Rules,
    Fallback,
}

/// One input row with its classification columns.
///
/// Values are kept as text so a fallback override, which may use buckets
/// the rules never emit, fits the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedRow {
    pub keyword: String,
    /// Original cells of the input row.
    #[serde(skip)]
    pub values: Vec<String>,
    pub bucket_id: String,
    pub intent: String,
    pub stage: String,
    pub paid_activation: String,
    pub seo_asset: String,
    pub is_negative: String,
    pub negative_type: String,
    pub negative_theme: String,
    pub confidence: f64,
    pub notes: String,
    pub source: ClassificationSource,
}

impl CategorizedRow {
    pub fn from_rules(keyword: String, values: Vec<String>, result: &ClassificationResult) -> Self {
        Self {
            keyword,
            values,
            bucket_id: result.bucket.as_str().to_string(),
            intent: result.intent.as_str().to_string(),
            stage: result.stage.as_str().to_string(),
            paid_activation: result.paid_activation.as_str().to_string(),
            seo_asset: result.seo_asset.as_str().to_string(),
            is_negative: result.negative.flag().to_string(),
            negative_type: result.negative.negative_type.clone(),
            negative_theme: result.negative.negative_theme.clone(),
            confidence: result.confidence,
            notes: result.notes.clone(),
            source: ClassificationSource::Rules,
        }
    }

    /// Whether the row goes to the fallback classifier.
    pub fn needs_review(&self, threshold: f64) -> bool {
        self.bucket_id == Bucket::Unclassified.as_str() || self.confidence < threshold
    }

    /// Apply a fallback override.
    ///
    /// Bucket, intent, stage and the negative fields are replaced; notes are
    /// appended; confidence is raised to at least `confidence_floor` and never
    /// lowered. Paid and SEO suggestions keep their rule values.
    pub fn apply_override(&mut self, item: &FallbackItem, confidence_floor: f64) {
        self.bucket_id = item.bucket_id.clone();
        self.intent = item.intent.clone();
        self.stage = item.stage.clone();
        self.is_negative = item.is_negative.clone();
        self.negative_type = item.negative_type.clone();
        self.negative_theme = item.negative_theme.clone();
        self.notes = if self.notes.is_empty() {
            item.notes.clone()
        } else {
            format!("{}; {}", self.notes, item.notes)
        };
        self.confidence = self.confidence.max(confidence_floor);
        self.source = ClassificationSource::Fallback;
    }

    fn output_cells(&self) -> [String; 10] {
        [
            self.bucket_id.clone(),
            self.intent.clone(),
            self.stage.clone(),
            self.paid_activation.clone(),
            self.seo_asset.clone(),
            self.is_negative.clone(),
            self.negative_type.clone(),
            self.negative_theme.clone(),
            self.confidence.to_string(),
            self.notes.clone(),
        ]
    }
}

/// Keyword count for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCount {
    pub label: String,
    pub keywords: usize,
}

/// Count rows per label, most frequent first, ties by label.
pub fn summarize<F>(rows: &[CategorizedRow], label: F) -> Vec<SummaryCount>
where
    F: Fn(&CategorizedRow) -> &str,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(label(row)).or_insert(0) += 1;
    }

    let mut summary: Vec<SummaryCount> = counts
        .into_iter()
        .map(|(label, keywords)| SummaryCount {
            label: label.to_string(),
            keywords,
        })
        .collect();
    summary.sort_by(|a, b| b.keywords.cmp(&a.keywords).then_with(|| a.label.cmp(&b.label)));
    summary
}

/// Counters describing one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    /// Rows kept with their rule values and not flagged for review.
    pub rule_resolved: usize,
    pub reviewed: usize,
    pub overridden: usize,
    pub rejected_overrides: usize,
    pub failed_fallback_batches: usize,
    pub fallback_used: bool,
}

/// Full result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub input_columns: Vec<String>,
    pub keyword_column: String,
    pub rows: Vec<CategorizedRow>,
    pub bucket_summary: Vec<SummaryCount>,
    pub intent_summary: Vec<SummaryCount>,
    pub stats: BatchStats,
}

impl BatchReport {
    pub fn new(
        input_columns: Vec<String>,
        keyword_column: String,
        rows: Vec<CategorizedRow>,
        stats: BatchStats,
    ) -> Self {
        let bucket_summary = summarize(&rows, |r| r.bucket_id.as_str());
        let intent_summary = summarize(&rows, |r| r.intent.as_str());

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            input_columns,
            keyword_column,
            rows,
            bucket_summary,
            intent_summary,
            stats,
        }
    }

    /// Write `categorized.csv`, `summary_bucket.csv` and `summary_intent.csv`.
    pub fn write_csv_report<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let categorized = dir.join("categorized.csv");
        let mut writer = csv::Writer::from_path(&categorized)?;
        let header: Vec<&str> = self
            .input_columns
            .iter()
            .map(String::as_str)
            .chain(OUTPUT_COLUMNS)
            .collect();
        writer.write_record(&header)?;
        for row in &self.rows {
            let mut record = row.values.clone();
            record.resize(self.input_columns.len(), String::new());
            record.extend(row.output_cells());
            writer.write_record(&record)?;
        }
        writer.flush()?;

        let bucket_path = dir.join("summary_bucket.csv");
        write_summary(&bucket_path, "Bucket", &self.bucket_summary)?;
        let intent_path = dir.join("summary_intent.csv");
        write_summary(&intent_path, "Intent", &self.intent_summary)?;

        info!(
            "Wrote report for {} keywords to {}",
            self.rows.len(),
            dir.display()
        );
        Ok(vec![categorized, bucket_path, intent_path])
    }

    /// Build the `.xlsx` report.
    ///
    /// The workbook has three sheets: [`CATEGORIZED_SHEET`] with every input
    /// column followed by [`OUTPUT_COLUMNS`], then the bucket and intent
    /// summaries. Cells that parse as finite numbers are written as numbers.
    pub fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet().set_name(CATEGORIZED_SHEET)?;
        let header = self
            .input_columns
            .iter()
            .map(String::as_str)
            .chain(OUTPUT_COLUMNS);
        for (col, name) in header.enumerate() {
            let (row, col) = cell_position(0, col)?;
            sheet.write_string(row, col, name)?;
        }
        let width = self.input_columns.len();
        for (i, categorized) in self.rows.iter().enumerate() {
            for col in 0..width {
                let value = categorized.values.get(col).map(String::as_str).unwrap_or("");
                write_cell(sheet, i + 1, col, value)?;
            }
            for (j, value) in categorized.output_cells().iter().enumerate() {
                write_cell(sheet, i + 1, width + j, value)?;
            }
        }

        write_summary_sheet(&mut workbook, BUCKET_SUMMARY_SHEET, "Bucket", &self.bucket_summary)?;
        write_summary_sheet(&mut workbook, INTENT_SUMMARY_SHEET, "Intent", &self.intent_summary)?;
        Ok(workbook)
    }

    /// The `.xlsx` report as bytes, for HTTP responses.
    pub fn workbook_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = self.to_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Write the `.xlsx` report to `path`.
    pub fn write_workbook<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = self.to_workbook()?;
        workbook.save(path)?;
        info!("Wrote workbook to {}", path.display());
        Ok(())
    }

    /// Write the whole report as JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        fs::write(path, json)?;
        Ok(())
    }
}

fn cell_position(row: usize, col: usize) -> Result<(RowNum, ColNum)> {
    let row = RowNum::try_from(row)
        .map_err(|_| KwcatError::other(format!("row {row} does not fit in a worksheet")))?;
    let col = ColNum::try_from(col)
        .map_err(|_| KwcatError::other(format!("column {col} does not fit in a worksheet")))?;
    Ok((row, col))
}

fn write_cell(sheet: &mut Worksheet, row: usize, col: usize, value: &str) -> Result<()> {
    let (row, col) = cell_position(row, col)?;
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => {
            sheet.write_number(row, col, number)?;
        }
        _ => {
            sheet.write_string(row, col, value)?;
        }
    }
    Ok(())
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    name: &str,
    label_header: &str,
    summary: &[SummaryCount],
) -> Result<()> {
    let sheet = workbook.add_worksheet().set_name(name)?;
    sheet.write_string(0, 0, label_header)?;
    sheet.write_string(0, 1, "Keywords")?;
    for (i, entry) in summary.iter().enumerate() {
        let (row, _) = cell_position(i + 1, 0)?;
        sheet.write_string(row, 0, entry.label.as_str())?;
        sheet.write_number(row, 1, entry.keywords as f64)?;
    }
    Ok(())
}

fn write_summary(path: &Path, label_header: &str, summary: &[SummaryCount]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([label_header, "Keywords"])?;
    for entry in summary {
        writer.write_record([entry.label.as_str(), entry.keywords.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
