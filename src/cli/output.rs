//! Output formatting for CLI commands.

use std::io;

use serde::{Deserialize, Serialize};

use crate::batch::BatchReport;
use crate::cli::args::{KwcatArgs, OutputFormat};
use crate::error::Result;
use crate::policy::{ClassificationResult, Explanation};

/// Result structure for configuration checks.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigCheckResult {
    pub lists_path: String,
    pub total_terms: usize,
    pub empty_categories: Vec<String>,
    pub taxonomy_source: String,
    pub buckets: usize,
    pub intents: usize,
    pub stages: usize,
}

/// Single keyword classification.
#[derive(Debug, Serialize)]
pub struct KeywordResult<'a> {
    pub keyword: &'a str,
    #[serde(flatten)]
    pub result: &'a ClassificationResult,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &KwcatArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
        OutputFormat::Csv => output_csv(result, args),
    }
}

/// Output a batch report: summaries for humans, rows for CSV.
pub fn output_report(report: &BatchReport, args: &KwcatArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            output_report_human(report, args);
            Ok(())
        }
        OutputFormat::Json => output_json(report, args),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record(["keyword", "bucket", "intent", "stage", "confidence", "notes"])?;
            for row in &report.rows {
                writer.write_record([
                    row.keyword.as_str(),
                    row.bucket_id.as_str(),
                    row.intent.as_str(),
                    row.stage.as_str(),
                    row.confidence.to_string().as_str(),
                    row.notes.as_str(),
                ])?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

/// Output a keyword explanation.
pub fn output_explanation(explanation: &Explanation, args: &KwcatArgs) -> Result<()> {
    if args.output_format != OutputFormat::Human {
        return output_result("", explanation, args);
    }

    println!("Keyword:    {}", explanation.keyword);
    println!("Normalized: {}", explanation.normalized);
    let signals: Vec<&str> = explanation
        .active_signals
        .iter()
        .map(|c| c.as_str())
        .collect();
    println!(
        "Signals:    {}",
        if signals.is_empty() {
            "(none)".to_string()
        } else {
            signals.join(", ")
        }
    );
    let phrases = &explanation.phrases;
    println!(
        "Phrases:    vs={} versus={} comparison={}",
        phrases.vs, phrases.versus, phrases.comparison
    );
    println!("Rule:       {}", explanation.rule.unwrap_or("(none)"));
    println!();
    print_classification(&explanation.result);
    Ok(())
}

fn output_report_human(report: &BatchReport, args: &KwcatArgs) {
    let stats = &report.stats;
    if args.verbosity() > 0 {
        println!("Run {} ({})", report.run_id, report.generated_at.to_rfc3339());
        println!();
    }
    println!("Keywords:          {}", stats.total);
    println!("Rule resolved:     {}", stats.rule_resolved);
    println!("Reviewed:          {}", stats.reviewed);
    if stats.fallback_used {
        println!("Overridden:        {}", stats.overridden);
        println!("Rejected:          {}", stats.rejected_overrides);
        println!("Failed batches:    {}", stats.failed_fallback_batches);
    }

    println!();
    println!("Buckets:");
    for entry in &report.bucket_summary {
        println!("  {:<14} {:>6}", entry.label, entry.keywords);
    }
    println!();
    println!("Intents:");
    for entry in &report.intent_summary {
        println!("  {:<14} {:>6}", entry.label, entry.keywords);
    }
}

fn print_classification(result: &ClassificationResult) {
    println!("Bucket:          {}", result.bucket);
    println!("Intent:          {}", result.intent.as_str());
    println!("Stage:           {}", result.stage.as_str());
    println!("Paid activation: {}", result.paid_activation.as_str());
    println!("SEO asset:       {}", result.seo_asset.as_str());
    println!(
        "Negative:        {} ({} / {})",
        result.negative.flag(),
        result.negative.negative_type,
        result.negative.negative_theme
    );
    println!("Confidence:      {}", result.confidence);
    if !result.notes.is_empty() {
        println!("Notes:           {}", result.notes);
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &KwcatArgs) -> Result<()> {
    if args.verbosity() > 0 && !message.is_empty() {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                println!("{key}: {}", format_value(&val));
            }
        }
        other => println!("{}", format_value(&other)),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &KwcatArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Output a single object as key-value CSV pairs.
fn output_csv<T: Serialize>(result: &T, _args: &KwcatArgs) -> Result<()> {
    let value = serde_json::to_value(result)?;
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["key", "value"])?;
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                writer.write_record([key.as_str(), format_value(&val).as_str()])?;
            }
        }
        other => writer.write_record(["value", format_value(&other).as_str()])?,
    }
    writer.flush()?;
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
