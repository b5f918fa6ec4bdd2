//! Command implementations for the kwcat CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use tokio::runtime::Runtime;

use crate::batch::{BatchOptions, BatchOrchestrator, WORKBOOK_FILE_NAME, read_input_file};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{Taxonomy, TokenCategory, TokenLists};
use crate::error::Result;
use crate::fallback::{FallbackClassifier, OpenAIFallbackClassifier};
use crate::policy::KeywordClassifier;
use crate::server::{self, AppState};

/// Execute a CLI command.
pub fn execute_command(args: KwcatArgs) -> Result<()> {
    match &args.command {
        Command::Classify(classify_args) => classify_file(classify_args.clone(), &args),
        Command::Keyword(keyword_args) => classify_one(keyword_args.clone(), &args),
        Command::CheckConfig(check_args) => check_config(check_args.clone(), &args),
        Command::Serve(serve_args) => serve(serve_args.clone(), &args),
    }
}

/// Classify a keyword file.
fn classify_file(args: ClassifyArgs, cli_args: &KwcatArgs) -> Result<()> {
    let options = BatchOptions {
        fallback_enabled: !args.no_fallback,
        fallback_batch_size: args.fallback_batch_size,
        fallback_concurrency: args.fallback_concurrency,
        threads: args.threads,
        ..BatchOptions::default()
    };
    let orchestrator = build_orchestrator(&args.config, options)?;
    let fallback = if args.no_fallback {
        None
    } else {
        openai_fallback()
    };

    let table = read_input_file(&args.input)?;
    let start_time = Instant::now();
    let runtime = Runtime::new()?;
    let report = runtime.block_on(orchestrator.run(table, fallback.as_deref()))?;
    info!(
        "Classified {} keywords in {} ms",
        report.rows.len(),
        start_time.elapsed().as_millis()
    );

    if let Some(dir) = &args.output_dir {
        let mut paths = report.write_csv_report(dir)?;
        let workbook = dir.join(WORKBOOK_FILE_NAME);
        report.write_workbook(&workbook)?;
        paths.push(workbook);
        report.write_json(dir.join("report.json"), cli_args.pretty)?;
        if cli_args.verbosity() > 1 {
            for path in &paths {
                println!("Wrote {}", path.display());
            }
        }
    }

    output_report(&report, cli_args)
}

/// Classify a single keyword with the rules only.
fn classify_one(args: KeywordArgs, cli_args: &KwcatArgs) -> Result<()> {
    let lists = TokenLists::load(&args.lists)?;
    let classifier = KeywordClassifier::new(Arc::new(lists));

    if args.explain {
        let explanation = classifier.explain(&args.keyword);
        output_explanation(&explanation, cli_args)
    } else {
        let result = classifier.classify(&args.keyword);
        output_result(
            "Keyword classified",
            &KeywordResult {
                keyword: &args.keyword,
                result: &result,
            },
            cli_args,
        )
    }
}

/// Load and validate configuration without classifying anything.
fn check_config(args: CheckConfigArgs, cli_args: &KwcatArgs) -> Result<()> {
    let lists = TokenLists::load(&args.config.lists)?;
    let taxonomy = Taxonomy::load_or_default(args.config.taxonomy.as_ref())?;

    let empty_categories: Vec<String> = TokenCategory::ALL
        .iter()
        .filter(|c| lists.terms(**c).is_empty())
        .map(|c| c.as_str().to_string())
        .collect();
    for category in &empty_categories {
        warn!("Token list '{category}' is empty");
    }

    output_result(
        "Configuration is valid",
        &ConfigCheckResult {
            lists_path: args.config.lists.display().to_string(),
            total_terms: lists.total_terms(),
            empty_categories,
            taxonomy_source: describe_taxonomy_source(args.config.taxonomy.as_deref()),
            buckets: taxonomy.buckets.len(),
            intents: taxonomy.intents.len(),
            stages: taxonomy.stages.len(),
        },
        cli_args,
    )
}

/// Run the HTTP API until interrupted.
fn serve(args: ServeArgs, _cli_args: &KwcatArgs) -> Result<()> {
    let options = BatchOptions {
        fallback_enabled: !args.no_fallback,
        threads: args.threads,
        ..BatchOptions::default()
    };
    let orchestrator = build_orchestrator(&args.config, options)?;
    let fallback = if args.no_fallback {
        None
    } else {
        openai_fallback()
    };

    let state = Arc::new(AppState {
        orchestrator,
        fallback,
    });
    let runtime = Runtime::new()?;
    runtime.block_on(server::serve(args.bind, state))
}

fn build_orchestrator(config: &ConfigPaths, options: BatchOptions) -> Result<BatchOrchestrator> {
    let lists = TokenLists::load(&config.lists)?;
    let taxonomy = Taxonomy::load_or_default(config.taxonomy.as_ref())?;
    BatchOrchestrator::new(
        KeywordClassifier::new(Arc::new(lists)),
        Arc::new(taxonomy),
        options,
    )
}

/// The OpenAI fallback, or `None` with a warning when it is not configured.
fn openai_fallback() -> Option<Arc<dyn FallbackClassifier>> {
    match OpenAIFallbackClassifier::from_env() {
        Ok(classifier) => {
            info!("Fallback classifier: OpenAI model {}", classifier.model());
            Some(Arc::new(classifier))
        }
        Err(e) => {
            warn!("Fallback disabled: {e}");
            None
        }
    }
}

fn describe_taxonomy_source(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "built-in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_taxonomy_source() {
        assert_eq!(describe_taxonomy_source(None), "built-in");
        assert_eq!(
            describe_taxonomy_source(Some(Path::new("config/taxonomy.yaml"))),
            "config/taxonomy.yaml"
        );
    }
}
