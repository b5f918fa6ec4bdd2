//! Batch pipeline: parallel rule pass, then chunked fallback review.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::batch::input::{KeywordTable, find_keyword_column};
use crate::batch::report::{BatchReport, BatchStats, CategorizedRow};
use crate::config::Taxonomy;
use crate::error::{KwcatError, Result};
use crate::fallback::{FallbackClassifier, FallbackItem};
use crate::policy::{ClassificationResult, KeywordClassifier};

/// Batch run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Send the review subset to the fallback classifier when one is given.
    pub fallback_enabled: bool,
    /// Keywords per fallback request.
    pub fallback_batch_size: usize,
    /// Fallback requests in flight at once.
    pub fallback_concurrency: usize,
    /// Rows below this confidence are reviewed.
    pub review_threshold: f64,
    /// Minimum confidence of an applied override.
    pub override_confidence_floor: f64,
    /// Rule pass worker threads, defaults to the number of CPUs.
    pub threads: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            fallback_batch_size: 80,
            fallback_concurrency: 1,
            review_threshold: 0.5,
            override_confidence_floor: 0.6,
            threads: None,
        }
    }
}

impl BatchOptions {
    pub fn validate(&self) -> Result<()> {
        if self.fallback_batch_size == 0 {
            return Err(KwcatError::invalid_argument(
                "fallback batch size must be at least 1",
            ));
        }
        if self.fallback_concurrency == 0 {
            return Err(KwcatError::invalid_argument(
                "fallback concurrency must be at least 1",
            ));
        }
        if self.threads == Some(0) {
            return Err(KwcatError::invalid_argument("threads must be at least 1"));
        }
        Ok(())
    }
}

/// Runs keyword tables through the rules and the optional fallback.
#[derive(Clone)]
pub struct BatchOrchestrator {
    classifier: KeywordClassifier,
    taxonomy: Arc<Taxonomy>,
    options: BatchOptions,
    thread_pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("options", &self.options)
            .field("threads", &self.thread_pool.current_num_threads())
            .finish()
    }
}

impl BatchOrchestrator {
    pub fn new(
        classifier: KeywordClassifier,
        taxonomy: Arc<Taxonomy>,
        options: BatchOptions,
    ) -> Result<Self> {
        options.validate()?;
        let threads = options.threads.unwrap_or_else(num_cpus::get);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("kwcat-rules-{i}"))
            .build()
            .map_err(|e| KwcatError::other(format!("Failed to create thread pool: {e}")))?;

        Ok(Self {
            classifier,
            taxonomy,
            options,
            thread_pool: Arc::new(thread_pool),
        })
    }

    /// Same classifier and pool with different fallback settings.
    ///
    /// `threads` is ignored; the existing pool is kept.
    pub fn with_options(&self, options: BatchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..self.clone()
        })
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn classifier(&self) -> &KeywordClassifier {
        &self.classifier
    }

    /// Classify keywords with the rules on the worker pool, preserving order.
    pub fn classify_rules(&self, keywords: &[String]) -> Vec<ClassificationResult> {
        let classifier = &self.classifier;
        self.thread_pool
            .install(|| keywords.par_iter().map(|k| classifier.classify(k)).collect())
    }

    /// Classify a whole table.
    ///
    /// The rule pass runs on a blocking task so the async runtime stays free.
    /// When `fallback` is given and enabled in the options, the review subset
    /// is sent to it afterwards.
    pub async fn run(
        &self,
        table: KeywordTable,
        fallback: Option<&dyn FallbackClassifier>,
    ) -> Result<BatchReport> {
        let keyword_column = find_keyword_column(&table)?;
        let keywords = table.column(keyword_column);
        let column_name = table.columns[keyword_column].clone();
        info!(
            "Classifying {} keywords from column '{}'",
            keywords.len(),
            column_name
        );

        let this = self.clone();
        let (keywords, results) = tokio::task::spawn_blocking(move || {
            let results = this.classify_rules(&keywords);
            (keywords, results)
        })
        .await
        .map_err(|e| KwcatError::other(format!("rule pass task failed: {e}")))?;

        let KeywordTable { columns, rows } = table;
        let mut categorized: Vec<CategorizedRow> = keywords
            .into_iter()
            .zip(rows)
            .zip(results.iter())
            .map(|((keyword, values), result)| CategorizedRow::from_rules(keyword, values, result))
            .collect();

        let mut stats = BatchStats {
            total: categorized.len(),
            ..BatchStats::default()
        };

        let review: Vec<usize> = categorized
            .iter()
            .enumerate()
            .filter(|(_, row)| row.needs_review(self.options.review_threshold))
            .map(|(i, _)| i)
            .collect();
        stats.reviewed = review.len();
        stats.rule_resolved = stats.total - stats.reviewed;

        match fallback {
            Some(fallback) if self.options.fallback_enabled && !review.is_empty() => {
                stats.fallback_used = true;
                self.apply_fallback(&mut categorized, &review, fallback, &mut stats)
                    .await;
            }
            _ => debug!("Fallback review skipped for {} rows", review.len()),
        }

        info!(
            "Batch done: {} total, {} reviewed, {} overridden",
            stats.total, stats.reviewed, stats.overridden
        );
        Ok(BatchReport::new(columns, column_name, categorized, stats))
    }

    async fn apply_fallback(
        &self,
        rows: &mut [CategorizedRow],
        review: &[usize],
        fallback: &dyn FallbackClassifier,
        stats: &mut BatchStats,
    ) {
        let todo: Vec<String> = review.iter().map(|&i| rows[i].keyword.clone()).collect();
        let chunks: Vec<Vec<String>> = todo
            .chunks(self.options.fallback_batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        info!(
            "Sending {} keywords to fallback '{}' in {} batches",
            todo.len(),
            fallback.name(),
            chunks.len()
        );

        // chunks are moved into the stream so the run future stays Send
        let shared_taxonomy = Arc::clone(&self.taxonomy);
        let responses: Vec<(usize, Result<Vec<FallbackItem>>)> =
            stream::iter(chunks.into_iter().enumerate())
                .map(move |(index, chunk)| {
                    let taxonomy = Arc::clone(&shared_taxonomy);
                    async move { (index, fallback.classify_batch(&chunk, &taxonomy).await) }
                })
                .buffered(self.options.fallback_concurrency)
                .collect()
                .await;

        let taxonomy = self.taxonomy.as_ref();

        // later items for the same keyword win
        let mut overrides: HashMap<String, FallbackItem> = HashMap::new();
        for (index, response) in responses {
            match response {
                Ok(items) => {
                    for item in items {
                        overrides.insert(item.keyword.clone(), item);
                    }
                }
                Err(e) => {
                    warn!("Fallback batch {index} failed: {e}");
                    stats.failed_fallback_batches += 1;
                }
            }
        }

        for &i in review {
            let Some(item) = overrides.get(&rows[i].keyword) else {
                continue;
            };
            let violations = item.violations(taxonomy);
            if !violations.is_empty() {
                warn!(
                    "Rejected fallback override for '{}': {}",
                    item.keyword,
                    violations.join(", ")
                );
                stats.rejected_overrides += 1;
                continue;
            }
            rows[i].apply_override(item, self.options.override_confidence_floor);
            stats.overridden += 1;
        }
    }
}
