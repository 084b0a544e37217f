//! Comparison mode: one prompt fanned out to every provider

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;

use super::catalog::{Provider, ProviderCatalog};
use super::chat::ChatController;
use super::types::Selection;
use crate::llm::{ProviderError, SamplingConfig};

/// One provider's answer in a comparison
#[derive(Debug, Clone)]
pub struct ComparisonEntry {
    pub provider: Provider,
    pub model: String,
    pub result: Result<String, ProviderError>,
    pub elapsed: Duration,
}

impl ComparisonEntry {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Side-by-side results, one entry per provider in catalog order
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<ComparisonEntry>,
    /// Words shared by every successful answer, when there are enough of them
    pub consensus: Option<String>,
    /// Successful provider with the smallest elapsed time
    pub fastest: Option<Provider>,
}

impl ComparisonReport {
    pub fn entry(&self, provider: Provider) -> Option<&ComparisonEntry> {
        self.entries.iter().find(|e| e.provider == provider)
    }

    pub fn successes(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ok()).count()
    }
}

/// Model each provider answers with: the selected one for the selected
/// provider, the default everywhere else
pub fn comparison_selections(catalog: &ProviderCatalog, current: &Selection) -> Vec<Selection> {
    catalog
        .providers()
        .map(|provider| {
            if provider == current.provider() {
                current.clone()
            } else {
                Selection::new(catalog, provider)
            }
        })
        .collect()
}

/// Shortest word counted towards a consensus
const MIN_CONSENSUS_WORD_LEN: usize = 4;
/// Shared words needed before a consensus is reported
const MIN_CONSENSUS_WORDS: usize = 6;
/// Shared words quoted in the summary
const CONSENSUS_PREVIEW: usize = 5;

/// Summarize the words that appear in every answer
///
/// Needs at least two answers. Words are compared case-insensitively and
/// listed in the order of the first answer.
pub fn find_consensus(answers: &[&str]) -> Option<String> {
    if answers.len() < 2 {
        return None;
    }
    let lowered: Vec<String> = answers.iter().map(|a| a.to_lowercase()).collect();
    let word_sets: Vec<HashSet<&str>> = lowered
        .iter()
        .map(|a| a.split_whitespace().collect())
        .collect();

    let mut seen = HashSet::new();
    let common: Vec<&str> = lowered[0]
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_CONSENSUS_WORD_LEN)
        .filter(|w| word_sets.iter().all(|set| set.contains(w)))
        .filter(|w| seen.insert(*w))
        .collect();

    if common.len() < MIN_CONSENSUS_WORDS {
        return None;
    }
    Some(format!(
        "Consensus detected: {}...",
        common[..CONSENSUS_PREVIEW].join(", ")
    ))
}

impl ChatController {
    /// Ask every provider the same prompt concurrently
    ///
    /// Returns `None` for a blank prompt. Each call has its own timeout and
    /// its own result, so one failure never hides the other answers.
    pub async fn compare_all(
        &self,
        prompt: &str,
        current: &Selection,
        catalog: &ProviderCatalog,
        sampling: &SamplingConfig,
    ) -> Option<ComparisonReport> {
        if prompt.trim().is_empty() {
            return None;
        }

        let selections = comparison_selections(catalog, current);
        tracing::info!(providers = selections.len(), "Starting comparison");

        let calls = selections.into_iter().map(|selection| async move {
            let started = Instant::now();
            let result = self.generate(prompt, &selection, sampling).await;
            let elapsed = started.elapsed();
            if let Err(e) = &result {
                tracing::warn!(provider = selection.provider().id(), "Comparison call failed: {}", e);
            }
            ComparisonEntry {
                provider: selection.provider(),
                model: selection.model().to_string(),
                result,
                elapsed,
            }
        });
        let entries = join_all(calls).await;

        let fastest = entries
            .iter()
            .filter(|e| e.is_ok())
            .min_by_key(|e| e.elapsed)
            .map(|e| e.provider);

        let answers: Vec<&str> = entries
            .iter()
            .filter_map(|e| e.result.as_deref().ok())
            .collect();
        let consensus = find_consensus(&answers);

        Some(ComparisonReport {
            prompt: prompt.to_string(),
            created_at: Utc::now(),
            consensus,
            entries,
            fastest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::SimulatedSource;
    use std::sync::Arc;

    #[test]
    fn test_selections_keep_current_model() {
        let catalog = ProviderCatalog::default();
        let current = Selection::with_model(&catalog, Provider::XaiGrok, "grok-2-vision-1212").unwrap();
        let selections = comparison_selections(&catalog, &current);
        assert_eq!(selections.len(), 4);
        assert_eq!(selections[0].model(), "gpt-4o");
        assert_eq!(selections[2].model(), "grok-2-vision-1212");
    }

    #[test]
    fn test_consensus_needs_shared_words() {
        let a = "Rust offers memory safety without garbage collection through ownership rules";
        let b = "Through ownership rules, Rust offers memory safety without garbage collection";
        assert_eq!(
            find_consensus(&[a, b]).as_deref(),
            Some("Consensus detected: rust, offers, memory, safety, without...")
        );

        assert_eq!(find_consensus(&[a]), None);
        assert_eq!(find_consensus(&[a, "Python uses a garbage collector"]), None);
    }

    #[tokio::test]
    async fn test_blank_prompt_returns_none() {
        let catalog = ProviderCatalog::default();
        let controller = ChatController::new(Arc::new(SimulatedSource::new()));
        let report = controller
            .compare_all(" ", &Selection::new(&catalog, Provider::OpenAi), &catalog, &SamplingConfig::default())
            .await;
        assert!(report.is_none());
    }

    #[tokio::test]
    async fn test_fastest_skips_failures() {
        let catalog = ProviderCatalog::default();
        let source = SimulatedSource::new().with_failure(Provider::OpenAi);
        let controller = ChatController::new(Arc::new(source));
        let report = controller
            .compare_all("x", &Selection::new(&catalog, Provider::OpenAi), &catalog, &SamplingConfig::default())
            .await
            .unwrap();
        assert_eq!(report.entries.len(), 4);
        assert_eq!(report.successes(), 3);
        assert!(report.fastest.is_some());
        assert_ne!(report.fastest, Some(Provider::OpenAi));
        // The simulated answers share their template
        assert!(report
            .consensus
            .as_deref()
            .unwrap()
            .starts_with("Consensus detected: this, simulated, response, from"));
    }
}
