//! Chat controller: validates input, calls the response source, appends messages

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::catalog::Provider;
use super::types::{Message, Selection, Transcript};
use crate::llm::{ProviderError, ResponseSource, SamplingConfig};

/// Default upper bound for a single generate call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a submit did to the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank prompt, transcript untouched
    Ignored,
    /// User message and assistant reply appended
    Replied,
    /// User message and an error notice appended
    Failed(ProviderError),
    /// User message and a cancellation notice appended
    Cancelled,
}

impl SubmitOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, SubmitOutcome::Ignored)
    }
}

/// User-initiated abort for an in-flight request
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling: never resolves
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Visible text of the assistant notice for a failed request
pub fn error_notice_text(selection: &Selection, error: &ProviderError) -> String {
    match error {
        ProviderError::Cancelled => error.to_string(),
        _ => format!(
            "⚠️ {} error: {}",
            selection.provider().display_name(),
            error
        ),
    }
}

/// Turns prompts into transcript entries through an injected [`ResponseSource`]
#[derive(Clone)]
pub struct ChatController {
    source: Arc<dyn ResponseSource>,
    timeout: Duration,
}

impl ChatController {
    pub fn new(source: Arc<dyn ResponseSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_available(&self, provider: Provider) -> bool {
        self.source.is_available(provider)
    }

    /// Submit a prompt with no way to cancel it
    pub async fn submit(
        &self,
        transcript: &mut Transcript,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
    ) -> SubmitOutcome {
        self.submit_cancellable(transcript, prompt, selection, sampling, &CancelToken::new())
            .await
    }

    /// Submit a prompt; `cancel` aborts the pending reply
    ///
    /// Both messages carry `selection` as it was when this call started. A
    /// failure never propagates: it becomes an assistant notice.
    pub async fn submit_cancellable(
        &self,
        transcript: &mut Transcript,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
        cancel: &CancelToken,
    ) -> SubmitOutcome {
        if prompt.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        transcript.push(Message::user(prompt, selection));
        tracing::info!(
            provider = selection.provider().id(),
            model = selection.model(),
            source = self.source.name(),
            "Submitting prompt"
        );

        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = self.generate(prompt, selection, sampling) => result,
        };

        match result {
            Ok(text) => {
                tracing::info!(
                    provider = selection.provider().id(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Reply received"
                );
                transcript.push(Message::assistant(text, selection));
                SubmitOutcome::Replied
            }
            Err(ProviderError::Cancelled) => {
                tracing::info!(provider = selection.provider().id(), "Request cancelled");
                transcript.push(Message::error_notice(
                    error_notice_text(selection, &ProviderError::Cancelled),
                    selection,
                ));
                SubmitOutcome::Cancelled
            }
            Err(e) => {
                tracing::warn!(
                    provider = selection.provider().id(),
                    model = selection.model(),
                    "Request failed: {}",
                    e
                );
                transcript.push(Message::error_notice(error_notice_text(selection, &e), selection));
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// One bounded call to the response source
    pub async fn generate(
        &self,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        match tokio::time::timeout(
            self.timeout,
            self.source.generate(prompt, selection, sampling),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout.as_secs())),
        }
    }
}
