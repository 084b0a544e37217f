//! End-to-end behaviour of selection, chat submission, comparison and rendering

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use studio_cli::core::{
    CatalogError, ChatController, Provider, ProviderCatalog, Role, Selection, SessionDefaults,
    SessionState, SubmitOutcome, Toggle, Transcript,
};
use studio_cli::dashboard;
use studio_cli::llm::{ProviderError, ResponseSource, SamplingConfig, SimulatedSource};

fn controller(source: SimulatedSource) -> ChatController {
    ChatController::new(Arc::new(source))
}

#[test]
fn test_every_provider_has_unique_models() {
    let catalog = ProviderCatalog::default();
    for provider in Provider::ALL {
        let models = catalog.models_for(provider.display_name()).unwrap();
        assert!(!models.is_empty());
        let mut unique = models.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), models.len(), "duplicate model for {}", provider);
    }
    assert!(matches!(
        catalog.models_for("Mistral"),
        Err(CatalogError::UnknownProvider(_))
    ));
}

#[derive(Debug, Clone)]
enum Action {
    SetProvider(usize),
    SetModel(String),
}

fn action() -> impl Strategy<Value = Action> {
    let models: Vec<String> = Provider::ALL
        .iter()
        .flat_map(|&p| ProviderCatalog::default().models(p).to_vec())
        .chain(["gpt-5".to_string(), String::new()])
        .collect();
    prop_oneof![
        (0usize..4).prop_map(Action::SetProvider),
        proptest::sample::select(models).prop_map(Action::SetModel),
    ]
}

proptest! {
    #[test]
    fn selection_model_always_belongs_to_provider(actions in proptest::collection::vec(action(), 0..40)) {
        let catalog = ProviderCatalog::default();
        let mut selection = Selection::new(&catalog, Provider::OpenAi);
        for action in actions {
            match action {
                Action::SetProvider(i) => {
                    selection.set_provider(&catalog, Provider::ALL[i]);
                    prop_assert_eq!(selection.model(), catalog.default_model(Provider::ALL[i]));
                }
                Action::SetModel(model) => {
                    let before = selection.clone();
                    let offered = catalog.contains(selection.provider(), &model);
                    let result = selection.set_model(&catalog, &model);
                    prop_assert_eq!(result.is_ok(), offered);
                    if !offered {
                        prop_assert_eq!(&selection, &before);
                    }
                }
            }
            prop_assert!(catalog.contains(selection.provider(), selection.model()));
        }
    }
}

#[tokio::test]
async fn test_hello_appends_tagged_pair() {
    let catalog = ProviderCatalog::default();
    let selection = Selection::with_model(&catalog, Provider::OpenAi, "gpt-4o").unwrap();
    let mut transcript = Transcript::new();

    let outcome = controller(SimulatedSource::new())
        .submit(&mut transcript, "hello", &selection, &SamplingConfig::default())
        .await;

    assert_eq!(outcome, SubmitOutcome::Replied);
    assert_eq!(transcript.len(), 2);
    let user = &transcript.messages()[0];
    let reply = &transcript.messages()[1];
    assert_eq!(user.role, Role::User);
    assert_eq!(user.content, "hello");
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.provider.as_deref(), Some("OpenAI"));
    assert_eq!(reply.model.as_deref(), Some("gpt-4o"));
    assert!(!reply.is_error);
}

#[tokio::test]
async fn test_history_keeps_original_tags() {
    let catalog = ProviderCatalog::default();
    let chat = controller(SimulatedSource::new());
    let mut state = SessionState::new(&catalog, &SessionDefaults::default());

    let selection = state.selection.clone();
    chat.submit(&mut state.transcript, "first", &selection, &state.sampling)
        .await;
    state.set_provider(&catalog, Provider::DeepSeek);
    let selection = state.selection.clone();
    chat.submit(&mut state.transcript, "second", &selection, &state.sampling)
        .await;

    let captions: Vec<_> = state
        .transcript
        .iter()
        .map(|m| m.caption().unwrap())
        .collect();
    assert_eq!(captions[0], "Provider: OpenAI | Model: gpt-4o");
    assert_eq!(captions[1], "Provider: OpenAI | Model: gpt-4o");
    assert_eq!(captions[2], "Provider: DeepSeek | Model: deepseek-chat");
    assert_eq!(captions[3], "Provider: DeepSeek | Model: deepseek-chat");
}

/// Source that hangs for one provider and answers for the rest
struct StallingSource {
    stalled: Provider,
}

#[async_trait]
impl ResponseSource for StallingSource {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn generate(
        &self,
        _prompt: &str,
        selection: &Selection,
        _sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        if selection.provider() == self.stalled {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(format!("answer from {}", selection.provider()))
    }
}

#[tokio::test]
async fn test_compare_isolates_failures_and_timeouts() {
    let catalog = ProviderCatalog::default();
    let chat = ChatController::new(Arc::new(StallingSource {
        stalled: Provider::XaiGrok,
    }))
    .with_timeout(Duration::from_millis(100));
    let selection = Selection::new(&catalog, Provider::Anthropic);

    let report = chat
        .compare_all("x", &selection, &catalog, &SamplingConfig::default())
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 4);
    let order: Vec<_> = report.entries.iter().map(|e| e.provider).collect();
    assert_eq!(order, Provider::ALL.to_vec());
    assert!(matches!(
        report.entry(Provider::XaiGrok).unwrap().result,
        Err(ProviderError::Timeout(_))
    ));
    for provider in [Provider::OpenAi, Provider::Anthropic, Provider::DeepSeek] {
        let entry = report.entry(provider).unwrap();
        assert_eq!(
            entry.result.as_deref(),
            Ok(format!("answer from {}", provider.display_name()).as_str())
        );
    }
    assert_ne!(report.fastest, Some(Provider::XaiGrok));
}

#[tokio::test]
async fn test_compare_with_failing_provider() {
    let catalog = ProviderCatalog::default();
    let chat = controller(SimulatedSource::new().with_failure(Provider::DeepSeek));
    let report = chat
        .compare_all(
            "x",
            &Selection::new(&catalog, Provider::OpenAi),
            &catalog,
            &SamplingConfig::default(),
        )
        .await
        .unwrap();
    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.successes(), 3);
    assert!(report.entry(Provider::DeepSeek).unwrap().result.is_err());
}

#[tokio::test]
async fn test_render_preserves_append_order() {
    let catalog = ProviderCatalog::default();
    let chat = controller(SimulatedSource::new().with_failure(Provider::Anthropic));
    let mut state = SessionState::new(&catalog, &SessionDefaults::default());

    for (provider, prompt) in [
        (Provider::OpenAi, "one"),
        (Provider::Anthropic, "two"),
        (Provider::XaiGrok, "three"),
    ] {
        state.set_provider(&catalog, provider);
        let selection = state.selection.clone();
        chat.submit(&mut state.transcript, prompt, &selection, &state.sampling)
            .await;
    }
    state.toggle(Toggle::MultiProvider);
    let selection = state.selection.clone();
    state.last_comparison = chat
        .compare_all("four", &selection, &catalog, &state.sampling)
        .await;

    let view = dashboard::render(&state, &catalog);
    let rendered: Vec<&str> = view.chat.iter().map(|e| e.content.as_str()).collect();
    let appended: Vec<&str> = state.transcript.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(rendered, appended);
    assert_eq!(view.chat.len(), 6);
    assert!(view.chat[3].is_error);

    let tabs: Vec<_> = view.comparison.unwrap().tabs.iter().map(|t| t.provider).collect();
    assert_eq!(tabs, vec!["OpenAI", "Anthropic", "xAI Grok", "DeepSeek"]);
}
