//! Panel renderer
//!
//! [`render`] is a pure function from session state to a [`DashboardView`]:
//! the layout description served as JSON over HTTP and printed by the CLI.
//! It is recomputed after every mutation; nothing is cached.

mod terminal;

pub use terminal::to_terminal;

use serde::Serialize;

use crate::core::{
    ComparisonReport, Provider, ProviderCatalog, Role, SessionState, UiToggles, UploadMeta,
    VisionOutcome,
};
use crate::vision::ImageKind;

pub const TITLE: &str = "🚀 FastBite Pro AI Studio";
pub const SUBTITLE: &str = "Advanced Multi-AI Platform with Voice & Vision";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub header: Header,
    pub sidebar: Sidebar,
    pub chat: Vec<ChatEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoicePanelView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionPanelView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonView>,
    pub metrics: Vec<Metric>,
    pub usage_chart: Vec<UsageSlice>,
    pub response_times: ResponseTimeChart,
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub providers: Vec<ProviderOption>,
    pub models: Vec<ModelOption>,
    pub toggles: UiToggles,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderOption {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelOption {
    pub id: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoicePanelView {
    pub recording: bool,
    pub speed: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisionPanelView {
    pub accepted_formats: Vec<&'static str>,
    pub last_upload: Option<UploadMeta>,
    pub question: String,
    pub last_result: Option<VisionOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    /// Prompt of the last comparison, if one ran
    pub prompt: Option<String>,
    pub tabs: Vec<ComparisonTab>,
    pub fastest: Option<&'static str>,
    pub consensus: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonTab {
    pub provider: &'static str,
    pub icon: &'static str,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: &'static str,
    pub delta: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UsageSlice {
    pub provider: &'static str,
    pub share: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseTimeChart {
    pub times: Vec<&'static str>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub provider: &'static str,
    pub color: &'static str,
    pub values: Vec<f64>,
}

/// Sample headline numbers
pub fn sample_metrics() -> Vec<Metric> {
    vec![
        Metric {
            label: "Total Requests",
            value: "1,234",
            delta: "+12%",
        },
        Metric {
            label: "Active Sessions",
            value: "56",
            delta: "+3%",
        },
        Metric {
            label: "Average Response Time",
            value: "1.2s",
            delta: "-5%",
        },
        Metric {
            label: "Success Rate",
            value: "99.8%",
            delta: "+0.1%",
        },
    ]
}

/// Sample usage share per provider
pub fn sample_usage() -> Vec<UsageSlice> {
    Provider::ALL
        .iter()
        .map(|&provider| UsageSlice {
            provider: provider.display_name(),
            share: match provider {
                Provider::OpenAi => 45,
                Provider::Anthropic => 25,
                Provider::XaiGrok => 20,
                Provider::DeepSeek => 10,
            },
            color: provider.color(),
        })
        .collect()
}

/// Sample response-time series, one point every four hours
pub fn sample_response_times() -> ResponseTimeChart {
    ResponseTimeChart {
        times: vec!["00:00", "04:00", "08:00", "12:00", "16:00", "20:00"],
        series: Provider::ALL
            .iter()
            .map(|&provider| Series {
                provider: provider.display_name(),
                color: provider.color(),
                values: match provider {
                    Provider::OpenAi => vec![1.2, 1.1, 1.3, 1.0, 1.1, 1.2],
                    Provider::Anthropic => vec![1.5, 1.4, 1.6, 1.3, 1.4, 1.5],
                    Provider::XaiGrok => vec![1.8, 1.7, 1.9, 1.6, 1.7, 1.8],
                    Provider::DeepSeek => vec![2.1, 2.0, 2.2, 1.9, 2.0, 2.1],
                },
            })
            .collect(),
    }
}

/// Build the layout description for a session
pub fn render(state: &SessionState, catalog: &ProviderCatalog) -> DashboardView {
    let selection = &state.selection;
    let toggles = state.toggles;

    let providers = catalog
        .providers()
        .map(|p| ProviderOption {
            id: p.id(),
            name: p.display_name(),
            icon: p.icon(),
            selected: p == selection.provider(),
        })
        .collect();
    let models = catalog
        .models(selection.provider())
        .iter()
        .map(|m| ModelOption {
            id: m.clone(),
            selected: m == selection.model(),
        })
        .collect();

    let chat = state
        .transcript
        .iter()
        .map(|m| ChatEntry {
            role: m.role,
            content: m.content.clone(),
            caption: m.caption(),
            is_error: m.is_error,
        })
        .collect();

    let voice = toggles.voice_enabled.then(|| VoicePanelView {
        recording: toggles.recording,
        speed: state.voice.speed(),
        pitch: state.voice.pitch(),
    });

    let vision = toggles.vision_enabled.then(|| VisionPanelView {
        accepted_formats: ImageKind::ACCEPTED.iter().map(|k| k.label()).collect(),
        last_upload: state.vision.last_upload.clone(),
        question: state.vision.question.clone(),
        last_result: state.vision.last_result.clone(),
    });

    let comparison = toggles
        .multi_provider_enabled
        .then(|| comparison_view(state.last_comparison.as_ref(), catalog));

    DashboardView {
        header: Header {
            title: TITLE,
            subtitle: SUBTITLE,
        },
        sidebar: Sidebar {
            providers,
            models,
            toggles,
            temperature: state.sampling.temperature(),
            max_tokens: state.sampling.max_tokens(),
        },
        chat,
        voice,
        vision,
        comparison,
        metrics: sample_metrics(),
        usage_chart: sample_usage(),
        response_times: sample_response_times(),
    }
}

/// Comparison tabs in catalog order; empty before the first comparison
pub fn comparison_view(report: Option<&ComparisonReport>, catalog: &ProviderCatalog) -> ComparisonView {
    let Some(report) = report else {
        return ComparisonView {
            prompt: None,
            tabs: Vec::new(),
            fastest: None,
            consensus: None,
        };
    };

    let tabs = catalog
        .providers()
        .filter_map(|p| report.entry(p))
        .map(|entry| {
            let (response, error) = match &entry.result {
                Ok(text) => (Some(text.clone()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            ComparisonTab {
                provider: entry.provider.display_name(),
                icon: entry.provider.icon(),
                model: entry.model.clone(),
                response,
                error,
                elapsed_ms: entry.elapsed.as_millis() as u64,
            }
        })
        .collect();

    ComparisonView {
        prompt: Some(report.prompt.clone()),
        tabs,
        fastest: report.fastest.map(Provider::display_name),
        consensus: report.consensus.clone(),
    }
}
