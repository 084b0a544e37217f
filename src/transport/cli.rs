//! CLI transport for direct terminal interaction

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{Config, SourceKind};
use crate::core::{
    CancelToken, ComparisonReport, Message, Provider, SessionState, SubmitOutcome, Toggle,
};
use crate::dashboard;
use crate::services::StudioService;
use crate::vision::{question_or_default, ImageUpload};

/// Options for `studio chat`
#[derive(Debug, Default)]
pub struct ChatOptions {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub live: bool,
    pub message: Option<String>,
}

/// One parsed REPL line
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Prompt(String),
    Provider(String),
    Model(String),
    Models,
    Toggle(Toggle),
    Record,
    Stop,
    Temperature(f32),
    MaxTokens(u32),
    Speed(f32),
    Pitch(f32),
    Image { path: String, question: String },
    Compare(String),
    Dashboard,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  /provider <name>          switch provider (model resets to its default)
  /model <id>               switch model within the current provider
  /models                   list models for the current provider
  /voice /vision /multi     toggle a panel
  /record /stop             start or stop voice capture
  /temp <0.0-2.0>           set temperature
  /max-tokens <100-4000>    set max tokens
  /speed <0.5-2.0>          set speech speed
  /pitch <0.5-2.0>          set speech pitch
  /image <path> [question]  analyze an image (JPEG, PNG, GIF)
  /compare <prompt>         ask every provider the same prompt
  /dashboard                show all panels
  /help                     show this help
  /quit                     exit";

/// Parse one line of REPL input
pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Prompt(line.to_string()));
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let require = |usage: &str| -> Result<String, String> {
        if arg.is_empty() {
            Err(format!("Usage: {}", usage))
        } else {
            Ok(arg.to_string())
        }
    };
    let number = |usage: &str| -> Result<f32, String> {
        require(usage)?
            .parse::<f32>()
            .map_err(|_| format!("Usage: {}", usage))
    };

    match name {
        "provider" => require("/provider <name>").map(ReplCommand::Provider),
        "model" => require("/model <id>").map(ReplCommand::Model),
        "models" => Ok(ReplCommand::Models),
        "voice" => Ok(ReplCommand::Toggle(Toggle::Voice)),
        "vision" => Ok(ReplCommand::Toggle(Toggle::Vision)),
        "multi" => Ok(ReplCommand::Toggle(Toggle::MultiProvider)),
        "record" => Ok(ReplCommand::Record),
        "stop" => Ok(ReplCommand::Stop),
        "temp" => number("/temp <0.0-2.0>").map(ReplCommand::Temperature),
        "max-tokens" => require("/max-tokens <100-4000>")?
            .parse::<u32>()
            .map(ReplCommand::MaxTokens)
            .map_err(|_| "Usage: /max-tokens <100-4000>".to_string()),
        "speed" => number("/speed <0.5-2.0>").map(ReplCommand::Speed),
        "pitch" => number("/pitch <0.5-2.0>").map(ReplCommand::Pitch),
        "image" => {
            let arg = require("/image <path> [question]")?;
            let (path, question) = match arg.split_once(char::is_whitespace) {
                Some((path, question)) => (path.to_string(), question.trim().to_string()),
                None => (arg, String::new()),
            };
            Ok(ReplCommand::Image { path, question })
        }
        "compare" => require("/compare <prompt>").map(ReplCommand::Compare),
        "dashboard" => Ok(ReplCommand::Dashboard),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command: /{}. Type /help", other)),
    }
}

fn build_service(mut config: Config, live: bool) -> Result<StudioService> {
    if live {
        config.studio.source = SourceKind::Live;
    }
    StudioService::from_config(&config)
}

/// Run interactive chat mode
pub async fn run_chat(config: Config, options: ChatOptions) -> Result<()> {
    let service = build_service(config, options.live)?;
    let mut session = service.new_session();

    if let Some(name) = &options.provider {
        let provider: Provider = name.parse()?;
        session.set_provider(&service.catalog, provider);
    }
    if let Some(model) = &options.model {
        session
            .set_model(&service.catalog, model)
            .context("Invalid --model")?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", dashboard::TITLE.bold().cyan())?;
    writeln!(
        stdout,
        "{} {} | {} {} | source: {}",
        "Provider:".bold(),
        session.selection.provider().display_name(),
        "Model:".bold(),
        session.selection.model(),
        service.controller.source_name()
    )?;
    writeln!(stdout, "Type /help for commands, /quit to exit\n")?;

    if let Some(message) = options.message {
        writeln!(stdout, "> {}", message)?;
        submit(&service, &mut session, &message, &mut stdout).await?;
    }

    run_repl(&service, &mut session, stdin.lock(), &mut stdout).await
}

/// Read commands until EOF or /quit
pub async fn run_repl<R: BufRead, W: Write>(
    service: &StudioService,
    session: &mut SessionState,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e.yellow())?;
                continue;
            }
        };
        if command == ReplCommand::Quit {
            writeln!(out, "Goodbye!")?;
            break;
        }
        execute(service, session, command, out).await?;
    }
    Ok(())
}

/// Apply one command to the session, reporting to `out`
///
/// Only I/O failures on `out` are returned; domain errors are printed.
pub async fn execute<W: Write>(
    service: &StudioService,
    session: &mut SessionState,
    command: ReplCommand,
    out: &mut W,
) -> Result<()> {
    let catalog = &service.catalog;
    match command {
        ReplCommand::Prompt(prompt) => submit(service, session, &prompt, out).await?,
        ReplCommand::Provider(name) => match name.parse::<Provider>() {
            Ok(provider) => {
                session.set_provider(catalog, provider);
                writeln!(
                    out,
                    "Provider: {} {} (model {})",
                    provider.icon(),
                    provider.display_name(),
                    session.selection.model()
                )?;
            }
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Model(model) => match session.set_model(catalog, &model) {
            Ok(()) => writeln!(out, "Model: {}", session.selection.model())?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Models => {
            for model in catalog.models(session.selection.provider()) {
                if model == session.selection.model() {
                    writeln!(out, "  {} {}", "●".green(), model)?;
                } else {
                    writeln!(out, "    {}", model)?;
                }
            }
        }
        ReplCommand::Toggle(toggle) => {
            let value = session.toggle(toggle);
            let name = match toggle {
                Toggle::Voice => "Voice",
                Toggle::Vision => "Vision",
                Toggle::MultiProvider => "Multi-provider",
            };
            writeln!(out, "{}: {}", name, if value { "on" } else { "off" })?;
        }
        ReplCommand::Record => match session.start_recording() {
            Ok(()) => writeln!(out, "🔴 Recording... (/stop to finish)")?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Stop => match session.stop_recording() {
            Ok(clip) => writeln!(out, "⏹️ Recording stopped ({} bytes captured)", clip.bytes.len())?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Temperature(value) => match session.sampling.set_temperature(value) {
            Ok(()) => writeln!(out, "Temperature: {:.1}", value)?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::MaxTokens(value) => match session.sampling.set_max_tokens(value) {
            Ok(()) => writeln!(out, "Max tokens: {}", value)?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Speed(value) => match session.voice.set_speed(value) {
            Ok(()) => writeln!(out, "Speech speed: {:.1}", value)?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Pitch(value) => match session.voice.set_pitch(value) {
            Ok(()) => writeln!(out, "Speech pitch: {:.1}", value)?,
            Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
        },
        ReplCommand::Image { path, question } => {
            if !session.toggles.vision_enabled {
                writeln!(out, "Vision is off. Enable it with /vision")?;
                return Ok(());
            }
            analyze_image(service, session, Path::new(&path), &question, out).await?;
        }
        ReplCommand::Compare(prompt) => {
            let report = service
                .controller
                .compare_all(&prompt, &session.selection, catalog, &session.sampling)
                .await;
            if let Some(report) = report {
                print_comparison(&report, out)?;
                session.last_comparison = Some(report);
            }
        }
        ReplCommand::Dashboard => {
            let view = dashboard::render(session, catalog);
            writeln!(out, "{}", dashboard::to_terminal(&view))?;
        }
        ReplCommand::Help => writeln!(out, "{}", HELP)?,
        ReplCommand::Quit => {}
    }
    Ok(())
}

async fn submit<W: Write>(
    service: &StudioService,
    session: &mut SessionState,
    prompt: &str,
    out: &mut W,
) -> Result<()> {
    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let selection = session.selection.clone();
    let outcome = service
        .controller
        .submit_cancellable(
            &mut session.transcript,
            prompt,
            &selection,
            &session.sampling,
            &cancel,
        )
        .await;
    watcher.abort();

    if outcome.is_ignored() {
        return Ok(());
    }
    if let Some(reply) = session.transcript.last() {
        print_message(reply, out)?;
        if outcome == SubmitOutcome::Replied && session.toggles.voice_enabled {
            match service.tts.synthesize(&reply.content, &session.voice) {
                Ok(clip) => tracing::debug!(bytes = clip.bytes.len(), "Synthesized reply"),
                Err(e) => tracing::warn!("Speech synthesis failed: {}", e),
            }
        }
    }
    Ok(())
}

fn print_message<W: Write>(message: &Message, out: &mut W) -> Result<()> {
    if message.is_error {
        writeln!(out, "\n{}", message.content.yellow())?;
    } else {
        writeln!(out, "\n{}", message.content)?;
    }
    if let Some(caption) = message.caption() {
        writeln!(out, "{}\n", caption.dimmed())?;
    }
    Ok(())
}

async fn analyze_image<W: Write>(
    service: &StudioService,
    session: &mut SessionState,
    path: &Path,
    question: &str,
    out: &mut W,
) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            writeln!(out, "{}", format!("Cannot read {}: {}", path.display(), e).yellow())?;
            return Ok(());
        }
    };
    let upload = match ImageUpload::from_bytes(name, bytes) {
        Ok(upload) => upload,
        Err(e) => {
            session.record_vision_error(question, &e);
            writeln!(out, "{}", e.to_string().yellow())?;
            return Ok(());
        }
    };

    writeln!(out, "🔍 Analyzing: {}", question_or_default(question))?;
    let result = service
        .vision
        .analyze(&upload, question, &session.selection)
        .await;
    match &result {
        Ok(text) => writeln!(out, "{}", text)?,
        Err(e) => writeln!(out, "{}", format!("⚠️ {}", e).yellow())?,
    }
    session.record_vision(&upload, question, result);
    Ok(())
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Time")]
    elapsed: String,
    #[tabled(rename = "Response")]
    response: String,
}

fn print_comparison<W: Write>(report: &ComparisonReport, out: &mut W) -> Result<()> {
    let rows: Vec<ComparisonRow> = report
        .entries
        .iter()
        .map(|entry| ComparisonRow {
            provider: format!("{} {}", entry.provider.icon(), entry.provider.display_name()),
            model: entry.model.clone(),
            elapsed: format!("{}ms", entry.elapsed.as_millis()),
            response: match &entry.result {
                Ok(text) => text.clone(),
                Err(e) => format!("⚠️ {}", e),
            },
        })
        .collect();

    writeln!(out, "{}", "=== MULTI-PROVIDER COMPARISON ===".bold().cyan())?;
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    writeln!(out, "{}", table)?;
    if let Some(fastest) = report.fastest {
        writeln!(out, "Fastest: {}", fastest.display_name().green())?;
    }
    if let Some(consensus) = &report.consensus {
        writeln!(out, "{}", consensus.cyan())?;
    }
    Ok(())
}

/// One-shot comparison across every provider
pub async fn run_compare(config: Config, prompt: &str, live: bool) -> Result<()> {
    let service = build_service(config, live)?;
    let session = service.new_session();
    let report = service
        .controller
        .compare_all(prompt, &session.selection, &service.catalog, &session.sampling)
        .await
        .context("Prompt is empty")?;
    print_comparison(&report, &mut io::stdout())
}

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "Provider")]
    name: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Models")]
    models: String,
    #[tabled(rename = "Features")]
    features: String,
}

/// List providers and their models
pub fn run_models(config: &Config, provider: Option<&str>) -> Result<()> {
    let catalog = config.catalog()?;
    match provider {
        Some(name) => {
            let provider: Provider = name.parse()?;
            println!("{}", format!("{} {}", provider.icon(), provider.display_name()).bold());
            for (i, model) in catalog.models(provider).iter().enumerate() {
                if i == 0 {
                    println!("  {} {}", model, "(default)".dimmed());
                } else {
                    println!("  {}", model);
                }
            }
        }
        None => {
            let rows: Vec<ProviderRow> = catalog
                .list()
                .into_iter()
                .map(|info| ProviderRow {
                    name: format!("{} {}", info.icon, info.name),
                    id: info.id.clone(),
                    models: info.models.join(", "),
                    features: info
                        .features
                        .iter()
                        .map(|f| format!("{:?}", f).to_lowercase())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();
            println!("{}", "=== AI PROVIDERS ===".bold().cyan());
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }
    Ok(())
}

/// Render the panels for a fresh session
pub fn run_dashboard(config: &Config, json: bool) -> Result<()> {
    let service = StudioService::from_config(config)?;
    let session = service.new_session();
    let view = dashboard::render(&session, &service.catalog);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", dashboard::to_terminal(&view));
    }
    Ok(())
}
