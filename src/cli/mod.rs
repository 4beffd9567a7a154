//! CLI command implementations for chatdash.
//!
//! Provides subcommand handlers for:
//! - `chatdash chat`: interactive terminal session (see [`repl`])
//! - `chatdash web`: browser dashboard backed by one session
//! - `chatdash health`: NLU and training backend reachability, config files
//! - `chatdash parse "text"`: one-off intent analysis
//! - `chatdash train intents|examples|add|run`: training bridge operations
//! - `chatdash config show|init|set|reset`: configuration management

pub mod repl;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::EventLog;
use crate::config::{self, schema::ChatdashConfig};
use crate::dashboard::format_percentage;
use crate::dashboard::highlight::Segment;
use crate::nlu::{NluClient, ParseResult};
use crate::session::{
    ConnectivityIndicator, Session, StatusPoller, TRAIN_DONE_TOAST, TrainingInputError,
    generate_sender_id,
};
use crate::training::{Outcome, TrainingClient, TrainingDesk};

/// Output format for `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// A session wired to the configured HTTP backends.
pub type LiveSession = Session<NluClient, TrainingClient>;

/// Build a session from config, with optional CLI overrides.
pub fn build_session(
    cfg: &ChatdashConfig,
    nlu_url: Option<&str>,
    sender: Option<&str>,
) -> LiveSession {
    let mut nlu_cfg = cfg.nlu.clone();
    if let Some(url) = nlu_url {
        nlu_cfg.url = url.to_string();
    }
    let sender_id = sender
        .map(str::to_string)
        .unwrap_or_else(|| generate_sender_id(&cfg.session.sender_prefix));

    Session::new(
        NluClient::from_config(&nlu_cfg),
        TrainingClient::from_config(&cfg.training),
        sender_id,
        EventLog::from_config(&cfg.logging),
    )
}

/// Start the background connectivity poller for a session.
pub fn spawn_poller(
    cfg: &ChatdashConfig,
    client: &NluClient,
    indicator: &ConnectivityIndicator,
) -> StatusPoller {
    StatusPoller::spawn(
        client.clone(),
        indicator.clone(),
        Duration::from_secs(cfg.session.status_poll_secs.max(1)),
        EventLog::from_config(&cfg.logging),
    )
}

// ---------------------------------------------------------------------------
// chatdash chat
// ---------------------------------------------------------------------------

pub fn run_chat(nlu_url: Option<&str>, sender: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let mut session = build_session(&cfg, nlu_url, sender);
    let poller = spawn_poller(&cfg, session.nlu(), session.connectivity());

    let stdin = io::stdin();
    let result = repl::run(&mut session, stdin.lock(), io::stdout());
    poller.shutdown();
    result
}

// ---------------------------------------------------------------------------
// chatdash web
// ---------------------------------------------------------------------------

pub fn run_web(addr: Option<&str>, no_open: bool) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or(cfg.web.addr.as_str()).to_string();
    let mut session = build_session(&cfg, None, None);
    let _poller = spawn_poller(&cfg, session.nlu(), session.connectivity());

    crate::web::serve(&addr, cfg.web.open_browser && !no_open, &mut session)
}

// ---------------------------------------------------------------------------
// chatdash health
// ---------------------------------------------------------------------------

pub fn run_health() -> Result<()> {
    println!("{}", "chatdash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let cfg = config::load();
    let sources = config::sources();
    let files = &sources[..2];
    for source in files {
        print_health_item(
            "Config file",
            source.present,
            &if source.present {
                format!("{} found", source.label)
            } else {
                format!("{} not found", source.label)
            },
        );
    }
    if files.iter().all(|s| !s.present) {
        println!(
            "    {}",
            "run `chatdash config init` to create one".dimmed()
        );
    }

    let nlu = NluClient::from_config(&cfg.nlu);
    let state = nlu.status();
    print_health_item(
        "NLU backend",
        state.is_connected(),
        &format!("{} {}", state.label(), nlu.base_url()),
    );

    let training = TrainingClient::from_config(&cfg.training);
    let training_ok = training.is_healthy();
    print_health_item(
        "Training API",
        training_ok,
        &if training_ok {
            format!("reachable at {}", training.base_url())
        } else {
            "not reachable (optional; offline tools will be suggested)".to_string()
        },
    );

    let events = EventLog::from_config(&cfg.logging);
    match events.path() {
        Some(path) => {
            let exists = path.exists();
            print_health_item(
                "Event log",
                exists,
                &if exists {
                    format!("{} events", format_number(events.read_all().len()))
                } else {
                    "no log file yet".to_string()
                },
            );
        }
        None => print_health_item("Event log", false, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// chatdash parse
// ---------------------------------------------------------------------------

pub fn run_parse(text: &str, format: OutputFormat) -> Result<()> {
    use crate::nlu::NluBackend;

    let cfg = config::load();
    let client = NluClient::from_config(&cfg.nlu);
    let parsed = client
        .parse(text)
        .with_context(|| format!("intent analysis unavailable at {}", client.base_url()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
        OutputFormat::Table => print_parse_table(&parsed),
    }
    Ok(())
}

fn print_parse_table(parsed: &ParseResult) {
    println!("{}", "Intent Analysis".bold().cyan());
    println!(
        "  {} {}",
        "Intent:    ".bold(),
        parsed.intent_name().unwrap_or("unknown")
    );
    println!(
        "  {} {}",
        "Confidence:".bold(),
        format_percentage(parsed.confidence().unwrap_or(0.0))
    );
    if parsed.entities.is_empty() {
        println!("  {} {}", "Entities:  ".bold(), "none".dimmed());
    } else {
        println!("  {}", "Entities:".bold());
        for entity in &parsed.entities {
            println!(
                "    {:<20} {}",
                truncate(&entity.entity_type, 20),
                entity.value
            );
        }
    }
}

// ---------------------------------------------------------------------------
// chatdash train
// ---------------------------------------------------------------------------

fn training_desk() -> TrainingDesk<TrainingClient> {
    let cfg = config::load();
    TrainingDesk::new(
        TrainingClient::from_config(&cfg.training),
        EventLog::from_config(&cfg.logging),
    )
}

pub fn run_train_intents() -> Result<()> {
    println!("{}", "Intents".bold().cyan());
    for intent in training_desk().list_intents() {
        println!("  {} {}", "·".dimmed(), intent);
    }
    Ok(())
}

pub fn run_train_examples(intent: &str) -> Result<()> {
    let intent = intent.trim();
    if intent.is_empty() {
        anyhow::bail!(TrainingInputError::MissingIntent);
    }
    println!("{} {}", "Ejemplos:".bold().cyan(), intent.bold());
    for example in training_desk().list_examples(intent) {
        println!("  {} {}", "·".dimmed(), example);
    }
    Ok(())
}

pub fn run_train_add(intent: &str, example: &str) -> Result<()> {
    let mut session = build_session(&config::load(), None, None);
    match session.add_example(intent, example) {
        Ok(added) => {
            write_outcome(&added.outcome, &mut io::stdout())?;
            if let Some(examples) = added.examples {
                for example in examples {
                    println!("  {} {}", "·".dimmed(), example);
                }
            }
        }
        Err(e) => println!("{} {}", "✗".red().bold(), e),
    }
    Ok(())
}

pub fn run_train(yes: bool) -> Result<()> {
    if !yes && !confirm(io::stdin().lock(), io::stdout())? {
        println!("{}", "Cancelado.".dimmed());
        return Ok(());
    }
    println!("{}", "Entrenando modelo...".dimmed());
    write_train_outcome(&training_desk().train(), &mut io::stdout())
}

/// Ask before training; accepts `s`, `si`, `sí`, `y`, `yes`.
pub(crate) fn confirm(mut input: impl BufRead, mut output: impl Write) -> Result<bool> {
    write!(
        output,
        "¿Estás seguro de que quieres entrenar el modelo? Esto puede tomar varios minutos. [s/N] "
    )?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    ))
}

pub(crate) fn write_outcome(outcome: &Outcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        Outcome::Done(message) => writeln!(out, "{} {}", "✓".green().bold(), message)?,
        Outcome::Offline(message) => {
            writeln!(out, "{} {}", "!".yellow().bold(), message.yellow())?
        }
        Outcome::Failed(message) => writeln!(out, "{} {}", "✗".red().bold(), message.red())?,
    }
    Ok(())
}

/// Like [`write_outcome`], plus the success toast after a training run.
pub(crate) fn write_train_outcome(outcome: &Outcome, out: &mut impl Write) -> Result<()> {
    write_outcome(outcome, out)?;
    if outcome.is_done() {
        writeln!(out, "  {}", TRAIN_DONE_TOAST.green())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// chatdash config show | init | set | reset
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective chatdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for source in config::sources() {
        if source.present {
            println!("  {} {}", "✓".green(), source.label);
        } else if !source.label.starts_with("CHATDASH_") {
            println!("  {} {}", "·".dimmed(), format!("{} (not found)", source.label).dimmed());
        }
    }

    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Render highlighted segments with entity values emphasised.
pub(crate) fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| match &s.entity {
            Some(_) => s.text.magenta().bold().to_string(),
            None => s.text.clone(),
        })
        .collect()
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("cotizar_producto", 8), "cotizar…");
        assert_eq!(truncate("señal", 10), "señal");
    }

    #[test]
    fn confirm_accepts_spanish_yes() {
        let mut out = Vec::new();
        assert!(confirm("sí\n".as_bytes(), &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().starts_with("¿Estás seguro"));
        assert!(!confirm("\n".as_bytes(), Vec::new()).unwrap());
        assert!(!confirm("no\n".as_bytes(), Vec::new()).unwrap());
    }

    #[test]
    fn build_session_applies_overrides() {
        let cfg = ChatdashConfig::default();
        let session = build_session(&cfg, Some("http://10.0.0.2:5005"), Some("tester"));
        assert_eq!(session.sender_id(), "tester");
        assert_eq!(session.nlu().base_url(), "http://10.0.0.2:5005");

        let generated = build_session(&cfg, None, None);
        assert!(generated.sender_id().starts_with("bmc_user_"));
    }

    #[test]
    fn render_segments_keeps_text() {
        colored::control::set_override(false);
        let segs = vec![
            Segment { text: "un ".into(), entity: None },
            Segment { text: "widget".into(), entity: Some("producto".into()) },
        ];
        assert_eq!(render_segments(&segs), "un widget");
    }
}
