//! Interactive terminal chat (`chatdash chat`).
//!
//! Plain lines are sent as chat messages; lines starting with `/` are
//! commands. All output goes through the given writer so the loop can be
//! driven from tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use super::{confirm, render_segments, write_outcome, write_train_outcome};
use crate::analytics::conversation::default_export_name;
use crate::dashboard::format_percentage;
use crate::nlu::NluBackend;
use crate::session::{Exchange, NO_RESPONSE_TEXT, Session, intent_created_message};
use crate::training::TrainingBackend;

const HELP: &str = "\
Comandos:
  /parse <texto>           analizar intent sin enviar
  /tracker                 estado de la conversación en el servidor
  /save [archivo]          exportar la conversación a JSON
  /stats                   resumen de analytics
  /history                 mensajes de esta sesión
  /status                  estado de conexión
  /intents                 listar intents
  /examples <intent>       ejemplos de un intent
  /add <intent> <ejemplo>  agregar ejemplo de entrenamiento
  /new-intent <nombre>     crear intent local
  /train                   entrenar modelo
  /exit                    salir";

/// Run the loop until `/exit` or end of input.
pub fn run<N, T>(
    session: &mut Session<N, T>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()>
where
    N: NluBackend,
    T: TrainingBackend,
{
    writeln!(
        out,
        "{} {} ({})",
        "chatdash".bold().cyan(),
        session.sender_id().dimmed(),
        session.connectivity().label()
    )?;
    writeln!(out, "{}", "Escribe /help para ver los comandos.".dimmed())?;

    loop {
        write!(out, "{} ", ">".bold())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
            if !handle_command(session, name, rest.trim(), &mut input, &mut out)? {
                break;
            }
        } else {
            match session.submit(line) {
                Ok(exchange) => print_exchange(&exchange, &mut out)?,
                Err(e) => writeln!(out, "{} {}", "✗".red().bold(), e.to_string().red())?,
            }
        }
    }

    Ok(())
}

/// Returns `false` when the loop should stop.
fn handle_command<N, T>(
    session: &mut Session<N, T>,
    name: &str,
    args: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool>
where
    N: NluBackend,
    T: TrainingBackend,
{
    match name {
        "exit" | "quit" => return Ok(false),
        "help" => writeln!(out, "{HELP}")?,

        "parse" => match session.parse_only(args) {
            Ok(parsed) => {
                writeln!(
                    out,
                    "  {} {} ({})",
                    "Intent:".bold(),
                    parsed.intent_name().unwrap_or("unknown"),
                    format_percentage(parsed.confidence().unwrap_or(0.0))
                )?;
                for entity in &parsed.entities {
                    writeln!(out, "  {} {} = {}", "·".dimmed(), entity.entity_type, entity.value)?;
                }
            }
            Err(e) => writeln!(out, "{} {}", "✗".red().bold(), e)?,
        },

        "tracker" => match session.tracker() {
            Ok(value) => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
            Err(e) => writeln!(out, "{} {}", "✗".red().bold(), e)?,
        },

        "save" => {
            let path = if args.is_empty() {
                PathBuf::from(default_export_name())
            } else {
                PathBuf::from(args)
            };
            match session.conversation().export(&path) {
                Ok(()) => writeln!(
                    out,
                    "{} {} mensajes guardados en {}",
                    "✓".green().bold(),
                    session.conversation().len(),
                    path.display()
                )?,
                Err(e) => writeln!(out, "{} {e:#}", "✗".red().bold())?,
            }
        }

        "stats" => print_stats(session, out)?,

        "history" => {
            for turn in session.conversation().turns() {
                writeln!(
                    out,
                    "  {} {} {}",
                    turn.timestamp.format("%H:%M:%S").to_string().dimmed(),
                    turn.user_text,
                    format!("[{}]", turn.intent.as_deref().unwrap_or("-")).dimmed()
                )?;
                for reply in &turn.bot_replies {
                    writeln!(out, "           {} {}", "←".cyan(), reply)?;
                }
            }
        }

        "status" => writeln!(out, "  {}", session.connectivity().label())?,

        "intents" => {
            for intent in session.load_intents() {
                writeln!(out, "  {} {}", "·".dimmed(), intent)?;
            }
        }

        "examples" => match session.examples(args) {
            Ok(examples) => {
                for example in examples {
                    writeln!(out, "  {} {}", "·".dimmed(), example)?;
                }
            }
            Err(e) => writeln!(out, "{} {}", "✗".red().bold(), e)?,
        },

        "add" => {
            let (intent, example) = args.split_once(' ').unwrap_or((args, ""));
            match session.add_example(intent, example) {
                Ok(added) => {
                    write_outcome(&added.outcome, out)?;
                    for example in added.examples.unwrap_or_default() {
                        writeln!(out, "  {} {}", "·".dimmed(), example)?;
                    }
                }
                Err(e) => writeln!(out, "{} {}", "✗".red().bold(), e)?,
            }
        }

        "new-intent" => match session.new_intent(args) {
            Ok(name) => writeln!(
                out,
                "{} {}",
                "✓".green().bold(),
                intent_created_message(&name)
            )?,
            Err(e) => writeln!(out, "{} {}", "✗".red().bold(), e)?,
        },

        "train" => {
            if confirm(&mut *input, &mut *out)? {
                write_train_outcome(&session.train(), out)?;
            }
        }

        other => writeln!(
            out,
            "{} comando desconocido: /{other} (usa /help)",
            "?".yellow().bold()
        )?,
    }

    Ok(true)
}

fn print_exchange(exchange: &Exchange, out: &mut impl Write) -> Result<()> {
    writeln!(out, "  {} {}", "tú:".dimmed(), render_segments(&exchange.highlighted))?;

    if exchange.no_response {
        writeln!(out, "  {} {}", "bot:".cyan(), NO_RESPONSE_TEXT.dimmed())?;
        return Ok(());
    }

    for reply in &exchange.replies {
        if let Some(text) = &reply.text {
            writeln!(out, "  {} {}", "bot:".cyan().bold(), text)?;
        }
        if let Some(image) = &reply.image {
            writeln!(out, "       {} {}", "🖼".dimmed(), image.dimmed())?;
        }
        for button in &reply.buttons {
            writeln!(out, "       [{}] {}", button.title, button.payload.dimmed())?;
        }
    }
    if let Some(annotation) = &exchange.annotation {
        writeln!(
            out,
            "       {} {}",
            annotation.intent.magenta(),
            annotation.confidence_label.dimmed()
        )?;
    }
    Ok(())
}

fn print_stats<N, T>(session: &Session<N, T>, out: &mut impl Write) -> Result<()>
where
    N: NluBackend,
    T: TrainingBackend,
{
    let view = session.dashboard();
    writeln!(out, "{}", "Analytics".bold().cyan())?;
    writeln!(out, "  {} {}", "Mensajes: ".bold(), view.total_messages)?;
    writeln!(out, "  {} {}", "Intents:  ".bold(), view.distinct_intents)?;
    writeln!(out, "  {} {}", "Entidades:".bold(), view.distinct_entities)?;
    writeln!(out, "  {} {}", "Confianza:".bold(), view.average_confidence_label)?;

    for row in &view.distribution {
        writeln!(out, "    {:<24} {:>5}", row.intent, row.count)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
