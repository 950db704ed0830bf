//! Interactive shell
//!
//! Reads one command per line and applies it to the composer, the terminal
//! counterpart of typing into the form and pressing buttons. Everything runs
//! on the calling thread, one event at a time.

use crate::render::{render_history, render_templates, render_view};
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;
use zapconnect_core::{Composer, DraftField, KeyValueStore, LinkOpener, View, ZapError};

pub const HELP: &str = "\
Commands:
  number <raw>      set the recipient number
  message <text>    set the message text
  template [<n>]    list templates, or append template n to the message
  preview           show the link that would be opened
  send              open the link and record it in history
  history           show recent sends
  reuse <n>         load history entry n into the draft
  clear             delete all history
  compose           show the compose view
  settings          show the settings view
  help              show this help
  quit              leave the shell
";

/// A parsed shell command; indices are zero-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Number(String),
    Message(String),
    Template(Option<usize>),
    Preview,
    Send,
    History,
    Reuse(usize),
    Clear,
    Compose,
    Settings,
    Help,
    Quit,
}

/// Parse one input line
///
/// Returns `Ok(None)` for a blank line. Text after `number` and `message` is
/// taken verbatim, whitespace included.
pub fn parse(line: &str) -> std::result::Result<Option<ShellCommand>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let line = line.trim_start();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let command = match word {
        "number" | "n" => ShellCommand::Number(rest.to_string()),
        "message" | "m" => ShellCommand::Message(rest.to_string()),
        "template" | "t" => {
            if rest.trim().is_empty() {
                ShellCommand::Template(None)
            } else {
                ShellCommand::Template(Some(parse_index(rest)?))
            }
        }
        "preview" => ShellCommand::Preview,
        "send" | "s" => ShellCommand::Send,
        "history" | "h" => ShellCommand::History,
        "reuse" | "r" => ShellCommand::Reuse(parse_index(rest)?),
        "clear" => ShellCommand::Clear,
        "compose" | "c" => ShellCommand::Compose,
        "settings" => ShellCommand::Settings,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command: {}. Type 'help'.", other)),
    };

    Ok(Some(command))
}

/// Parse a 1-based position into a zero-based index
fn parse_index(text: &str) -> std::result::Result<usize, String> {
    let text = text.trim();
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Expected a number starting at 1, got '{}'", text)),
    }
}

/// Outcome of applying one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply `command` to the composer, writing any feedback to `out`
pub fn apply<S, O, W>(
    composer: &mut Composer<S, O>,
    command: ShellCommand,
    out: &mut W,
) -> Result<Flow>
where
    S: KeyValueStore,
    O: LinkOpener,
    W: Write,
{
    debug!("Shell command: {:?}", command);

    match command {
        ShellCommand::Number(number) => composer.update_draft(DraftField::Number, number),
        ShellCommand::Message(body) => composer.update_draft(DraftField::Body, body),
        ShellCommand::Template(None) => {
            if composer.toggle_templates() {
                write!(out, "{}", render_templates(composer.templates()))?;
            }
        }
        ShellCommand::Template(Some(index)) => {
            if let Err(e) = composer.insert_template(index) {
                writeln!(out, "{}", e.user_message())?;
            }
        }
        ShellCommand::Preview => match composer.preview_link() {
            Some(link) => writeln!(out, "{}", link)?,
            None => writeln!(out, "{}", ZapError::EmptyRecipient.user_message())?,
        },
        ShellCommand::Send => match composer.send() {
            Ok(sent) => writeln!(out, "Opened {}", sent.uri)?,
            Err(e) => writeln!(out, "{}", e.user_message())?,
        },
        ShellCommand::History => {
            composer.show(View::History);
            write!(out, "{}", render_history(composer.history()))?;
        }
        ShellCommand::Reuse(index) => match composer.reuse_at(index) {
            Ok(()) => write!(out, "{}", render_view(composer))?,
            Err(e) => writeln!(out, "{}", e.user_message())?,
        },
        ShellCommand::Clear => {
            composer.clear_history();
            writeln!(out, "History cleared.")?;
        }
        ShellCommand::Compose => {
            composer.show(View::Compose);
            write!(out, "{}", render_view(composer))?;
        }
        ShellCommand::Settings => {
            composer.show(View::Settings);
            write!(out, "{}", render_view(composer))?;
        }
        ShellCommand::Help => write!(out, "{}", HELP)?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    if let Some(warning) = composer.take_warning() {
        writeln!(out, "Warning: {}", warning.user_message())?;
    }

    Ok(Flow::Continue)
}

/// Run the shell until `quit` or end of input
pub fn run<S, O, R, W>(composer: &mut Composer<S, O>, input: R, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    O: LinkOpener,
    R: BufRead,
    W: Write,
{
    writeln!(out, "ZapConnect - direct WhatsApp sender. Type 'help' for commands.")?;

    let mut lines = input.lines();
    loop {
        write!(out, "[{}] > ", view_label(composer.view()))?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };

        match parse(&line?) {
            Ok(Some(command)) => {
                if apply(composer, command, out)? == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => writeln!(out, "{}", message)?,
        }
    }

    Ok(())
}

fn view_label(view: View) -> &'static str {
    match view {
        View::Compose => "compose",
        View::History => "history",
        View::Settings => "settings",
    }
}
