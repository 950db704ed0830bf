//! Text rendering of the composer views

use std::fmt::Write;
use zapconnect_core::{Composer, HistoryLog, KeyValueStore, LinkOpener, View};

/// Render whichever view the composer currently projects
pub fn render_view<S: KeyValueStore, O: LinkOpener>(composer: &Composer<S, O>) -> String {
    match composer.view().projection() {
        View::History => render_history(composer.history()),
        View::Compose | View::Settings => render_compose(composer),
    }
}

/// Compose view: draft, template picker and link preview
pub fn render_compose<S: KeyValueStore, O: LinkOpener>(composer: &Composer<S, O>) -> String {
    let draft = composer.draft();
    let mut out = String::new();

    let _ = writeln!(out, "Recipient: {}", or_dash(&draft.number));
    let _ = writeln!(out, "Message:   {}", or_dash(&draft.body));

    if composer.templates_open() {
        out.push_str(&render_templates(composer.templates()));
    }

    match composer.preview_link() {
        Some(link) => {
            let _ = writeln!(out, "Link:      {}", link);
        }
        None => out.push_str("Enter a recipient number to enable sending.\n"),
    }

    out
}

/// History view, newest first, numbered from 1
pub fn render_history(log: &HistoryLog) -> String {
    if log.is_empty() {
        return "No recent history\n".to_string();
    }

    let mut out = String::from("Recent chats\n");
    for (index, entry) in log.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  [{}]",
            index + 1,
            display_number(entry.number()),
            entry.created_at()
        );
        let _ = writeln!(out, "    {}", single_line(entry.body()));
    }
    out
}

/// Template list, numbered from 1
pub fn render_templates(templates: &[String]) -> String {
    let mut out = String::from("Quick templates\n");
    for (index, template) in templates.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", index + 1, template);
    }
    out
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn display_number(number: &str) -> String {
    if number.starts_with('+') {
        number.to_string()
    } else {
        format!("+{}", number)
    }
}

fn single_line(text: &str) -> String {
    text.replace('\n', " ")
}
