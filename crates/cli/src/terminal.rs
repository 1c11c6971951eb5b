//! Terminal front end for the synchronizer
//!
//! Boards go to stdout. Loading placeholders, prompts and the login hint go to
//! stderr so piped output only ever holds finished boards.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use taskdeck_core::intent::{Confirm, Intent};
use taskdeck_core::sync::Screen;
use taskdeck_core::view::{BoardView, Section, TaskCard};

const ACTIVE_HEADING: &str = "To Do & In Progress";
const DONE_HEADING: &str = "DONE";

pub const LOGIN_HINT: &str =
    "Not logged in. Run `taskdeck login <username-or-email>` or `taskdeck register <username> <email>`.";

pub struct TerminalScreen;

impl Screen for TerminalScreen {
    fn render(&self, board: &BoardView) {
        if matches!(board.active, Section::Loading(_)) {
            if let Some(text) = board.active.placeholder() {
                eprintln!("{}", text);
            }
            return;
        }
        print!("{}", format_board(board));
    }

    fn redirect_to_login(&self) {
        eprintln!("{}", LOGIN_HINT);
    }
}

/// Reads a y/N answer from stdin
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub fn format_board(board: &BoardView) -> String {
    let mut out = String::new();
    format_section(&mut out, ACTIVE_HEADING, &board.active);
    out.push('\n');
    format_section(&mut out, DONE_HEADING, &board.done);
    out
}

fn format_section(out: &mut String, heading: &str, section: &Section) {
    let _ = writeln!(out, "{}", heading);
    let _ = writeln!(out, "{}", "-".repeat(heading.len()));
    match section {
        Section::Cards(cards) => {
            for card in cards {
                format_card(out, card);
            }
        }
        Section::Cleared => {}
        other => {
            if let Some(text) = other.placeholder() {
                let _ = writeln!(out, "{}", text);
            }
        }
    }
}

fn format_card(out: &mut String, card: &TaskCard) {
    let _ = writeln!(out, "#{}  {}", card.id, card.title);
    let _ = writeln!(
        out,
        "    Status: {} | Priority: {}",
        card.status_label, card.priority_label
    );
    if let Some(due) = &card.due_date {
        let _ = writeln!(out, "    Due Date: {}", due);
    }
    if let Some(comment) = &card.comment {
        let _ = writeln!(out, "    Description: {}", comment);
    }
    let _ = writeln!(out, "    Created at: {}", card.created_at);
    if let Some(done_at) = &card.done_at {
        let _ = writeln!(out, "    Done at: {}", done_at);
    }

    let actions: Vec<String> = card
        .intents
        .iter()
        .map(|intent| match intent {
            Intent::MarkDone(id) => format!("done {}", id),
            Intent::Edit(form) => format!("edit {}", form.id),
            Intent::Delete(id) => format!("rm {}", id),
        })
        .collect();
    let _ = writeln!(out, "    Actions: {}", actions.join(" | "));
}
