// ABOUTME: Status bar widget — renders model, temperature, token budget, and turn count.
// ABOUTME: Displayed at the bottom of the TUI as a single-line summary.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Values shown in the status bar.
pub struct StatusBarParams<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub turn_count: usize,
    pub busy: bool,
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let white = Style::default().fg(Color::White);
    let mut spans = vec![
        Span::styled(format!(" {} ", params.model), Style::default().fg(Color::Cyan)),
        Span::styled("| ", dim),
        Span::styled(format!("temp {:.2} ", params.temperature), white),
        Span::styled("| ", dim),
        Span::styled(format!("max {} tokens ", params.max_tokens), white),
        Span::styled("| ", dim),
        Span::styled(format_turns(params.turn_count), white),
    ];

    if params.busy {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            "thinking... ",
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}

fn format_turns(count: usize) -> String {
    if count == 1 {
        "1 turn ".to_string()
    } else {
        format!("{} turns ", count)
    }
}
