use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{Outcome, Snapshot};

const HORIZONTAL_MARGIN: u16 = 5;
const WORD_GAP: &str = "  ";

/// Style for one letter of the word list given where the cursor is.
pub fn letter_style(snapshot: &Snapshot, word_idx: usize, letter_idx: usize) -> Style {
    let gray = Style::default().fg(Color::DarkGray);
    if word_idx != snapshot.current_word_index {
        return gray;
    }

    let current = Style::default().bg(Color::Rgb(55, 65, 81));
    // The cursor never steps past the final letter, so a finished session
    // colours by what was typed instead.
    let typed = if snapshot.is_complete {
        snapshot.typed_characters.len()
    } else {
        snapshot.current_letter_index
    };

    if letter_idx < typed {
        match snapshot.typed_characters.get(letter_idx).map(|k| k.outcome) {
            Some(Outcome::Correct) => current.fg(Color::Green),
            _ => current.fg(Color::Red),
        }
    } else if letter_idx == typed {
        current.fg(Color::White).add_modifier(Modifier::UNDERLINED)
    } else {
        current.fg(Color::Gray)
    }
}

fn word_spans(snapshot: &Snapshot) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (wi, word) in snapshot.words.iter().enumerate() {
        if wi > 0 {
            spans.push(Span::raw(WORD_GAP));
        }
        spans.extend(
            word.chars()
                .enumerate()
                .map(|(li, c)| Span::styled(c.to_string(), letter_style(snapshot, wi, li))),
        );
    }
    spans
}

impl Widget for &Snapshot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().fg(Color::Gray);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_width = self.words.iter().join(WORD_GAP).width();
        let prompt_lines = ((prompt_width as f64 / max_chars_per_line as f64).ceil() as u16).max(1);
        let content_height = 2 + 1 + prompt_lines + 1 + 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(area.height.saturating_sub(content_height) / 2),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(prompt_lines),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled("Typing Test", bold_style)),
            Line::from(Span::styled(
                format!("Accuracy: {:.1}%", self.accuracy_percent),
                dim_style,
            )),
        ])
        .alignment(Alignment::Center);
        header.render(chunks[1], buf);

        let prompt = Paragraph::new(Line::from(word_spans(self)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        prompt.render(chunks[3], buf);

        let footer = if self.is_complete {
            vec![
                Line::from(Span::styled(
                    format!(
                        "Done: {:.1}% accuracy ({}/{} keystrokes correct)",
                        self.accuracy_percent, self.correct_keystrokes, self.total_keystrokes
                    ),
                    Style::default().patch(bold_style).fg(Color::Magenta),
                )),
                Line::from(Span::styled("(ctrl+r)estart / (esc)ape", italic_style)),
            ]
        } else {
            vec![Line::from(Span::styled(
                "(ctrl+r)estart / (esc)ape",
                italic_style.add_modifier(Modifier::DIM),
            ))]
        };
        Paragraph::new(footer)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}
