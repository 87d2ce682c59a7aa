use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::state::WrongAnswer;
use crate::ui::theme::Theme;

/// Lines each entry takes, separator included.
pub const ENTRY_HEIGHT: usize = 4;

/// Wrong answers from the last session, one entry per miss.
pub struct ReviewList<'a> {
    entries: &'a [WrongAnswer],
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> ReviewList<'a> {
    pub fn new(entries: &'a [WrongAnswer], scroll: usize, theme: &'a Theme) -> Self {
        Self {
            entries,
            scroll,
            theme,
        }
    }
}

impl Widget for ReviewList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Review ({} to practice) ", self.entries.len()))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));

        if self.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No mistakes last session. Nothing to review!",
                Style::default().fg(colors.success()),
            )))
            .block(block)
            .render(area, buf);
            return;
        }

        let dim = Style::default().fg(colors.text_dim());
        let mut lines = Vec::with_capacity(self.entries.len() * ENTRY_HEIGHT);
        for (i, entry) in self.entries.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>3}. ", i + 1), dim),
                Span::styled(
                    entry.challenge.as_str(),
                    Style::default()
                        .fg(colors.fg())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  ({}, {})", entry.tier, entry.mode), dim),
            ]));
            let submitted = if entry.timed_out {
                Span::styled("timed out", Style::default().fg(colors.warning()))
            } else if entry.submitted.trim().is_empty() {
                Span::styled("(no answer)", dim)
            } else {
                Span::styled(
                    entry.submitted.as_str(),
                    Style::default().fg(colors.word_incorrect()),
                )
            };
            lines.push(Line::from(vec![Span::styled("     You typed: ", dim), submitted]));
            lines.push(Line::from(""));
            lines.push(Line::from(""));
        }
        // Drop the trailing separator.
        lines.truncate(lines.len() - 2);

        Paragraph::new(lines)
            .block(block)
            .scroll((self.scroll.min(u16::MAX as usize) as u16, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Mode, Tier};

    fn render(entries: &[WrongAnswer], scroll: usize) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        ReviewList::new(entries, scroll, &theme).render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn miss(challenge: &str, submitted: &str, timed_out: bool) -> WrongAnswer {
        WrongAnswer {
            challenge: challenge.to_string(),
            submitted: submitted.to_string(),
            tier: Tier::Advanced,
            mode: Mode::Word,
            timed_out,
        }
    }

    #[test]
    fn empty_review_congratulates() {
        assert!(render(&[], 0).contains("Nothing to review"));
    }

    #[test]
    fn entries_show_challenge_and_attempt() {
        let text = render(
            &[miss("ubiquitous", "ubiquitus", false), miss("ephemeral", "", true)],
            0,
        );
        assert!(text.contains("1. ubiquitous  (Advanced, Word)"));
        assert!(text.contains("You typed: ubiquitus"));
        assert!(text.contains("2. ephemeral"));
        assert!(text.contains("timed out"));
    }

    #[test]
    fn scrolling_hides_earlier_entries() {
        let text = render(
            &[miss("first", "x", false), miss("second", "y", false)],
            ENTRY_HEIGHT,
        );
        assert!(!text.contains("first"));
        assert!(text.contains("second"));
    }
}
