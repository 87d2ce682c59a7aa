use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::catalog::BadgeInfo;
use crate::engine::evaluator::WordDiff;
use crate::session::result::LevelResult;
use crate::ui::theme::Theme;

pub struct FeedbackPanel<'a> {
    result: &'a LevelResult,
    diff: &'a [WordDiff],
    new_badges: Vec<BadgeInfo>,
    advance_in_ms: Option<u64>,
    theme: &'a Theme,
}

impl<'a> FeedbackPanel<'a> {
    pub fn new(
        result: &'a LevelResult,
        diff: &'a [WordDiff],
        new_badges: Vec<BadgeInfo>,
        advance_in_ms: Option<u64>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            result,
            diff,
            new_badges,
            advance_in_ms,
            theme,
        }
    }
}

impl Widget for FeedbackPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;
        let verdict_color = if result.is_correct {
            colors.success()
        } else {
            colors.error()
        };

        let block = Block::bordered()
            .border_style(Style::default().fg(verdict_color))
            .style(Style::default().bg(colors.bg()));

        let label = Style::default().fg(colors.text_dim());
        let mut lines = vec![
            Line::from(Span::styled(
                result.title(),
                Style::default()
                    .fg(verdict_color)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::from(""),
        ];

        if result.is_correct {
            lines.push(Line::from(vec![
                Span::styled("Points earned: ", label),
                Span::styled(
                    format!("+{}", result.points),
                    Style::default().fg(colors.success()),
                ),
            ]));
            if result.bonus_points > 0 {
                lines.push(Line::from(Span::styled(
                    format!("Speed bonus: +{} points!", result.bonus_points),
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                )));
            }
        } else {
            let mut answer = vec![Span::styled("Your answer:    ", label)];
            if result.user_answer.trim().is_empty() {
                answer.push(Span::styled("(no answer)", label));
            } else {
                for word in self.diff.iter().filter(|w| !w.is_missing) {
                    let color = if word.is_correct {
                        colors.word_correct()
                    } else {
                        colors.word_incorrect()
                    };
                    answer.push(Span::styled(format!("{} ", word.word), Style::default().fg(color)));
                }
                let missing = self.diff.iter().filter(|w| w.is_missing).count();
                if missing > 0 {
                    answer.push(Span::styled(
                        format!("(+{missing} missing)"),
                        Style::default().fg(colors.word_missing()),
                    ));
                }
            }
            lines.push(Line::from(answer));
            lines.push(Line::from(vec![
                Span::styled("Correct answer: ", label),
                Span::styled(
                    result.correct_answer.as_str(),
                    Style::default()
                        .fg(colors.fg())
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }

        if !self.new_badges.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("New badges:", label)));
            for badge in &self.new_badges {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  \u{2605} {}", badge.name),
                        Style::default()
                            .fg(colors.badge())
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", badge.description), label),
                ]));
            }
        }

        lines.push(Line::from(""));
        let hint = match self.advance_in_ms {
            Some(ms) => format!("Next level in {:.1}s  [Enter] Continue now", ms as f64 / 1000.0),
            None => "[Enter] Continue".to_string(),
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(colors.accent()))));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}
