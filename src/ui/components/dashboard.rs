use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::catalog::{BadgeId, Catalog};
use crate::session::SessionSummary;
use crate::store::schema::PersistedProgress;
use crate::ui::theme::Theme;

/// Stats screen: the session that just ended (if any) and lifetime progress.
pub struct Dashboard<'a> {
    summary: Option<&'a SessionSummary>,
    lifetime: &'a PersistedProgress,
    catalog: &'a Catalog,
    theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        summary: Option<&'a SessionSummary>,
        lifetime: &'a PersistedProgress,
        catalog: &'a Catalog,
        theme: &'a Theme,
    ) -> Self {
        Self {
            summary,
            lifetime,
            catalog,
            theme,
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let label = Style::default().fg(colors.fg());
        let value = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let heading = Style::default()
            .fg(colors.header_fg())
            .add_modifier(Modifier::BOLD);

        let session_lines = match self.summary {
            Some(summary) => {
                let mistakes = summary.wrong_answers.len();
                let mut lines = vec![
                    Line::from(Span::styled("Last session", heading)),
                    Line::from(vec![
                        Span::styled("  Score:     ", label),
                        Span::styled(summary.score.to_string(), value),
                    ]),
                    Line::from(vec![
                        Span::styled("  Levels:    ", label),
                        Span::styled(summary.levels_played.to_string(), value),
                    ]),
                    Line::from(vec![
                        Span::styled("  Mistakes:  ", label),
                        Span::styled(
                            mistakes.to_string(),
                            Style::default().fg(if mistakes == 0 {
                                colors.success()
                            } else {
                                colors.error()
                            }),
                        ),
                    ]),
                ];
                if summary.progress.is_none() {
                    lines.push(Line::from(Span::styled(
                        "  Progress could not be saved (see log)",
                        Style::default().fg(colors.warning()),
                    )));
                }
                lines
            }
            None => vec![
                Line::from(Span::styled("Last session", heading)),
                Line::from(Span::styled(
                    "  No session played yet",
                    Style::default().fg(colors.text_dim()),
                )),
            ],
        };
        Paragraph::new(session_lines).render(layout[0], buf);

        let lifetime_lines = vec![
            Line::from(Span::styled("All time", heading)),
            Line::from(vec![
                Span::styled("  High score:       ", label),
                Span::styled(self.lifetime.high_score.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("  Levels completed: ", label),
                Span::styled(self.lifetime.levels_completed.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("  Last played:      ", label),
                Span::styled(
                    self.lifetime
                        .last_saved_at
                        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "never".to_string()),
                    Style::default().fg(colors.text_dim()),
                ),
            ]),
        ];
        Paragraph::new(lifetime_lines).render(layout[1], buf);

        let mut badge_lines = vec![Line::from(Span::styled(
            format!(
                "Badges ({}/{})",
                self.lifetime.earned_badges.len(),
                BadgeId::ALL.len()
            ),
            heading,
        ))];
        for id in BadgeId::ALL {
            let info = self.catalog.badge(id);
            let earned = self.lifetime.earned_badges.contains(&id);
            let (mark, color) = if earned {
                ("\u{2605}", colors.badge())
            } else {
                ("\u{2606}", colors.text_dim())
            };
            badge_lines.push(Line::from(vec![
                Span::styled(format!("  {mark} {:<16}", info.name), Style::default().fg(color)),
                Span::styled(info.description, Style::default().fg(colors.text_dim())),
            ]));
        }
        Paragraph::new(badge_lines).render(layout[2], buf);

        let review_hint = match self.summary {
            Some(summary) if !summary.wrong_answers.is_empty() => "  [r] Review mistakes",
            _ => "",
        };
        Paragraph::new(Line::from(vec![
            Span::styled("[Enter/Esc] Back to menu", Style::default().fg(colors.accent())),
            Span::styled(review_hint, Style::default().fg(colors.accent())),
        ]))
        .alignment(Alignment::Center)
        .render(layout[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(summary: Option<&SessionSummary>, lifetime: &PersistedProgress) -> String {
        let theme = Theme::default();
        let catalog = Catalog::builtin().unwrap();
        let area = Rect::new(0, 0, 72, 22);
        let mut buf = Buffer::empty(area);
        Dashboard::new(summary, lifetime, &catalog, &theme).render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn fresh_install_shows_placeholders() {
        let text = render(None, &PersistedProgress::default());
        assert!(text.contains("No session played yet"));
        assert!(text.contains("never"));
        assert!(text.contains("Badges (0/4)"));
    }

    #[test]
    fn summary_and_lifetime_are_shown() {
        let lifetime = PersistedProgress {
            levels_completed: 42,
            high_score: 120,
            earned_badges: [BadgeId::Streak5].into_iter().collect(),
            ..PersistedProgress::default()
        };
        let summary = SessionSummary {
            score: 85,
            levels_played: 9,
            wrong_answers: Vec::new(),
            progress: Some(lifetime.clone()),
        };
        let text = render(Some(&summary), &lifetime);
        assert!(text.contains("Score:     85"));
        assert!(text.contains("High score:       120"));
        assert!(text.contains("Levels completed: 42"));
        assert!(text.contains("Badges (1/4)"));
        assert!(!text.contains("Review mistakes"));
    }
}
