use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub label: String,
    /// Current value for setting rows; `None` for actions.
    pub value: Option<String>,
    pub description: String,
}

impl MenuItem {
    pub fn setting(label: &str, value: String, description: &str) -> Self {
        Self {
            label: label.to_string(),
            value: Some(value),
            description: description.to_string(),
        }
    }

    pub fn action(label: &str, description: &str) -> Self {
        Self {
            label: label.to_string(),
            value: None,
            description: description.to_string(),
        }
    }
}

/// Setup screen: session settings followed by actions.
pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(items: Vec<MenuItem>, selected: usize, theme: &'a Theme) -> Self {
        Self {
            items,
            selected,
            theme,
        }
    }
}

impl Widget for Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "dictum",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Listen. Type. Level up.",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let Some(&row) = rows.get(i) else { break };
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let mut spans = vec![Span::styled(
                format!(" {indicator} {:<10}", item.label),
                label_style,
            )];
            if let Some(ref value) = item.value {
                let value_style = Style::default().fg(if is_selected {
                    colors.warning()
                } else {
                    colors.text_dim()
                });
                spans.push(Span::styled(format!("< {value} >"), value_style));
            }

            let lines = vec![
                Line::from(spans),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_dim()),
                )),
            ];
            Paragraph::new(lines).render(row, buf);
        }
    }
}
