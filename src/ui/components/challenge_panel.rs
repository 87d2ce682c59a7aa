use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::catalog::Mode;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Speaking,
    /// First playback done, countdown running.
    Answering,
    /// Narration failed or is muted; the countdown still runs.
    Silent,
}

/// The answer area: what to listen for and the text typed so far.
pub struct ChallengePanel<'a> {
    level: u32,
    mode: Mode,
    playback: Playback,
    input: &'a LineInput,
    theme: &'a Theme,
}

impl<'a> ChallengePanel<'a> {
    pub fn new(
        level: u32,
        mode: Mode,
        playback: Playback,
        input: &'a LineInput,
        theme: &'a Theme,
    ) -> Self {
        Self {
            level,
            mode,
            playback,
            input,
            theme,
        }
    }
}

impl Widget for ChallengePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Level {} ", self.level))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(3),
            ])
            .split(inner);

        let noun = match self.mode {
            Mode::Word => "word",
            Mode::Sentence => "sentence",
        };
        let (prompt, prompt_color) = match self.playback {
            Playback::Speaking => ("Listening\u{2026}".to_string(), colors.warning()),
            Playback::Answering => (format!("Type the {noun} you heard"), colors.accent()),
            Playback::Silent => (
                format!("No audio. Type the {noun} if you can guess it"),
                colors.error(),
            ),
        };
        Paragraph::new(Line::from(Span::styled(
            prompt,
            Style::default()
                .fg(prompt_color)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let (before, cursor, after) = self.input.render_parts();
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
        let mut spans = vec![
            Span::styled(" > ", Style::default().fg(colors.accent())),
            Span::styled(before, Style::default().fg(colors.fg())),
        ];
        match cursor {
            Some(ch) => spans.push(Span::styled(ch.to_string(), cursor_style)),
            None => spans.push(Span::styled(" ", cursor_style)),
        }
        spans.push(Span::styled(after, Style::default().fg(colors.fg())));

        let answer_block = Block::bordered()
            .title(" Your answer ")
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .block(answer_block)
            .render(layout[2], buf);
    }
}
