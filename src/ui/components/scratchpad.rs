use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

// Oldest lines are dropped past this point; the pad is a viewport, not a
// document.
const MAX_LINES: usize = 200;

/// Free-typing buffer. Only a display aid: experience is counted from the
/// inbound events, never recounted from this text, so deleting here never
/// claws XP back.
#[derive(Debug)]
pub struct Scratchpad {
    lines: Vec<String>,
    pub session_chars: u64,
}

impl Default for Scratchpad {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            session_chars: 0,
        }
    }
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn push_char(&mut self, ch: char) {
        self.current_line().push(ch);
        self.session_chars += 1;
    }

    pub fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.newline();
            } else if ch == '\r' {
                // Bracketed paste on some terminals sends CRLF; fold it.
            } else {
                self.push_char(ch);
            }
        }
    }

    pub fn newline(&mut self) {
        self.lines.push(String::new());
        self.session_chars += 1;
        if self.lines.len() > MAX_LINES {
            self.lines.remove(0);
        }
    }

    pub fn backspace(&mut self) {
        if self.current_line().pop().is_none() && self.lines.len() > 1 {
            self.lines.pop();
        }
    }

    fn current_line(&mut self) -> &mut String {
        // Invariant: never empty, established in the constructor.
        self.lines.last_mut().expect("scratchpad has no line")
    }
}

pub struct ScratchpadView<'a> {
    pad: &'a Scratchpad,
    theme: &'a Theme,
}

impl<'a> ScratchpadView<'a> {
    pub fn new(pad: &'a Scratchpad, theme: &'a Theme) -> Self {
        Self { pad, theme }
    }
}

impl Widget for ScratchpadView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" scratchpad ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Tail of the buffer that fits the viewport.
        let visible = inner.height as usize;
        let start = self.pad.lines().len().saturating_sub(visible);
        let mut lines: Vec<Line> = self.pad.lines()[start..]
            .iter()
            .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(colors.fg()))))
            .collect();

        if let Some(last) = lines.last_mut() {
            last.push_span(Span::styled(
                " ",
                Style::default()
                    .bg(colors.accent())
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
