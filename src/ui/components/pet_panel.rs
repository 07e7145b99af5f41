use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::bridge::{PresentationMessage, RenderSurface};
use crate::engine::activity::PetState;
use crate::ui::theme::Theme;

// Animation frames flip every 5 ticks (~500ms at the 100ms tick rate).
const TICKS_PER_FRAME: u32 = 5;

const SPRITE_IDLE: [&[&str]; 2] = [
    &["  /\\_/\\   ", " ( -.- ) z", "  >   <   "],
    &["  /\\_/\\  Z", " ( -.- )  ", "  >   <   "],
];

const SPRITE_ACTIVE: [&[&str]; 2] = [
    &["  /\\_/\\   ", " ( o.o )  ", "  > ^ <   "],
    &["  /\\_/\\   ", " ( o.o )  ", "  > v <   "],
];

const SPRITE_LEVEL_UP: [&[&str]; 2] = [
    &["* /\\_/\\ * ", " ( ^o^ )  ", "  >(!)<   "],
    &["  /\\_/\\   ", "*( ^o^ )* ", "  >(!)<   "],
];

/// In-process rendering surface: holds whatever the bridge last pushed,
/// plus the animation frame clock. Owns nothing else; the widget below
/// draws from it.
#[derive(Debug, Default)]
pub struct PetDisplay {
    pub state: Option<PetState>,
    pub experience: u64,
    pub level: u32,
    session_token: String,
    ticks: u32,
}

impl PetDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn advance_frame(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    fn frame(&self) -> usize {
        ((self.ticks / TICKS_PER_FRAME) % 2) as usize
    }

    fn sprite(&self) -> &'static [&'static str] {
        match self.state.unwrap_or(PetState::Idle) {
            PetState::Idle => SPRITE_IDLE[self.frame()],
            PetState::Active => SPRITE_ACTIVE[self.frame()],
            PetState::LevelUp => SPRITE_LEVEL_UP[self.frame()],
        }
    }
}

impl RenderSurface for PetDisplay {
    fn begin(&mut self, session_token: &str) {
        self.session_token = session_token.to_string();
        self.ticks = 0;
    }

    fn present(&mut self, message: &PresentationMessage) {
        self.state = Some(message.state);
        self.experience = message.experience;
        self.level = message.level;
    }
}

pub struct PetPanel<'a> {
    display: &'a PetDisplay,
    theme: &'a Theme,
}

impl<'a> PetPanel<'a> {
    pub fn new(display: &'a PetDisplay, theme: &'a Theme) -> Self {
        Self { display, theme }
    }
}

impl Widget for PetPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let state = self.display.state.unwrap_or(PetState::Idle);

        let block = Block::bordered()
            .title(" pet ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 10 || inner.height < 5 {
            return;
        }

        let pet_color = match state {
            PetState::Idle => colors.pet_idle(),
            PetState::Active => colors.pet_active(),
            PetState::LevelUp => colors.pet_level_up(),
        };

        let sprite = self.display.sprite();
        let sprite_x = inner.x + (inner.width.saturating_sub(10)) / 2;
        for (i, row) in sprite.iter().enumerate() {
            buf.set_string(
                sprite_x,
                inner.y + 1 + i as u16,
                row,
                Style::default().fg(pet_color),
            );
        }

        let status_y = inner.y + 1 + sprite.len() as u16 + 1;
        let status = state.as_str();
        let status_x = inner.x + (inner.width.saturating_sub(status.len() as u16)) / 2;
        buf.set_string(
            status_x,
            status_y,
            status,
            Style::default().fg(pet_color).add_modifier(Modifier::BOLD),
        );

        let counters = format!("Lv {}  {} XP", self.display.level, self.display.experience);
        let counters_x = inner.x + (inner.width.saturating_sub(counters.len() as u16)) / 2;
        buf.set_string(
            counters_x,
            status_y + 1,
            &counters,
            Style::default().fg(colors.fg()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tracks_presented_message() {
        let mut display = PetDisplay::new();
        display.present(&PresentationMessage::new(PetState::Active, 55, 1));
        assert_eq!(display.state, Some(PetState::Active));
        assert_eq!(display.experience, 55);
        assert_eq!(display.level, 1);
    }

    #[test]
    fn test_begin_stores_token_and_resets_animation() {
        let mut display = PetDisplay::new();
        for _ in 0..7 {
            display.advance_frame();
        }
        display.begin("tok");
        assert_eq!(display.session_token(), "tok");
        assert_eq!(display.frame(), 0);
    }

    #[test]
    fn test_frames_flip_on_schedule() {
        let mut display = PetDisplay::new();
        assert_eq!(display.frame(), 0);
        for _ in 0..TICKS_PER_FRAME {
            display.advance_frame();
        }
        assert_eq!(display.frame(), 1);
        for _ in 0..TICKS_PER_FRAME {
            display.advance_frame();
        }
        assert_eq!(display.frame(), 0);
    }

    #[test]
    fn test_sprite_rows_align() {
        for frames in [SPRITE_IDLE, SPRITE_ACTIVE, SPRITE_LEVEL_UP] {
            for frame in frames {
                assert_eq!(frame.len(), 3);
                for row in frame {
                    assert_eq!(row.chars().count(), 10);
                }
            }
        }
    }
}
