use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::engine::activity::PetState;

/// Value object pushed across the bridge. Immutable once built; no identity
/// beyond its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentationMessage {
    pub state: PetState,
    pub experience: u64,
    pub level: u32,
}

impl PresentationMessage {
    pub fn new(state: PetState, experience: u64, level: u32) -> Self {
        Self {
            state,
            experience,
            level,
        }
    }

    pub fn to_wire(self) -> WireMessage {
        WireMessage::UpdateState {
            state: self.state,
            experience: self.experience,
            level: self.level,
        }
    }
}

/// The one-way message schema consumed by the rendering surface:
/// `{"type":"updateState","state":…,"experience":…,"level":…}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireMessage {
    UpdateState {
        state: PetState,
        experience: u64,
        level: u32,
    },
}

/// A display area the bridge can push messages into. The surface owns all
/// pixel/cell-level rendering; the bridge never inspects what it drew.
pub trait RenderSurface {
    /// Called once per attachment with the session token that tags all
    /// content for this attachment.
    fn begin(&mut self, session_token: &str);

    fn present(&mut self, message: &PresentationMessage);
}

/// Forwards presentation messages to the attached surface, if any.
///
/// Messages sent while detached are silently dropped, not queued; the only
/// replay is the last-known message, re-sent on every attachment so a fresh
/// surface is never blank.
pub struct PresentationBridge<S: RenderSurface> {
    surface: Option<S>,
    last: PresentationMessage,
    rng: SmallRng,
}

impl<S: RenderSurface> PresentationBridge<S> {
    /// `initial` is the last-known message before any typing, normally Idle
    /// with the totals restored from the profile.
    pub fn new(initial: PresentationMessage) -> Self {
        Self {
            surface: None,
            last: initial,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn last_message(&self) -> PresentationMessage {
        self.last
    }

    /// Attach a surface, replacing any current one. The new surface gets a
    /// fresh session token and an immediate copy of the last-known message.
    pub fn attach(&mut self, mut surface: S) {
        let token = session_token(&mut self.rng);
        surface.begin(&token);
        surface.present(&self.last);
        self.surface = Some(surface);
    }

    pub fn detach(&mut self) -> Option<S> {
        self.surface.take()
    }

    pub fn notify(&mut self, message: PresentationMessage) {
        self.last = message;
        if let Some(ref mut surface) = self.surface {
            surface.present(&message);
        }
    }
}

const TOKEN_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 32;

/// Random alphanumeric token identifying one surface attachment.
fn session_token(rng: &mut SmallRng) -> String {
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARS[rng.gen_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}
