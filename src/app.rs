use std::time::Instant;

use crate::bridge::{PresentationBridge, PresentationMessage};
use crate::config::Config;
use crate::engine::activity::{ActivityMachine, PetState};
use crate::engine::progress::ExperienceState;
use crate::store::json_store::JsonStore;
use crate::store::schema::ProfileData;
use crate::ui::components::pet_panel::PetDisplay;
use crate::ui::components::scratchpad::Scratchpad;
use crate::ui::theme::Theme;

pub struct App {
    pub config: Config,
    pub theme: &'static Theme,
    pub xp: ExperienceState,
    pub machine: ActivityMachine,
    pub bridge: PresentationBridge<PetDisplay>,
    pub store: Option<JsonStore>,
    pub pad: Scratchpad,
    pub should_quit: bool,
    save_deadline: Option<Instant>,
}

impl App {
    pub fn new() -> Self {
        let config = Config::load().unwrap_or_default();
        let store = JsonStore::new().ok();
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Option<JsonStore>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let xp = if let Some(ref s) = store {
            // load_profile returns None if file exists but can't parse
            // (schema mismatch / corruption): start over.
            match s.load_profile() {
                Some(pd) if !pd.needs_reset() => ExperienceState::new(pd.total_xp, pd.pending_chars),
                _ => ExperienceState::default(),
            }
        } else {
            ExperienceState::default()
        };

        let machine = ActivityMachine::new(config.idle_timeout(), config.level_up_hold());

        // The surface must never start blank: seed the bridge with Idle at
        // the restored totals, then attach the panel.
        let mut bridge = PresentationBridge::new(PresentationMessage::new(
            PetState::Idle,
            xp.total_xp(),
            xp.level(),
        ));
        bridge.attach(PetDisplay::new());

        Self {
            config,
            theme,
            xp,
            machine,
            bridge,
            store,
            pad: Scratchpad::new(),
            should_quit: false,
            save_deadline: None,
        }
    }

    fn message_for(&self, state: PetState) -> PresentationMessage {
        PresentationMessage::new(state, self.xp.total_xp(), self.xp.level())
    }

    /// One text-change notification: `count` net characters inserted.
    /// Zero-insertion notifications are ignored.
    pub fn on_text_change(&mut self, count: u64, now: Instant) {
        if count == 0 {
            return;
        }
        let report = self.xp.apply_characters(count);
        let state = self.machine.on_typing(report.leveled_up, now);
        self.bridge.notify(self.message_for(state));

        // Debounced snapshot: bursts coalesce into one write after the
        // last qualifying event.
        self.save_deadline = Some(now + self.config.save_debounce());
    }

    pub fn on_tick(&mut self, now: Instant) {
        for state in self.machine.poll(now) {
            self.bridge.notify(self.message_for(state));
        }

        if let Some(deadline) = self.save_deadline {
            if deadline <= now {
                self.save_deadline = None;
                self.save_profile();
            }
        }

        if let Some(display) = self.bridge.surface_mut() {
            display.advance_frame();
        }
    }

    /// Detach or re-attach the pet panel. Re-attachment goes through the
    /// bridge so the fresh surface immediately shows the last-known state.
    pub fn toggle_panel(&mut self) {
        if self.bridge.is_attached() {
            self.bridge.detach();
        } else {
            self.bridge.attach(PetDisplay::new());
        }
    }

    fn save_profile(&self) {
        if let Some(ref store) = self.store {
            let _ = store.save_profile(&ProfileData {
                total_xp: self.xp.total_xp(),
                pending_chars: self.xp.pending_chars(),
                ..ProfileData::default()
            });
        }
    }

    /// Final best-effort snapshot at teardown.
    pub fn flush(&self) {
        self.save_profile();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn make_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let app = App::with_store(Config::default(), Some(store));
        (dir, app)
    }

    #[test]
    fn test_starts_idle_with_panel_attached_and_populated() {
        let (_dir, app) = make_app();
        assert!(app.bridge.is_attached());
        let display = app.bridge.surface().unwrap();
        assert_eq!(display.state, Some(PetState::Idle));
        assert_eq!(display.experience, 0);
        assert_eq!(display.level, 1);
    }

    #[test]
    fn test_typing_updates_display_and_schedules_save() {
        let (dir, mut app) = make_app();
        let now = Instant::now();

        app.on_text_change(250, now);
        let display = app.bridge.surface().unwrap();
        assert_eq!(display.state, Some(PetState::Active));
        assert_eq!(display.experience, 10);

        // Nothing written until the debounce window passes.
        assert!(!dir.path().join("profile.json").exists());
        app.on_tick(now + Duration::from_millis(999));
        assert!(!dir.path().join("profile.json").exists());
        app.on_tick(now + Duration::from_millis(1000));
        assert!(dir.path().join("profile.json").exists());
    }

    #[test]
    fn test_debounce_coalesces_bursts() {
        let (dir, mut app) = make_app();
        let now = Instant::now();

        app.on_text_change(10, now);
        app.on_text_change(10, now + Duration::from_millis(900));
        // The first deadline was pushed out by the second event.
        app.on_tick(now + Duration::from_millis(1100));
        assert!(!dir.path().join("profile.json").exists());
        app.on_tick(now + Duration::from_millis(1900));
        assert!(dir.path().join("profile.json").exists());
    }

    #[test]
    fn test_level_up_presents_then_reverts() {
        let (_dir, mut app) = make_app();
        let now = Instant::now();

        app.on_text_change(2000, now);
        assert_eq!(
            app.bridge.surface().unwrap().state,
            Some(PetState::LevelUp)
        );

        app.on_tick(now + Duration::from_secs(3));
        let display = app.bridge.surface().unwrap();
        assert_eq!(display.state, Some(PetState::Active));
        assert_eq!(display.experience, 100);
        assert_eq!(display.level, 2);
    }

    #[test]
    fn test_inactivity_presents_idle() {
        let (_dir, mut app) = make_app();
        let now = Instant::now();
        app.on_text_change(10, now);
        app.on_tick(now + Duration::from_secs(30));
        assert_eq!(app.bridge.surface().unwrap().state, Some(PetState::Idle));
    }

    #[test]
    fn test_restart_restores_persisted_totals() {
        let dir = TempDir::new().unwrap();
        {
            let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
            let mut app = App::with_store(Config::default(), Some(store));
            app.on_text_change(3050, Instant::now());
            app.flush();
        }

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let app = App::with_store(Config::default(), Some(store));
        assert_eq!(app.xp.total_xp(), 150);
        assert_eq!(app.xp.pending_chars(), 50);
        let display = app.bridge.surface().unwrap();
        assert_eq!(display.state, Some(PetState::Idle));
        assert_eq!(display.experience, 150);
        assert_eq!(display.level, 2);
    }

    #[test]
    fn test_panel_toggle_reattaches_with_current_state() {
        let (_dir, mut app) = make_app();
        let now = Instant::now();
        app.on_text_change(150, now);

        app.toggle_panel();
        assert!(!app.bridge.is_attached());
        // Activity while detached is dropped, not queued.
        app.on_text_change(10, now + Duration::from_secs(1));

        app.toggle_panel();
        let display = app.bridge.surface().unwrap();
        assert_eq!(display.state, Some(PetState::Active));
        assert_eq!(display.experience, 5);
    }

    #[test]
    fn test_zero_count_notification_ignored() {
        let (_dir, mut app) = make_app();
        let now = Instant::now();
        app.on_text_change(0, now);
        // Still Idle: a zero-insertion notification is not typing.
        assert_eq!(app.machine.state(), PetState::Idle);
        assert_eq!(app.xp.total_xp(), 0);
    }
}
