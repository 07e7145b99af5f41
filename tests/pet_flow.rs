//! End-to-end flow over the public pieces: accumulator -> state machine ->
//! bridge, plus profile persistence across a simulated restart.

use std::time::{Duration, Instant};

use codepet::bridge::{PresentationBridge, PresentationMessage, RenderSurface};
use codepet::engine::activity::{ActivityMachine, PetState};
use codepet::engine::progress::{self, ExperienceState};
use codepet::store::json_store::JsonStore;
use codepet::store::schema::ProfileData;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSurface {
    messages: Vec<PresentationMessage>,
}

impl RenderSurface for RecordingSurface {
    fn begin(&mut self, _session_token: &str) {}

    fn present(&mut self, message: &PresentationMessage) {
        self.messages.push(*message);
    }
}

/// Minimal harness wiring the three components the way the binary does.
struct Harness {
    xp: ExperienceState,
    machine: ActivityMachine,
    bridge: PresentationBridge<RecordingSurface>,
}

impl Harness {
    fn new(xp: ExperienceState) -> Self {
        let machine = ActivityMachine::new(Duration::from_secs(30), Duration::from_secs(3));
        let bridge = PresentationBridge::new(PresentationMessage::new(
            PetState::Idle,
            xp.total_xp(),
            xp.level(),
        ));
        Self {
            xp,
            machine,
            bridge,
        }
    }

    fn type_chars(&mut self, count: u64, now: Instant) {
        if count == 0 {
            return;
        }
        let report = self.xp.apply_characters(count);
        let state = self.machine.on_typing(report.leveled_up, now);
        self.bridge
            .notify(PresentationMessage::new(state, self.xp.total_xp(), self.xp.level()));
    }

    fn tick(&mut self, now: Instant) {
        for state in self.machine.poll(now) {
            self.bridge
                .notify(PresentationMessage::new(state, self.xp.total_xp(), self.xp.level()));
        }
    }

    fn messages(&self) -> &[PresentationMessage] {
        &self.bridge.surface().unwrap().messages
    }
}

#[test]
fn attach_after_progress_receives_current_totals_not_blank() {
    let mut harness = Harness::new(ExperienceState::new(150, 0));
    harness.bridge.attach(RecordingSurface::default());

    assert_eq!(
        harness.messages(),
        &[PresentationMessage::new(PetState::Idle, 150, 2)]
    );
}

#[test]
fn level_up_emits_exactly_one_active_revert_with_unchanged_totals() {
    let mut harness = Harness::new(ExperienceState::new(95, 0));
    harness.bridge.attach(RecordingSurface::default());
    let now = Instant::now();

    harness.type_chars(100, now);
    assert_eq!(
        harness.messages().last().unwrap(),
        &PresentationMessage::new(PetState::LevelUp, 100, 2)
    );

    // Ticks before the hold elapses emit nothing.
    let before = harness.messages().len();
    harness.tick(now + Duration::from_secs(1));
    harness.tick(now + Duration::from_secs(2));
    assert_eq!(harness.messages().len(), before);

    // Exactly one Active 3s later, totals unchanged; later ticks are quiet
    // until the inactivity timeout.
    harness.tick(now + Duration::from_secs(3));
    harness.tick(now + Duration::from_secs(4));
    assert_eq!(harness.messages().len(), before + 1);
    assert_eq!(
        harness.messages().last().unwrap(),
        &PresentationMessage::new(PetState::Active, 100, 2)
    );
}

#[test]
fn inactivity_emits_exactly_one_idle() {
    let mut harness = Harness::new(ExperienceState::default());
    harness.bridge.attach(RecordingSurface::default());
    let now = Instant::now();

    harness.type_chars(10, now);
    let before = harness.messages().len();

    harness.tick(now + Duration::from_secs(29));
    assert_eq!(harness.messages().len(), before);

    harness.tick(now + Duration::from_secs(30));
    harness.tick(now + Duration::from_secs(31));
    assert_eq!(harness.messages().len(), before + 1);
    assert_eq!(
        harness.messages().last().unwrap(),
        &PresentationMessage::new(PetState::Idle, 0, 1)
    );
}

#[test]
fn typing_while_detached_is_dropped_but_reattach_shows_latest() {
    let mut harness = Harness::new(ExperienceState::default());
    let now = Instant::now();

    // No surface attached: notifications vanish silently.
    harness.type_chars(250, now);

    harness.bridge.attach(RecordingSurface::default());
    assert_eq!(
        harness.messages(),
        &[PresentationMessage::new(PetState::Active, 10, 1)]
    );
}

#[test]
fn profile_survives_restart_through_store() {
    let dir = TempDir::new().unwrap();

    // First session: type 3275 characters, then snapshot.
    {
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut harness = Harness::new(ExperienceState::default());
        harness.type_chars(3275, Instant::now());
        store
            .save_profile(&ProfileData {
                total_xp: harness.xp.total_xp(),
                pending_chars: harness.xp.pending_chars(),
                ..ProfileData::default()
            })
            .unwrap();
    }

    // Second session: restore and verify the attach handshake reflects it.
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let profile = store.load_profile().unwrap();
    assert_eq!(profile.total_xp, (3275 / 100) * 5);
    assert_eq!(profile.pending_chars, 3275 % 100);

    let mut harness = Harness::new(ExperienceState::new(
        profile.total_xp,
        profile.pending_chars,
    ));
    harness.bridge.attach(RecordingSurface::default());
    let expected_level = progress::level(profile.total_xp);
    assert_eq!(
        harness.messages(),
        &[PresentationMessage::new(
            PetState::Idle,
            profile.total_xp,
            expected_level
        )]
    );
}
