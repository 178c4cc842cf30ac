use std::time::Duration;

use aim_trainer_core::{
    Command, Event, InputSnapshot, Key, KeySet, ParameterKind, Point, Screen, TargetColor,
    TargetSpawn,
};
use aim_trainer_session::{self as session, query, Session, SessionConfig};
use assert_matches::assert_matches;

fn keys(held: &[Key]) -> InputSnapshot {
    InputSnapshot {
        keys: held.iter().copied().collect(),
        ..InputSnapshot::default()
    }
}

fn tick(session: &mut Session, now: Duration, input: InputSnapshot) -> Vec<Event> {
    let mut events = Vec::new();
    session::apply(session, Command::Tick { now, input }, &mut events);
    events
}

fn spawn(session: &mut Session, centers: &[Point]) -> Vec<Event> {
    let targets = centers
        .iter()
        .map(|center| TargetSpawn {
            center: *center,
            diameter: 40.0,
            color: TargetColor::from_rgb(200, 100, 50),
        })
        .collect();
    let mut events = Vec::new();
    session::apply(session, Command::SpawnWave { targets }, &mut events);
    events
}

fn session_in_play(config: SessionConfig, now: Duration) -> Session {
    let mut session = Session::new(config);
    let _ = tick(&mut session, now, keys(&[Key::Begin]));
    let _ = tick(&mut session, now, keys(&[Key::Confirm]));
    assert_eq!(query::screen(&session), Screen::Play);
    session
}

#[test]
fn begin_key_enters_settings_and_records_entry_time() {
    let mut session = Session::default();
    let now = Duration::from_millis(4_250);

    let events = tick(&mut session, now, keys(&[Key::Begin]));

    assert_eq!(query::screen(&session), Screen::Settings);
    assert_eq!(query::timers(&session).settings_entered(), now);
    assert!(events.contains(&Event::ScreenChanged {
        from: Screen::Start,
        to: Screen::Settings,
    }));
}

#[test]
fn start_screen_ignores_other_keys() {
    let mut session = Session::default();
    let _ = tick(
        &mut session,
        Duration::from_secs(1),
        keys(&[Key::Confirm, Key::Replay, Key::Left]),
    );
    assert_eq!(query::screen(&session), Screen::Start);
}

#[test]
fn settings_start_play_after_timeout_without_confirm() {
    let mut session = Session::default();
    let entered = Duration::from_secs(2);
    let _ = tick(&mut session, entered, keys(&[Key::Begin]));

    let _ = tick(&mut session, entered + Duration::from_millis(19_999), keys(&[]));
    assert_eq!(query::screen(&session), Screen::Settings);
    assert_eq!(
        query::remaining_settings_time(&session),
        Duration::from_millis(1)
    );

    let now = entered + Duration::from_secs(20);
    let events = tick(&mut session, now, keys(&[]));
    assert_eq!(query::screen(&session), Screen::Play);
    assert_eq!(query::timers(&session).play_started(), now);
    assert!(events.contains(&Event::ScreenChanged {
        from: Screen::Settings,
        to: Screen::Play,
    }));
}

#[test]
fn settings_timeout_is_configurable() {
    let config = SessionConfig::default().with_settings_timeout(Duration::from_secs(5));
    let mut session = Session::new(config);
    let _ = tick(&mut session, Duration::ZERO, keys(&[Key::Begin]));
    let _ = tick(&mut session, Duration::from_secs(5), keys(&[]));
    assert_eq!(query::screen(&session), Screen::Play);
}

#[test]
fn confirm_key_starts_play_and_requests_first_wave() {
    let mut session = Session::default();
    let _ = tick(&mut session, Duration::from_secs(1), keys(&[Key::Begin]));

    let events = tick(&mut session, Duration::from_secs(3), keys(&[Key::Confirm]));

    assert_eq!(query::screen(&session), Screen::Play);
    let parameters = query::parameters(&session);
    assert_matches!(
        events.last(),
        Some(Event::WaveDue { count, diameter })
            if *count == parameters.targets_per_wave()
                && *diameter == parameters.target_diameter()
    );
}

#[test]
fn play_ends_when_session_duration_elapses() {
    // 570 maps to 30.2 seconds, truncated to a 30 second round.
    let config = SessionConfig::default().with_initial_position(ParameterKind::Time, 570.0);
    let started = Duration::from_secs(10);
    let mut session = session_in_play(config, started);
    assert_eq!(
        query::parameters(&session).session_duration(),
        Duration::from_secs(30)
    );
    let _ = spawn(&mut session, &[Point::new(100.0, 100.0), Point::new(300.0, 300.0)]);

    let _ = tick(&mut session, started + Duration::from_millis(29_900), keys(&[]));
    assert_eq!(query::screen(&session), Screen::Play);
    assert_eq!(
        query::remaining_play_time(&session),
        Duration::from_millis(100)
    );

    let events = tick(&mut session, started + Duration::from_secs(30), keys(&[]));
    assert_eq!(query::screen(&session), Screen::Over);
    assert!(query::targets(&session).is_empty());
    assert!(events.contains(&Event::TargetsCleared { count: 2 }));
    assert!(
        !events.iter().any(|event| matches!(event, Event::WaveDue { .. })),
        "no wave may be requested once the round is over",
    );
}

#[test]
fn replay_resets_score_and_returns_to_start() {
    let config = SessionConfig::default().with_initial_position(ParameterKind::Count, 1085.0);
    let mut session = session_in_play(config, Duration::ZERO);
    let mut now = Duration::ZERO;

    for _ in 0..7 {
        let _ = spawn(&mut session, &[Point::new(500.0, 500.0)]);
        now += Duration::from_millis(10);
        let press = InputSnapshot {
            pointer: Point::new(505.0, 495.0),
            pointer_down: true,
            ..InputSnapshot::default()
        };
        let events = tick(&mut session, now, press);
        assert_matches!(events.iter().find(|e| matches!(e, Event::TargetHit { .. })), Some(_));
        now += Duration::from_millis(10);
        let _ = tick(&mut session, now, keys(&[]));
    }

    let _ = spawn(&mut session, &[Point::new(500.0, 500.0)]);
    for _ in 0..3 {
        now += Duration::from_millis(10);
        let press = InputSnapshot {
            pointer: Point::new(50.0, 50.0),
            pointer_down: true,
            ..InputSnapshot::default()
        };
        let _ = tick(&mut session, now, press);
        now += Duration::from_millis(10);
        let _ = tick(&mut session, now, keys(&[]));
    }

    let duration = query::parameters(&session).session_duration();
    let _ = tick(&mut session, duration, keys(&[]));
    assert_eq!(query::screen(&session), Screen::Over);

    let score = query::score(&session);
    assert_eq!((score.hits(), score.misses()), (7, 3));
    let accuracy = score.accuracy().expect("attempts recorded");
    assert!((accuracy - 0.7).abs() < 1e-6);

    let _ = tick(&mut session, duration + Duration::from_secs(1), keys(&[Key::Replay]));
    assert_eq!(query::screen(&session), Screen::Start);
    let score = query::score(&session);
    assert_eq!((score.hits(), score.misses()), (0, 0));
    assert_eq!(score.accuracy(), None);
}

#[test]
fn held_pointer_counts_a_single_press() {
    let mut session = session_in_play(SessionConfig::default(), Duration::ZERO);
    let _ = spawn(&mut session, &[Point::new(500.0, 500.0)]);

    let held = InputSnapshot {
        pointer: Point::new(10.0, 10.0),
        pointer_down: true,
        ..InputSnapshot::default()
    };
    for frame in 1..=5 {
        let _ = tick(&mut session, Duration::from_millis(frame * 16), held);
    }

    assert_eq!(query::score(&session).misses(), 1);
}

#[test]
fn off_target_press_counts_one_miss_regardless_of_live_targets() {
    let config = SessionConfig::default().with_initial_position(ParameterKind::Count, 1085.0);
    let mut session = session_in_play(config, Duration::ZERO);
    let _ = spawn(
        &mut session,
        &[
            Point::new(100.0, 100.0),
            Point::new(300.0, 100.0),
            Point::new(500.0, 100.0),
        ],
    );

    let press = InputSnapshot {
        pointer: Point::new(700.0, 700.0),
        pointer_down: true,
        ..InputSnapshot::default()
    };
    let events = tick(&mut session, Duration::from_millis(16), press);

    assert_eq!(query::score(&session).misses(), 1);
    assert!(events.contains(&Event::PressMissed {
        at: Point::new(700.0, 700.0)
    }));
    assert_eq!(query::targets(&session).len(), 3);
}

#[test]
fn presses_without_live_targets_are_not_scored() {
    let mut session = session_in_play(SessionConfig::default(), Duration::ZERO);
    let press = InputSnapshot {
        pointer: Point::new(700.0, 700.0),
        pointer_down: true,
        ..InputSnapshot::default()
    };
    let _ = tick(&mut session, Duration::from_millis(16), press);
    assert_eq!(query::score(&session).attempts(), 0);
}

#[test]
fn hovered_target_is_flagged() {
    let mut session = session_in_play(SessionConfig::default(), Duration::ZERO);
    let _ = spawn(&mut session, &[Point::new(400.0, 400.0), Point::new(900.0, 200.0)]);

    let hover = InputSnapshot {
        pointer: Point::new(410.0, 390.0),
        ..InputSnapshot::default()
    };
    let _ = tick(&mut session, Duration::from_millis(16), hover);

    let hovered: Vec<bool> = query::targets(&session)
        .iter()
        .map(|target| target.is_hovered())
        .collect();
    assert_eq!(hovered, vec![true, false]);
}

#[test]
fn escape_sets_close_flag_once() {
    let mut session = Session::default();
    assert!(!query::should_terminate(&session));

    let events = tick(&mut session, Duration::from_secs(1), keys(&[Key::Escape]));
    assert!(query::should_terminate(&session));
    assert!(events.contains(&Event::CloseRequested));

    let events = tick(&mut session, Duration::from_secs(2), keys(&[Key::Escape]));
    assert!(!events.contains(&Event::CloseRequested));
}

#[test]
fn close_can_be_requested_externally() {
    let mut session = Session::default();
    let mut events = Vec::new();
    session::apply(&mut session, Command::RequestClose, &mut events);
    assert!(query::should_terminate(&session));
    assert_eq!(events, vec![Event::CloseRequested]);
}

#[test]
fn settings_sliders_react_to_input_only_on_settings_screen() {
    let mut session = Session::default();
    let drag = InputSnapshot {
        keys: KeySet::empty(),
        pointer: Point::new(900.0, 575.0),
        pointer_down: true,
    };

    let _ = tick(&mut session, Duration::ZERO, drag);
    assert_eq!(query::slider(&session, ParameterKind::Size).position_x(), 700.0);

    let _ = tick(&mut session, Duration::from_millis(16), keys(&[Key::Begin]));
    let events = tick(&mut session, Duration::from_millis(32), drag);
    assert_eq!(query::slider(&session, ParameterKind::Size).position_x(), 900.0);
    assert_matches!(
        events
            .iter()
            .find(|event| matches!(event, Event::SliderMoved { .. })),
        Some(Event::SliderMoved {
            kind: ParameterKind::Size,
            ..
        })
    );
}
