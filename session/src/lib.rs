#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the aim trainer.
//!
//! The [`Session`] is the screen-level state machine. It owns the sliders, the
//! live targets, the timers and the score. Adapters mutate it exclusively
//! through [`apply`] and observe it through the read-only [`query`] module.

mod sliders;
mod targets;

use std::time::Duration;

use aim_trainer_core::{
    Command, Event, InputSnapshot, Key, ParameterKind, Score, Screen, TargetSpawn,
    WELCOME_BANNER,
};

pub use sliders::{Slider, SliderBank, KNOB_SIZE};
pub use targets::{Target, TargetList};

/// Time the settings screen waits before starting the round on its own.
pub const DEFAULT_SETTINGS_TIMEOUT: Duration = Duration::from_secs(20);

/// Distance a hovered slider moves per frame while an arrow key is held.
pub const DEFAULT_NUDGE_STEP: f32 = 3.8;

/// Knob position used for every slider unless configured otherwise.
pub const DEFAULT_KNOB_POSITION: f32 = 700.0;

/// Tunables applied when constructing a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    settings_timeout: Duration,
    nudge_step: f32,
    initial_positions: [f32; 4],
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settings_timeout: DEFAULT_SETTINGS_TIMEOUT,
            nudge_step: DEFAULT_NUDGE_STEP,
            initial_positions: [DEFAULT_KNOB_POSITION; 4],
        }
    }
}

impl SessionConfig {
    /// Overrides how long the settings screen waits before starting the round.
    #[must_use]
    pub const fn with_settings_timeout(mut self, timeout: Duration) -> Self {
        self.settings_timeout = timeout;
        self
    }

    /// Overrides the keyboard nudge distance.
    #[must_use]
    pub const fn with_nudge_step(mut self, step: f32) -> Self {
        self.nudge_step = step;
        self
    }

    /// Overrides the initial knob position of one slider.
    #[must_use]
    pub fn with_initial_position(mut self, kind: ParameterKind, position_x: f32) -> Self {
        if let Some(index) = ParameterKind::ALL.iter().position(|candidate| *candidate == kind) {
            self.initial_positions[index] = position_x;
        }
        self
    }

    /// Time the settings screen waits before starting the round.
    #[must_use]
    pub const fn settings_timeout(&self) -> Duration {
        self.settings_timeout
    }

    /// Keyboard nudge distance.
    #[must_use]
    pub const fn nudge_step(&self) -> f32 {
        self.nudge_step
    }
}

/// Timestamps tracked by the session, all read from the frame clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionTimers {
    clock: Duration,
    play_started: Duration,
    settings_entered: Duration,
    last_spawn: Option<Duration>,
    elapsed_play: Duration,
}

impl SessionTimers {
    /// Time of the most recent frame.
    #[must_use]
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    /// Time the current or most recent round started.
    #[must_use]
    pub const fn play_started(&self) -> Duration {
        self.play_started
    }

    /// Time the settings screen was last entered.
    #[must_use]
    pub const fn settings_entered(&self) -> Duration {
        self.settings_entered
    }

    /// Time the latest wave spawned, if one has spawned this round.
    #[must_use]
    pub const fn last_spawn(&self) -> Option<Duration> {
        self.last_spawn
    }

    /// Time spent in the current or most recent round.
    #[must_use]
    pub const fn elapsed_play(&self) -> Duration {
        self.elapsed_play
    }
}

/// Represents the authoritative aim trainer session.
#[derive(Clone, Debug)]
pub struct Session {
    banner: &'static str,
    screen: Screen,
    config: SessionConfig,
    sliders: SliderBank,
    targets: TargetList,
    timers: SessionTimers,
    score: Score,
    pointer_was_down: bool,
    close_requested: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Creates a session on the start screen.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            screen: Screen::Start,
            sliders: SliderBank::new(config.initial_positions),
            config,
            targets: TargetList::default(),
            timers: SessionTimers::default(),
            score: Score::default(),
            pointer_was_down: false,
            close_requested: false,
        }
    }

    fn transition(&mut self, to: Screen, out_events: &mut Vec<Event>) {
        let from = self.screen;
        self.screen = to;
        log::info!("screen changed from {from} to {to}");
        out_events.push(Event::ScreenChanged { from, to });
    }

    fn clear_targets(&mut self, out_events: &mut Vec<Event>) {
        let count = self.targets.clear();
        if count > 0 {
            out_events.push(Event::TargetsCleared { count });
        }
    }

    fn enter_settings(&mut self, out_events: &mut Vec<Event>) {
        self.timers.settings_entered = self.timers.clock;
        self.transition(Screen::Settings, out_events);
    }

    fn enter_play(&mut self, out_events: &mut Vec<Event>) {
        self.timers.play_started = self.timers.clock;
        self.timers.elapsed_play = Duration::ZERO;
        self.timers.last_spawn = None;
        self.sliders.reset_highlights();
        self.clear_targets(out_events);
        self.transition(Screen::Play, out_events);
    }

    fn enter_over(&mut self, out_events: &mut Vec<Event>) {
        self.clear_targets(out_events);
        self.transition(Screen::Over, out_events);
    }

    fn enter_start(&mut self, out_events: &mut Vec<Event>) {
        self.score.reset();
        self.transition(Screen::Start, out_events);
    }

    fn request_close(&mut self, out_events: &mut Vec<Event>) {
        if !self.close_requested {
            self.close_requested = true;
            log::info!("close requested");
            out_events.push(Event::CloseRequested);
        }
    }

    fn tick(&mut self, now: Duration, input: InputSnapshot, out_events: &mut Vec<Event>) {
        self.timers.clock = now.max(self.timers.clock);
        out_events.push(Event::TimeAdvanced {
            now: self.timers.clock,
        });

        if input.keys.contains(Key::Escape) {
            self.request_close(out_events);
        }

        let press = input.pointer_down && !self.pointer_was_down;
        self.pointer_was_down = input.pointer_down;

        match self.screen {
            Screen::Start => {
                if input.keys.contains(Key::Begin) {
                    self.enter_settings(out_events);
                }
            }
            Screen::Settings => {
                self.sliders
                    .interact(&input, self.config.nudge_step, out_events);

                let waited = self
                    .timers
                    .clock
                    .saturating_sub(self.timers.settings_entered);
                if input.keys.contains(Key::Confirm) {
                    self.enter_play(out_events);
                } else if waited >= self.config.settings_timeout {
                    log::debug!("settings timed out after {waited:?}");
                    self.enter_play(out_events);
                }
            }
            Screen::Play => self.play_frame(input, press, out_events),
            Screen::Over => {
                if input.keys.contains(Key::Replay) {
                    self.enter_start(out_events);
                }
            }
        }

        if self.screen == Screen::Play && self.wave_due() {
            let parameters = self.sliders.parameters();
            out_events.push(Event::WaveDue {
                count: parameters.targets_per_wave(),
                diameter: parameters.target_diameter(),
            });
        }
    }

    fn play_frame(&mut self, input: InputSnapshot, press: bool, out_events: &mut Vec<Event>) {
        self.targets.update_hover(input.pointer);

        if press && !self.targets.is_empty() {
            match self.targets.take_hit(input.pointer) {
                Some(target) => {
                    self.score.record_hit();
                    out_events.push(Event::TargetHit { target });
                }
                None => {
                    self.score.record_miss();
                    out_events.push(Event::PressMissed { at: input.pointer });
                }
            }
        }

        self.timers.elapsed_play = self.timers.clock.saturating_sub(self.timers.play_started);
        if self.timers.elapsed_play >= self.sliders.parameters().session_duration() {
            self.enter_over(out_events);
        }
    }

    fn wave_due(&self) -> bool {
        let interval = self.sliders.parameters().spawn_interval();
        self.timers
            .last_spawn
            .map_or(true, |last| self.timers.clock.saturating_sub(last) >= interval)
    }

    fn spawn_wave(&mut self, targets: &[TargetSpawn], out_events: &mut Vec<Event>) {
        if self.screen != Screen::Play {
            log::debug!("ignoring wave of {} targets outside play", targets.len());
            return;
        }

        let discarded = self.targets.replace_wave(targets);
        if discarded > 0 {
            out_events.push(Event::TargetsCleared { count: discarded });
        }
        self.timers.last_spawn = Some(self.timers.clock);
        log::debug!("spawned wave of {} targets", targets.len());
        out_events.push(Event::WaveSpawned {
            count: targets.len(),
        });
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { now, input } => session.tick(now, input, out_events),
        Command::SpawnWave { targets } => session.spawn_wave(&targets, out_events),
        Command::RequestClose => session.request_close(out_events),
    }
}

/// Read-only queries over the session state.
pub mod query {
    use std::time::Duration;

    use aim_trainer_core::{ParameterKind, Parameters, Score, Screen};

    use crate::{Session, SessionTimers, Slider, Target};

    /// Banner shown on the start screen.
    #[must_use]
    pub fn welcome_banner(session: &Session) -> &'static str {
        session.banner
    }

    /// Screen currently shown.
    #[must_use]
    pub fn screen(session: &Session) -> Screen {
        session.screen
    }

    /// Sliders, top to bottom.
    pub fn sliders(session: &Session) -> impl Iterator<Item = &Slider> {
        session.sliders.iter()
    }

    /// Slider bound to the provided parameter.
    #[must_use]
    pub fn slider(session: &Session, kind: ParameterKind) -> &Slider {
        session.sliders.get(kind)
    }

    /// Gameplay parameters selected by the sliders.
    #[must_use]
    pub fn parameters(session: &Session) -> Parameters {
        session.sliders.parameters()
    }

    /// Live targets in spawn order.
    #[must_use]
    pub fn targets(session: &Session) -> &[Target] {
        session.targets.as_slice()
    }

    /// Hit and miss counters of the current round.
    #[must_use]
    pub fn score(session: &Session) -> Score {
        session.score
    }

    /// Timestamps tracked by the session.
    #[must_use]
    pub fn timers(session: &Session) -> SessionTimers {
        session.timers
    }

    /// Time left in the current round.
    #[must_use]
    pub fn remaining_play_time(session: &Session) -> Duration {
        parameters(session)
            .session_duration()
            .saturating_sub(session.timers.elapsed_play)
    }

    /// Time left before the settings screen starts the round on its own.
    #[must_use]
    pub fn remaining_settings_time(session: &Session) -> Duration {
        let waited = session
            .timers
            .clock
            .saturating_sub(session.timers.settings_entered);
        session.config.settings_timeout.saturating_sub(waited)
    }

    /// Reports whether termination was requested.
    #[must_use]
    pub fn should_terminate(session: &Session) -> bool {
        session.close_requested
    }
}
