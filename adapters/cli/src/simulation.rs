//! Per-frame glue between the session, the spawning system and the scene.

use std::{ops::ControlFlow, time::Duration};

use aim_trainer_core::{Command, Event};
use aim_trainer_rendering::{Color, FrameInput, Scene, SliderPresentation, TargetPresentation};
use aim_trainer_session::{self as session, query, Session, SessionConfig};
use aim_trainer_system_spawning::{self as spawning, Spawning};

/// Owns the authoritative session and the systems reacting to its events.
#[derive(Debug)]
pub(crate) struct Simulation {
    session: Session,
    spawning: Spawning,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    pub(crate) fn new(session_config: SessionConfig, spawning_config: spawning::Config) -> Self {
        Self {
            session: Session::new(session_config),
            spawning: Spawning::new(spawning_config),
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Advances the session by one frame.
    ///
    /// Breaks once the session asks to terminate.
    pub(crate) fn advance(&mut self, now: Duration, input: FrameInput) -> ControlFlow<()> {
        self.events.clear();
        session::apply(
            &mut self.session,
            Command::Tick {
                now,
                input: input.to_snapshot(),
            },
            &mut self.events,
        );

        self.spawning.handle(&self.events, &mut self.commands);
        for command in self.commands.drain(..) {
            session::apply(&mut self.session, command, &mut self.events);
        }

        for event in &self.events {
            match event {
                Event::TargetHit { target } => log::debug!("hit target {}", target.get()),
                Event::PressMissed { at } => log::debug!("missed at ({:.0}, {:.0})", at.x, at.y),
                _ => {}
            }
        }

        if query::should_terminate(&self.session) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Copies the session state into the scene drawn this frame.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let session = &self.session;
        scene.screen = query::screen(session);
        query::welcome_banner(session).clone_into(&mut scene.banner);

        scene.sliders.clear();
        scene.sliders.extend(query::sliders(session).map(|slider| {
            SliderPresentation::new(
                slider.kind(),
                slider.knob(),
                slider.value(),
                slider.highlight(),
            )
        }));

        scene.targets.clear();
        scene
            .targets
            .extend(query::targets(session).iter().map(|target| {
                TargetPresentation::new(
                    target.shape(),
                    Color::from(target.color()),
                    target.is_hovered(),
                )
            }));

        scene.score = query::score(session);
        scene.remaining_play = query::remaining_play_time(session);
        scene.remaining_settings = query::remaining_settings_time(session);
        scene.session_duration = query::parameters(session).session_duration();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_trainer_core::{Key, KeySet, Screen};
    use glam::Vec2;

    fn simulation() -> Simulation {
        Simulation::new(SessionConfig::default(), spawning::Config::new(9))
    }

    fn keys(held: &[Key]) -> FrameInput {
        FrameInput {
            keys: held.iter().copied().collect(),
            ..FrameInput::default()
        }
    }

    #[test]
    fn round_starts_with_a_populated_scene() {
        let mut simulation = simulation();
        let mut scene = Scene::new("");

        assert!(simulation
            .advance(Duration::ZERO, keys(&[Key::Begin]))
            .is_continue());
        simulation.populate_scene(&mut scene);
        assert_eq!(scene.screen, Screen::Settings);
        assert_eq!(scene.sliders.len(), 4);
        assert_eq!(scene.remaining_settings, Duration::from_secs(20));
        assert_eq!(scene.banner, "Welcome to the Aim Trainer!");

        assert!(simulation
            .advance(Duration::from_secs(1), keys(&[Key::Confirm]))
            .is_continue());
        simulation.populate_scene(&mut scene);
        assert_eq!(scene.screen, Screen::Play);
        let parameters = query::parameters(&simulation.session);
        assert_eq!(scene.targets.len(), parameters.targets_per_wave());
        assert_eq!(scene.session_duration, parameters.session_duration());
        assert_eq!(scene.remaining_play, parameters.session_duration());
    }

    #[test]
    fn clicking_a_target_updates_the_scene_score() {
        let mut simulation = simulation();
        let mut scene = Scene::new("");
        let _ = simulation.advance(Duration::ZERO, keys(&[Key::Begin]));
        let _ = simulation.advance(Duration::ZERO, keys(&[Key::Confirm]));

        let center = query::targets(&simulation.session)[0].shape().center();
        let press = FrameInput {
            keys: KeySet::empty(),
            pointer: Vec2::new(center.x, center.y),
            pointer_down: true,
        };
        let _ = simulation.advance(Duration::from_millis(16), press);
        simulation.populate_scene(&mut scene);

        assert_eq!(scene.score.hits(), 1);
        assert_eq!(scene.score.misses(), 0);
    }

    #[test]
    fn escape_breaks_the_frame_loop() {
        let mut simulation = simulation();
        assert!(simulation
            .advance(Duration::ZERO, keys(&[Key::Escape]))
            .is_break());
    }
}
