#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded wave generator that answers wave requests with spawn commands.

use aim_trainer_core::{
    Command, Event, Point, TargetColor, TargetSpawn, FIELD_HEIGHT, FIELD_WIDTH,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of intensity steps each color channel is drawn from.
const COLOR_STEPS: u16 = 10;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    field_width: f32,
    field_height: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration covering the default play field.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self::with_field(FIELD_WIDTH, FIELD_HEIGHT, rng_seed)
    }

    /// Creates a configuration covering a play field of the provided size.
    #[must_use]
    pub const fn with_field(field_width: f32, field_height: f32, rng_seed: u64) -> Self {
        Self {
            field_width,
            field_height,
            rng_seed,
        }
    }
}

/// Pure system that turns [`Event::WaveDue`] requests into [`Command::SpawnWave`].
#[derive(Debug)]
pub struct Spawning {
    field_width: f32,
    field_height: f32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            field_width: config.field_width.max(0.0),
            field_height: config.field_height.max(0.0),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and emits one spawn command for the latest wave request.
    ///
    /// Every wave replaces its predecessor, so earlier requests in the same
    /// batch are superseded.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let request = events.iter().rev().find_map(|event| match event {
            Event::WaveDue { count, diameter } => Some((*count, *diameter)),
            _ => None,
        });

        let Some((count, diameter)) = request else {
            return;
        };

        let targets = (0..count).map(|_| self.next_target(diameter)).collect();
        log::debug!("generated wave of {count} targets with diameter {diameter:.1}");
        out.push(Command::SpawnWave { targets });
    }

    fn next_target(&mut self, diameter: f32) -> TargetSpawn {
        TargetSpawn {
            center: Point::new(
                self.next_coordinate(self.field_width),
                self.next_coordinate(self.field_height),
            ),
            diameter,
            color: TargetColor::from_rgb(
                self.next_channel(),
                self.next_channel(),
                self.next_channel(),
            ),
        }
    }

    fn next_coordinate(&mut self, extent: f32) -> f32 {
        if extent <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..extent)
    }

    fn next_channel(&mut self) -> u8 {
        let step = self.rng.gen_range(0..COLOR_STEPS);
        (step * 255 / COLOR_STEPS) as u8
    }
}
