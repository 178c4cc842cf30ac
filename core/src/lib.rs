#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the aim trainer.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session, and pure systems. Adapters submit [`Command`] values
//! once per frame, the session executes those commands via its `apply` entry
//! point, and then broadcasts [`Event`] values for systems to react to. Systems
//! consume event streams and respond exclusively with new command batches.
//!
//! The parameter mapper that converts slider positions into gameplay values
//! lives here as well, so every layer agrees on the same linear transforms.

use std::{fmt, str::FromStr, time::Duration};

use thiserror::Error;

/// Canonical banner shown on the start screen.
pub const WELCOME_BANNER: &str = "Welcome to the Aim Trainer!";

/// Width of the play field measured in field units.
pub const FIELD_WIDTH: f32 = 1400.0;

/// Height of the play field measured in field units.
pub const FIELD_HEIGHT: f32 = 800.0;

/// Horizontal distance that corresponds to one mapper unit (an eighth of the field).
pub const SLIDER_UNIT: f32 = FIELD_WIDTH / 8.0;

/// Left end of every slider's travel range (1.8 mapper units).
pub const TRAVEL_MIN_X: f32 = 315.0;

/// Right end of every slider's travel range (6.2 mapper units).
pub const TRAVEL_MAX_X: f32 = 1085.0;

const TRAVEL_OFFSET_UNITS: f64 = 1.8;
const TRAVEL_SPAN_UNITS: f64 = 4.4;

/// Screen currently shown by the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Welcome screen waiting for the begin key.
    #[default]
    Start,
    /// Slider screen where the player tunes the session.
    Settings,
    /// Timed round spawning clickable targets.
    Play,
    /// Summary screen showing the round's statistics.
    Over,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Settings => "settings",
            Self::Play => "play",
            Self::Over => "over",
        };
        f.write_str(name)
    }
}

/// Logical keys understood by the session.
///
/// Adapters decide which physical keys produce each logical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Leaves the start screen for the settings screen.
    Begin,
    /// Starts the round from the settings screen.
    Confirm,
    /// Returns from the summary screen to the start screen.
    Replay,
    /// Nudges the hovered slider to the left.
    Left,
    /// Nudges the hovered slider to the right.
    Right,
    /// Requests that the application terminates.
    Escape,
}

impl Key {
    /// Every logical key in declaration order.
    pub const ALL: [Key; 6] = [
        Key::Begin,
        Key::Confirm,
        Key::Replay,
        Key::Left,
        Key::Right,
        Key::Escape,
    ];

    const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Set of logical keys held down during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySet(u8);

impl KeySet {
    /// Creates an empty key set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy of the set with the provided key added.
    #[must_use]
    pub const fn with(self, key: Key) -> Self {
        Self(self.0 | key.mask())
    }

    /// Marks the provided key as held.
    pub fn insert(&mut self, key: Key) {
        self.0 |= key.mask();
    }

    /// Reports whether the provided key is held.
    #[must_use]
    pub const fn contains(&self, key: Key) -> bool {
        self.0 & key.mask() != 0
    }

    /// Reports whether no key is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterator over the held keys in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(|key| self.contains(*key))
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut set = Self::empty();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

/// Location on the play field. The vertical axis grows upward from the bottom-left origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate in field units.
    pub x: f32,
    /// Vertical coordinate in field units.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds expressed in field units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Smallest horizontal coordinate covered.
    pub left: f32,
    /// Largest horizontal coordinate covered.
    pub right: f32,
    /// Smallest vertical coordinate covered.
    pub bottom: f32,
    /// Largest vertical coordinate covered.
    pub top: f32,
}

impl Bounds {
    /// Builds bounds centred on `center` with the provided extent.
    #[must_use]
    pub fn around(center: Point, width: f32, height: f32) -> Self {
        let half_width = width * 0.5;
        let half_height = height * 0.5;
        Self {
            left: center.x - half_width,
            right: center.x + half_width,
            bottom: center.y - half_height,
            top: center.y + half_height,
        }
    }

    /// Reports whether the point lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.contains_x(point.x) && self.contains_y(point.y)
    }

    /// Reports whether the horizontal coordinate lies within the bounds.
    #[must_use]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Reports whether the vertical coordinate lies within the bounds.
    #[must_use]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.bottom && y <= self.top
    }
}

/// Drawable geometry shared by sliders and targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rectangle {
        /// Centre of the rectangle.
        center: Point,
        /// Horizontal extent.
        width: f32,
        /// Vertical extent.
        height: f32,
    },
    /// Circle inscribed in its square bounds.
    Circle {
        /// Centre of the circle.
        center: Point,
        /// Diameter of the circle.
        diameter: f32,
    },
}

impl Shape {
    /// Centre point of the shape.
    #[must_use]
    pub const fn center(&self) -> Point {
        match self {
            Self::Rectangle { center, .. } | Self::Circle { center, .. } => *center,
        }
    }

    /// Axis-aligned bounds enclosing the shape.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match *self {
            Self::Rectangle {
                center,
                width,
                height,
            } => Bounds::around(center, width, height),
            Self::Circle { center, diameter } => Bounds::around(center, diameter, diameter),
        }
    }

    /// Reports whether the point falls inside the shape's bounds.
    ///
    /// Circles are tested against their bounding square.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Reports whether the horizontal row at `y` crosses the shape.
    #[must_use]
    pub fn spans_row(&self, y: f32) -> bool {
        self.bounds().contains_y(y)
    }

    /// Returns the same shape moved horizontally so its centre sits at `x`.
    #[must_use]
    pub fn with_center_x(self, x: f32) -> Self {
        match self {
            Self::Rectangle {
                center,
                width,
                height,
            } => Self::Rectangle {
                center: Point::new(x, center.y),
                width,
                height,
            },
            Self::Circle { center, diameter } => Self::Circle {
                center: Point::new(x, center.y),
                diameter,
            },
        }
    }
}

/// Visual appearance applied to a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TargetColor {
    /// Creates a new target color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Unique identifier assigned to a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u32);

impl TargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual state of a slider recomputed every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SliderHighlight {
    /// The pointer is on another row.
    #[default]
    Idle,
    /// The pointer shares the slider's row.
    Hovered,
    /// The pointer is dragging the knob.
    Dragged,
}

/// Hit and miss counters for the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Score {
    hits: u32,
    misses: u32,
}

impl Score {
    /// Creates a score with explicit counters.
    #[must_use]
    pub const fn new(hits: u32, misses: u32) -> Self {
        Self { hits, misses }
    }

    /// Number of targets clicked.
    #[must_use]
    pub const fn hits(&self) -> u32 {
        self.hits
    }

    /// Number of presses that landed on no target.
    #[must_use]
    pub const fn misses(&self) -> u32 {
        self.misses
    }

    /// Total number of scored presses.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.hits.saturating_add(self.misses)
    }

    /// Fraction of scored presses that hit a target.
    ///
    /// Returns `None` when nothing has been scored yet.
    #[must_use]
    pub fn accuracy(&self) -> Option<f32> {
        let attempts = self.attempts();
        if attempts == 0 {
            return None;
        }
        Some(self.hits as f32 / attempts as f32)
    }

    /// Records a successful hit.
    pub fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    /// Records a press that did not land on any target.
    pub fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
    }

    /// Resets both counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Gameplay parameter controlled by a slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterKind {
    /// Diameter of spawned targets.
    Size,
    /// Seconds between successive waves.
    Speed,
    /// Number of targets per wave.
    Count,
    /// Length of a round in seconds.
    Time,
}

impl ParameterKind {
    /// Every parameter in slider order, top to bottom.
    pub const ALL: [ParameterKind; 4] = [
        ParameterKind::Size,
        ParameterKind::Speed,
        ParameterKind::Count,
        ParameterKind::Time,
    ];

    /// Configuration name of the parameter.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Speed => "speed",
            Self::Count => "count",
            Self::Time => "time",
        }
    }

    /// Caption drawn on the parameter's slider.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Speed => "speed",
            Self::Count => "targets",
            Self::Time => "time",
        }
    }

    /// Horizontal range the parameter's slider may travel.
    #[must_use]
    pub const fn travel_range(self) -> TravelRange {
        TravelRange::new(TRAVEL_MIN_X, TRAVEL_MAX_X)
    }

    /// Values produced at the two ends of the travel range.
    #[must_use]
    pub const fn output_range(self) -> (f32, f32) {
        match self {
            Self::Size => (5.0, 105.0),
            Self::Speed => (1.0, 5.0),
            Self::Count => (1.0, 6.0),
            Self::Time => (15.0, 61.0),
        }
    }

    /// Linear transform relating slider positions to parameter values.
    #[must_use]
    pub fn linear_map(self) -> LinearMap {
        let (low, high) = self.output_range();
        LinearMap {
            scale: (f64::from(high) - f64::from(low)) / TRAVEL_SPAN_UNITS,
            offset: TRAVEL_OFFSET_UNITS,
            base: f64::from(low),
            unit: f64::from(SLIDER_UNIT),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterKind {
    type Err = ParameterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParameterError::UnknownKind {
                name: trimmed.to_owned(),
            })
    }
}

/// Errors raised when a parameter is named incorrectly.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// The name does not correspond to any [`ParameterKind`].
    #[error("unrecognized parameter kind `{name}` (expected size, speed, count or time)")]
    UnknownKind {
        /// Name that failed to resolve.
        name: String,
    },
}

/// Inclusive horizontal interval a slider is clamped to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TravelRange {
    min_x: f32,
    max_x: f32,
}

impl TravelRange {
    /// Creates a travel range spanning `min_x..=max_x`.
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32) -> Self {
        Self { min_x, max_x }
    }

    /// Left end of the range.
    #[must_use]
    pub const fn min_x(&self) -> f32 {
        self.min_x
    }

    /// Right end of the range.
    #[must_use]
    pub const fn max_x(&self) -> f32 {
        self.max_x
    }

    /// Reports whether `x` lies within the range, ends included.
    #[must_use]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    /// Clamps `x` into the range. `NaN` collapses onto the left end.
    #[must_use]
    pub fn clamp(&self, x: f32) -> f32 {
        if x.is_nan() {
            return self.min_x;
        }
        x.clamp(self.min_x, self.max_x)
    }
}

/// Linear transform `scale * (x / unit - offset) + base`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearMap {
    /// Output change per mapper unit.
    pub scale: f64,
    /// Mapper units subtracted before scaling.
    pub offset: f64,
    /// Output produced at the offset.
    pub base: f64,
    /// Field units per mapper unit.
    pub unit: f64,
}

impl LinearMap {
    /// Evaluates the transform at `position_x`.
    ///
    /// Computed in double precision so the travel-range endpoints land exactly
    /// on the documented output bounds after narrowing.
    #[must_use]
    pub fn apply(&self, position_x: f32) -> f32 {
        let units = f64::from(position_x) / self.unit;
        (self.scale * (units - self.offset) + self.base) as f32
    }
}

/// Maps a slider position onto the value of the provided parameter.
///
/// No clamping is applied: positions outside the travel range extrapolate past
/// the output range, so callers clamp first.
#[must_use]
pub fn map(position_x: f32, kind: ParameterKind) -> f32 {
    kind.linear_map().apply(position_x)
}

/// Maps a slider position onto the parameter identified by `name`.
pub fn map_named(position_x: f32, name: &str) -> Result<f32, ParameterError> {
    let kind = name.parse::<ParameterKind>()?;
    Ok(map(position_x, kind))
}

/// Gameplay values derived from the four sliders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
    target_diameter: f32,
    spawn_interval: Duration,
    targets_per_wave: usize,
    session_duration: Duration,
}

impl Parameters {
    /// Interprets raw mapper outputs.
    ///
    /// Size and speed stay continuous; count and time are truncated to whole
    /// targets and whole seconds.
    #[must_use]
    pub fn from_values(size: f32, speed: f32, count: f32, time: f32) -> Self {
        Self {
            target_diameter: size.max(0.0),
            spawn_interval: Duration::from_secs_f32(non_negative(speed)),
            targets_per_wave: non_negative(count) as usize,
            session_duration: Duration::from_secs(non_negative(time) as u64),
        }
    }

    /// Diameter of spawned targets.
    #[must_use]
    pub const fn target_diameter(&self) -> f32 {
        self.target_diameter
    }

    /// Time between successive waves.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Number of targets spawned per wave.
    #[must_use]
    pub const fn targets_per_wave(&self) -> usize {
        self.targets_per_wave
    }

    /// Length of a round.
    #[must_use]
    pub const fn session_duration(&self) -> Duration {
        self.session_duration
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Input captured by an adapter for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Logical keys held during the frame.
    pub keys: KeySet,
    /// Pointer location in field coordinates.
    pub pointer: Point,
    /// Whether the primary pointer button is held.
    pub pointer_down: bool,
}

/// Description of a single target requested by the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSpawn {
    /// Centre of the target.
    pub center: Point,
    /// Diameter of the target.
    pub diameter: f32,
    /// Appearance of the target.
    pub color: TargetColor,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session by one frame using the provided input.
    Tick {
        /// Monotonic time elapsed since the process started.
        now: Duration,
        /// Input observed during the frame.
        input: InputSnapshot,
    },
    /// Replaces the active targets with a new wave.
    SpawnWave {
        /// Targets composing the wave.
        targets: Vec<TargetSpawn>,
    },
    /// Requests that the application terminates.
    RequestClose,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Monotonic time of the frame.
        now: Duration,
    },
    /// Announces that a different screen became active.
    ScreenChanged {
        /// Screen that was active before the transition.
        from: Screen,
        /// Screen that became active.
        to: Screen,
    },
    /// Reports that a slider changed position.
    SliderMoved {
        /// Parameter bound to the slider.
        kind: ParameterKind,
        /// New horizontal position of the knob.
        position_x: f32,
        /// Parameter value at the new position.
        value: f32,
    },
    /// Requests a new wave from the spawning system.
    WaveDue {
        /// Number of targets the wave must contain.
        count: usize,
        /// Diameter every target of the wave must use.
        diameter: f32,
    },
    /// Confirms that a wave replaced the active targets.
    WaveSpawned {
        /// Number of targets in the new wave.
        count: usize,
    },
    /// Confirms that a press landed on a target.
    TargetHit {
        /// Identifier of the target that was hit.
        target: TargetId,
    },
    /// Reports a press that landed on no target.
    PressMissed {
        /// Pointer location of the press.
        at: Point,
    },
    /// Reports that live targets were discarded.
    TargetsCleared {
        /// Number of targets removed.
        count: usize,
    },
    /// Announces that termination was requested.
    CloseRequested,
}
