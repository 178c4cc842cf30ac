#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for aim trainer adapters.

use aim_trainer_core::{
    InputSnapshot, KeySet, ParameterKind, Point, Score, Screen, Shape, SliderHighlight,
    TargetColor,
};
use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{ops::ControlFlow, time::Duration};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns a new color darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);

        Self {
            red: self.red * keep,
            green: self.green * keep,
            blue: self.blue * keep,
            alpha: self.alpha,
        }
    }
}

impl From<TargetColor> for Color {
    fn from(color: TargetColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Logical keys held during the frame.
    pub keys: KeySet,
    /// Pointer position expressed in field units with the origin at the bottom-left.
    pub pointer: Vec2,
    /// Whether the primary pointer button is held.
    pub pointer_down: bool,
}

impl FrameInput {
    /// Converts the adapter input into the snapshot consumed by the session.
    #[must_use]
    pub fn to_snapshot(self) -> InputSnapshot {
        InputSnapshot {
            keys: self.keys,
            pointer: Point::new(self.pointer.x, self.pointer.y),
            pointer_down: self.pointer_down,
        }
    }
}

/// Play field dimensions shared by the scene and the backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPresentation {
    width: f32,
    height: f32,
}

impl FieldPresentation {
    /// Creates a new field descriptor.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn new(width: f32, height: f32) -> std::result::Result<Self, RenderingError> {
        let valid = |extent: f32| extent.is_finite() && extent > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderingError::InvalidFieldSize { width, height });
        }

        Ok(Self { width, height })
    }

    /// Width of the field in field units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the field in field units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Converts a window position (origin top-left, y down) into field units.
    #[must_use]
    pub fn screen_to_field(&self, position: Vec2, screen_size: Vec2) -> Vec2 {
        let scale = self.scale(screen_size);
        Vec2::new(position.x / scale.x, self.height - position.y / scale.y)
    }

    /// Converts a field position into window coordinates.
    #[must_use]
    pub fn field_to_screen(&self, point: Point, screen_size: Vec2) -> Vec2 {
        let scale = self.scale(screen_size);
        Vec2::new(point.x * scale.x, (self.height - point.y) * scale.y)
    }

    /// Window pixels per field unit along each axis.
    #[must_use]
    pub fn scale(&self, screen_size: Vec2) -> Vec2 {
        let scale = screen_size / Vec2::new(self.width, self.height);
        // A minimised window reports a zero size.
        Vec2::new(non_degenerate(scale.x), non_degenerate(scale.y))
    }
}

fn non_degenerate(scale: f32) -> f32 {
    if scale.is_finite() && scale > f32::EPSILON {
        scale
    } else {
        1.0
    }
}

/// Snapshot of a slider knob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderPresentation {
    /// Parameter bound to the slider.
    pub kind: ParameterKind,
    /// Geometry of the knob.
    pub knob: Shape,
    /// Mapped parameter value at the knob position.
    pub value: f32,
    /// Interaction state computed during the last tick.
    pub highlight: SliderHighlight,
}

impl SliderPresentation {
    /// Creates a new slider descriptor.
    #[must_use]
    pub const fn new(
        kind: ParameterKind,
        knob: Shape,
        value: f32,
        highlight: SliderHighlight,
    ) -> Self {
        Self {
            kind,
            knob,
            value,
            highlight,
        }
    }

    /// Fill color of the knob, derived from its kind and highlight.
    #[must_use]
    pub fn fill(&self) -> Color {
        let base = slider_base_color(self.kind);
        match self.highlight {
            SliderHighlight::Idle => base,
            SliderHighlight::Hovered => base.lighten(0.5),
            SliderHighlight::Dragged => base.darken(0.5),
        }
    }

    /// Color used for the knob caption so it stays readable on the fill.
    #[must_use]
    pub fn caption_color(&self) -> Color {
        let fill = self.fill();
        let luminance = 0.299 * fill.red + 0.587 * fill.green + 0.114 * fill.blue;
        if luminance > 0.6 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

/// Base knob color for each parameter.
#[must_use]
pub const fn slider_base_color(kind: ParameterKind) -> Color {
    match kind {
        ParameterKind::Size => Color::new(1.0, 0.0, 0.0, 1.0),
        ParameterKind::Speed => Color::new(0.0, 1.0, 0.0, 1.0),
        ParameterKind::Count => Color::new(0.0, 0.0, 1.0, 1.0),
        ParameterKind::Time => Color::WHITE,
    }
}

/// Snapshot of a live target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPresentation {
    /// Geometry of the target.
    pub shape: Shape,
    /// Color assigned when the target spawned.
    pub color: Color,
    /// Whether the pointer rests over the target.
    pub hovered: bool,
}

impl TargetPresentation {
    /// Creates a new target descriptor.
    #[must_use]
    pub const fn new(shape: Shape, color: Color, hovered: bool) -> Self {
        Self {
            shape,
            color,
            hovered,
        }
    }

    /// Fill color, lightened while hovered.
    #[must_use]
    pub fn fill(&self) -> Color {
        if self.hovered {
            self.color.lighten(0.5)
        } else {
            self.color
        }
    }
}

/// Scene description consumed once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Screen currently shown.
    pub screen: Screen,
    /// Banner displayed on the start screen.
    pub banner: String,
    /// Slider knobs, top to bottom.
    pub sliders: Vec<SliderPresentation>,
    /// Live targets in spawn order.
    pub targets: Vec<TargetPresentation>,
    /// Hit and miss counters of the current round.
    pub score: Score,
    /// Time left in the current round.
    pub remaining_play: Duration,
    /// Time left before the settings screen starts the round on its own.
    pub remaining_settings: Duration,
    /// Configured round length.
    pub session_duration: Duration,
}

impl Scene {
    /// Creates an empty start-screen scene showing the provided banner.
    #[must_use]
    pub fn new<T>(banner: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            screen: Screen::Start,
            banner: banner.into(),
            sliders: Vec::new(),
            targets: Vec::new(),
            score: Score::default(),
            remaining_play: Duration::ZERO,
            remaining_settings: Duration::ZERO,
            session_duration: Duration::ZERO,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Dimensions of the play field.
    pub field: FieldPresentation,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        field: FieldPresentation,
        scene: Scene,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            field,
            scene,
        }
    }
}

/// Rendering backend capable of presenting aim trainer scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the time elapsed since the
    /// backend started, per-frame input captured by the adapter, and may mutate
    /// the scene before it is rendered. Returning [`ControlFlow::Break`] closes
    /// the window after the current frame.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> ControlFlow<()> + 'static;
}

/// Formats a duration as whole seconds, rounding up so a countdown never shows zero early.
#[must_use]
pub fn format_countdown(remaining: Duration) -> String {
    let millis = remaining.as_millis();
    format!("{}", millis.div_ceil(1000))
}

/// Formats click accuracy as a percentage, or `n/a` when nothing was attempted.
#[must_use]
pub fn format_accuracy(score: Score) -> String {
    match score.accuracy() {
        Some(ratio) => format!("{:.2}%", ratio * 100.0),
        None => "n/a".to_owned(),
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Error)]
pub enum RenderingError {
    /// The play field must have a positive finite extent.
    #[error("field size must be positive (received {width} x {height})")]
    InvalidFieldSize {
        /// Provided width that failed validation.
        width: f32,
        /// Provided height that failed validation.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_trainer_core::{FIELD_HEIGHT, FIELD_WIDTH};

    fn field() -> FieldPresentation {
        FieldPresentation::new(FIELD_WIDTH, FIELD_HEIGHT).expect("valid field")
    }

    #[test]
    fn field_creation_rejects_degenerate_sizes_without_panicking() {
        for (width, height) in [(0.0, 800.0), (1400.0, -1.0), (f32::NAN, 800.0)] {
            let error = FieldPresentation::new(width, height)
                .expect_err("degenerate field must be rejected");
            assert!(matches!(error, RenderingError::InvalidFieldSize { .. }));
        }
    }

    #[test]
    fn screen_to_field_flips_vertical_axis() {
        let field = field();
        let window = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);

        assert_eq!(
            field.screen_to_field(Vec2::new(0.0, 0.0), window),
            Vec2::new(0.0, 800.0)
        );
        assert_eq!(
            field.screen_to_field(Vec2::new(700.0, 800.0), window),
            Vec2::new(700.0, 0.0)
        );
    }

    #[test]
    fn screen_to_field_rescales_smaller_windows() {
        let field = field();
        let window = Vec2::new(700.0, 400.0);

        assert_eq!(
            field.screen_to_field(Vec2::new(350.0, 100.0), window),
            Vec2::new(700.0, 600.0)
        );
        assert_eq!(
            field.field_to_screen(Point::new(700.0, 600.0), window),
            Vec2::new(350.0, 100.0)
        );
    }

    #[test]
    fn zero_sized_window_falls_back_to_unit_scale() {
        assert_eq!(field().scale(Vec2::ZERO), Vec2::ONE);
    }

    #[test]
    fn slider_fill_tracks_highlight() {
        let knob = Shape::Rectangle {
            center: Point::new(700.0, 575.0),
            width: 80.0,
            height: 80.0,
        };
        let mut slider =
            SliderPresentation::new(ParameterKind::Size, knob, 55.0, SliderHighlight::Idle);
        assert_eq!(slider.fill(), Color::new(1.0, 0.0, 0.0, 1.0));

        slider.highlight = SliderHighlight::Hovered;
        assert_eq!(slider.fill(), Color::new(1.0, 0.5, 0.5, 1.0));

        slider.highlight = SliderHighlight::Dragged;
        assert_eq!(slider.fill(), Color::new(0.5, 0.0, 0.0, 1.0));
    }

    #[test]
    fn time_slider_caption_is_dark_on_white_knob() {
        let knob = Shape::Rectangle {
            center: Point::new(700.0, 125.0),
            width: 80.0,
            height: 80.0,
        };
        let slider =
            SliderPresentation::new(ParameterKind::Time, knob, 38.0, SliderHighlight::Idle);
        assert_eq!(slider.caption_color(), Color::BLACK);
    }

    #[test]
    fn hovered_target_is_lightened() {
        let shape = Shape::Circle {
            center: Point::new(10.0, 10.0),
            diameter: 20.0,
        };
        let target = TargetPresentation::new(shape, Color::from_rgb_u8(0, 0, 0), true);
        assert_eq!(target.fill(), Color::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn accuracy_is_formatted_as_percentage() {
        assert_eq!(format_accuracy(Score::new(7, 3)), "70.00%");
        assert_eq!(format_accuracy(Score::default()), "n/a");
    }

    #[test]
    fn countdown_rounds_partial_seconds_up() {
        assert_eq!(format_countdown(Duration::from_millis(14_001)), "15");
        assert_eq!(format_countdown(Duration::from_secs(3)), "3");
        assert_eq!(format_countdown(Duration::ZERO), "0");
    }

    #[test]
    fn frame_input_converts_into_session_snapshot() {
        let input = FrameInput {
            keys: KeySet::empty(),
            pointer: Vec2::new(12.0, 34.0),
            pointer_down: true,
        };
        let snapshot = input.to_snapshot();
        assert_eq!(snapshot.pointer, Point::new(12.0, 34.0));
        assert!(snapshot.pointer_down);
    }
}
