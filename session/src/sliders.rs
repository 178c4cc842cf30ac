//! Draggable sliders bound to gameplay parameters.

use aim_trainer_core::{
    map, Event, InputSnapshot, Key, ParameterKind, Parameters, Point, Shape, SliderHighlight,
    TravelRange, FIELD_HEIGHT,
};

/// Edge length of the square slider knob.
pub const KNOB_SIZE: f32 = 80.0;

/// Vertical position of each slider row, in sixteenths of the field height.
const ROW_SIXTEENTHS: [f32; 4] = [11.5, 8.5, 5.5, 2.5];

/// Horizontal slider whose knob position selects a parameter value.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    kind: ParameterKind,
    knob: Shape,
    travel: TravelRange,
    value: f32,
    highlight: SliderHighlight,
}

impl Slider {
    /// Creates a slider for `kind` with its knob at `position_x` on row `row_y`.
    ///
    /// The position is clamped into the parameter's travel range.
    #[must_use]
    pub fn new(kind: ParameterKind, position_x: f32, row_y: f32) -> Self {
        let travel = kind.travel_range();
        let x = travel.clamp(position_x);
        Self {
            kind,
            knob: Shape::Rectangle {
                center: Point::new(x, row_y),
                width: KNOB_SIZE,
                height: KNOB_SIZE,
            },
            travel,
            value: map(x, kind),
            highlight: SliderHighlight::Idle,
        }
    }

    /// Parameter bound to the slider.
    #[must_use]
    pub const fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Horizontal position of the knob centre.
    #[must_use]
    pub const fn position_x(&self) -> f32 {
        self.knob.center().x
    }

    /// Left end of the travel range.
    #[must_use]
    pub const fn min_x(&self) -> f32 {
        self.travel.min_x()
    }

    /// Right end of the travel range.
    #[must_use]
    pub const fn max_x(&self) -> f32 {
        self.travel.max_x()
    }

    /// Parameter value at the current knob position.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Highlight computed during the most recent frame.
    #[must_use]
    pub const fn highlight(&self) -> SliderHighlight {
        self.highlight
    }

    /// Geometry of the knob.
    #[must_use]
    pub const fn knob(&self) -> Shape {
        self.knob
    }

    /// Moves the knob to `x`, clamped into the travel range, and refreshes the value.
    pub fn set_position_x(&mut self, x: f32) {
        let x = self.travel.clamp(x);
        self.knob = self.knob.with_center_x(x);
        self.value = map(x, self.kind);
    }

    /// Moves the knob horizontally by `dx`.
    pub fn move_by(&mut self, dx: f32) {
        self.set_position_x(self.position_x() + dx);
    }

    /// Reports whether the pointer shares the knob's row.
    ///
    /// Only the vertical extent matters; sliders are stacked rows.
    #[must_use]
    pub fn is_hovered_by(&self, point: Point) -> bool {
        self.knob.spans_row(point.y)
    }

    /// Applies one frame of keyboard and pointer input.
    ///
    /// Returns `true` when the knob moved.
    fn interact(&mut self, input: &InputSnapshot, nudge_step: f32) -> bool {
        if !self.is_hovered_by(input.pointer) {
            self.highlight = SliderHighlight::Idle;
            return false;
        }

        let before = self.position_x();
        if input.keys.contains(Key::Left) {
            self.move_by(-nudge_step);
        }
        if input.keys.contains(Key::Right) {
            self.move_by(nudge_step);
        }

        // Pointer wins over the keyboard for this frame.
        let dragging = input.pointer_down && self.travel.contains(input.pointer.x);
        if dragging {
            self.set_position_x(input.pointer.x);
            self.highlight = SliderHighlight::Dragged;
        } else {
            self.highlight = SliderHighlight::Hovered;
        }

        self.position_x() != before
    }
}

/// The four parameter sliders in top-to-bottom order.
#[derive(Clone, Debug, PartialEq)]
pub struct SliderBank {
    sliders: [Slider; 4],
}

impl SliderBank {
    /// Creates the bank from one knob position per parameter, in [`ParameterKind::ALL`] order.
    #[must_use]
    pub fn new(positions: [f32; 4]) -> Self {
        let sliders = std::array::from_fn(|index| {
            let kind = ParameterKind::ALL[index];
            let row_y = ROW_SIXTEENTHS[index] * FIELD_HEIGHT / 16.0;
            Slider::new(kind, positions[index], row_y)
        });
        Self { sliders }
    }

    /// Iterator over the sliders, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Slider> {
        self.sliders.iter()
    }

    /// Slider bound to the provided parameter.
    #[must_use]
    pub fn get(&self, kind: ParameterKind) -> &Slider {
        &self.sliders[slot(kind)]
    }

    /// Gameplay parameters selected by the current knob positions.
    #[must_use]
    pub fn parameters(&self) -> Parameters {
        Parameters::from_values(
            self.get(ParameterKind::Size).value(),
            self.get(ParameterKind::Speed).value(),
            self.get(ParameterKind::Count).value(),
            self.get(ParameterKind::Time).value(),
        )
    }

    pub(crate) fn interact(
        &mut self,
        input: &InputSnapshot,
        nudge_step: f32,
        out_events: &mut Vec<Event>,
    ) {
        for slider in &mut self.sliders {
            if slider.interact(input, nudge_step) {
                log::trace!(
                    "{} slider moved to {:.1} ({:.2})",
                    slider.kind(),
                    slider.position_x(),
                    slider.value()
                );
                out_events.push(Event::SliderMoved {
                    kind: slider.kind(),
                    position_x: slider.position_x(),
                    value: slider.value(),
                });
            }
        }
    }

    pub(crate) fn reset_highlights(&mut self) {
        for slider in &mut self.sliders {
            slider.highlight = SliderHighlight::Idle;
        }
    }
}

const fn slot(kind: ParameterKind) -> usize {
    match kind {
        ParameterKind::Size => 0,
        ParameterKind::Speed => 1,
        ParameterKind::Count => 2,
        ParameterKind::Time => 3,
    }
}
