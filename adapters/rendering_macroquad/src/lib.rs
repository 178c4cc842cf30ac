#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the aim trainer.
//!
//! The trainer plays no sound, so macroquad is pulled in without its default
//! `audio` feature and the build needs no native audio libraries.
//!
//! The window is sized to the play field. Pointer positions are flipped into
//! the field's y-up convention and rescaled when the window is resized, so the
//! session never sees window coordinates.

use aim_trainer_core::{Key, KeySet, ParameterKind, Point, Screen, Shape};
use aim_trainer_rendering::{
    format_accuracy, format_countdown, Color, FieldPresentation, FrameInput, Presentation,
    RenderingBackend, Scene, SliderPresentation, TargetPresentation,
};
use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, is_mouse_button_down, mouse_position, KeyCode, MouseButton};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

const TITLE_FONT_SIZE: f32 = 48.0;
const BODY_FONT_SIZE: f32 = 28.0;
const CAPTION_FONT_SIZE: f32 = 22.0;
const TRACK_THICKNESS: f32 = 4.0;

/// Mapping from physical keys to the logical keys understood by the session.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyBindings {
    bindings: Vec<(KeyCode, Key)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyCode::S, Key::Begin),
                (KeyCode::G, Key::Confirm),
                (KeyCode::A, Key::Replay),
                (KeyCode::Left, Key::Left),
                (KeyCode::Right, Key::Right),
                (KeyCode::Escape, Key::Escape),
            ],
        }
    }
}

impl KeyBindings {
    /// Bindings with no keys assigned.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Adds a binding; several physical keys may produce the same logical key.
    #[must_use]
    pub fn bind(mut self, code: KeyCode, key: Key) -> Self {
        self.bindings.push((code, key));
        self
    }

    /// Collects the logical keys whose physical key is reported as held.
    pub fn resolve<F>(&self, mut is_down: F) -> KeySet
    where
        F: FnMut(KeyCode) -> bool,
    {
        self.bindings
            .iter()
            .filter(|(code, _)| is_down(*code))
            .map(|(_, key)| *key)
            .collect()
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    key_bindings: KeyBindings,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Replaces the default key bindings.
    #[must_use]
    pub fn with_key_bindings(mut self, key_bindings: KeyBindings) -> Self {
        self.key_bindings = key_bindings;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> std::ops::ControlFlow<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            key_bindings,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            field,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: field.width().round() as i32,
            window_height: field.height().round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        log::info!(
            "opening {}x{} window",
            config.window_width,
            config.window_height
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let screen_size = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let metrics = SceneMetrics::new(field, screen_size);
                let frame_input = gather_frame_input(&key_bindings, &metrics);
                let now = Duration::from_secs_f64(macroquad::time::get_time().max(0.0));

                let flow = update_scene(now, frame_input, &mut scene);

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_scene(&scene, &metrics);
                let render_duration = render_start.elapsed();

                let frame_dt = Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let fps_metrics = fps_counter.record_frame(frame_dt, render_duration);
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_render,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} (10s avg: {:.2}) | render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                if flow.is_break() {
                    log::info!("closing window");
                    break;
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Window geometry resolved for a single frame.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    field: FieldPresentation,
    screen_size: Vec2,
    scale: Vec2,
}

impl SceneMetrics {
    fn new(field: FieldPresentation, screen_size: Vec2) -> Self {
        Self {
            field,
            screen_size,
            scale: field.scale(screen_size),
        }
    }

    fn to_screen(&self, point: Point) -> Vec2 {
        self.field.field_to_screen(point, self.screen_size)
    }

    fn to_field(&self, position: Vec2) -> Vec2 {
        self.field.screen_to_field(position, self.screen_size)
    }

    /// Uniform factor for lengths that must stay round, such as radii and font sizes.
    fn uniform_scale(&self) -> f32 {
        self.scale.x.min(self.scale.y)
    }

    /// Top-left corner and size of the shape's bounds in window coordinates.
    fn screen_rect(&self, shape: Shape) -> (Vec2, Vec2) {
        let bounds = shape.bounds();
        let top_left = self.to_screen(Point::new(bounds.left, bounds.top));
        let size = Vec2::new(
            (bounds.right - bounds.left) * self.scale.x,
            (bounds.top - bounds.bottom) * self.scale.y,
        );
        (top_left, size)
    }
}

fn gather_frame_input(key_bindings: &KeyBindings, metrics: &SceneMetrics) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    FrameInput {
        keys: key_bindings.resolve(is_key_down),
        pointer: metrics.to_field(Vec2::new(cursor_x, cursor_y)),
        pointer_down: is_mouse_button_down(MouseButton::Left),
    }
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics) {
    match scene.screen {
        Screen::Start => draw_start_screen(scene, metrics),
        Screen::Settings => draw_settings_screen(scene, metrics),
        Screen::Play => draw_play_screen(scene, metrics),
        Screen::Over => draw_over_screen(scene, metrics),
    }
}

fn draw_start_screen(scene: &Scene, metrics: &SceneMetrics) {
    let height = metrics.field.height();
    draw_centered_text(&scene.banner, height * 0.6, TITLE_FONT_SIZE, Color::WHITE, metrics);
    draw_centered_text(
        "Press S to choose your settings",
        height * 0.45,
        BODY_FONT_SIZE,
        Color::WHITE,
        metrics,
    );
    draw_centered_text(
        "Press Escape at any time to quit",
        height * 0.38,
        CAPTION_FONT_SIZE,
        Color::WHITE.darken(0.3),
        metrics,
    );
}

fn draw_settings_screen(scene: &Scene, metrics: &SceneMetrics) {
    let height = metrics.field.height();
    draw_centered_text(
        "Hover a slider, then drag it or hold the arrow keys",
        height * 0.95,
        BODY_FONT_SIZE,
        Color::WHITE,
        metrics,
    );
    let prompt = format!(
        "Press G to start (starting in {} s)",
        format_countdown(scene.remaining_settings)
    );
    draw_centered_text(&prompt, height * 0.9, BODY_FONT_SIZE, Color::WHITE, metrics);

    for slider in &scene.sliders {
        draw_slider(slider, metrics);
    }
}

fn draw_slider(slider: &SliderPresentation, metrics: &SceneMetrics) {
    let center = slider.knob.center();
    let travel = slider.kind.travel_range();
    let start = metrics.to_screen(Point::new(travel.min_x(), center.y));
    let end = metrics.to_screen(Point::new(travel.max_x(), center.y));
    macroquad::shapes::draw_line(
        start.x,
        start.y,
        end.x,
        end.y,
        TRACK_THICKNESS * metrics.uniform_scale(),
        to_macroquad_color(Color::WHITE.darken(0.5)),
    );

    let (top_left, size) = metrics.screen_rect(slider.knob);
    macroquad::shapes::draw_rectangle(
        top_left.x,
        top_left.y,
        size.x,
        size.y,
        to_macroquad_color(slider.fill()),
    );

    let caption_size = CAPTION_FONT_SIZE * metrics.uniform_scale();
    let knob_center = metrics.to_screen(center);
    draw_text_centered_at(
        slider.kind.label(),
        knob_center,
        caption_size,
        slider.caption_color(),
    );

    let value_anchor = metrics.to_screen(Point::new(travel.max_x() + 60.0, center.y));
    draw_text_centered_at(
        &format_parameter(slider.kind, slider.value),
        value_anchor,
        BODY_FONT_SIZE * metrics.uniform_scale(),
        Color::WHITE,
    );
}

fn draw_play_screen(scene: &Scene, metrics: &SceneMetrics) {
    for target in &scene.targets {
        draw_target(target, metrics);
    }

    let height = metrics.field.height();
    let hud = format!(
        "Time left: {} s    Hits: {}",
        format_countdown(scene.remaining_play),
        scene.score.hits()
    );
    draw_centered_text(&hud, height * 0.96, BODY_FONT_SIZE, Color::WHITE, metrics);
}

fn draw_target(target: &TargetPresentation, metrics: &SceneMetrics) {
    let fill = to_macroquad_color(target.fill());
    match target.shape {
        Shape::Circle { center, diameter } => {
            let position = metrics.to_screen(center);
            let radius = diameter * 0.5 * metrics.uniform_scale();
            macroquad::shapes::draw_circle(position.x, position.y, radius, fill);
        }
        Shape::Rectangle { .. } => {
            let (top_left, size) = metrics.screen_rect(target.shape);
            macroquad::shapes::draw_rectangle(top_left.x, top_left.y, size.x, size.y, fill);
        }
    }
}

fn draw_over_screen(scene: &Scene, metrics: &SceneMetrics) {
    let height = metrics.field.height();
    let lines = [
        format!("Time completed: {} s", scene.session_duration.as_secs()),
        format!("Targets clicked: {}", scene.score.hits()),
        format!("Click accuracy: {}", format_accuracy(scene.score)),
    ];

    draw_centered_text("Round over", height * 0.75, TITLE_FONT_SIZE, Color::WHITE, metrics);
    for (index, line) in lines.iter().enumerate() {
        let y = height * (0.6 - 0.08 * index as f32);
        draw_centered_text(line, y, BODY_FONT_SIZE, Color::WHITE, metrics);
    }
    draw_centered_text(
        "Press A to play again",
        height * 0.25,
        BODY_FONT_SIZE,
        Color::WHITE,
        metrics,
    );
}

/// Draws text horizontally centred on the field at the provided field height.
fn draw_centered_text(
    text: &str,
    field_y: f32,
    font_size: f32,
    color: Color,
    metrics: &SceneMetrics,
) {
    let anchor = metrics.to_screen(Point::new(metrics.field.width() * 0.5, field_y));
    draw_text_centered_at(text, anchor, font_size * metrics.uniform_scale(), color);
}

fn draw_text_centered_at(text: &str, anchor: Vec2, font_size: f32, color: Color) {
    let font_size = font_size.max(1.0);
    let dimensions = macroquad::text::measure_text(text, None, font_size.round() as u16, 1.0);
    let x = anchor.x - dimensions.width * 0.5;
    let y = anchor.y + dimensions.offset_y * 0.5;
    let _ = macroquad::text::draw_text(text, x, y, font_size, to_macroquad_color(color));
}

/// Formats a slider value the way the session interprets it.
fn format_parameter(kind: ParameterKind, value: f32) -> String {
    match kind {
        ParameterKind::Size => format!("{value:.0}"),
        ParameterKind::Speed => format!("{value:.1} s"),
        ParameterKind::Count => format!("{}", value.max(0.0) as usize),
        ParameterKind::Time => format!("{} s", value.max(0.0) as u64),
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_trainer_core::{FIELD_HEIGHT, FIELD_WIDTH};

    fn metrics(width: f32, height: f32) -> SceneMetrics {
        let field = FieldPresentation::new(FIELD_WIDTH, FIELD_HEIGHT).expect("valid field");
        SceneMetrics::new(field, Vec2::new(width, height))
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        let render = Duration::from_millis(2);

        assert!(counter.record_frame(frame, render).is_none());
        assert!(counter.record_frame(frame, render).is_none());
        assert!(counter.record_frame(frame, render).is_none());
        let metrics = counter
            .record_frame(frame, render)
            .expect("one second elapsed");

        assert!((metrics.per_second - 4.0).abs() < 1e-4);
        assert!((metrics.trailing_ten_seconds - 4.0).abs() < 1e-4);
        assert_eq!(metrics.avg_render, render);
        assert!(counter.record_frame(frame, render).is_none());
    }

    #[test]
    fn fps_counter_trims_trailing_window_to_ten_seconds() {
        let mut counter = FpsCounter::default();
        for _ in 0..30 {
            let _ = counter.record_frame(Duration::from_millis(500), Duration::ZERO);
        }
        assert!(counter.window_duration <= Duration::from_secs(10));
        assert_eq!(counter.frame_times.len(), 20);
    }

    #[test]
    fn knob_rect_is_placed_top_left_in_window_space() {
        let metrics = metrics(FIELD_WIDTH, FIELD_HEIGHT);
        let knob = Shape::Rectangle {
            center: Point::new(700.0, 575.0),
            width: 80.0,
            height: 80.0,
        };

        let (top_left, size) = metrics.screen_rect(knob);
        assert_eq!(top_left, Vec2::new(660.0, 185.0));
        assert_eq!(size, Vec2::new(80.0, 80.0));
    }

    #[test]
    fn pointer_round_trips_through_window_space() {
        let metrics = metrics(700.0, 400.0);
        let field_point = Point::new(315.0, 125.0);
        let screen = metrics.to_screen(field_point);
        assert_eq!(metrics.to_field(screen), Vec2::new(315.0, 125.0));
        assert_eq!(metrics.uniform_scale(), 0.5);
    }

    #[test]
    fn parameters_are_formatted_as_interpreted() {
        assert_eq!(format_parameter(ParameterKind::Size, 55.0), "55");
        assert_eq!(format_parameter(ParameterKind::Speed, 3.0), "3.0 s");
        assert_eq!(format_parameter(ParameterKind::Count, 3.5), "3");
        assert_eq!(format_parameter(ParameterKind::Time, 38.9), "38 s");
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let backend = MacroquadBackend::new().with_key_bindings(KeyBindings::empty());
        assert_eq!(backend.key_bindings, KeyBindings::empty());
        assert_eq!(MacroquadBackend::new().with_vsync(false).swap_interval, Some(0));
    }

    #[test]
    fn default_bindings_cover_every_logical_key() {
        let bindings = KeyBindings::default();
        let keys = bindings.resolve(|_| true);
        for key in Key::ALL {
            assert!(keys.contains(key), "{key:?} is unbound");
        }
    }
}
