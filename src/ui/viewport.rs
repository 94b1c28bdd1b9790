use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use cgmath::{Point3, Vector2};

use crate::classify;
use crate::state::settings::ViewSettings;
use crate::state::star::Star;
use crate::ui::camera::OrbitCamera;
use crate::Message;

/// Background fill behind the star field
const BACKGROUND: Color = Color::from_rgb(0.02, 0.03, 0.06);

const LABEL_SIZE: f32 = 12.0;

/// 3D star field renderer with orbit/zoom interaction
///
/// Each draw starts from a blank frame and rebuilds every primitive from the
/// display list - the previous frame is replaced wholesale, never patched.
/// Distances are measured from the live camera eye, so point sizes and label
/// visibility react to navigation; the owning view clears the cache whenever
/// the camera or the catalog changes.
pub struct Viewport<'a> {
    stars: &'a [Star],
    camera: &'a OrbitCamera,
    settings: &'a ViewSettings,
    cache: &'a canvas::Cache,
}

impl<'a> Viewport<'a> {
    pub fn new(
        stars: &'a [Star],
        camera: &'a OrbitCamera,
        settings: &'a ViewSettings,
        cache: &'a canvas::Cache,
    ) -> Self {
        Self {
            stars,
            camera,
            settings,
            cache,
        }
    }

    fn draw_star(&self, frame: &mut canvas::Frame, star: &Star) {
        let world = Point3::new(star.x as f32, star.y as f32, star.z as f32);
        let distance = f64::from(self.camera.distance_to(world));

        let Some(screen) = self.camera.project(world, frame.size()) else {
            return;
        };

        let (r, g, b) = classify::class_color(star.spectral_class());
        let color = Color::from_rgb8(r, g, b);
        let size = classify::render_size(
            star.luminosity,
            star.radius,
            distance,
            self.settings.max_render_distance,
        ) as f32;

        frame.fill(&Path::circle(screen, size), color);

        if classify::label_visible(distance, self.settings.label_distance) {
            let font = if distance <= self.settings.bold_label_distance {
                iced::Font {
                    weight: iced::font::Weight::Bold,
                    ..iced::Font::DEFAULT
                }
            } else {
                iced::Font::DEFAULT
            };

            frame.fill_text(canvas::Text {
                content: star.display_name().to_string(),
                position: Point::new(screen.x + size + 4.0, screen.y - LABEL_SIZE * 0.5),
                color,
                size: LABEL_SIZE.into(),
                font,
                ..canvas::Text::default()
            });
        }
    }
}

impl Program<Message> for Viewport<'_> {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, frame.size(), BACKGROUND);

            for star in self.stars {
                self.draw_star(frame, star);
            }
        });

        vec![geometry]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        _bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Mouse wheel zooms toward the target
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let zoom_delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y * 0.5,
                    mouse::ScrollDelta::Pixels { y, .. } => y * 0.01,
                };
                return (canvas::event::Status::Captured, Some(Message::Zoom(zoom_delta)));
            }

            // Mouse button press - start orbiting
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position() {
                    state.is_dragging = true;
                    state.last_position = Some(pos);
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Mouse button release - stop orbiting
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.is_dragging = false;
                state.last_position = None;
                return (canvas::event::Status::Captured, None);
            }

            // Mouse move - orbit if dragging
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    if let Some(current_pos) = cursor.position() {
                        if let Some(last_pos) = state.last_position {
                            // Screen-space drag becomes yaw/pitch in radians
                            let delta = Vector2::new(
                                (current_pos.x - last_pos.x) * 0.008,
                                (current_pos.y - last_pos.y) * 0.008,
                            );

                            state.last_position = Some(current_pos);
                            return (canvas::event::Status::Captured, Some(Message::Orbit(delta)));
                        }
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub last_position: Option<Point>,
}
