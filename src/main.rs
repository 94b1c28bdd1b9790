use cgmath::Vector2;
use chrono::Local;
use iced::widget::{button, canvas, column, container, row, text};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

// Declare the modules
mod classify;
mod state;
mod ui;

use state::repository::StarRepository;
use state::settings::ViewSettings;
use state::star::{Star, StarCatalog};
use ui::camera::OrbitCamera;
use ui::viewport::Viewport;

/// Main application state
struct StarAtlas {
    /// Everything the last database load produced
    catalog: StarCatalog,
    /// Stars the viewport draws: singles plus one point per multi-star system
    display: Vec<Star>,
    /// Orbit camera driving the 3D projection
    camera: OrbitCamera,
    /// Persisted viewer settings (render/label distances)
    settings: ViewSettings,
    /// Cached star field geometry, cleared on camera or catalog changes
    cache: canvas::Cache,
    /// Status message to display to the user
    status: String,
    /// True while a database load is in flight
    loading: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Open Database" button
    OpenDatabase,
    /// Background load finished (catalog or user-facing error text)
    DatabaseLoaded(Result<StarCatalog, String>),
    /// Mouse wheel over the viewport
    Zoom(f32),
    /// Mouse drag over the viewport (yaw/pitch deltas in radians)
    Orbit(Vector2<f32>),
}

impl StarAtlas {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = ViewSettings::load();
        // Keep the on-disk file in sync so users can hand-tune it
        settings.save();

        println!(
            "🌌 Star Atlas initialized (render {} ly, labels {} ly)",
            settings.max_render_distance, settings.label_distance
        );

        (
            StarAtlas {
                catalog: StarCatalog::default(),
                display: Vec::new(),
                camera: OrbitCamera::default(),
                settings,
                cache: canvas::Cache::default(),
                status: String::from("Open a star database to begin."),
                loading: false,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenDatabase => {
                // One load at a time; in-flight loads are not cancellable
                if self.loading {
                    return Task::none();
                }

                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Star Database")
                    .add_filter("SQLite database", &["db", "sqlite", "sqlite3"])
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Loading {}...", path.display());
                    self.loading = true;

                    return Task::perform(
                        load_catalog_async(path),
                        Message::DatabaseLoaded,
                    );
                }

                Task::none()
            }
            Message::DatabaseLoaded(Ok(catalog)) => {
                self.loading = false;
                self.display = catalog.display_list();
                self.catalog = catalog;

                // New catalog replaces everything; start from the home view
                self.camera.reset();
                self.cache.clear();

                let sector = if self.catalog.sector_name.is_empty() {
                    String::new()
                } else {
                    format!(", sector {}", self.catalog.sector_name)
                };
                self.status = format!(
                    "✅ Loaded {} stars, showing {} systems{} at {}",
                    self.catalog.star_count,
                    self.display.len(),
                    sector,
                    Local::now().format("%H:%M:%S"),
                );

                println!(
                    "📊 Catalog loaded: {} stars, {} multi-star systems",
                    self.catalog.star_count,
                    self.catalog.largest.len()
                );

                Task::none()
            }
            Message::DatabaseLoaded(Err(error)) => {
                self.loading = false;
                self.status = format!("⚠️  {}", error);
                eprintln!("⚠️  Database load failed: {}", error);
                Task::none()
            }
            Message::Zoom(delta) => {
                self.camera.zoom(delta);
                self.cache.clear();
                Task::none()
            }
            Message::Orbit(delta) => {
                self.camera.orbit(delta.x, delta.y);
                self.cache.clear();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toolbar = row![
            button("Open Database").on_press(Message::OpenDatabase).padding(8),
            text(&self.status).size(14),
        ]
        .spacing(16)
        .padding(10)
        .align_y(Alignment::Center);

        let viewport = canvas(Viewport::new(
            &self.display,
            &self.camera,
            &self.settings,
            &self.cache,
        ))
        .width(Length::Fill)
        .height(Length::Fill);

        let content = column![toolbar, viewport];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application(
        "Star Atlas",
        StarAtlas::update,
        StarAtlas::view,
    )
    .theme(StarAtlas::theme)
    .centered()
    .run_with(StarAtlas::new)
}

/// Load a full star catalog from a database file.
/// Runs in a background thread to avoid blocking the UI.
///
/// Opens its own repository because `rusqlite::Connection` is not `Send`;
/// the connection lives exactly as long as this load and is released on
/// every exit path, including errors.
async fn load_catalog_async(path: PathBuf) -> Result<StarCatalog, String> {
    tokio::task::spawn_blocking(move || {
        let mut repository = StarRepository::new();
        repository.open(&path).map_err(|e| e.to_string())?;

        let stars = repository.read_all_stars().map_err(|e| e.to_string())?;
        let largest = repository.largest_per_system().map_err(|e| e.to_string())?;
        let star_count = repository.count_stars().map_err(|e| e.to_string())?;
        let sector_name = repository.sector_name().map_err(|e| e.to_string())?;

        println!("⭐ Read {} stars from {}", stars.len(), path.display());

        Ok(StarCatalog {
            stars,
            largest,
            star_count,
            sector_name,
        })
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}
