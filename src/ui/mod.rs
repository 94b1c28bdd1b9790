/// Viewport rendering module
///
/// This module turns the loaded star list into pixels:
/// - `camera.rs` - orbit camera and 3D-to-screen projection
/// - `viewport.rs` - canvas program that draws points and labels

pub mod camera;
pub mod viewport;
