/// Orbit camera for the 3D star viewport
///
/// The camera circles a target point at a given radius; mouse drag changes
/// yaw/pitch and the wheel changes the radius. `project` maps a world-space
/// position (light-years) to a screen point through a standard
/// perspective * look-at transform.
use cgmath::{perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};
use iced::{Point, Size};

/// Vertical field of view
const FOV_Y: Deg<f32> = Deg(60.0);
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1_000.0;

/// Pitch is clamped just short of the poles to keep look_at well-defined
const MAX_PITCH: f32 = 1.54;

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 400.0;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Point the camera looks at and orbits around
    pub target: Point3<f32>,
    /// Rotation around the vertical axis, radians
    pub yaw: f32,
    /// Elevation above the horizontal plane, radians
    pub pitch: f32,
    /// Distance from the target, light-years
    pub radius: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            yaw: -0.8,
            pitch: 0.35,
            radius: 60.0,
        }
    }
}

impl OrbitCamera {
    /// Camera eye position in world space
    pub fn position(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let direction = Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw);
        self.target + direction * self.radius
    }

    /// Rotate around the target. Deltas are in radians.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move toward (positive delta) or away from the target
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius * (1.0 - delta * 0.1)).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    /// Reset orientation and distance, keeping the default origin target
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Distance from the camera eye to a world-space point
    pub fn distance_to(&self, world: Point3<f32>) -> f32 {
        (world - self.position()).magnitude()
    }

    /// Project a world-space point into viewport pixel coordinates.
    /// Returns None for points behind the camera.
    pub fn project(&self, world: Point3<f32>, viewport: Size) -> Option<Point> {
        let aspect = viewport.width / viewport.height.max(1.0);
        let view = Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y());
        let projection = perspective(FOV_Y, aspect, NEAR_PLANE, FAR_PLANE);

        let clip = projection * view * world.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;

        Some(Point::new(
            (ndc_x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc_y) * 0.5 * viewport.height,
        ))
    }
}
