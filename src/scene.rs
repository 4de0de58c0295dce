use std::fmt;

use glam::{EulerRot, Mat4, Vec2, Vec3};

use crate::geometry::Wireframe;
use crate::motion::{AnimatedPrimitive, Pose, PrimitiveKind};
use crate::telemetry::{log_event, LogLevel};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimitiveSpec {
    pub kind: PrimitiveKind,
    pub base_position: Vec3,
    pub speed: f32,
}

const fn cube(x: f32, y: f32, z: f32, speed: f32) -> PrimitiveSpec {
    PrimitiveSpec {
        kind: PrimitiveKind::Cube,
        base_position: Vec3::new(x, y, z),
        speed,
    }
}

const fn sphere(x: f32, y: f32, z: f32, speed: f32) -> PrimitiveSpec {
    PrimitiveSpec {
        kind: PrimitiveKind::Sphere,
        base_position: Vec3::new(x, y, z),
        speed,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub points: &'static [PointLight],
}

impl Lighting {
    /// Brightness of a primitive at `position` as seen from `eye`, clamped to 1.
    pub fn intensity_at(&self, position: Vec3, eye: Vec3) -> f32 {
        let normal = (eye - position).normalize_or_zero();
        let diffuse: f32 = self
            .points
            .iter()
            .map(|light| {
                let to_light = (light.position - position).normalize_or_zero();
                light.intensity * normal.dot(to_light).max(0.0)
            })
            .sum();

        (self.ambient + diffuse).min(1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// View-projection looking straight down -Z from the camera, shifted
    /// sideways by `shift` world units.
    pub fn view_projection(&self, aspect: f32, shift: Vec2) -> Mat4 {
        let eye = self.position + shift.extend(0.0);
        let view = Mat4::look_at_rh(eye, eye + Vec3::NEG_Z, Vec3::Y);
        let projection =
            Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far);
        projection * view
    }
}

const DEFAULT_CAMERA: Camera = Camera {
    position: Vec3::new(0.0, 0.0, 5.0),
    fov_y_degrees: 75.0,
    near: 0.1,
    far: 1000.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: &'static str,
    pub opacity: f32,
}

impl Material {
    pub fn for_kind(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Cube => Self {
                color: "#fae4c5",
                opacity: 0.3,
            },
            PrimitiveKind::Sphere => Self {
                color: "#4f5f6e",
                opacity: 0.25,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub name: &'static str,
    pub roster: &'static [PrimitiveSpec],
    pub lighting: Lighting,
    pub camera: Camera,
    /// World units the camera drifts at the pointer's extreme positions.
    pub parallax: f32,
}

pub static HERO_SCENE: SceneConfig = SceneConfig {
    name: "hero",
    roster: &[
        cube(-2.0, 1.0, -2.0, 0.4),
        cube(2.0, -1.0, -1.0, 0.6),
        cube(0.0, 2.0, -3.0, 0.5),
        sphere(-1.5, -1.5, -2.0, 0.4),
        sphere(1.5, 1.0, -1.5, 0.5),
        sphere(-0.5, -2.0, -2.5, 0.3),
    ],
    lighting: Lighting {
        ambient: 0.5,
        points: &[
            PointLight {
                position: Vec3::new(10.0, 10.0, 10.0),
                intensity: 0.8,
            },
            PointLight {
                position: Vec3::new(-10.0, -10.0, -10.0),
                intensity: 0.3,
            },
        ],
    },
    camera: DEFAULT_CAMERA,
    parallax: 0.15,
};

pub static SECTION_SCENE: SceneConfig = SceneConfig {
    name: "section",
    roster: &[
        cube(-1.5, 0.0, -1.0, 0.5),
        cube(1.5, 0.0, -1.5, 0.4),
        sphere(0.0, 0.0, -2.0, 0.3),
    ],
    lighting: Lighting {
        ambient: 0.4,
        points: &[PointLight {
            position: Vec3::new(5.0, 5.0, 5.0),
            intensity: 0.6,
        }],
    },
    camera: DEFAULT_CAMERA,
    parallax: 0.0,
};

/// Distance from the top of the page to the top of section `index`.
/// Sections without a measurement yet count as zero height.
pub fn section_offset(heights: &[Option<f64>], index: usize) -> f64 {
    heights
        .iter()
        .take(index)
        .map(|height| height.unwrap_or(0.0))
        .sum()
}

/// How far the reader has scrolled past the top of section `index`.
pub fn relative_scroll_offset(scroll_y: f64, heights: &[Option<f64>], index: usize) -> f64 {
    scroll_y - section_offset(heights, index)
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedPrimitive {
    pub kind: PrimitiveKind,
    pub pose: Pose,
    pub brightness: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub alpha: f32,
    pub segments: Vec<[Vec2; 2]>,
}

/// Everything needed to draw one frame, all taken from one scroll snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub scroll_offset: f64,
    pub primitives: Vec<PlacedPrimitive>,
}

pub struct SceneComposer {
    config: &'static SceneConfig,
    primitives: Vec<AnimatedPrimitive>,
    cube_mesh: Wireframe,
    sphere_mesh: Wireframe,
    frames: u64,
}

impl SceneComposer {
    pub fn new(config: &'static SceneConfig) -> Self {
        let primitives = config
            .roster
            .iter()
            .map(|spec| AnimatedPrimitive::new(spec.kind, spec.base_position, spec.speed))
            .collect();

        Self {
            config,
            primitives,
            cube_mesh: Wireframe::for_kind(PrimitiveKind::Cube),
            sphere_mesh: Wireframe::for_kind(PrimitiveKind::Sphere),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn primitives(&self) -> &[AnimatedPrimitive] {
        &self.primitives
    }

    /// Advances every primitive by one frame against the same scroll offset.
    pub fn advance(&mut self, scroll_offset: f64) -> Frame {
        self.frames += 1;
        let eye = self.config.camera.position;
        let lighting = self.config.lighting;

        let primitives = self
            .primitives
            .iter_mut()
            .map(|primitive| {
                let pose = primitive.update(scroll_offset);
                PlacedPrimitive {
                    kind: primitive.kind(),
                    pose,
                    brightness: lighting.intensity_at(pose.position, eye),
                }
            })
            .collect();

        Frame {
            scroll_offset,
            primitives,
        }
    }

    /// Projects a frame to canvas-space line segments. `pointer` is the
    /// normalized pointer position in [-1, 1] on both axes.
    pub fn strokes(&self, frame: &Frame, viewport: Vec2, pointer: Vec2) -> Vec<Stroke> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return Vec::new();
        }

        let shift = Vec2::new(pointer.x, -pointer.y) * self.config.parallax;
        let view_projection = self.config.camera.view_projection(viewport.x / viewport.y, shift);

        frame
            .primitives
            .iter()
            .map(|placed| {
                let mesh = match placed.kind {
                    PrimitiveKind::Cube => &self.cube_mesh,
                    PrimitiveKind::Sphere => &self.sphere_mesh,
                };
                let material = Material::for_kind(placed.kind);
                let rotation = placed.pose.rotation;
                let model = Mat4::from_translation(placed.pose.position)
                    * Mat4::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
                let transform = view_projection * model;

                let projected: Vec<Option<Vec2>> = mesh
                    .vertices
                    .iter()
                    .map(|vertex| project(transform, *vertex, viewport))
                    .collect();
                let segments = mesh
                    .edges
                    .iter()
                    .filter_map(|[a, b]| Some([projected[*a]?, projected[*b]?]))
                    .collect();

                Stroke {
                    color: material.color,
                    alpha: material.opacity * placed.brightness,
                    segments,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    MissingCanvas,
    ContextUnavailable,
    ContextRejected(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCanvas => f.write_str("canvas element is not mounted"),
            Self::ContextUnavailable => f.write_str("2d context is not available"),
            Self::ContextRejected(reason) => write!(f, "2d context request failed: {reason}"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Hands a scene the surface it draws on.
pub trait SurfaceProvider {
    type Surface;

    fn acquire(self) -> Result<Self::Surface, SceneError>;
}

/// A scene that got its surface and is ready to animate.
pub struct LiveScene<S> {
    pub composer: SceneComposer,
    pub surface: S,
}

/// Starts `config` on the provider's surface. A provider that fails leaves the
/// scene disabled: the failure is logged and `None` comes back, other scenes
/// are unaffected.
pub fn start_scene<P: SurfaceProvider>(
    config: &'static SceneConfig,
    provider: P,
) -> Option<LiveScene<P::Surface>> {
    match provider.acquire() {
        Ok(surface) => Some(LiveScene {
            composer: SceneComposer::new(config),
            surface,
        }),
        Err(error) => {
            log_event(
                LogLevel::Warn,
                "scene_disabled",
                serde_json::json!({ "scene": config.name, "error": error.to_string() }),
            );
            None
        }
    }
}

/// Clip space to canvas pixels, origin top-left. Points behind the camera have
/// no projection.
pub fn project(transform: Mat4, point: Vec3, viewport: Vec2) -> Option<Vec2> {
    let clip = transform * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }

    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    ))
}
