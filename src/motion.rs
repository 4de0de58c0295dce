use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wave {
    Sin,
    Cos,
}

impl Wave {
    fn eval(self, radians: f64) -> f64 {
        match self {
            Self::Sin => radians.sin(),
            Self::Cos => radians.cos(),
        }
    }
}

/// Fixed motion constants for one primitive kind.
///
/// Cubes and spheres use phase-shifted waves so the two kinds never move in
/// lockstep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionProfile {
    pub rotation_step: f32,
    pub default_speed: f32,
    pub vertical_amplitude: f64,
    pub vertical_frequency: f64,
    pub vertical_wave: Wave,
    pub horizontal_amplitude: f64,
    pub horizontal_frequency: f64,
    pub horizontal_wave: Wave,
}

pub const CUBE_PROFILE: MotionProfile = MotionProfile {
    rotation_step: 0.01,
    default_speed: 0.5,
    vertical_amplitude: 0.5,
    vertical_frequency: 0.001,
    vertical_wave: Wave::Sin,
    horizontal_amplitude: 0.3,
    horizontal_frequency: 0.001,
    horizontal_wave: Wave::Cos,
};

pub const SPHERE_PROFILE: MotionProfile = MotionProfile {
    rotation_step: 0.005,
    default_speed: 0.3,
    vertical_amplitude: 0.4,
    vertical_frequency: 0.001,
    vertical_wave: Wave::Cos,
    horizontal_amplitude: 0.2,
    horizontal_frequency: 0.0015,
    horizontal_wave: Wave::Sin,
};

impl PrimitiveKind {
    pub fn profile(self) -> &'static MotionProfile {
        match self {
            Self::Cube => &CUBE_PROFILE,
            Self::Sphere => &SPHERE_PROFILE,
        }
    }

    /// Unit rotation axes advanced each frame: cubes spin on X and Y, spheres
    /// on X and Z.
    fn spin_axes(self) -> Vec3 {
        match self {
            Self::Cube => Vec3::new(1.0, 1.0, 0.0),
            Self::Sphere => Vec3::new(1.0, 0.0, 1.0),
        }
    }
}

impl MotionProfile {
    pub fn vertical_offset(&self, scroll_offset: f64) -> f64 {
        self.vertical_amplitude * self.vertical_wave.eval(scroll_offset * self.vertical_frequency)
    }

    pub fn horizontal_offset(&self, scroll_offset: f64) -> f64 {
        self.horizontal_amplitude
            * self
                .horizontal_wave
                .eval(scroll_offset * self.horizontal_frequency)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedPrimitive {
    kind: PrimitiveKind,
    base_position: Vec3,
    speed: f32,
    rotation: Vec3,
}

impl AnimatedPrimitive {
    pub fn new(kind: PrimitiveKind, base_position: Vec3, speed: f32) -> Self {
        Self {
            kind,
            base_position,
            speed,
            rotation: Vec3::ZERO,
        }
    }

    pub fn with_default_speed(kind: PrimitiveKind, base_position: Vec3) -> Self {
        Self::new(kind, base_position, kind.profile().default_speed)
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Advances the rotation accumulators by one display frame.
    pub fn advance_frame(&mut self) {
        self.rotation += self.kind.spin_axes() * (self.kind.profile().rotation_step * self.speed);
    }

    /// Position for the given scroll offset. Independent of the rotation state.
    pub fn position_at(&self, scroll_offset: f64) -> Vec3 {
        let profile = self.kind.profile();
        Vec3::new(
            (f64::from(self.base_position.x) + profile.horizontal_offset(scroll_offset)) as f32,
            (f64::from(self.base_position.y) + profile.vertical_offset(scroll_offset)) as f32,
            self.base_position.z,
        )
    }

    pub fn pose(&self, scroll_offset: f64) -> Pose {
        Pose {
            position: self.position_at(scroll_offset),
            rotation: self.rotation,
        }
    }

    /// One frame: spin, then place.
    pub fn update(&mut self, scroll_offset: f64) -> Pose {
        self.advance_frame();
        self.pose(scroll_offset)
    }
}
