use glam::{Mat4, Vec3};

pub const DIFFUSE_MAP: &str = "resources/textures/container2.png";
pub const SPECULAR_MAP: &str = "resources/textures/container2_specular.png";

pub const ORBIT_RADIUS: f32 = 4.0;
pub const ORBIT_HEIGHT: f32 = 4.0;

/// Shininess exponent shared by every model material.
pub const SHININESS: f32 = 64.0;

/// Fixed positions of the four light-marker cubes.
pub const LIGHT_MARKERS: [Vec3; 4] = [
    Vec3::new(-1.9, 0.25, 0.9),
    Vec3::new(1.9, 0.25, -0.9),
    Vec3::new(-1.9, 0.25, -0.9),
    Vec3::new(1.9, 0.25, 0.9),
];
pub const MARKER_SCALE: f32 = 0.2;

/// Models loaded at startup, one per OBJ file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelId {
    Terrain,
    LakersLogo,
    BullsLogo,
    Jordan,
    Kobe,
    Ball,
    PulseBall,
}

impl ModelId {
    pub const ALL: [Self; 7] = [
        Self::Terrain,
        Self::LakersLogo,
        Self::BullsLogo,
        Self::Jordan,
        Self::Kobe,
        Self::Ball,
        Self::PulseBall,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Terrain => "resources/objects/kocka/teren2.obj",
            Self::LakersLogo => "resources/objects/kocka/lakersLogo.obj",
            Self::BullsLogo => "resources/objects/kocka/bullsLogo.obj",
            Self::Jordan => "resources/objects/kocka/jordan.obj",
            Self::Kobe => "resources/objects/kocka/kobe.obj",
            Self::Ball => "resources/objects/ball/ball3.obj",
            Self::PulseBall => "resources/objects/ball/ball.obj",
        }
    }
}

/// Rotation part of an object transform. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    None,
    Fixed { angle: f32, axis: Vec3 },
    /// Angle grows as `time * rate`.
    Spin { rate: f32, axis: Vec3 },
}

impl Rotation {
    pub fn matrix_at(&self, time: f32) -> Mat4 {
        match *self {
            Self::None => Mat4::IDENTITY,
            Self::Fixed { angle, axis } => Mat4::from_axis_angle(axis.normalize(), angle),
            Self::Spin { rate, axis } => Mat4::from_axis_angle(axis.normalize(), time * rate),
        }
    }
}

/// Scale part of an object transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Fixed(Vec3),
    /// Uniform `sin(time) / divisor`; zero or negative while `sin(time) <= 0`.
    Pulse { divisor: f32 },
}

impl Scale {
    pub fn at(&self, time: f32) -> Vec3 {
        match *self {
            Self::Fixed(scale) => scale,
            Self::Pulse { divisor } => Vec3::splat(time.sin() / divisor),
        }
    }
}

/// A model instance with its animated transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub model: ModelId,
    pub translation: Vec3,
    pub rotation: Rotation,
    pub scale: Scale,
}

impl SceneObject {
    /// `translate * rotate * scale`, evaluated at `time` seconds.
    pub fn model_matrix(&self, time: f32) -> Mat4 {
        Mat4::from_translation(self.translation)
            * self.rotation.matrix_at(time)
            * Mat4::from_scale(self.scale.at(time))
    }
}

const PULSE_ROTATION: Rotation = Rotation::Spin {
    rate: 2.0,
    axis: Vec3::ONE,
};
const PULSE_SCALE: Scale = Scale::Pulse { divisor: 3.0 };

/// Every model instance, in draw order.
pub const SCENE: [SceneObject; 10] = [
    SceneObject {
        name: "terrain",
        model: ModelId::Terrain,
        translation: Vec3::ZERO,
        rotation: Rotation::None,
        scale: Scale::Fixed(Vec3::ONE),
    },
    SceneObject {
        name: "lakers-logo",
        model: ModelId::LakersLogo,
        translation: Vec3::new(1.0, 0.09, 0.0),
        rotation: Rotation::Spin {
            rate: 1.0,
            axis: Vec3::Y,
        },
        scale: Scale::Fixed(Vec3::splat(0.2)),
    },
    SceneObject {
        name: "bulls-logo",
        model: ModelId::BullsLogo,
        translation: Vec3::new(-1.0, 0.09, 0.0),
        rotation: Rotation::Spin {
            rate: 1.0,
            axis: Vec3::Y,
        },
        scale: Scale::Fixed(Vec3::splat(0.2)),
    },
    SceneObject {
        name: "jordan",
        model: ModelId::Jordan,
        translation: Vec3::new(-2.2, 0.6, -0.1),
        rotation: Rotation::Fixed {
            angle: 0.0,
            axis: Vec3::Y,
        },
        scale: Scale::Fixed(Vec3::splat(0.3)),
    },
    SceneObject {
        name: "kobe",
        model: ModelId::Kobe,
        translation: Vec3::new(2.2, 0.6, 0.1),
        rotation: Rotation::Fixed {
            angle: 135.08,
            axis: Vec3::Y,
        },
        scale: Scale::Fixed(Vec3::splat(0.3)),
    },
    SceneObject {
        name: "ball",
        model: ModelId::Ball,
        translation: Vec3::new(0.0, 0.6, 0.1),
        rotation: Rotation::Spin {
            rate: 1.0 / 15.0,
            axis: Vec3::ONE,
        },
        scale: Scale::Fixed(Vec3::splat(4.0)),
    },
    SceneObject {
        name: "pulse-ball-0",
        model: ModelId::PulseBall,
        translation: Vec3::new(0.0, 2.0, -0.5),
        rotation: PULSE_ROTATION,
        scale: PULSE_SCALE,
    },
    SceneObject {
        name: "pulse-ball-1",
        model: ModelId::PulseBall,
        translation: Vec3::new(-0.5, 2.0, 0.0),
        rotation: PULSE_ROTATION,
        scale: PULSE_SCALE,
    },
    SceneObject {
        name: "pulse-ball-2",
        model: ModelId::PulseBall,
        translation: Vec3::new(0.0, 2.0, 0.5),
        rotation: PULSE_ROTATION,
        scale: PULSE_SCALE,
    },
    SceneObject {
        name: "pulse-ball-3",
        model: ModelId::PulseBall,
        translation: Vec3::new(0.5, 2.0, 0.0),
        rotation: PULSE_ROTATION,
        scale: PULSE_SCALE,
    },
];

/// Point light consumed by the model lighting shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            ambient: Vec3::new(0.6, 0.6, 0.3),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::ONE,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl PointLight {
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Light position on its orbit after `time` seconds.
pub fn orbit_position(time: f32) -> Vec3 {
    Vec3::new(
        ORBIT_RADIUS * time.cos(),
        ORBIT_HEIGHT,
        ORBIT_RADIUS * time.sin(),
    )
}

/// One model draw for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub model: ModelId,
    pub transform: Mat4,
}

pub fn draw_list(time: f32) -> Vec<DrawItem> {
    SCENE
        .iter()
        .map(|object| DrawItem {
            model: object.model,
            transform: object.model_matrix(time),
        })
        .collect()
}

pub fn marker_transforms() -> [Mat4; 4] {
    LIGHT_MARKERS.map(|position| {
        Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(MARKER_SCALE))
    })
}
