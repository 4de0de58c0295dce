use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::motion::PrimitiveKind;

pub const CUBE_EDGE: f32 = 0.5;
pub const SPHERE_RADIUS: f32 = 0.3;
const SPHERE_RINGS: usize = 8;
const SPHERE_SEGMENTS: usize = 12;

/// Line-list mesh in model space.
#[derive(Clone, Debug, PartialEq)]
pub struct Wireframe {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<[usize; 2]>,
}

impl Wireframe {
    pub fn for_kind(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Cube => Self::cube(CUBE_EDGE),
            PrimitiveKind::Sphere => Self::sphere(SPHERE_RADIUS, SPHERE_RINGS, SPHERE_SEGMENTS),
        }
    }

    pub fn cube(edge: f32) -> Self {
        let half = edge / 2.0;
        let vertices: Vec<Vec3> = (0..8u8)
            .map(|corner| {
                let pick = |bit: u8| if corner & bit == 0 { -half } else { half };
                Vec3::new(pick(1), pick(2), pick(4))
            })
            .collect();

        // Corners one bit apart share an edge.
        let mut edges = Vec::with_capacity(12);
        for a in 0..8usize {
            for b in (a + 1)..8 {
                if (a ^ b).count_ones() == 1 {
                    edges.push([a, b]);
                }
            }
        }

        Self { vertices, edges }
    }

    /// Latitude/longitude sphere. Pole rows are kept as repeated vertices so the
    /// indexing stays a plain grid.
    pub fn sphere(radius: f32, rings: usize, segments: usize) -> Self {
        let mut vertices = Vec::with_capacity((rings + 1) * segments);
        for ring in 0..=rings {
            let theta = PI * ring as f32 / rings as f32;
            for segment in 0..segments {
                let phi = TAU * segment as f32 / segments as f32;
                vertices.push(Vec3::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.cos(),
                    radius * theta.sin() * phi.sin(),
                ));
            }
        }

        let index = |ring: usize, segment: usize| ring * segments + segment % segments;
        let mut edges = Vec::new();
        for ring in 1..rings {
            for segment in 0..segments {
                edges.push([index(ring, segment), index(ring, segment + 1)]);
            }
        }
        for ring in 0..rings {
            for segment in 0..segments {
                edges.push([index(ring, segment), index(ring + 1, segment)]);
            }
        }

        Self { vertices, edges }
    }
}
