//! Fixed decoration field around the runway: static blocks, road strips,
//! hills, and water patches. Generated once at startup from the world seed.
//! Decorations are scenery only and never take part in collision.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Cell pitch of the decoration field (matches the city grid).
const DECOR_PITCH: f32 = 30.0;
/// Half-width of the decoration field in cells (covers -10..=10).
const DECOR_HALF_CELLS: i32 = 10;

/// What a decoration looks like. Water is drawn in the transparent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorKind {
    /// A low static block near the runway.
    Block,
    /// A dark road strip lying on the ground.
    Road,
    /// A grassy hill (sphere half-sunk into the ground).
    Hill,
    /// A translucent water patch.
    Water,
}

/// One piece of scenery: shape is implied by kind, placement by the fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub kind: DecorKind,
    pub position: Vec3,
    pub scale: Vec3,
    pub color: [f32; 4],
}

impl Decoration {
    /// Whether this decoration needs alpha blending.
    pub fn is_translucent(&self) -> bool {
        self.kind == DecorKind::Water
    }
}

/// Whether a decoration cell lies inside the reserved runway rectangle
/// (x within ±5, z within ±50 world units).
fn in_runway_rect(x: f32, z: f32) -> bool {
    (-5.0..=5.0).contains(&x) && (-50.0..=50.0).contains(&z)
}

/// Populate the fixed environment around the origin. Pure function of the
/// seed: the same seed always yields the same field.
pub fn populate_environment(seed: u64) -> Vec<Decoration> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();

    // Blocks and roads: one per cell, skipping the runway rectangle.
    for i in -DECOR_HALF_CELLS..=DECOR_HALF_CELLS {
        for j in -DECOR_HALF_CELLS..=DECOR_HALF_CELLS {
            let x = i as f32 * DECOR_PITCH;
            let z = j as f32 * DECOR_PITCH;
            if in_runway_rect(x, z) {
                continue;
            }
            if rng.gen::<f32>() < 0.5 {
                let height = rng.gen::<f32>() * 45.0 + 5.0;
                out.push(Decoration {
                    kind: DecorKind::Block,
                    position: Vec3::new(x, height / 2.0, z),
                    scale: Vec3::new(8.0, height, 8.0),
                    color: [rng.gen(), rng.gen(), rng.gen(), 1.0],
                });
            } else {
                out.push(Decoration {
                    kind: DecorKind::Road,
                    position: Vec3::new(x, 0.1, z),
                    scale: Vec3::new(10.0, 0.1, 60.0),
                    color: [0.2, 0.2, 0.2, 1.0],
                });
            }
        }
    }

    // Hills: sparse, half-sunk spheres.
    for i in -DECOR_HALF_CELLS..=DECOR_HALF_CELLS {
        for j in -DECOR_HALF_CELLS..=DECOR_HALF_CELLS {
            if rng.gen::<f32>() < 0.1 {
                out.push(Decoration {
                    kind: DecorKind::Hill,
                    position: Vec3::new(i as f32 * DECOR_PITCH, 5.0, j as f32 * DECOR_PITCH),
                    scale: Vec3::splat(10.0),
                    color: [0.13, 0.55, 0.13, 1.0],
                });
            }
        }
    }

    // Water patches: rarer still, translucent.
    for i in -DECOR_HALF_CELLS..=DECOR_HALF_CELLS {
        for j in -DECOR_HALF_CELLS..=DECOR_HALF_CELLS {
            if rng.gen::<f32>() < 0.05 {
                out.push(Decoration {
                    kind: DecorKind::Water,
                    position: Vec3::new(i as f32 * DECOR_PITCH, 0.1, j as f32 * DECOR_PITCH),
                    scale: Vec3::new(20.0, 0.05, 20.0),
                    color: [0.0, 0.0, 1.0, 0.5],
                });
            }
        }
    }

    log::debug!("populated {} decorations (seed {})", out.len(), seed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_seed() {
        assert_eq!(populate_environment(77), populate_environment(77));
    }

    #[test]
    fn different_seed_differs() {
        assert_ne!(populate_environment(1), populate_environment(2));
    }

    #[test]
    fn blocks_and_roads_avoid_runway_rect() {
        for d in populate_environment(5) {
            if matches!(d.kind, DecorKind::Block | DecorKind::Road) {
                assert!(
                    !in_runway_rect(d.position.x, d.position.z),
                    "{:?} at {:?} overlaps the runway rectangle",
                    d.kind,
                    d.position
                );
            }
        }
    }

    #[test]
    fn block_heights_in_range() {
        for d in populate_environment(11) {
            if d.kind == DecorKind::Block {
                assert!(d.scale.y >= 5.0 && d.scale.y <= 50.0);
            }
        }
    }

    #[test]
    fn only_water_is_translucent() {
        for d in populate_environment(13) {
            assert_eq!(d.is_translucent(), d.kind == DecorKind::Water);
        }
    }
}
