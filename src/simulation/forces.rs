//! Force calculation for the particle simulation.
//!
//! Every particle feels the averaged pull of every other particle it is not currently
//! colliding with. Three laws are summed: gravity (~1/r^2, attractive), close charge
//! (~1/r^3, signed) and far charge (~r, attractive). Pairs found overlapping are handed
//! to the collision classifier instead of contributing force.

use ultraviolet::DVec2;

use super::collision;
use crate::config::SimConfig;
use crate::particle::Particle;

/// Acceleration contributions accumulated for one particle over all its neighbors.
#[derive(Clone, Copy, Debug)]
struct Accumulator {
    gravity: DVec2,
    close: DVec2,
    far: DVec2,
    contributors: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            gravity: DVec2::zero(),
            close: DVec2::zero(),
            far: DVec2::zero(),
            contributors: 0,
        }
    }

    /// Averaged velocity change. No contributors means no change.
    fn average(&self) -> DVec2 {
        if self.contributors == 0 {
            return DVec2::zero();
        }
        (self.gravity + self.close + self.far) / self.contributors as f64
    }
}

/// Update velocities of all particles and classify any new contacts.
///
/// Particles are visited in roster order and updated in place, so a bounce applied
/// while visiting one particle is seen by the ones visited after it.
pub fn accelerate(particles: &mut [Particle], config: &SimConfig) {
    let n = particles.len();
    for i in 0..n {
        let mut acc = Accumulator::new();
        for j in 0..n {
            if i == j {
                continue;
            }
            let p = &particles[i];
            let o = &particles[j];
            if p.merging_with.contains(&o.id) {
                continue;
            }

            let d = p.pos - o.pos;
            let r = d.mag();
            let combined = (p.radius() + o.radius()) as f64;

            if p.bouncing_against == Some(o.id) {
                if r > config.bounce_complete_dist_factor * combined {
                    particles[i].bouncing_against = None;
                }
                continue;
            }

            if r < combined {
                collision::classify(particles, i, j, config);
                continue;
            }

            acc.contributors += 1;
            acc.gravity += gravity(d, r, o, config.gravity_strength);
            acc.close += close_charge(d, r, p, o, config.close_charge_strength);
            acc.far += far_charge(d, p, o, config.far_charge_strength);
        }
        particles[i].vel += acc.average();
    }
}

/// Gravity felt by a particle at displacement `d` from `o` (own mass divides out).
fn gravity(d: DVec2, r: f64, o: &Particle, strength: f64) -> DVec2 {
    d * (-strength * o.mass() / r.powi(3))
}

/// Same-sign close charges repel, opposite signs attract.
fn close_charge(d: DVec2, r: f64, p: &Particle, o: &Particle, strength: f64) -> DVec2 {
    d * (strength * p.close_charge() * o.close_charge() / (p.mass() * r.powi(4)))
}

/// Grows linearly with distance; far charges are non-negative so this always attracts.
fn far_charge(d: DVec2, p: &Particle, o: &Particle, strength: f64) -> DVec2 {
    d * (-strength * p.far_charge() * o.far_charge() / p.mass())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(gravity: f64, close: f64, far: f64) -> SimConfig {
        SimConfig {
            gravity_strength: gravity,
            close_charge_strength: close,
            far_charge_strength: far,
            ..SimConfig::default()
        }
    }

    #[test]
    fn gravity_pulls_pair_together_symmetrically() {
        let mut particles = vec![
            Particle::new(100.0, 0.0, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(200.0, 400.0)),
        ];
        accelerate(&mut particles, &only(15.0, 0.0, 0.0));
        // 15 * 100 / 100^2
        assert!((particles[0].vel.x - 0.15).abs() < 1e-12);
        assert!((particles[1].vel.x + 0.15).abs() < 1e-12);
        assert_eq!(particles[0].vel.y, 0.0);
    }

    #[test]
    fn like_close_charges_repel() {
        let mut particles = vec![
            Particle::new(100.0, 0.5, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.5, 0.0, DVec2::new(200.0, 400.0)),
        ];
        accelerate(&mut particles, &only(0.0, 1.0e6, 0.0));
        // 1e6 * 0.25 / (100 * 100^4) * 100
        assert!((particles[0].vel.x + 0.0025).abs() < 1e-12);
        assert!(particles[1].vel.x > 0.0);
    }

    #[test]
    fn opposite_close_charges_attract() {
        let mut particles = vec![
            Particle::new(100.0, 0.5, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, -0.5, 0.0, DVec2::new(200.0, 400.0)),
        ];
        accelerate(&mut particles, &only(0.0, 1.0e6, 0.0));
        assert!(particles[0].vel.x > 0.0);
        assert!(particles[1].vel.x < 0.0);
    }

    #[test]
    fn far_charge_scales_with_distance() {
        let mut near = vec![
            Particle::new(100.0, 0.0, 1.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 1.0, DVec2::new(150.0, 400.0)),
        ];
        let mut far = vec![
            Particle::new(100.0, 0.0, 1.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 1.0, DVec2::new(200.0, 400.0)),
        ];
        let config = only(0.0, 0.0, 7.5);
        accelerate(&mut near, &config);
        accelerate(&mut far, &config);
        assert!(near[0].vel.x > 0.0);
        assert!((far[0].vel.x - 2.0 * near[0].vel.x).abs() < 1e-12);
    }

    #[test]
    fn contributions_are_averaged_over_neighbors() {
        // Two identical neighbors on the same side pull exactly as hard as one.
        let mut pair = vec![
            Particle::new(100.0, 0.0, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(200.0, 400.0)),
        ];
        let mut trio = vec![
            Particle::new(100.0, 0.0, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(200.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(200.0, 400.0)),
        ];
        let config = only(15.0, 0.0, 0.0);
        accelerate(&mut pair, &config);
        accelerate(&mut trio, &config);
        assert!((pair[0].vel.x - trio[0].vel.x).abs() < 1e-12);
    }

    #[test]
    fn lone_particle_keeps_its_velocity() {
        let mut particles = vec![
            Particle::new(100.0, 1.0, 1.0, DVec2::new(10.0, 10.0)).with_velocity(DVec2::new(2.0, -1.0)),
        ];
        accelerate(&mut particles, &SimConfig::default());
        assert_eq!(particles[0].vel, DVec2::new(2.0, -1.0));
    }

    #[test]
    fn colliding_neighbors_contribute_no_force() {
        // Everyone overlaps: nobody has a contributing neighbor, nothing may turn NaN.
        let mut particles = vec![
            Particle::new(100.0, 0.0, 0.0, DVec2::new(400.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(400.0, 400.0)),
        ];
        accelerate(&mut particles, &SimConfig::default());
        for p in &particles {
            assert!(p.vel.x.is_finite() && p.vel.y.is_finite());
        }
    }

    #[test]
    fn bounce_ends_once_pair_separates() {
        let mut particles = vec![
            Particle::new(100.0, 0.0, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(200.0, 400.0)),
        ];
        let other = particles[1].id;
        particles[0].bouncing_against = Some(other);
        accelerate(&mut particles, &only(15.0, 0.0, 0.0));
        assert!(!particles[0].is_bouncing());
        // The pair was still skipped on the tick the bounce completed.
        assert_eq!(particles[0].vel, DVec2::zero());
        assert!(particles[1].vel.x < 0.0);
    }

    #[test]
    fn bounce_persists_while_pair_is_close() {
        let mut particles = vec![
            Particle::new(100.0, 0.0, 0.0, DVec2::new(100.0, 400.0)),
            Particle::new(100.0, 0.0, 0.0, DVec2::new(107.0, 400.0)),
        ];
        let other = particles[1].id;
        particles[0].bouncing_against = Some(other);
        // 7 apart: no longer overlapping (6) but inside 1.5 * 6 = 9.
        accelerate(&mut particles, &only(15.0, 0.0, 0.0));
        assert_eq!(particles[0].bouncing_against(), Some(other));
        assert_eq!(particles[0].vel, DVec2::zero());
    }
}
