// simulation/spawn.rs
// Random particle generation

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use ultraviolet::DVec2;

use crate::config::{
    check_environment_size, check_positive, MASS_SPREAD_FACTOR, MAX_MASS_FACTOR, MIN_GENERATED_MASS,
    MIN_MASS_FACTOR,
};
use crate::error::Result;
use crate::particle::Particle;

/// Draw a mass from a normal distribution around `average_mass`, clamped to
/// `[max(4, 0.2 * avg), 1.75 * avg]`.
pub fn sample_mass<R: Rng + ?Sized>(rng: &mut R, average_mass: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    let lower = MIN_GENERATED_MASS.max(MIN_MASS_FACTOR * average_mass);
    let upper = MAX_MASS_FACTOR * average_mass;
    (z * MASS_SPREAD_FACTOR * average_mass + average_mass).max(lower).min(upper)
}

/// `count` particles at rest, uniformly placed in `[0, size)` on both axes.
pub fn random_particles<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    average_mass: f64,
    environment_size: i32,
) -> Result<Vec<Particle>> {
    check_positive("average_mass", average_mass)?;
    check_environment_size(environment_size)?;
    let size = environment_size as f64;

    let mut particles = Vec::with_capacity(count);
    for _ in 0..count {
        let mass = sample_mass(rng, average_mass);
        let close_charge = rng.random_range(-1.0..1.0);
        let far_charge = rng.random_range(0.0..1.0);
        let pos = DVec2::new(rng.random_range(0.0..size), rng.random_range(0.0..size));
        particles.push(Particle::new(mass, close_charge, far_charge, pos));
    }
    log::info!("generated {} particles around mass {:.1}", count, average_mass);
    Ok(particles)
}
