// simulation/boundary.rs
// Wall reflection for a square environment of side `size`

use ultraviolet::DVec2;

use super::collision::reflect;
use crate::particle::Particle;

/// Positions are compared on their integer part, as the renderer sees them.
fn outside(coord: f64, radius: f64, size: f64) -> bool {
    let c = coord.trunc();
    c - radius < 0.0 || c + radius > size - 1.0
}

/// Reflect particles whose disc crosses a wall and pull them back inside.
///
/// Only one axis is resolved per particle per call: a particle crossing a corner
/// gets its horizontal reflection this tick and its vertical one on a later tick.
pub fn reflect_walls(particles: &mut [Particle], environment_size: i32) {
    let size = environment_size as f64;
    for p in particles.iter_mut() {
        let r = p.radius() as f64;
        let upper = (size - r - 1.0).max(r);
        if outside(p.pos.x, r, size) {
            p.vel = reflect(p.vel, DVec2::new(1.0, 0.0));
            p.pos.x = p.pos.x.min(upper).max(r);
        } else if outside(p.pos.y, r, size) {
            p.vel = reflect(p.vel, DVec2::new(0.0, 1.0));
            p.pos.y = p.pos.y.min(upper).max(r);
        }
    }
}
