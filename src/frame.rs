// frame.rs
// Read-only view of the roster published to renderers after each tick

use std::sync::Arc;

use parking_lot::Mutex;
use ultraviolet::DVec2;

use crate::simulation::Simulation;

/// What a renderer needs to draw one particle.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleView {
    pub id: u64,
    pub pos: DVec2,
    pub radius: u32,
    pub color: [u8; 4],
    /// Oldest point first.
    pub trail: Vec<DVec2>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameView {
    pub frame: usize,
    pub environment_size: i32,
    /// Mass-descending, so heavier particles are drawn first.
    pub particles: Vec<ParticleView>,
}

/// Latest frame, written by the simulation thread and read by whoever renders.
pub type SharedFrame = Arc<Mutex<FrameView>>;

impl FrameView {
    pub fn capture(sim: &Simulation) -> Self {
        let mut order: Vec<_> = sim.particles().iter().collect();
        // The roster is only sorted before merging; merged particles sit at the end.
        order.sort_by(|a, b| b.mass().total_cmp(&a.mass()));
        let particles = order
            .into_iter()
            .map(|p| ParticleView {
                id: p.id,
                pos: p.pos,
                radius: p.radius(),
                color: p.color(),
                trail: p.history().iter().collect(),
            })
            .collect();
        Self {
            frame: sim.frame,
            environment_size: sim.config().environment_size,
            particles,
        }
    }

    pub fn publish(self, shared: &SharedFrame) {
        *shared.lock() = self;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::particle::Particle;

    #[test]
    fn capture_orders_by_mass_and_copies_trails() {
        let mut sim = Simulation::with_config(SimConfig::default(), Some(2)).unwrap();
        sim.set_particles(vec![
            Particle::new(10.0, -1.0, 0.0, DVec2::new(100.0, 100.0)).with_velocity(DVec2::new(1.0, 0.0)),
            Particle::new(300.0, 1.0, 1.0, DVec2::new(600.0, 600.0)),
        ]);
        sim.step();

        let frame = FrameView::capture(&sim);
        assert_eq!(frame.frame, 1);
        assert_eq!(frame.environment_size, 800);
        assert_eq!(frame.particles.len(), 2);
        assert_eq!(frame.particles[0].color, [0, 255, 0, 255]);
        assert_eq!(frame.particles[1].color, [255, 0, 0, 48]);
        assert_eq!(frame.particles[1].trail, vec![DVec2::new(100.0, 100.0)]);
    }

    #[test]
    fn publish_replaces_shared_frame() {
        let shared: SharedFrame = Arc::new(Mutex::new(FrameView::default()));
        let sim = Simulation::new();
        FrameView { frame: 9, ..FrameView::capture(&sim) }.publish(&shared);
        assert_eq!(shared.lock().frame, 9);
    }
}
