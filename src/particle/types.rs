// particle/types.rs
// Contains the Particle struct: fundamental properties, derived display proxies,
// and the ephemeral merge/bounce state the collision code works with

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use ultraviolet::DVec2;

use super::history::PositionHistory;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A point mass carrying two charge-like scalars.
///
/// Mass and charges are only writable through setters so the radius and color
/// proxies can never drift from the values they are derived from.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: u64,
    pub pos: DVec2,
    pub vel: DVec2,
    mass: f64,
    close_charge: f64,
    far_charge: f64,
    radius: u32,
    color: [u8; 4],
    pub(crate) history: PositionHistory,
    pub(crate) merging: bool,
    pub(crate) merging_with: BTreeSet<u64>,
    pub(crate) bouncing_against: Option<u64>,
}

impl Particle {
    /// A particle at rest at `pos`. Charges are clamped into their legal ranges.
    pub fn new(mass: f64, close_charge: f64, far_charge: f64, pos: DVec2) -> Self {
        let mut particle = Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            pos,
            vel: DVec2::zero(),
            mass: 0.0,
            close_charge: 0.0,
            far_charge: 0.0,
            radius: 1,
            color: [0, 0, 0, 48],
            history: PositionHistory::default(),
            merging: false,
            merging_with: BTreeSet::new(),
            bouncing_against: None,
        };
        particle.set_mass(mass);
        particle.set_close_charge(close_charge);
        particle.set_far_charge(far_charge);
        particle
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    /// Copy of the persistent state only (mass, charges, position, velocity) under a new id.
    /// History and collision bookkeeping start empty.
    pub fn pristine_copy(&self) -> Self {
        Self::new(self.mass, self.close_charge, self.far_charge, self.pos).with_velocity(self.vel)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.radius = radius_for_mass(mass);
    }

    pub fn close_charge(&self) -> f64 {
        self.close_charge
    }

    /// Negative charge shows red, positive green; zero is black.
    pub fn set_close_charge(&mut self, close_charge: f64) {
        let close_charge = close_charge.clamp(-1.0, 1.0);
        self.close_charge = close_charge;
        let level = (255.0 * close_charge.abs()) as u8;
        if close_charge < 0.0 {
            self.color[0] = level;
            self.color[1] = 0;
        } else {
            self.color[0] = 0;
            self.color[1] = level;
        }
    }

    pub fn far_charge(&self) -> f64 {
        self.far_charge
    }

    /// Alpha never drops below 48 so uncharged particles stay visible.
    pub fn set_far_charge(&mut self, far_charge: f64) {
        let far_charge = far_charge.clamp(0.0, 1.0);
        self.far_charge = far_charge;
        self.color[3] = (207.0 * far_charge) as u8 + 48;
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// RGBA display proxy.
    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn set_track_history(&mut self, enabled: bool) {
        self.history.set_enabled(enabled);
    }

    pub fn set_history_size(&mut self, size: usize) {
        self.history.set_capacity(size);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn is_merging(&self) -> bool {
        self.merging
    }

    pub fn merging_with(&self) -> &BTreeSet<u64> {
        &self.merging_with
    }

    pub fn is_bouncing(&self) -> bool {
        self.bouncing_against.is_some()
    }

    pub fn bouncing_against(&self) -> Option<u64> {
        self.bouncing_against
    }

    /// Record the current position (if tracking) and advance by one tick of velocity.
    pub fn update_position(&mut self) {
        self.history.record(self.pos);
        self.pos += self.vel;
    }

    pub(crate) fn clear_merge(&mut self) {
        self.merging = false;
        self.merging_with.clear();
    }

    pub fn summary(&self) -> ParticleSummary {
        ParticleSummary {
            id: self.id,
            mass: self.mass,
            pos: self.pos,
            vel: self.vel,
        }
    }
}

/// Radius proxy: area roughly proportional to mass, at least one unit.
pub fn radius_for_mass(mass: f64) -> u32 {
    (mass.sqrt() / (2.0 * PI.sqrt())).round().max(1.0) as u32
}

/// Compact value copy of a particle, used in merge reports and status lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSummary {
    pub id: u64,
    pub mass: f64,
    pub pos: DVec2,
    pub vel: DVec2,
}

impl fmt::Display for ParticleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:.1}; [{:.1} {:.1}]; [{:.3} {:.3}]}}",
            self.mass, self.pos.x, self.pos.y, self.vel.x, self.vel.y
        )
    }
}
