// simulation/collision.rs
// Contains collision classification (merge vs bounce), bounce reflection and
// end-of-tick merge aggregation

use std::collections::{HashMap, HashSet};

use ultraviolet::DVec2;

use crate::config::SimConfig;
use crate::particle::{Particle, ParticleSummary};

/// What the last merge of a tick did, for status display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeEvent {
    /// Some merge this tick took in more than two particles.
    pub multiple: bool,
    /// Number of separate merges resolved this tick.
    pub clusters: usize,
    /// The heaviest participant, whose history the result inherits.
    pub source: ParticleSummary,
    pub partner: ParticleSummary,
    pub result: ParticleSummary,
}

impl MergeEvent {
    pub fn status_text(&self) -> String {
        let mut text = format!("Merging {} with {}", self.source, self.partner);
        if self.multiple {
            text.push_str(" (et. al.)");
        }
        text.push_str(". Now: ");
        text.push_str(&self.result.to_string());
        text
    }
}

/// Reflect `v` over the line perpendicular to the unit normal `n`.
pub(crate) fn reflect(v: DVec2, n: DVec2) -> DVec2 {
    v - n * (2.0 * v.dot(n))
}

/// Decide what happens when `particles[i]` first touches `particles[j]`.
///
/// A merge marks both particles and links them to each other. A bounce only
/// changes `particles[i]`; the partner reacts when its own turn comes.
pub fn classify(particles: &mut [Particle], i: usize, j: usize, config: &SimConfig) {
    let (p, o) = (&particles[i], &particles[j]);
    let (p_id, o_id) = (p.id, o.id);

    if should_merge(p, o, config) {
        log::debug!("merge pending between {} and {}", p_id, o_id);
        for (k, partner) in [(i, o_id), (j, p_id)] {
            let particle = &mut particles[k];
            particle.merging = true;
            particle.merging_with.insert(partner);
            if particle.bouncing_against == Some(partner) {
                particle.bouncing_against = None;
            }
        }
        return;
    }

    let n = if p.vel.x.abs() + o.vel.x.abs() > p.vel.y.abs() + o.vel.y.abs() {
        DVec2::new(0.0, 1.0)
    } else {
        DVec2::new(1.0, 0.0)
    };
    let p = &mut particles[i];
    p.vel = reflect(p.vel, n);
    p.bouncing_against = Some(o_id);
}

fn should_merge(p: &Particle, o: &Particle, config: &SimConfig) -> bool {
    if !config.allow_merge {
        return false;
    }
    let ratio = p.mass().max(o.mass()) / p.mass().min(o.mass());
    if ratio <= config.merge_mass_ratio_threshold {
        return false;
    }
    let (a, b) = (p.close_charge(), o.close_charge());
    a.is_sign_negative() != b.is_sign_negative()
        || a.abs() + b.abs() < config.merge_close_charge_threshold
}

/// Running mass-weighted totals for one merge cluster.
struct Aggregate {
    mass: f64,
    close_charge: f64,
    far_charge: f64,
    position: DVec2,
    velocity: DVec2,
    root_mass: f64,
}

impl Aggregate {
    fn new(root: &Particle) -> Self {
        let m = root.mass();
        Self {
            mass: m,
            close_charge: root.close_charge() * m,
            far_charge: root.far_charge() * m,
            position: root.pos * m,
            velocity: root.vel,
            root_mass: m,
        }
    }

    fn absorb(&mut self, o: &Particle) {
        let m = o.mass();
        self.mass += m;
        self.close_charge += o.close_charge() * m;
        self.far_charge += o.far_charge() * m;
        self.position += o.pos * m;
        // Scaled by the root's mass rather than the total; kept for compatibility.
        self.velocity += o.vel * (m / self.root_mass);
    }

    fn build(&self) -> Particle {
        Particle::new(
            self.mass,
            self.close_charge / self.mass,
            self.far_charge / self.mass,
            self.position / self.mass,
        )
        .with_velocity(self.velocity)
    }
}

/// Replace every merge cluster in `particles` with one aggregated particle.
///
/// `particles` must already be sorted by descending mass so the first member of a
/// cluster visited is its heaviest. A cluster is everything reachable through
/// `merging_with` links, so each participant is absorbed exactly once even when
/// contacts chain (A touches B, B touches C).
pub fn aggregate_merges(particles: &mut Vec<Particle>) -> Option<MergeEvent> {
    if !particles.iter().any(|p| p.merging) {
        return None;
    }

    let index_of: HashMap<u64, usize> = particles.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
    let mut consumed: HashSet<u64> = HashSet::new();
    let mut remove: Vec<usize> = Vec::new();
    let mut created: Vec<Particle> = Vec::new();
    let mut event: Option<MergeEvent> = None;
    let mut clusters = 0;
    let mut multiple = false;

    for i in 0..particles.len() {
        if !particles[i].merging {
            continue;
        }
        let root_id = particles[i].id;
        if consumed.contains(&root_id) {
            remove.push(i);
            continue;
        }

        let members = cluster_members(particles, i, &index_of, &consumed);
        if members.is_empty() {
            // Partners vanished from the roster; nothing to merge into.
            particles[i].clear_merge();
            continue;
        }

        let root = &particles[i];
        let mut aggregate = Aggregate::new(root);
        for &k in &members {
            aggregate.absorb(&particles[k]);
        }
        let partner = particles[members[0]].summary();
        let source = root.summary();

        let mut merged = aggregate.build();
        merged.history = root.history.clone();

        consumed.insert(root_id);
        for &k in &members {
            consumed.insert(particles[k].id);
            particles[k].merging_with.remove(&root_id);
        }
        remove.push(i);
        clusters += 1;
        multiple |= members.len() > 1;

        log::debug!(
            "merged {} particles into {} (mass {:.1})",
            members.len() + 1,
            merged.id,
            merged.mass()
        );
        event = Some(MergeEvent {
            multiple,
            clusters,
            source,
            partner,
            result: merged.summary(),
        });
        created.push(merged);
    }

    // Descending so each swap_remove only moves an element we keep.
    remove.sort_unstable_by(|a, b| b.cmp(a));
    for i in remove {
        particles.swap_remove(i);
    }
    particles.extend(created);
    event
}

/// Indices of every unconsumed particle linked to `root`, directly or through other members,
/// in discovery order.
fn cluster_members(
    particles: &[Particle],
    root: usize,
    index_of: &HashMap<u64, usize>,
    consumed: &HashSet<u64>,
) -> Vec<usize> {
    let mut seen: HashSet<u64> = HashSet::from([particles[root].id]);
    let mut members = Vec::new();
    let mut frontier = vec![root];
    while let Some(k) = frontier.pop() {
        for id in &particles[k].merging_with {
            if consumed.contains(id) || !seen.insert(*id) {
                continue;
            }
            if let Some(&idx) = index_of.get(id) {
                members.push(idx);
                frontier.push(idx);
            }
        }
    }
    members
}
