// particle/tests.rs
// Tests for Particle proxies, clamping, and position history

use super::*;
use ultraviolet::DVec2;

#[test]
fn radius_tracks_mass() {
    let mut p = Particle::new(100.0, 0.0, 0.0, DVec2::zero());
    assert_eq!(p.radius(), 3);
    p.set_mass(1000.0);
    assert_eq!(p.radius(), 9);
    p.set_mass(1.0);
    assert_eq!(p.radius(), 1, "radius is never below one");
}

#[test]
fn charges_clamp_into_legal_ranges() {
    let p = Particle::new(10.0, -3.0, 7.0, DVec2::zero());
    assert_eq!(p.close_charge(), -1.0);
    assert_eq!(p.far_charge(), 1.0);

    let q = Particle::new(10.0, 2.0, -0.5, DVec2::zero());
    assert_eq!(q.close_charge(), 1.0);
    assert_eq!(q.far_charge(), 0.0);
}

#[test]
fn color_proxies_follow_charges() {
    let mut p = Particle::new(10.0, -0.5, 0.0, DVec2::zero());
    assert_eq!(p.color(), [127, 0, 0, 48]);

    p.set_close_charge(1.0);
    p.set_far_charge(1.0);
    assert_eq!(p.color(), [0, 255, 0, 255]);

    p.set_close_charge(0.0);
    assert_eq!(p.color()[0], 0);
    assert_eq!(p.color()[1], 0);
}

#[test]
fn ids_are_unique() {
    let a = Particle::new(1.0, 0.0, 0.0, DVec2::zero());
    let b = Particle::new(1.0, 0.0, 0.0, DVec2::zero());
    assert_ne!(a.id, b.id);
}

#[test]
fn pristine_copy_drops_history_and_collision_state() {
    let mut p = Particle::new(50.0, 0.2, 0.4, DVec2::new(1.0, 2.0)).with_velocity(DVec2::new(3.0, 4.0));
    p.set_track_history(true);
    p.set_history_size(5);
    p.update_position();
    p.merging = true;
    p.merging_with.insert(42);
    p.bouncing_against = Some(7);

    let copy = p.pristine_copy();
    assert_ne!(copy.id, p.id);
    assert_eq!(copy.mass(), 50.0);
    assert_eq!(copy.pos, p.pos);
    assert_eq!(copy.vel, p.vel);
    assert!(copy.history().is_empty());
    assert!(!copy.is_merging());
    assert!(copy.merging_with().is_empty());
    assert!(!copy.is_bouncing());
}

#[test]
fn update_position_records_previous_position() {
    let mut p = Particle::new(10.0, 0.0, 0.0, DVec2::new(0.0, 0.0)).with_velocity(DVec2::new(1.0, 0.5));
    p.set_track_history(true);
    p.set_history_size(10);
    p.update_position();
    p.update_position();

    assert_eq!(p.pos, DVec2::new(2.0, 1.0));
    let trail: Vec<DVec2> = p.history().iter().collect();
    assert_eq!(trail, vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.5)]);
}

#[test]
fn untracked_particle_keeps_no_history() {
    let mut p = Particle::new(10.0, 0.0, 0.0, DVec2::zero()).with_velocity(DVec2::new(1.0, 0.0));
    p.set_history_size(10);
    p.update_position();
    assert!(p.history().is_empty());
}

#[test]
fn history_evicts_oldest_first() {
    let mut history = PositionHistory::new(true, 3);
    for i in 0..5 {
        history.record(DVec2::new(i as f64, 0.0));
        assert!(history.len() <= history.capacity());
    }
    let xs: Vec<f64> = history.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![2.0, 3.0, 4.0]);
}

#[test]
fn shrinking_history_truncates_from_oldest_end() {
    let mut history = PositionHistory::new(true, 4);
    for i in 0..4 {
        history.record(DVec2::new(i as f64, 0.0));
    }
    history.set_capacity(2);
    let xs: Vec<f64> = history.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![2.0, 3.0]);

    history.set_capacity(0);
    assert!(history.is_empty());
    history.record(DVec2::new(9.0, 9.0));
    assert!(history.is_empty(), "zero capacity keeps nothing");
}

#[test]
fn history_iteration_is_restartable() {
    let mut history = PositionHistory::new(true, 3);
    history.record(DVec2::new(1.0, 1.0));
    history.record(DVec2::new(2.0, 2.0));
    let first: Vec<DVec2> = history.iter().collect();
    let second: Vec<DVec2> = history.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn summary_display_is_compact() {
    let p = Particle::new(110.0, 0.0, 0.0, DVec2::new(400.0, 10.0)).with_velocity(DVec2::new(0.5, -0.25));
    assert_eq!(p.summary().to_string(), "{110.0; [400.0 10.0]; [0.500 -0.250]}");
}
