// particle/history.rs
// Bounded FIFO of past positions, consumed by renderers for trail display

use std::collections::VecDeque;
use ultraviolet::DVec2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionHistory {
    enabled: bool,
    capacity: usize,
    points: VecDeque<DVec2>,
}

impl PositionHistory {
    pub fn new(enabled: bool, capacity: usize) -> Self {
        Self {
            enabled,
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling stops recording but keeps the points already stored.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrinking drops the oldest points so `len() <= capacity` holds immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_overflow();
    }

    /// Append `pos` if recording is enabled.
    pub fn record(&mut self, pos: DVec2) {
        if !self.enabled {
            return;
        }
        self.points.push_back(pos);
        self.evict_overflow();
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest point first. Each call starts a fresh pass over the buffer.
    pub fn iter(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.points.iter().copied()
    }

    fn evict_overflow(&mut self) {
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }
}
