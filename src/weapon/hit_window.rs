//! Per-activation hit registry.

use std::collections::HashSet;

use super::Hand;
use crate::target::TargetId;

/// One open hit window: which targets were already struck and for how much
#[derive(Debug, Clone)]
pub struct HitWindow {
    generation: u64,
    hand: Hand,
    active_since: f64,
    damage: f32,
    already_hit: HashSet<TargetId>,
}

impl HitWindow {
    pub fn open(generation: u64, hand: Hand, active_since: f64, damage: f32) -> Self {
        Self {
            generation,
            hand,
            active_since,
            damage,
            already_hit: HashSet::new(),
        }
    }

    /// Record a contact. Returns false when the target was already struck in this window.
    pub fn register(&mut self, target: TargetId) -> bool {
        self.already_hit.insert(target)
    }

    pub fn contains(&self, target: TargetId) -> bool {
        self.already_hit.contains(&target)
    }

    pub fn hit_count(&self) -> usize {
        self.already_hit.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn active_since(&self) -> f64 {
        self.active_since
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut window = HitWindow::open(3, Hand::Light, 0.5, 12.0);
        assert!(window.register(TargetId(1)));
        assert!(!window.register(TargetId(1)));
        assert!(window.register(TargetId(2)));
        assert_eq!(window.hit_count(), 2);
        assert!(window.contains(TargetId(1)));
        assert_eq!(window.generation(), 3);
        assert_eq!(window.hand(), Hand::Light);
        assert_eq!(window.active_since(), 0.5);
    }
}
