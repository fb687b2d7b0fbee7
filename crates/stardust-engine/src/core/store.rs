use crate::api::types::ParticleId;
use crate::components::particle::Particle;

/// Flat storage for the active particle population.
/// Designed for hundreds-to-low-thousands of entries; lookups scan,
/// removals swap from the end, iteration visits each entry exactly once
/// even while entries are being retired.
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(256),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
        }
    }

    /// Add a particle. Inserting an id that is already present is a
    /// contract violation; release builds keep the store intact by
    /// dropping the duplicate.
    pub fn insert(&mut self, particle: Particle) {
        let duplicate = self.get(particle.id).is_some();
        debug_assert!(!duplicate, "duplicate particle id {:?}", particle.id);
        if duplicate {
            return;
        }
        self.particles.push(particle);
    }

    /// Remove a particle by id. Removing an absent id is a contract
    /// violation; release builds treat it as a no-op.
    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let idx = self.particles.iter().position(|p| p.id == id);
        debug_assert!(idx.is_some(), "removing absent particle id {:?}", id);
        idx.map(|i| self.particles.swap_remove(i))
    }

    /// Remove every particle, returning the removed set so the caller can
    /// emit removal notices for them.
    pub fn clear(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.particles)
    }

    /// Drop particles from the end until at most `target` remain.
    /// Returns the discarded set, newest first.
    pub fn truncate(&mut self, target: usize) -> Vec<Particle> {
        let mut removed = Vec::new();
        while self.particles.len() > target {
            // len > target >= 0, so pop always yields
            if let Some(p) = self.particles.pop() {
                removed.push(p);
            }
        }
        removed
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    /// Visit every particle exactly once, keeping those for which `keep`
    /// returns true. Removals never skip or double-visit entries.
    pub fn retain_with<F>(&mut self, keep: F)
    where
        F: FnMut(&mut Particle) -> bool,
    {
        self.particles.retain_mut(keep);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::profile::{Color, EmissionProfile};
    use glam::Vec2;
    use std::sync::Arc;

    fn particle(id: u32) -> Particle {
        Particle {
            id: ParticleId(id),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: 1.0,
            opacity: 1.0,
            fade: 1.0,
            color: Color::WHITE,
            phase: 0.0,
            age: 0.0,
            expires_at: None,
            profile: Arc::new(EmissionProfile::default()),
        }
    }

    #[test]
    fn insert_and_count() {
        let mut store = ParticleStore::new();
        store.insert(particle(1));
        store.insert(particle(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_returns_particle() {
        let mut store = ParticleStore::new();
        store.insert(particle(1));
        let removed = store.remove(ParticleId(1)).unwrap();
        assert_eq!(removed.id, ParticleId(1));
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_and_returns_all() {
        let mut store = ParticleStore::new();
        store.insert(particle(1));
        store.insert(particle(2));
        let removed = store.clear();
        assert_eq!(removed.len(), 2);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn truncate_discards_from_the_end() {
        let mut store = ParticleStore::new();
        for i in 0..10 {
            store.insert(particle(i));
        }
        let removed = store.truncate(3);
        assert_eq!(store.len(), 3);
        assert_eq!(removed.len(), 7);
        assert!(store.get(ParticleId(0)).is_some());
        assert!(store.get(ParticleId(9)).is_none());
    }

    #[test]
    fn truncate_above_len_is_noop() {
        let mut store = ParticleStore::new();
        store.insert(particle(1));
        assert!(store.truncate(5).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn retain_with_visits_each_once() {
        let mut store = ParticleStore::new();
        for i in 0..6 {
            store.insert(particle(i));
        }
        let mut visited = Vec::new();
        store.retain_with(|p| {
            visited.push(p.id);
            p.id.0 % 2 == 0
        });
        assert_eq!(visited.len(), 6);
        assert_eq!(store.len(), 3);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn duplicate_insert_ignored_in_release() {
        let mut store = ParticleStore::new();
        store.insert(particle(1));
        store.insert(particle(1));
        assert_eq!(store.len(), 1);
    }
}
