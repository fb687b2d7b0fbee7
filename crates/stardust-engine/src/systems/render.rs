//! Builds the outbound frame snapshot from the particle store.

use crate::components::particle::Particle;
use crate::renderer::frame::{FrameBuffer, ParticleInstance};

/// Rebuild `frame.instances` from the live population, in store order.
/// Removal notices are accumulated separately by the engine; this only
/// refreshes the visual-state snapshot.
pub fn build_frame<'a>(particles: impl Iterator<Item = &'a Particle>, frame: &mut FrameBuffer) {
    frame.instances.clear();
    for particle in particles {
        frame.push(ParticleInstance::from_particle(particle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ParticleId, ParticleIds, Viewport};
    use crate::api::registry::ProfileRegistry;
    use crate::components::profile::EmissionProfile;
    use crate::core::rng::Rng;
    use crate::core::store::ParticleStore;
    use crate::systems::spawner::{spawn_burst, SpawnCtx, SpawnOrigin, VelocityModel};

    #[test]
    fn snapshot_mirrors_store() {
        let mut registry = ProfileRegistry::new();
        registry.register("dot", EmissionProfile::new(4));
        let mut store = ParticleStore::new();
        let mut rng = Rng::new(1);
        let mut ids = ParticleIds::new();
        let mut ctx = SpawnCtx {
            registry: &registry,
            store: &mut store,
            rng: &mut rng,
            ids: &mut ids,
            viewport: Viewport::new(800.0, 600.0),
        };
        spawn_burst(
            &mut ctx,
            "dot",
            None,
            SpawnOrigin::Anywhere,
            &VelocityModel::Isotropic,
            0.0,
        );

        let mut frame = FrameBuffer::new();
        frame.removals.push(ParticleId(99));
        build_frame(store.iter(), &mut frame);

        assert_eq!(frame.instance_count(), 4);
        let store_ids: Vec<u32> = store.iter().map(|p| p.id.0).collect();
        let frame_ids: Vec<u32> = frame.instances.iter().map(|i| i.id).collect();
        assert_eq!(frame_ids, store_ids, "snapshot must preserve store order");
        // Removals are owned by the engine's tick, not by the rebuild.
        assert_eq!(frame.removals.len(), 1);
    }
}
