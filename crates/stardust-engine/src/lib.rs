pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::engine::{EngineConfig, ParticleEngine};
pub use api::registry::ProfileRegistry;
pub use api::types::{ParticleId, ParticleIds, ScrollDirection, Viewport};
pub use components::particle::Particle;
pub use components::profile::{Behavior, Color, EmissionProfile, Lifetime, Span};
pub use core::rng::Rng;
pub use core::store::ParticleStore;
pub use core::time::{frame_scale, FrameClock};
pub use renderer::frame::{FrameBuffer, ParticleInstance};
pub use renderer::traits::ParticleSink;
pub use systems::coordinator::{SegmentCoordinator, SegmentMap, DEFAULT_FADE_MS};
pub use systems::integrator::{advance, Step, WRAP_MARGIN};
pub use systems::spawner::{
    spawn_burst, spawn_orbit_point, SpawnCtx, SpawnMode, SpawnOrigin, SpawnSchedule, SpawnSpec,
    VelocityModel,
};
pub use extensions::easing::{ease, lerp, Easing};
