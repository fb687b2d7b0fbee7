//! The engine facade: owns the store, registry, coordinator and clock,
//! and exposes the host-facing surface.
//!
//! There is no global instance. Whoever owns the render loop constructs
//! a `ParticleEngine`, forwards scroll-tracker signals to it, and calls
//! `tick(now_ms)` once per display refresh.

use crate::api::registry::ProfileRegistry;
use crate::api::types::{ParticleId, ParticleIds, ScrollDirection, Viewport};
use crate::components::particle::Particle;
use crate::components::profile::EmissionProfile;
use crate::core::rng::Rng;
use crate::core::store::ParticleStore;
use crate::core::time::FrameClock;
use crate::renderer::frame::FrameBuffer;
use crate::renderer::traits::ParticleSink;
use crate::systems::coordinator::{SegmentCoordinator, SegmentMap, DEFAULT_FADE_MS};
use crate::systems::integrator::{advance, Step, WRAP_MARGIN};
use crate::systems::render::build_frame;
use crate::systems::spawner::{spawn_burst, SpawnCtx, SpawnOrigin, VelocityModel};

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub viewport: Viewport,
    /// Seed for every random draw; a fixed seed reproduces a run.
    pub seed: u64,
    /// Length of the segment-transition opacity ramp.
    pub fade_ms: f64,
    /// Upper bound on a single tick delta (stall protection).
    pub max_step_ms: f64,
    /// Population that `set_intensity(1.0)` corresponds to.
    pub intensity_reference: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(1280.0, 720.0),
            seed: 42,
            fade_ms: DEFAULT_FADE_MS,
            max_step_ms: 100.0,
            intensity_reference: 100,
        }
    }
}

/// The particle simulation and emission engine.
pub struct ParticleEngine {
    registry: ProfileRegistry,
    store: ParticleStore,
    coordinator: SegmentCoordinator,
    clock: FrameClock,
    rng: Rng,
    ids: ParticleIds,
    frame: FrameBuffer,
    viewport: Viewport,
    intensity_reference: u32,
    /// Ticking is suspended while false; state is preserved.
    running: bool,
    /// Degraded no-op mode (render surface absent at startup).
    enabled: bool,
    custom_seq: u32,
    /// Removal notices produced between ticks (intensity cuts, dispose).
    pending_removals: Vec<ParticleId>,
    /// Custom profiles awaiting their initial burst at the next tick.
    pending_bursts: Vec<String>,
}

impl ParticleEngine {
    /// Engine with the built-in profile catalog and segment script.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_content(config, ProfileRegistry::builtin(), SegmentMap::builtin())
    }

    /// Engine with caller-provided profiles and segment mapping.
    pub fn with_content(
        config: EngineConfig,
        registry: ProfileRegistry,
        segments: SegmentMap,
    ) -> Self {
        log::info!(
            "particle engine initialized ({} profiles, {} segments)",
            registry.len(),
            segments.len()
        );
        Self {
            registry,
            store: ParticleStore::new(),
            coordinator: SegmentCoordinator::new(segments, config.fade_ms),
            clock: FrameClock::new(config.max_step_ms),
            rng: Rng::new(config.seed),
            ids: ParticleIds::new(),
            frame: FrameBuffer::new(),
            viewport: config.viewport,
            intensity_reference: config.intensity_reference,
            running: true,
            enabled: true,
            custom_seq: 0,
            pending_removals: Vec::new(),
            pending_bursts: Vec::new(),
        }
    }

    /// Degraded mode for hosts whose render surface is missing: every
    /// call is a safe no-op and `tick` yields an empty frame.
    pub fn disabled() -> Self {
        log::warn!("particle engine disabled: no render surface");
        let mut engine = Self::with_content(
            EngineConfig::default(),
            ProfileRegistry::new(),
            SegmentMap::new(),
        );
        engine.enabled = false;
        engine.running = false;
        engine
    }

    /// Advance the simulation to `now_ms` and return this tick's
    /// snapshot. While paused or disabled, the previous frame is
    /// returned untouched.
    pub fn tick(&mut self, now_ms: f64) -> &FrameBuffer {
        if !self.enabled || !self.running {
            return &self.frame;
        }
        let dt = self.clock.delta(now_ms);
        self.frame.begin_frame();
        self.frame.removals.append(&mut self.pending_removals);

        {
            let mut ctx = SpawnCtx {
                registry: &self.registry,
                store: &mut self.store,
                rng: &mut self.rng,
                ids: &mut self.ids,
                viewport: self.viewport,
            };
            // Custom profiles registered since the last tick burst in first.
            for name in std::mem::take(&mut self.pending_bursts) {
                spawn_burst(
                    &mut ctx,
                    &name,
                    None,
                    SpawnOrigin::Anywhere,
                    &VelocityModel::Isotropic,
                    now_ms,
                );
            }
            self.coordinator
                .tick(now_ms, &mut ctx, &mut self.frame.removals);
        }

        let viewport = self.viewport;
        let removals = &mut self.frame.removals;
        self.store
            .retain_with(|particle| match advance(particle, dt, now_ms, viewport) {
                Step::Continue => true,
                Step::Expired => {
                    removals.push(particle.id);
                    false
                }
            });

        build_frame(self.store.iter(), &mut self.frame);
        &self.frame
    }

    /// `tick`, then push the snapshot to a sink.
    pub fn tick_with(&mut self, now_ms: f64, sink: &mut impl ParticleSink) {
        self.tick(now_ms);
        sink.submit(&self.frame);
    }

    /// Signal from the external scroll tracker that the active segment
    /// changed. Takes effect at the next tick.
    pub fn segment_changed(&mut self, segment: &str) {
        if !self.enabled {
            return;
        }
        self.coordinator.segment_changed(segment);
    }

    /// The host viewport changed size. Out-of-bounds particles are pulled
    /// back inside; nothing is destroyed.
    pub fn viewport_resized(&mut self, width: f32, height: f32) {
        if !self.enabled {
            return;
        }
        self.viewport = Viewport::new(width, height);
        for particle in self.store.iter_mut() {
            if particle.pos.x > width {
                particle.pos.x = width - WRAP_MARGIN;
            }
            if particle.pos.y > height {
                particle.pos.y = height - WRAP_MARGIN;
            }
        }
    }

    /// Reduce the population toward `floor(factor · reference)` by
    /// discarding the newest particles. Never creates any.
    pub fn set_intensity(&mut self, factor: f32) {
        if !self.enabled {
            return;
        }
        let factor = factor.clamp(0.0, 1.0);
        let target = (factor * self.intensity_reference as f32).floor() as usize;
        for particle in self.store.truncate(target) {
            self.pending_removals.push(particle.id);
        }
    }

    /// Register an ad-hoc profile under a generated name and spawn its
    /// initial batch at the next tick. Returns the generated name.
    pub fn register_custom_profile(&mut self, profile: EmissionProfile) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let name = format!("custom-{}", self.custom_seq);
        self.custom_seq += 1;
        self.registry.register(&name, profile);
        self.pending_bursts.push(name.clone());
        Some(name)
    }

    /// Store or overwrite a named profile.
    pub fn register_profile(&mut self, name: &str, profile: EmissionProfile) {
        if !self.enabled {
            return;
        }
        self.registry.register(name, profile);
    }

    /// Scroll-velocity nudge: particles whose profile has `flow` set get
    /// a horizontal velocity kick proportional to the scroll speed.
    pub fn scroll_impulse(&mut self, velocity: f32, direction: ScrollDirection) {
        if !self.enabled {
            return;
        }
        let nudge = velocity * 0.01 * direction.sign();
        for particle in self.store.iter_mut() {
            if particle.profile.behavior.flow {
                particle.vel.x += nudge;
            }
        }
    }

    /// Stop ticking. The population and any pending transition are kept.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resume ticking. The elapsed-time baseline is re-armed so the
    /// first tick after resume sees no simulated time jump.
    pub fn resume(&mut self) {
        if !self.enabled {
            return;
        }
        self.running = true;
        self.clock.reset();
    }

    /// Tear down: stop ticking, drop the population and every profile.
    /// The final frame carries removal notices for everything cleared.
    pub fn dispose(&mut self) {
        if !self.enabled {
            return;
        }
        self.running = false;
        self.frame.begin_frame();
        for particle in self.store.clear() {
            self.frame.removals.push(particle.id);
        }
        self.registry.clear();
        self.coordinator.reset();
        log::info!("particle engine disposed");
    }

    // -- Inspection --

    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.store.iter()
    }

    pub fn current_segment(&self) -> Option<&str> {
        self.coordinator.current_segment()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
