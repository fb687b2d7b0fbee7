//! Particle creation: instantaneous bursts, timed repeat batches, and
//! parametric orbit trails.
//!
//! Timed and orbit spawning never schedule real timers. Each becomes a
//! [`SpawnSchedule`] record of logical deadlines that the segment
//! coordinator owns and evaluates at tick boundaries, so cancelling a
//! sequence is just dropping the record.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::registry::ProfileRegistry;
use crate::api::types::{ParticleIds, Viewport};
use crate::components::particle::Particle;
use crate::components::profile::{Color, EmissionProfile, Span};
use crate::core::rng::Rng;
use crate::core::store::ParticleStore;

/// Everything a spawn call needs, borrowed from the engine for the
/// duration of one tick.
pub struct SpawnCtx<'a> {
    pub registry: &'a ProfileRegistry,
    pub store: &'a mut ParticleStore,
    pub rng: &'a mut Rng,
    pub ids: &'a mut ParticleIds,
    pub viewport: Viewport,
}

/// Where a spawned particle starts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Uniformly anywhere in the viewport.
    #[default]
    Anywhere,
    /// A viewport-relative anchor point with uniform jitter around it.
    Anchor {
        x_frac: f32,
        y_frac: f32,
        jitter_x: f32,
        jitter_y: f32,
    },
}

impl SpawnOrigin {
    fn sample(&self, viewport: Viewport, rng: &mut Rng) -> Vec2 {
        match *self {
            SpawnOrigin::Anywhere => Vec2::new(
                rng.range_f32(0.0, viewport.width),
                rng.range_f32(0.0, viewport.height),
            ),
            SpawnOrigin::Anchor {
                x_frac,
                y_frac,
                jitter_x,
                jitter_y,
            } => Vec2::new(
                viewport.width * x_frac + rng.range_f32(-jitter_x, jitter_x),
                viewport.height * y_frac + rng.range_f32(-jitter_y, jitter_y),
            ),
        }
    }
}

/// How a spawned particle's initial velocity is drawn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum VelocityModel {
    /// Each axis uniform in ±(profile speed max).
    #[default]
    Isotropic,
    /// Explicit per-axis spans (e.g. exhaust pushed upward).
    Drift { x: Span, y: Span },
    /// Batch members evenly spaced around a circle, magnitude from `speed`.
    Ring { speed: Span },
}

impl VelocityModel {
    fn sample(
        &self,
        profile: &EmissionProfile,
        index: usize,
        batch: usize,
        rng: &mut Rng,
    ) -> Vec2 {
        match self {
            VelocityModel::Isotropic => {
                let limit = profile.speed.max;
                Vec2::new(rng.range_f32(-limit, limit), rng.range_f32(-limit, limit))
            }
            VelocityModel::Drift { x, y } => Vec2::new(x.sample(rng), y.sample(rng)),
            VelocityModel::Ring { speed } => {
                let angle = index as f32 / batch.max(1) as f32 * TAU;
                let magnitude = speed.sample(rng);
                Vec2::new(angle.cos() * magnitude, angle.sin() * magnitude)
            }
        }
    }
}

/// One spawn instruction inside a segment script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub profile: String,
    pub mode: SpawnMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Create a batch immediately. `count` of `None` uses the profile default.
    Burst {
        #[serde(default)]
        count: Option<u32>,
        #[serde(default)]
        origin: SpawnOrigin,
        #[serde(default)]
        velocity: VelocityModel,
    },
    /// Repeat a batch every `interval_ms` until `duration_ms` has elapsed.
    Timed {
        per_batch: u32,
        interval_ms: f64,
        duration_ms: f64,
        #[serde(default)]
        origin: SpawnOrigin,
        #[serde(default)]
        velocity: VelocityModel,
    },
    /// Advance an angle by `step` per firing and spawn one particle on an
    /// ellipse, velocity tangent to the path.
    Orbit {
        interval_ms: f64,
        duration_ms: f64,
        /// Ellipse radius as a fraction of the smaller viewport dimension.
        radius_frac: f32,
        /// Vertical flattening of the ellipse.
        squash: f32,
        step: f32,
    },
}

/// Create a burst of particles from a registered profile.
/// Unregistered profile names produce nothing.
pub fn spawn_burst(
    ctx: &mut SpawnCtx,
    profile_name: &str,
    count: Option<u32>,
    origin: SpawnOrigin,
    velocity: &VelocityModel,
    now_ms: f64,
) -> usize {
    let Some(profile) = ctx.registry.lookup(profile_name) else {
        return 0;
    };
    let batch = count.unwrap_or(profile.count) as usize;
    for index in 0..batch {
        let pos = origin.sample(ctx.viewport, ctx.rng);
        let vel = velocity.sample(&profile, index, batch, ctx.rng);
        insert_particle(ctx, &profile, pos, vel, now_ms);
    }
    batch
}

/// Place one particle on the orbit ellipse at `angle`, moving tangentially.
pub fn spawn_orbit_point(
    ctx: &mut SpawnCtx,
    profile_name: &str,
    angle: f32,
    radius_frac: f32,
    squash: f32,
    now_ms: f64,
) -> usize {
    let Some(profile) = ctx.registry.lookup(profile_name) else {
        return 0;
    };
    let center = Vec2::new(ctx.viewport.width * 0.5, ctx.viewport.height * 0.5);
    let radius = ctx.viewport.min_dim() * radius_frac;
    let pos = center + Vec2::new(angle.cos() * radius, angle.sin() * radius * squash);
    let speed = profile.speed.sample(ctx.rng);
    let vel = Vec2::new(-angle.sin() * speed, angle.cos() * speed * squash);
    insert_particle(ctx, &profile, pos, vel, now_ms);
    1
}

fn insert_particle(
    ctx: &mut SpawnCtx,
    profile: &Arc<EmissionProfile>,
    pos: Vec2,
    vel: Vec2,
    now_ms: f64,
) {
    let rotation_speed = if profile.behavior.rotation {
        ctx.rng.range_f32(-2.0, 2.0)
    } else {
        0.0
    };
    ctx.store.insert(Particle {
        id: ctx.ids.next(),
        pos,
        vel,
        rotation: 0.0,
        rotation_speed,
        size: profile.size.sample(ctx.rng),
        opacity: profile.opacity.sample(ctx.rng),
        fade: 1.0,
        color: Color::pick(&profile.colors, ctx.rng),
        phase: ctx.rng.range_f32(0.0, 256.0),
        age: 0.0,
        expires_at: Particle::expiry_for(profile.lifetime, now_ms),
        profile: Arc::clone(profile),
    });
}

/// A pending timed or orbit sequence: logical deadlines plus parametric
/// state. Owned by the segment coordinator's current transition; dropping
/// it cancels every remaining firing.
#[derive(Debug, Clone)]
pub struct SpawnSchedule {
    spec: SpawnSpec,
    next_fire_ms: f64,
    interval_ms: f64,
    ends_ms: f64,
    angle: f32,
}

impl SpawnSchedule {
    /// Schedule a spec starting at `now_ms`. Bursts have no schedule —
    /// they fire at once — so they return `None`.
    pub fn from_spec(spec: &SpawnSpec, now_ms: f64) -> Option<Self> {
        let (interval_ms, duration_ms) = match spec.mode {
            SpawnMode::Burst { .. } => return None,
            SpawnMode::Timed {
                interval_ms,
                duration_ms,
                ..
            }
            | SpawnMode::Orbit {
                interval_ms,
                duration_ms,
                ..
            } => (interval_ms.max(1.0), duration_ms),
        };
        Some(Self {
            spec: spec.clone(),
            next_fire_ms: now_ms + interval_ms,
            interval_ms,
            ends_ms: now_ms + duration_ms,
            angle: 0.0,
        })
    }

    /// Fire every deadline that is due at `now_ms` (a slow tick catches
    /// up on missed intervals). Returns false once the bounded window has
    /// closed and the schedule should be discarded.
    pub fn fire_due(&mut self, now_ms: f64, ctx: &mut SpawnCtx) -> bool {
        loop {
            if self.next_fire_ms > self.ends_ms {
                return false;
            }
            if self.next_fire_ms > now_ms {
                return true;
            }
            match &self.spec.mode {
                SpawnMode::Timed {
                    per_batch,
                    origin,
                    velocity,
                    ..
                } => {
                    let (count, origin, velocity) = (Some(*per_batch), *origin, velocity.clone());
                    spawn_burst(ctx, &self.spec.profile, count, origin, &velocity, now_ms);
                }
                SpawnMode::Orbit {
                    radius_frac,
                    squash,
                    step,
                    ..
                } => {
                    let (radius_frac, squash, step) = (*radius_frac, *squash, *step);
                    self.angle += step;
                    spawn_orbit_point(
                        ctx,
                        &self.spec.profile,
                        self.angle,
                        radius_frac,
                        squash,
                        now_ms,
                    );
                }
                SpawnMode::Burst { .. } => return false,
            }
            self.next_fire_ms += self.interval_ms;
        }
    }
}
