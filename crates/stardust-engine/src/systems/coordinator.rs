//! Segment transitions: fade out the current population, clear it, then
//! spawn the profile set mapped to the new segment.
//!
//! The coordinator is a three-state machine (`Idle → FadingOut →
//! Spawning → Idle`). A transition owns every schedule it creates; a new
//! segment change drops them all before starting over, so a fast
//! sequence of changes can never leave a stale sequence spawning into
//! the new segment's population.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::ParticleId;
use crate::components::profile::Span;
use crate::extensions::easing::Easing;
use crate::systems::spawner::{
    spawn_burst, SpawnCtx, SpawnMode, SpawnOrigin, SpawnSchedule, SpawnSpec, VelocityModel,
};

/// Default opacity ramp length for a segment transition.
pub const DEFAULT_FADE_MS: f64 = 1000.0;

/// Mapping from segment name to the ordered spawn entries it activates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentMap {
    segments: HashMap<String, Vec<SpawnSpec>>,
}

impl SegmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in script of the presentation's seven segments.
    pub fn builtin() -> Self {
        let mut map = Self::new();

        map.insert("hero", vec![stars(50), rocket_exhaust()]);
        map.insert(
            "sputnik",
            vec![
                stars(40),
                SpawnSpec {
                    profile: "satellite-trail".into(),
                    mode: SpawnMode::Orbit {
                        interval_ms: 200.0,
                        duration_ms: 10_000.0,
                        radius_frac: 0.3,
                        squash: 0.6,
                        step: 0.1,
                    },
                },
            ],
        );
        map.insert("gagarin", vec![stars(60), atmosphere()]);
        map.insert("jfk", vec![stars(70), energy()]);
        map.insert(
            "spacewalk",
            vec![
                stars(30),
                SpawnSpec {
                    profile: "space-debris".into(),
                    mode: SpawnMode::Burst {
                        count: Some(15),
                        origin: SpawnOrigin::Anywhere,
                        velocity: VelocityModel::Drift {
                            x: Span::new(-1.0, 1.0),
                            y: Span::new(-1.0, 1.0),
                        },
                    },
                },
                atmosphere(),
            ],
        );
        map.insert("apollo", vec![stars(40), rocket_exhaust(), energy()]);
        map.insert(
            "moon-landing",
            vec![
                stars(80),
                SpawnSpec {
                    profile: "lunar-dust".into(),
                    mode: SpawnMode::Timed {
                        per_batch: 2,
                        interval_ms: 300.0,
                        duration_ms: 8000.0,
                        origin: SpawnOrigin::Anchor {
                            x_frac: 0.3,
                            y_frac: 0.9,
                            jitter_x: 50.0,
                            jitter_y: 0.0,
                        },
                        velocity: VelocityModel::Drift {
                            x: Span::new(-1.0, 1.0),
                            y: Span::new(-2.0, -0.5),
                        },
                    },
                },
            ],
        );

        map
    }

    pub fn insert(&mut self, segment: &str, entries: Vec<SpawnSpec>) {
        self.segments.insert(segment.to_owned(), entries);
    }

    pub fn get(&self, segment: &str) -> Option<&[SpawnSpec]> {
        self.segments.get(segment).map(Vec::as_slice)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn stars(count: u32) -> SpawnSpec {
    SpawnSpec {
        profile: "stars".into(),
        mode: SpawnMode::Burst {
            count: Some(count),
            origin: SpawnOrigin::Anywhere,
            velocity: VelocityModel::Isotropic,
        },
    }
}

fn rocket_exhaust() -> SpawnSpec {
    SpawnSpec {
        profile: "rocket-exhaust".into(),
        mode: SpawnMode::Timed {
            per_batch: 3,
            interval_ms: 100.0,
            duration_ms: 5000.0,
            origin: SpawnOrigin::Anchor {
                x_frac: 0.2,
                y_frac: 0.8,
                jitter_x: 20.0,
                jitter_y: 10.0,
            },
            velocity: VelocityModel::Drift {
                x: Span::new(-0.5, 0.5),
                y: Span::new(-3.0, -1.0),
            },
        },
    }
}

fn atmosphere() -> SpawnSpec {
    SpawnSpec {
        profile: "atmosphere".into(),
        mode: SpawnMode::Burst {
            count: Some(20),
            origin: SpawnOrigin::Anywhere,
            velocity: VelocityModel::Drift {
                x: Span::new(-0.5, 0.5),
                y: Span::new(-0.5, 0.5),
            },
        },
    }
}

fn energy() -> SpawnSpec {
    SpawnSpec {
        profile: "energy".into(),
        mode: SpawnMode::Timed {
            per_batch: 8,
            interval_ms: 500.0,
            duration_ms: 2500.0,
            origin: SpawnOrigin::Anchor {
                x_frac: 0.5,
                y_frac: 0.5,
                jitter_x: 30.0,
                jitter_y: 30.0,
            },
            velocity: VelocityModel::Ring {
                speed: Span::new(2.0, 4.0),
            },
        },
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    /// Ramp armed at the first tick after the signal; `queued` holds the
    /// new segment's entries until the store has been cleared.
    FadingOut {
        started_ms: Option<f64>,
        queued: Vec<SpawnSpec>,
    },
    Spawning,
}

/// Reacts to segment-change signals and drives the fade → clear →
/// respawn transition.
pub struct SegmentCoordinator {
    map: SegmentMap,
    current: Option<String>,
    phase: Phase,
    /// Timed/orbit sequences owned by the current transition.
    schedules: Vec<SpawnSchedule>,
    fade_ms: f64,
}

impl SegmentCoordinator {
    pub fn new(map: SegmentMap, fade_ms: f64) -> Self {
        Self {
            map,
            current: None,
            phase: Phase::Idle,
            schedules: Vec::new(),
            fade_ms,
        }
    }

    pub fn current_segment(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Whether no transition work remains pending.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle) && self.schedules.is_empty()
    }

    /// Handle a segment-change signal. Re-signalling the current segment
    /// is a no-op; anything else preempts whatever transition was in
    /// flight. Returns whether a transition was started.
    pub fn segment_changed(&mut self, segment: &str) -> bool {
        if self.current.as_deref() == Some(segment) {
            return false;
        }
        self.current = Some(segment.to_owned());
        // Cancellation: every handle owned by the previous transition dies here.
        self.schedules.clear();
        let queued = self.map.get(segment).map(<[_]>::to_vec).unwrap_or_default();
        log::debug!(
            "segment changed to '{}' ({} spawn entries)",
            segment,
            queued.len()
        );
        self.phase = Phase::FadingOut {
            started_ms: None,
            queued,
        };
        true
    }

    /// Drive the transition forward one tick. Cleared particle ids are
    /// appended to `removals` for the outbound frame.
    pub fn tick(&mut self, now_ms: f64, ctx: &mut SpawnCtx, removals: &mut Vec<ParticleId>) {
        match &mut self.phase {
            Phase::Idle => {}
            Phase::FadingOut { started_ms, queued } => {
                let started = *started_ms.get_or_insert(now_ms);
                let elapsed = now_ms - started;
                if ctx.store.is_empty() || elapsed >= self.fade_ms {
                    for particle in ctx.store.clear() {
                        removals.push(particle.id);
                    }
                    let queued = std::mem::take(queued);
                    for spec in &queued {
                        match SpawnSchedule::from_spec(spec, now_ms) {
                            Some(schedule) => self.schedules.push(schedule),
                            None => {
                                if let SpawnMode::Burst {
                                    count,
                                    origin,
                                    velocity,
                                } = &spec.mode
                                {
                                    spawn_burst(ctx, &spec.profile, *count, *origin, velocity, now_ms);
                                }
                            }
                        }
                    }
                    self.phase = if self.schedules.is_empty() {
                        Phase::Idle
                    } else {
                        Phase::Spawning
                    };
                } else {
                    let t = (elapsed / self.fade_ms) as f32;
                    let fade = 1.0 - Easing::QuadOut.apply(t);
                    for particle in ctx.store.iter_mut() {
                        particle.fade = fade;
                    }
                }
            }
            Phase::Spawning => {
                self.schedules.retain_mut(|s| s.fire_due(now_ms, ctx));
                if self.schedules.is_empty() {
                    self.phase = Phase::Idle;
                }
            }
        }
    }

    /// Abandon any transition in flight and forget the current segment.
    pub fn reset(&mut self) {
        self.current = None;
        self.schedules.clear();
        self.phase = Phase::Idle;
    }
}
