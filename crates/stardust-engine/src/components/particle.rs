use std::sync::Arc;

use glam::Vec2;

use crate::api::types::ParticleId;
use crate::components::profile::{Color, EmissionProfile, Lifetime};

/// A single simulated particle.
///
/// Created only by the spawner, advanced only by the integrator, and
/// faded/cleared only by the segment coordinator. The `profile` back
/// reference drives behavior dispatch each tick; holding the `Arc` keeps
/// the template alive for as long as the particle is.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    /// Position in viewport units.
    pub pos: Vec2,
    /// Velocity in units-per-frame at the reference rate.
    pub vel: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Angular velocity, degrees-per-frame. Zero unless the profile's
    /// `rotation` flag was set at creation.
    pub rotation_speed: f32,
    pub size: f32,
    pub opacity: f32,
    /// Transition fade multiplier in [0, 1]. Written only by the segment
    /// coordinator during fade-out; composed with `opacity` in the frame
    /// snapshot so it never fights the twinkle oscillation.
    pub fade: f32,
    /// Fixed at creation.
    pub color: Color,
    /// Oscillation phase offset, sampled at creation. Keeps twinkle and
    /// flow de-synchronized across particles without deriving anything
    /// from the id representation.
    pub phase: f32,
    /// Accumulated elapsed time since creation, ms.
    pub age: f64,
    /// Absolute expiry instant in ms, or `None` for immortal particles.
    /// Once finite, never decreased.
    pub expires_at: Option<f64>,
    pub profile: Arc<EmissionProfile>,
}

impl Particle {
    /// Whether this particle has outlived a finite lifetime at `now_ms`.
    pub fn is_expired(&self, now_ms: f64) -> bool {
        match self.expires_at {
            Some(at) => now_ms > at,
            None => false,
        }
    }

    /// Absolute expiry instant for a particle created at `now_ms`.
    pub fn expiry_for(lifetime: Lifetime, now_ms: f64) -> Option<f64> {
        match lifetime {
            Lifetime::Never => None,
            Lifetime::Finite(ms) => Some(now_ms + ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_particle(expires_at: Option<f64>) -> Particle {
        Particle {
            id: ParticleId(1),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: 2.0,
            opacity: 1.0,
            fade: 1.0,
            color: Color::WHITE,
            phase: 0.0,
            age: 0.0,
            expires_at,
            profile: Arc::new(EmissionProfile::default()),
        }
    }

    #[test]
    fn finite_lifetime_expires_after_instant() {
        let p = test_particle(Some(2000.0));
        assert!(!p.is_expired(2000.0));
        assert!(p.is_expired(2001.0));
    }

    #[test]
    fn immortal_never_expires() {
        let p = test_particle(None);
        assert!(!p.is_expired(f64::MAX));
    }

    #[test]
    fn expiry_from_lifetime() {
        assert_eq!(Particle::expiry_for(Lifetime::Never, 500.0), None);
        assert_eq!(
            Particle::expiry_for(Lifetime::Finite(2000.0), 500.0),
            Some(2500.0)
        );
    }
}
