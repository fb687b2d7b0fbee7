//! Pure per-tick particle state evolution.
//!
//! `advance` is the only place kinematic and temporal particle state
//! changes. It never fails: behavior flags a profile does not set are
//! simply inert, and the result only reports whether the particle
//! survived the tick.

use glam::Vec2;

use crate::api::types::Viewport;
use crate::components::particle::Particle;
use crate::core::time::frame_scale;

/// Distance past the viewport edge at which a coordinate wraps to the
/// opposite side. Keeps immortal populations (star fields) perpetually
/// on-screen without the store ever growing.
pub const WRAP_MARGIN: f32 = 50.0;

/// Outcome of advancing one particle by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Expired,
}

/// Advance `particle` by `dt_ms` at absolute time `now_ms`.
pub fn advance(particle: &mut Particle, dt_ms: f64, now_ms: f64, viewport: Viewport) -> Step {
    if particle.is_expired(now_ms) {
        return Step::Expired;
    }

    particle.age += dt_ms;
    let scale = frame_scale(dt_ms);
    let behavior = particle.profile.behavior;

    // Turbulence is recomputed from wall-clock time each tick; it shifts
    // this tick's motion but is never folded back into the velocity.
    let mut flow = Vec2::ZERO;
    if behavior.flow {
        let t = now_ms * 0.001 + particle.phase as f64;
        flow = Vec2::new((t.sin() * 0.1) as f32, ((t * 1.3).cos() * 0.1) as f32);
    }

    particle.pos += (particle.vel + flow) * scale;

    if let Some(gravity) = behavior.gravity {
        particle.vel.y += gravity * scale;
    }

    if behavior.rotation {
        particle.rotation += particle.rotation_speed * scale;
    }

    if behavior.twinkle {
        let span = particle.profile.opacity;
        let t = (now_ms + particle.phase as f64 * 100.0) * 0.003;
        particle.opacity = span.min + (span.max - span.min) * (0.5 + 0.5 * t.sin()) as f32;
    }

    wrap(&mut particle.pos, viewport);

    Step::Continue
}

/// Teleport a coordinate that left the bounds-plus-margin box to the
/// opposite edge.
fn wrap(pos: &mut Vec2, viewport: Viewport) {
    if pos.x < -WRAP_MARGIN {
        pos.x = viewport.width + WRAP_MARGIN;
    } else if pos.x > viewport.width + WRAP_MARGIN {
        pos.x = -WRAP_MARGIN;
    }
    if pos.y < -WRAP_MARGIN {
        pos.y = viewport.height + WRAP_MARGIN;
    } else if pos.y > viewport.height + WRAP_MARGIN {
        pos.y = -WRAP_MARGIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ParticleId;
    use crate::components::profile::{Color, EmissionProfile};
    use std::sync::Arc;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);
    const DT: f64 = 1000.0 / 60.0;

    fn particle(profile: EmissionProfile, expires_at: Option<f64>) -> Particle {
        Particle {
            id: ParticleId(7),
            pos: Vec2::new(400.0, 300.0),
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: 2.0,
            opacity: 0.8,
            fade: 1.0,
            color: Color::WHITE,
            phase: 42.0,
            age: 0.0,
            expires_at,
            profile: Arc::new(profile),
        }
    }

    #[test]
    fn expires_strictly_after_instant() {
        let mut p = particle(EmissionProfile::default(), Some(2000.0));
        assert_eq!(advance(&mut p, DT, 2000.0, VIEWPORT), Step::Continue);
        assert_eq!(advance(&mut p, DT, 2001.0, VIEWPORT), Step::Expired);
    }

    #[test]
    fn immortal_survives_any_instant() {
        let mut p = particle(EmissionProfile::default(), None);
        assert_eq!(advance(&mut p, DT, 1.0e12, VIEWPORT), Step::Continue);
    }

    #[test]
    fn position_integrates_velocity_at_reference_rate() {
        let mut p = particle(EmissionProfile::default(), None);
        p.vel = Vec2::new(2.0, -1.0);
        // One exact 60 Hz frame: scale is 1, so pos moves by exactly vel.
        advance(&mut p, DT, 100.0, VIEWPORT);
        assert!((p.pos.x - 402.0).abs() < 1e-3);
        assert!((p.pos.y - 299.0).abs() < 1e-3);
    }

    #[test]
    fn gravity_accumulates_in_velocity() {
        let g = -0.1;
        let mut p = particle(EmissionProfile::new(1).with_gravity(g), None);
        let n = 20;
        for i in 0..n {
            advance(&mut p, DT, 100.0 + DT * i as f64, VIEWPORT);
        }
        let expected = g * n as f32 * frame_scale(DT);
        assert!(
            (p.vel.y - expected).abs() < 1e-4,
            "vy = {}, expected {}",
            p.vel.y,
            expected
        );
    }

    #[test]
    fn rotation_only_with_flag() {
        let mut p = particle(EmissionProfile::new(1).with_rotation(), None);
        p.rotation_speed = 1.5;
        advance(&mut p, DT, 100.0, VIEWPORT);
        assert!((p.rotation - 1.5).abs() < 1e-3);

        let mut q = particle(EmissionProfile::default(), None);
        q.rotation_speed = 1.5;
        advance(&mut q, DT, 100.0, VIEWPORT);
        assert_eq!(q.rotation, 0.0);
    }

    #[test]
    fn twinkle_stays_within_opacity_span() {
        let mut p = particle(
            EmissionProfile::new(1).with_opacity(0.3, 1.0).with_twinkle(),
            None,
        );
        for i in 0..600 {
            advance(&mut p, DT, DT * i as f64, VIEWPORT);
            assert!(
                (0.3..=1.0).contains(&p.opacity),
                "opacity out of span: {}",
                p.opacity
            );
        }
    }

    #[test]
    fn flow_perturbs_position_without_accumulating_velocity() {
        let mut p = particle(EmissionProfile::new(1).with_flow(), None);
        let before = p.vel;
        for i in 0..100 {
            advance(&mut p, DT, DT * i as f64, VIEWPORT);
        }
        assert_eq!(p.vel, before, "flow must not fold into velocity");
        assert_ne!(p.pos, Vec2::new(400.0, 300.0), "flow must move the particle");
    }

    #[test]
    fn wraps_left_edge_to_right() {
        let mut p = particle(EmissionProfile::default(), None);
        p.pos.x = -60.0;
        advance(&mut p, DT, 100.0, VIEWPORT);
        assert_eq!(p.pos.x, 850.0);
    }

    #[test]
    fn wraps_all_four_edges() {
        let cases = [
            (Vec2::new(-60.0, 300.0), Vec2::new(850.0, 300.0)),
            (Vec2::new(860.0, 300.0), Vec2::new(-50.0, 300.0)),
            (Vec2::new(400.0, -70.0), Vec2::new(400.0, 650.0)),
            (Vec2::new(400.0, 700.0), Vec2::new(400.0, -50.0)),
        ];
        for (start, expected) in cases {
            let mut p = particle(EmissionProfile::default(), None);
            p.pos = start;
            advance(&mut p, DT, 100.0, VIEWPORT);
            assert_eq!(p.pos, expected, "from {:?}", start);
        }
    }

    #[test]
    fn coordinates_always_inside_margin_box() {
        let mut p = particle(EmissionProfile::default(), None);
        p.vel = Vec2::new(8.0, 6.0);
        for i in 0..2000 {
            advance(&mut p, DT, DT * i as f64, VIEWPORT);
            assert!(p.pos.x >= -WRAP_MARGIN && p.pos.x <= VIEWPORT.width + WRAP_MARGIN);
            assert!(p.pos.y >= -WRAP_MARGIN && p.pos.y <= VIEWPORT.height + WRAP_MARGIN);
        }
    }

    #[test]
    fn age_accumulates() {
        let mut p = particle(EmissionProfile::default(), None);
        advance(&mut p, 16.0, 100.0, VIEWPORT);
        advance(&mut p, 16.0, 116.0, VIEWPORT);
        assert!((p.age - 32.0).abs() < 1e-9);
    }
}
