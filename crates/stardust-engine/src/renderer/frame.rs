use bytemuck::{Pod, Zeroable};

use crate::api::types::ParticleId;
use crate::components::particle::Particle;

/// Per-particle visual state written once per tick for the rendering
/// collaborator. Flat 40-byte stride so a host can hand the whole
/// snapshot to a GPU buffer or read it across a WASM boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ParticleInstance {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Opacity after the transition fade multiplier is applied.
    pub opacity: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Rendering hint bits (`HINT_TRAIL`, `HINT_GLOW`).
    pub hints: u32,
}

impl ParticleInstance {
    pub const WORDS: usize = 10;
    pub const STRIDE_BYTES: usize = Self::WORDS * 4;

    pub const HINT_TRAIL: u32 = 1 << 0;
    pub const HINT_GLOW: u32 = 1 << 1;

    pub fn from_particle(particle: &Particle) -> Self {
        let behavior = particle.profile.behavior;
        let mut hints = 0;
        if behavior.trail {
            hints |= Self::HINT_TRAIL;
        }
        if behavior.glow {
            hints |= Self::HINT_GLOW;
        }
        Self {
            id: particle.id.0,
            x: particle.pos.x,
            y: particle.pos.y,
            size: particle.size,
            opacity: particle.opacity * particle.fade,
            rotation: particle.rotation,
            r: particle.color.r,
            g: particle.color.g,
            b: particle.color.b,
            hints,
        }
    }
}

/// One tick's outbound snapshot: every live particle's visual state plus
/// the ids destroyed since the previous tick.
pub struct FrameBuffer {
    pub instances: Vec<ParticleInstance>,
    pub removals: Vec<ParticleId>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            removals: Vec::new(),
        }
    }

    /// Reset for a new tick.
    pub fn begin_frame(&mut self) {
        self.instances.clear();
        self.removals.clear();
    }

    pub fn push(&mut self, instance: ParticleInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for shared-memory reads.
    pub fn instances_ptr(&self) -> *const u32 {
        self.instances.as_ptr() as *const u32
    }
}

impl Default for FrameBuffer {
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

    #[test]
    fn instance_is_ten_words() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 40);
        assert_eq!(ParticleInstance::STRIDE_BYTES, 40);
    }

    #[test]
    fn instance_carries_faded_opacity_and_hints() {
        let particle = Particle {
            id: ParticleId(9),
            pos: Vec2::new(10.0, 20.0),
            vel: Vec2::ZERO,
            rotation: 45.0,
            rotation_speed: 0.0,
            size: 3.0,
            opacity: 0.8,
            fade: 0.5,
            color: Color::hex(0xff6600),
            phase: 0.0,
            age: 0.0,
            expires_at: None,
            profile: Arc::new(EmissionProfile::new(1).with_trail().with_glow()),
        };
        let instance = ParticleInstance::from_particle(&particle);
        assert_eq!(instance.id, 9);
        assert!((instance.opacity - 0.4).abs() < 1e-6);
        assert_eq!(
            instance.hints,
            ParticleInstance::HINT_TRAIL | ParticleInstance::HINT_GLOW
        );
    }

    #[test]
    fn begin_frame_resets_both_lists() {
        let mut frame = FrameBuffer::new();
        frame.push(ParticleInstance::default());
        frame.removals.push(ParticleId(1));
        frame.begin_frame();
        assert_eq!(frame.instance_count(), 0);
        assert!(frame.removals.is_empty());
    }
}
