use serde::{Deserialize, Serialize};

use crate::core::rng::Rng;

/// Closed numeric range, sampled uniformly per particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in [min, max).
    pub fn sample(&self, rng: &mut Rng) -> f32 {
        rng.range_f32(self.min, self.max)
    }
}

/// RGB color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a color from a packed `0xRRGGBB` value.
    pub fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
        }
    }

    /// Pick one color from a palette. Falls back to white on an empty
    /// palette, though registered profiles always carry at least one entry.
    pub fn pick(palette: &[Color], rng: &mut Rng) -> Color {
        if palette.is_empty() {
            return Color::WHITE;
        }
        palette[rng.next_int(palette.len() as u32) as usize]
    }
}

/// How long a particle lives after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// Removed only by an explicit clear, never by expiry.
    Never,
    /// Expires this many milliseconds after creation.
    Finite(f64),
}

/// Behavioral traits of a particle class. All independently combinable.
/// `trail` and `glow` are rendering hints only — the simulation ignores
/// them and forwards them in the frame snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Behavior {
    /// Signed vertical acceleration, units-per-frame² at the reference rate.
    #[serde(default)]
    pub gravity: Option<f32>,
    /// Particles get an angular velocity at creation.
    #[serde(default)]
    pub rotation: bool,
    /// Periodic opacity oscillation within the profile's opacity span.
    #[serde(default)]
    pub twinkle: bool,
    /// Turbulent sinusoidal velocity perturbation, recomputed each tick.
    #[serde(default)]
    pub flow: bool,
    #[serde(default)]
    pub trail: bool,
    #[serde(default)]
    pub glow: bool,
}

/// Immutable template describing how a class of particles is created and
/// how it behaves over time. Registered profiles are shared behind an `Arc`
/// so live particles keep their template alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionProfile {
    /// Default batch size when a spawn does not override it.
    pub count: u32,
    pub size: Span,
    pub opacity: Span,
    /// Initial speed magnitude span, units-per-frame at the reference rate.
    pub speed: Span,
    /// Non-empty palette; one entry is chosen per particle.
    pub colors: Vec<Color>,
    pub lifetime: Lifetime,
    #[serde(default)]
    pub behavior: Behavior,
}

impl Default for EmissionProfile {
    fn default() -> Self {
        Self {
            count: 10,
            size: Span::new(1.0, 3.0),
            opacity: Span::new(0.5, 1.0),
            speed: Span::new(0.5, 2.0),
            colors: vec![Color::WHITE],
            lifetime: Lifetime::Finite(3000.0),
            behavior: Behavior::default(),
        }
    }
}

impl EmissionProfile {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    // -- Builder pattern --

    pub fn with_size(mut self, min: f32, max: f32) -> Self {
        self.size = Span::new(min, max);
        self
    }

    pub fn with_opacity(mut self, min: f32, max: f32) -> Self {
        self.opacity = Span::new(min, max);
        self
    }

    pub fn with_speed(mut self, min: f32, max: f32) -> Self {
        self.speed = Span::new(min, max);
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_lifetime_ms(mut self, ms: f64) -> Self {
        self.lifetime = Lifetime::Finite(ms);
        self
    }

    /// Particles from this profile never expire.
    pub fn immortal(mut self) -> Self {
        self.lifetime = Lifetime::Never;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.behavior.gravity = Some(gravity);
        self
    }

    pub fn with_rotation(mut self) -> Self {
        self.behavior.rotation = true;
        self
    }

    pub fn with_twinkle(mut self) -> Self {
        self.behavior.twinkle = true;
        self
    }

    pub fn with_flow(mut self) -> Self {
        self.behavior.flow = true;
        self
    }

    pub fn with_trail(mut self) -> Self {
        self.behavior.trail = true;
        self
    }

    pub fn with_glow(mut self) -> Self {
        self.behavior.glow = true;
        self
    }
}
