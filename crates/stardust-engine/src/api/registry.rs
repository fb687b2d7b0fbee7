use std::collections::HashMap;
use std::sync::Arc;

use crate::components::profile::{Color, EmissionProfile};

/// Registry of named emission profiles.
/// Registration is last-write-wins; lookup failure is not an error —
/// spawn calls against an unknown name simply produce nothing.
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<EmissionProfile>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the built-in profile catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(
            "stars",
            EmissionProfile::new(100)
                .with_size(1.0, 3.0)
                .with_opacity(0.3, 1.0)
                .with_speed(0.1, 0.5)
                .with_colors(vec![
                    Color::hex(0xffffff),
                    Color::hex(0xffeeaa),
                    Color::hex(0xaaeeff),
                ])
                .with_twinkle()
                .immortal(),
        );

        registry.register(
            "rocket-exhaust",
            EmissionProfile::new(50)
                .with_size(2.0, 8.0)
                .with_opacity(0.7, 1.0)
                .with_speed(2.0, 5.0)
                .with_colors(vec![
                    Color::hex(0xff6600),
                    Color::hex(0xffaa00),
                    Color::hex(0xff0000),
                ])
                .with_gravity(-0.1)
                .with_lifetime_ms(2000.0),
        );

        registry.register(
            "satellite-trail",
            EmissionProfile::new(30)
                .with_size(1.0, 3.0)
                .with_opacity(0.5, 0.9)
                .with_speed(1.0, 3.0)
                .with_colors(vec![
                    Color::hex(0x00ff00),
                    Color::hex(0x66ff66),
                    Color::hex(0xffffff),
                ])
                .with_trail()
                .with_lifetime_ms(3000.0),
        );

        registry.register(
            "space-debris",
            EmissionProfile::new(20)
                .with_size(1.0, 4.0)
                .with_opacity(0.4, 0.8)
                .with_speed(0.5, 2.0)
                .with_colors(vec![
                    Color::hex(0x888888),
                    Color::hex(0xbbbbbb),
                    Color::hex(0x666666),
                ])
                .with_rotation()
                .with_lifetime_ms(8000.0),
        );

        registry.register(
            "lunar-dust",
            EmissionProfile::new(40)
                .with_size(1.0, 2.0)
                .with_opacity(0.3, 0.7)
                .with_speed(0.2, 1.0)
                .with_colors(vec![
                    Color::hex(0xcccccc),
                    Color::hex(0xdddddd),
                    Color::hex(0xaaaaaa),
                ])
                .with_gravity(0.05)
                .with_lifetime_ms(5000.0),
        );

        registry.register(
            "atmosphere",
            EmissionProfile::new(60)
                .with_size(2.0, 6.0)
                .with_opacity(0.2, 0.5)
                .with_speed(0.3, 1.5)
                .with_colors(vec![
                    Color::hex(0x87ceeb),
                    Color::hex(0xadd8e6),
                    Color::hex(0xb0e0e6),
                ])
                .with_flow()
                .with_lifetime_ms(6000.0),
        );

        registry.register(
            "energy",
            EmissionProfile::new(25)
                .with_size(3.0, 8.0)
                .with_opacity(0.6, 1.0)
                .with_speed(1.0, 4.0)
                .with_colors(vec![
                    Color::hex(0xffd700),
                    Color::hex(0xffff00),
                    Color::hex(0xffffff),
                ])
                .with_glow()
                .with_lifetime_ms(1500.0),
        );

        registry
    }

    /// Store or overwrite a named profile.
    pub fn register(&mut self, name: &str, profile: EmissionProfile) {
        log::debug!("registering emission profile '{}'", name);
        self.profiles.insert(name.to_owned(), Arc::new(profile));
    }

    /// Look up a profile by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<EmissionProfile>> {
        self.profiles.get(name).cloned()
    }

    /// Register every profile from a JSON object of `name → profile`.
    /// Returns the number of profiles loaded.
    pub fn load_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let parsed: HashMap<String, EmissionProfile> = serde_json::from_str(json)?;
        let count = parsed.len();
        for (name, profile) in parsed {
            self.register(&name, profile);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Drop every registered profile. Live particles keep their templates
    /// alive through their own references.
    pub fn clear(&mut self) {
        self.profiles.clear();
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
