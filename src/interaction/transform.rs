use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Multiplier applied by one zoom-in command; zoom-out uses its inverse.
    pub button_factor: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 4.0,
            button_factor: 1.2,
        }
    }
}

impl ZoomConfig {
    fn bounds(&self) -> (f32, f32) {
        let min = if self.min_scale.is_finite() && self.min_scale > 0.0 {
            self.min_scale
        } else {
            0.1
        };
        let max = if self.max_scale.is_finite() {
            self.max_scale.max(min)
        } else {
            min.max(4.0)
        };
        (min, max)
    }

    fn step(&self) -> f32 {
        if self.button_factor.is_finite() && self.button_factor > 1.0 {
            self.button_factor
        } else {
            1.2
        }
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        let (min, max) = self.bounds();
        if scale.is_finite() {
            scale.clamp(min, max)
        } else {
            min
        }
    }
}

/// Screen = world * scale + translate, in canvas-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.translate) / self.scale
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.translate
    }

    /// The only place `scale` changes. Keeps the world point under `anchor`
    /// fixed on screen. Returns whether the transform changed.
    pub fn zoom_by(&mut self, factor: f32, anchor: Vec2, config: &ZoomConfig) -> bool {
        if !factor.is_finite() || factor <= 0.0 || !anchor.x.is_finite() || !anchor.y.is_finite()
        {
            return false;
        }

        let scale = config.clamp_scale(self.scale * factor);
        if scale == self.scale {
            return false;
        }

        let world_before = self.screen_to_world(anchor);
        self.scale = scale;
        self.translate = anchor - world_before * scale;
        true
    }

    pub fn zoom_in(&mut self, viewport: Vec2, config: &ZoomConfig) -> bool {
        self.zoom_by(config.step(), viewport * 0.5, config)
    }

    pub fn zoom_out(&mut self, viewport: Vec2, config: &ZoomConfig) -> bool {
        self.zoom_by(1.0 / config.step(), viewport * 0.5, config)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.translate += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let config = ZoomConfig::default();
        let mut transform = ViewTransform::default();
        let anchor = vec2(120.0, 80.0);
        let world = transform.screen_to_world(anchor);

        assert!(transform.zoom_by(2.0, anchor, &config));

        let screen = transform.world_to_screen(world);
        assert!((screen - anchor).length() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let config = ZoomConfig::default();
        let mut transform = ViewTransform::default();

        assert!(transform.zoom_by(100.0, Vec2::ZERO, &config));
        assert_eq!(transform.scale, 4.0);
        assert!(!transform.zoom_by(2.0, Vec2::ZERO, &config));

        transform.zoom_by(0.0001, Vec2::ZERO, &config);
        assert_eq!(transform.scale, 0.1);
    }

    #[test]
    fn malformed_factors_are_ignored() {
        let config = ZoomConfig::default();
        let mut transform = ViewTransform::default();

        assert!(!transform.zoom_by(f32::NAN, Vec2::ZERO, &config));
        assert!(!transform.zoom_by(-2.0, Vec2::ZERO, &config));
        assert_eq!(transform, ViewTransform::default());
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        let config = ZoomConfig {
            min_scale: 2.0,
            max_scale: 1.0,
            button_factor: 1.2,
        };

        assert_eq!(config.clamp_scale(0.5), 2.0);
        assert_eq!(config.clamp_scale(8.0), 2.0);
    }
}
