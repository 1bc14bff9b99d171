//! Color definitions for resource types and agent states

use crate::core::types::{ResourceType, TypePair};

/// RGBA color (0.0 to 1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Darken color by a factor (0.0 = black, 1.0 = unchanged)
    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Linear blend; `t = 0` gives `self`, `t = 1` gives `other`
    pub fn mix(&self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}

/// Background color of a shot
pub const BACKGROUND: Color = Color::new(0.1, 0.1, 0.12, 1.0);

/// Bond lines
pub const BOND: Color = Color::new(0.75, 0.75, 0.75, 1.0);

/// Outline of agents that acted during the cycle
pub const ACTED_OUTLINE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Base color of a resource type
pub fn resource_color(kind: ResourceType) -> Color {
    match kind {
        ResourceType::A => Color::new(0.9, 0.2, 0.2, 1.0), // Red
        ResourceType::B => Color::new(0.2, 0.6, 0.9, 1.0), // Blue
        ResourceType::C => Color::new(0.3, 0.8, 0.3, 1.0), // Green
        ResourceType::D => Color::new(0.9, 0.8, 0.2, 1.0), // Yellow
        ResourceType::E => Color::new(0.7, 0.4, 0.9, 1.0), // Violet
        ResourceType::F => Color::new(0.9, 0.5, 0.1, 1.0), // Orange
        ResourceType::G => Color::new(0.3, 0.8, 0.8, 1.0), // Teal
    }
}

/// Agents lean toward the color of what they produce
pub fn type_pair_color(kind: TypePair) -> Color {
    resource_color(kind.input).mix(resource_color(kind.output), 0.65)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceType::{A, B};

    #[test]
    fn test_type_pairs_are_distinguishable() {
        assert_ne!(type_pair_color(TypePair::new(A, B)), type_pair_color(TypePair::new(B, A)));
    }

    #[test]
    fn test_rgba8_conversion() {
        assert_eq!(Color::new(1.0, 0.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
        assert_eq!(BACKGROUND.darken(0.0).to_rgba8()[..3], [0, 0, 0]);
    }
}
