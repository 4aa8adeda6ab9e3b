//! Value-over-lifetime helpers

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp into [0, 1]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
