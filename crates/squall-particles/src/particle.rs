//! Renderer-facing point data

use bytemuck::{Pod, Zeroable};
use squall_core::{Rgba, Vec2};

use crate::disintegrate::DisintegrationParticle;

/// One point to draw. 32 bytes, two vec4 rows.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub pos_size: [f32; 4], // xy = screen px, z = 0, w = size px
    pub color: [f32; 4],    // rgba, 0..1
}

impl PointInstance {
    pub fn new(position: Vec2, size: f32, color: Rgba) -> Self {
        Self {
            pos_size: [position.x, position.y, 0.0, size],
            color: color.to_f32(),
        }
    }

    pub fn from_fragment(p: &DisintegrationParticle) -> Self {
        Self::new(Vec2::new(p.x, p.y), p.size, p.color.with_alpha(p.alpha))
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.pos_size[0], self.pos_size[1])
    }

    pub fn size(&self) -> f32 {
        self.pos_size[3]
    }
}

/// Pack screen positions into `out`, cycling through `sizes` by index.
///
/// `out` is cleared first; its allocation is reused.
pub fn pack_points(positions: &[Vec2], sizes: &[f32], color: Rgba, out: &mut Vec<PointInstance>) {
    out.clear();
    out.reserve(positions.len());
    for (i, p) in positions.iter().enumerate() {
        let size = if sizes.is_empty() {
            1.0
        } else {
            sizes[i % sizes.len()]
        };
        out.push(PointInstance::new(*p, size, color));
    }
}

/// Pack every visible fragment of a disintegration
pub fn pack_fragments<'a>(
    fragments: impl IntoIterator<Item = &'a DisintegrationParticle>,
    out: &mut Vec<PointInstance>,
) {
    out.clear();
    out.extend(
        fragments
            .into_iter()
            .filter(|p| p.alpha > 0)
            .map(PointInstance::from_fragment),
    );
}
