//! Colormaps for the mesh heat map.

use crate::util::f32_to_u8;

/// Available colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Blue to teal to green to yellow.
    #[default]
    Viridis,
    /// Black to red to yellow to white.
    Hot,
    Grayscale,
}

impl Colormap {
    pub const ALL: [Colormap; 3] = [Colormap::Viridis, Colormap::Hot, Colormap::Grayscale];
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Viridis => write!(f, "Viridis"),
            Colormap::Hot => write!(f, "Hot"),
            Colormap::Grayscale => write!(f, "Grayscale"),
        }
    }
}

impl Colormap {
    /// Maps a normalized value in `[0, 1]` to RGBA bytes.
    #[must_use]
    pub fn apply(self, val: f32) -> [u8; 4] {
        let val = val.clamp(0.0, 1.0);
        match self {
            Colormap::Grayscale => {
                let v = f32_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Hot => {
                if val < 1.0 / 3.0 {
                    [f32_to_u8(val * 3.0 * 255.0), 0, 0, 255]
                } else if val < 2.0 / 3.0 {
                    [255, f32_to_u8((val * 3.0 - 1.0) * 255.0), 0, 255]
                } else {
                    [255, 255, f32_to_u8((val * 3.0 - 2.0) * 255.0), 255]
                }
            }
            Colormap::Viridis => {
                let r = f32_to_u8(255.0 * val.powf(2.0));
                let g = f32_to_u8(255.0 * val);
                let b = f32_to_u8(255.0 * (1.0 - val));
                [r, g, b, 255]
            }
        }
    }
}
