//! Heat map image generation for mesh grids.

use egui::ColorImage;
use ndarray::Array2;

use crate::util::f64_to_f32;
use crate::viewer::Colormap;

/// Renders `grid[[i, j]]` (azimuth row `i`, zenith column `j`) as an image.
///
/// Zenith runs left to right and azimuth bottom to top, so row 0 of the
/// grid ends up on the last image row. Non-finite cells are drawn black.
#[must_use]
pub fn grid_image(grid: &Array2<f64>, colormap: Colormap) -> ColorImage {
    let (rows, cols) = grid.dim();
    let finite = || grid.iter().copied().filter(|v| v.is_finite());
    let min = finite().fold(f64::INFINITY, f64::min);
    let max = finite().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let mut pixels = vec![0u8; rows * cols * 4];
    for ((i, j), &v) in grid.indexed_iter() {
        let rgba = if !v.is_finite() {
            [0, 0, 0, 255]
        } else if span > f64::EPSILON {
            colormap.apply(f64_to_f32((v - min) / span))
        } else {
            colormap.apply(0.0)
        };
        let offset = ((rows - 1 - i) * cols + j) * 4;
        pixels[offset..offset + 4].copy_from_slice(&rgba);
    }
    ColorImage::from_rgba_unmultiplied([cols, rows], &pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_is_drawn_at_the_bottom() {
        let grid = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        let image = grid_image(&grid, Colormap::Grayscale);
        assert_eq!(image.size, [2, 2]);
        // bottom-left pixel holds the maximum
        assert_eq!(image.pixels[2], egui::Color32::WHITE);
        assert_eq!(image.pixels[0], egui::Color32::BLACK);
    }

    #[test]
    fn test_nan_is_black() {
        let grid = Array2::from_shape_vec((1, 2), vec![f64::NAN, 2.0]).unwrap();
        let image = grid_image(&grid, Colormap::Hot);
        assert_eq!(image.pixels[0], egui::Color32::BLACK);
    }
}
