//! Visualization helpers for the mesh heat map.

mod colormap;
mod texture;

pub use colormap::Colormap;
pub use texture::grid_image;
