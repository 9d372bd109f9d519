//! wgpu viewer for shell clouds.
//!
//! Displays a continuously rotating cloud of small triangles produced by
//! `shellcloud-core`, and rebuilds it as parameters are edited.
//!
//! # Features
//! - One GPU mesh per shell, colored by shell index
//! - Wireframe drawn as line lists, no optional GPU features needed
//! - Orbit camera with auto-rotation and damping
//! - Keyboard and gamepad parameter editing, coalesced per frame

pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod renderer;
pub mod scene;

pub use camera::OrbitCamera;
pub use config::{CameraConfig, Cli, ViewerConfig};
pub use controls::{Control, EditQueue};
pub use error::{ConfigError, RendererError};
pub use renderer::Renderer;
pub use scene::{GpuScene, MeshStore};

use shellcloud_core::Material;

/// Camera uniform: combined view-projection matrix (column-major).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: glam::Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

/// Per-mesh material uniform: flat RGBA color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
}

impl MaterialUniform {
    /// Linear-space color for an sRGB surface.
    pub fn from_material(material: &Material) -> Self {
        let [r, g, b] = material.color.to_linear_f32();
        Self {
            color: [r, g, b, 1.0],
        }
    }
}

/// Line-list indices outlining every triangle of a flat triangle list.
///
/// Each triangle `t` contributes edges `(3t, 3t+1)`, `(3t+1, 3t+2)` and
/// `(3t+2, 3t)`.
pub fn edge_indices(triangle_count: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(triangle_count as usize * 6);
    for t in 0..triangle_count {
        let a = t * 3;
        indices.extend_from_slice(&[a, a + 1, a + 1, a + 2, a + 2, a]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
    }

    #[test]
    fn edges_outline_each_triangle() {
        assert_eq!(edge_indices(0), Vec::<u32>::new());
        assert_eq!(
            edge_indices(2),
            vec![0, 1, 1, 2, 2, 0, 3, 4, 4, 5, 5, 3]
        );
    }

    #[test]
    fn material_color_is_opaque() {
        let uniform = MaterialUniform::from_material(&Material::for_shell(0, true));
        assert_eq!(uniform.color[3], 1.0);
        assert!((uniform.color[0] - 1.0).abs() < 1e-6);
        assert_eq!(uniform.color[1], 0.0);
    }
}
