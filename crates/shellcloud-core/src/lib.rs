//! Shell Cloud Generation
//!
//! Procedurally generates a randomized cloud of small triangles arranged in
//! concentric spherical shells around the origin.
//!
//! # Budget Distribution
//!
//! A total triangle budget is split across `shell_count` shells with
//! weights `1, 2, ..., shell_count`, innermost first. Outer shells are both
//! larger and denser:
//!
//! ```text
//! 700 triangles, 7 shells → [25, 50, 75, 100, 125, 150, 175]
//! ```
//!
//! # Sampling
//!
//! Each triangle is three vertices jittered around one random center,
//! sampled in spherical coordinates within its shell's radial band. See
//! [`sampler`] for the exact distribution.
//!
//! # Rebuilds
//!
//! [`CloudBuilder`] owns the live [`CloudState`] and replaces it atomically
//! through a [`Scene`] whenever parameters change. Invalid parameters are
//! rejected before anything visible changes.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use shellcloud_core::{CloudBuilder, GenerationParameters, MemoryScene};
//!
//! let mut scene = MemoryScene::new();
//! let params = GenerationParameters::default().with_triangle_count(700);
//! let mut builder =
//!     CloudBuilder::build_initial(&mut scene, params, StdRng::seed_from_u64(1)).unwrap();
//! assert_eq!(scene.attached_count(), 7);
//!
//! // Rejected: the previous cloud stays on display
//! assert!(builder.rebuild(&mut scene, params.with_sizes(3.0, 1.0)).is_err());
//! assert_eq!(scene.attached_count(), 7);
//! ```

mod builder;
mod error;
mod material;
mod params;
mod quota;
pub mod sampler;
mod scene;
mod shell;

pub use builder::{CloudBuilder, CloudState, RebuildReport, ShellMesh};
pub use error::{Error, Result, SceneError};
pub use material::{shell_color, Material, Rgb, SHELL_PALETTE};
pub use params::{
    GenerationParameters, ParameterEdit, SizeRange, DEFAULT_OUTER_RADIUS, DEFAULT_SHELL_COUNT,
    DEFAULT_SIZE_MAX, DEFAULT_SIZE_MIN, DEFAULT_TRIANGLE_COUNT, MAX_TRIANGLE_COUNT,
};
pub use quota::{shell_quota, shell_quotas, shell_weight, shell_weights, weight_sum};
pub use sampler::{
    generate_shell, sample_cloud, sample_triangle, GeometryBuffer, SampledTriangle, ShellSampler,
};
pub use scene::{MemoryScene, MeshId, Scene, StoredMesh};
pub use shell::ShellBand;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_covers_default_shells() {
        assert_eq!(SHELL_PALETTE.len(), DEFAULT_SHELL_COUNT as usize);
    }
}
