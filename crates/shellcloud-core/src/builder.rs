//! Cloud orchestration and atomic rebuild-and-replace.
//!
//! A rebuild runs in three strictly ordered steps, all synchronous:
//!
//! 1. Validate the snapshot, sample every shell and construct its mesh.
//!    Nothing visible changes; on failure the live cloud stays as is.
//! 2. Detach and dispose every mesh of the previous cloud.
//! 3. Attach every mesh of the new cloud.
//!
//! Since the frame loop only reads the scene between calls, no frame can
//! show both clouds or neither.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::{Error, Result};
use crate::material::Material;
use crate::params::{GenerationParameters, ParameterEdit};
use crate::sampler::ShellSampler;
use crate::scene::Scene;

/// One shell's mesh as tracked by the builder.
#[derive(Debug)]
pub struct ShellMesh<M> {
    pub shell_index: u32,
    pub triangle_count: usize,
    pub material: Material,
    mesh: M,
}

impl<M> ShellMesh<M> {
    /// The scene handle. Only valid until the next rebuild.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.triangle_count * 3
    }
}

/// The complete set of shell meshes produced by one build.
#[derive(Debug)]
pub struct CloudState<M> {
    params: Option<GenerationParameters>,
    shells: Vec<ShellMesh<M>>,
}

impl<M> Default for CloudState<M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<M> CloudState<M> {
    /// State before the first successful build.
    pub fn empty() -> Self {
        Self {
            params: None,
            shells: Vec::new(),
        }
    }

    /// Parameters this state was built from.
    pub fn params(&self) -> Option<&GenerationParameters> {
        self.params.as_ref()
    }

    pub fn shells(&self) -> &[ShellMesh<M>] {
        &self.shells
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.shells.iter().map(|s| s.triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.shells.iter().map(ShellMesh::vertex_count).sum()
    }
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildReport {
    /// Number of successful rebuilds so far, this one included
    pub generation: u64,
    pub shells: usize,
    pub triangles: usize,
    /// Meshes of the previous cloud released cleanly
    pub disposed: usize,
    /// Meshes of the previous cloud whose release failed
    pub disposal_failures: usize,
    pub elapsed: Duration,
}

/// Owns the live [`CloudState`] and replaces it on parameter changes.
pub struct CloudBuilder<M, R> {
    rng: R,
    live: CloudState<M>,
    generation: u64,
}

impl<M, R: Rng> CloudBuilder<M, R> {
    /// Builder with no cloud yet.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            live: CloudState::empty(),
            generation: 0,
        }
    }

    /// Startup entry point: build the first cloud and make it visible.
    pub fn build_initial<S>(scene: &mut S, params: GenerationParameters, rng: R) -> Result<Self>
    where
        S: Scene<Mesh = M>,
    {
        let mut builder = Self::new(rng);
        builder.rebuild(scene, params)?;
        Ok(builder)
    }

    /// The cloud currently on display.
    pub fn state(&self) -> &CloudState<M> {
        &self.live
    }

    /// Parameters of the cloud currently on display.
    pub fn params(&self) -> Option<&GenerationParameters> {
        self.live.params()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the random source used by later builds.
    pub fn reseed(&mut self, rng: R) {
        self.rng = rng;
    }

    /// Produce a new cloud whose meshes exist in `scene` but are not
    /// attached. The live cloud is not touched.
    pub fn build<S>(&mut self, scene: &mut S, params: GenerationParameters) -> Result<CloudState<M>>
    where
        S: Scene<Mesh = M>,
    {
        let sampler = ShellSampler::new(params)?;
        check_mesh_limit(scene, &sampler)?;

        // Sample and upload shell by shell so only one shell's geometry is
        // held in memory at a time
        let mut shells = Vec::with_capacity(sampler.quotas().len());
        for shell_index in 0..params.shell_count {
            match self.build_shell(scene, &sampler, shell_index) {
                Ok(shell) => shells.push(shell),
                Err(e) => {
                    let partial = CloudState {
                        params: Some(params),
                        shells,
                    };
                    release(scene, partial);
                    return Err(e);
                }
            }
        }

        Ok(CloudState {
            params: Some(params),
            shells,
        })
    }

    fn build_shell<S>(
        &mut self,
        scene: &mut S,
        sampler: &ShellSampler,
        shell_index: u32,
    ) -> Result<ShellMesh<M>>
    where
        S: Scene<Mesh = M>,
    {
        let geometry = sampler.generate_shell(&mut self.rng, shell_index)?;
        let triangle_count = geometry.triangle_count();
        tracing::debug!(
            shell = shell_index,
            triangles = triangle_count,
            "sampled shell"
        );

        let material = Material::for_shell(shell_index, sampler.params().wireframe);
        let mesh = scene
            .create_mesh(geometry, material)
            .map_err(|source| Error::MeshConstruction {
                shell: shell_index,
                source,
            })?;

        Ok(ShellMesh {
            shell_index,
            triangle_count,
            material,
            mesh,
        })
    }

    /// Build a cloud from `params` and swap it in for the live one.
    ///
    /// Invalid parameters and construction failures leave the live cloud
    /// exactly as it was. Disposal failures of the old cloud are logged
    /// and counted but do not stop the new cloud from being attached.
    pub fn rebuild<S>(&mut self, scene: &mut S, params: GenerationParameters) -> Result<RebuildReport>
    where
        S: Scene<Mesh = M>,
    {
        let start = Instant::now();

        let next = match self.build(scene, params) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("Rebuild rejected, keeping current cloud: {}", e);
                return Err(e);
            }
        };

        let previous = std::mem::replace(&mut self.live, next);
        let (disposed, disposal_failures) = release(scene, previous);

        for shell in &self.live.shells {
            scene.attach(&shell.mesh);
        }
        self.generation += 1;

        let report = RebuildReport {
            generation: self.generation,
            shells: self.live.shell_count(),
            triangles: self.live.triangle_count(),
            disposed,
            disposal_failures,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Built cloud #{}: {} triangles in {} shells ({:?})",
            report.generation,
            report.triangles,
            report.shells,
            report.elapsed
        );

        Ok(report)
    }

    /// Apply one control edit on top of the live parameters and rebuild.
    pub fn apply_edit<S>(&mut self, scene: &mut S, edit: ParameterEdit) -> Result<RebuildReport>
    where
        S: Scene<Mesh = M>,
    {
        let base = self.params().copied().unwrap_or_default();
        self.rebuild(scene, edit.apply(base))
    }

    /// Detach and dispose the live cloud, leaving nothing on display.
    /// Returns the number of disposal failures.
    pub fn teardown<S>(&mut self, scene: &mut S) -> usize
    where
        S: Scene<Mesh = M>,
    {
        let previous = std::mem::take(&mut self.live);
        release(scene, previous).1
    }
}

/// Reject a plan whose largest shell does not fit in one scene mesh.
fn check_mesh_limit<S: Scene>(scene: &S, sampler: &ShellSampler) -> Result<()> {
    let Some(limit) = scene.max_mesh_triangles() else {
        return Ok(());
    };
    let oversized = sampler
        .quotas()
        .iter()
        .enumerate()
        .find(|&(_, &quota)| quota as usize > limit);
    match oversized {
        Some((shell, quota)) => Err(Error::invalid(
            "total_triangle_count",
            format!("shell {shell} needs {quota} triangles, a mesh holds at most {limit}"),
        )),
        None => Ok(()),
    }
}

/// Detach and dispose every mesh of `state`. Returns
/// `(disposed, failures)`.
fn release<S: Scene>(scene: &mut S, state: CloudState<S::Mesh>) -> (usize, usize) {
    let mut disposed = 0;
    let mut failures = 0;

    for shell in state.shells {
        scene.detach(&shell.mesh);
        match scene.dispose(shell.mesh) {
            Ok(()) => disposed += 1,
            Err(e) => {
                tracing::warn!("Failed to dispose shell {}: {}", shell.shell_index, e);
                failures += 1;
            }
        }
    }

    (disposed, failures)
}
