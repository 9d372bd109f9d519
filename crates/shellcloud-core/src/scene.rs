//! The display collaborator seam.
//!
//! The core never touches GPU objects. It hands geometry and materials to
//! a [`Scene`], gets back opaque mesh handles, and tells the scene when to
//! show, hide and release them.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SceneError;
use crate::material::Material;
use crate::sampler::GeometryBuffer;

/// A display backend that owns mesh resources.
pub trait Scene {
    /// Opaque handle to a mesh owned by the scene.
    type Mesh;

    /// Build a renderable mesh from one shell's geometry. The scene takes
    /// ownership of the buffer.
    fn create_mesh(
        &mut self,
        geometry: GeometryBuffer,
        material: Material,
    ) -> Result<Self::Mesh, SceneError>;

    /// Make a mesh visible.
    fn attach(&mut self, mesh: &Self::Mesh);

    /// Hide a mesh without releasing it.
    fn detach(&mut self, mesh: &Self::Mesh);

    /// Release a mesh's geometry and material. The handle is consumed.
    fn dispose(&mut self, mesh: Self::Mesh) -> Result<(), SceneError>;

    /// Most triangles a single mesh can hold, or `None` for no limit.
    /// Checked against every shell's quota before anything is sampled.
    fn max_mesh_triangles(&self) -> Option<usize> {
        None
    }
}

/// Handle into a [`MemoryScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(pub u64);

/// Mesh stored by a [`MemoryScene`].
#[derive(Debug, Clone)]
pub struct StoredMesh {
    pub geometry: GeometryBuffer,
    pub material: Material,
}

/// Headless scene that keeps meshes in memory.
///
/// Tracks what is live and what is attached so callers can inspect the
/// display at any point, and can be told to fail construction or disposal.
#[derive(Debug, Default)]
pub struct MemoryScene {
    next_id: u64,
    meshes: BTreeMap<MeshId, StoredMesh>,
    attached: BTreeSet<MeshId>,
    created_total: u64,
    disposed_total: u64,
    fail_create_after: Option<u64>,
    fail_dispose: bool,
    max_mesh_triangles: Option<usize>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `create_mesh` once `count` more meshes have been created.
    pub fn fail_create_after(&mut self, count: u64) {
        self.fail_create_after = Some(count);
    }

    /// Make every `dispose` report failure (the mesh is still dropped).
    pub fn fail_dispose(&mut self, fail: bool) {
        self.fail_dispose = fail;
    }

    /// Cap the triangles a single mesh may hold.
    pub fn limit_mesh_triangles(&mut self, limit: usize) {
        self.max_mesh_triangles = Some(limit);
    }

    /// Meshes that are created and not yet disposed.
    pub fn live_count(&self) -> usize {
        self.meshes.len()
    }

    /// Meshes currently visible.
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn created_total(&self) -> u64 {
        self.created_total
    }

    pub fn disposed_total(&self) -> u64 {
        self.disposed_total
    }

    /// Visible meshes in creation order.
    pub fn attached(&self) -> impl Iterator<Item = &StoredMesh> + '_ {
        self.attached.iter().filter_map(|id| self.meshes.get(id))
    }

    /// Total vertices across visible meshes.
    pub fn attached_vertex_count(&self) -> usize {
        self.attached().map(|m| m.geometry.vertex_count()).sum()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&StoredMesh> {
        self.meshes.get(&id)
    }
}

impl Scene for MemoryScene {
    type Mesh = MeshId;

    fn create_mesh(
        &mut self,
        geometry: GeometryBuffer,
        material: Material,
    ) -> Result<MeshId, SceneError> {
        if let Some(remaining) = self.fail_create_after.as_mut() {
            if *remaining == 0 {
                return Err(SceneError::Construction("injected failure".into()));
            }
            *remaining -= 1;
        }

        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.created_total += 1;
        self.meshes.insert(id, StoredMesh { geometry, material });
        Ok(id)
    }

    fn attach(&mut self, mesh: &MeshId) {
        if self.meshes.contains_key(mesh) {
            self.attached.insert(*mesh);
        }
    }

    fn detach(&mut self, mesh: &MeshId) {
        self.attached.remove(mesh);
    }

    fn dispose(&mut self, mesh: MeshId) -> Result<(), SceneError> {
        self.attached.remove(&mesh);
        let removed = self.meshes.remove(&mesh);
        if self.fail_dispose {
            return Err(SceneError::Disposal(format!("injected failure for {mesh:?}")));
        }
        match removed {
            Some(_) => {
                self.disposed_total += 1;
                Ok(())
            }
            None => Err(SceneError::Disposal(format!("unknown mesh {mesh:?}"))),
        }
    }

    fn max_mesh_triangles(&self) -> Option<usize> {
        self.max_mesh_triangles
    }
}
