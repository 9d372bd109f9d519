//! GPU buffer management for shell meshes.

use std::collections::HashMap;

use shellcloud_core::sampler::FLOATS_PER_TRIANGLE;
use shellcloud_core::{GeometryBuffer, Material, MeshId, Scene, SceneError};
use wgpu::util::DeviceExt;

use crate::{edge_indices, MaterialUniform};

/// GPU resources for one shell.
pub struct GpuMesh {
    pub shell_index: u32,
    /// `None` for a shell that received no triangles
    pub vertex_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    /// Line-list indices, present for wireframe materials
    pub edge_buffer: Option<wgpu::Buffer>,
    pub edge_count: u32,
    pub material_buffer: wgpu::Buffer,
    pub material_bind_group: wgpu::BindGroup,
    pub wireframe: bool,
}

impl GpuMesh {
    fn destroy(self) {
        if let Some(buffer) = self.vertex_buffer {
            buffer.destroy();
        }
        if let Some(buffer) = self.edge_buffer {
            buffer.destroy();
        }
        self.material_buffer.destroy();
    }

    /// Bytes held on the GPU by this mesh.
    pub fn gpu_bytes(&self) -> u64 {
        let vertex = self.vertex_buffer.as_ref().map_or(0, |b| b.size());
        let edge = self.edge_buffer.as_ref().map_or(0, |b| b.size());
        vertex + edge + self.material_buffer.size()
    }
}

/// All shell meshes the renderer knows about, and which are visible.
#[derive(Default)]
pub struct MeshStore {
    next_id: u64,
    meshes: HashMap<MeshId, GpuMesh>,
    attached: Vec<MeshId>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible meshes in attach order.
    pub fn attached(&self) -> impl Iterator<Item = &GpuMesh> + '_ {
        self.attached.iter().filter_map(|id| self.meshes.get(id))
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn live_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn gpu_bytes(&self) -> u64 {
        self.meshes.values().map(GpuMesh::gpu_bytes).sum()
    }

    fn insert(&mut self, mesh: GpuMesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    fn attach(&mut self, id: MeshId) {
        if self.meshes.contains_key(&id) && !self.attached.contains(&id) {
            self.attached.push(id);
        }
    }

    fn detach(&mut self, id: MeshId) {
        self.attached.retain(|&a| a != id);
    }

    fn remove(&mut self, id: MeshId) -> Option<GpuMesh> {
        self.detach(id);
        self.meshes.remove(&id)
    }
}

/// Layout shared by every per-mesh material bind group.
pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material bind group layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(
                    std::mem::size_of::<MaterialUniform>() as u64,
                ),
            },
            count: None,
        }],
    })
}

/// Vertex layout matching [`GeometryBuffer`]'s flat `x, y, z` coordinates.
pub fn position_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

/// Short-lived [`Scene`] view over the renderer's device and mesh store.
pub struct GpuScene<'a> {
    pub(crate) device: &'a wgpu::Device,
    pub(crate) material_layout: &'a wgpu::BindGroupLayout,
    pub(crate) store: &'a mut MeshStore,
}

impl Scene for GpuScene<'_> {
    type Mesh = MeshId;

    fn create_mesh(
        &mut self,
        geometry: GeometryBuffer,
        material: Material,
    ) -> Result<MeshId, SceneError> {
        let shell_index = geometry.shell_index();
        let coords = geometry.as_slice();
        let bytes = std::mem::size_of_val(coords) as u64;
        let max = self.device.limits().max_buffer_size;
        if bytes > max {
            return Err(SceneError::Construction(format!(
                "shell {shell_index} needs {bytes} bytes, device allows {max}"
            )));
        }

        let vertex_buffer = (!coords.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("shell vertex buffer"),
                    contents: bytemuck::cast_slice(coords),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let triangle_count = geometry.triangle_count() as u32;
        let edge_buffer = (material.wireframe && triangle_count > 0).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("shell edge buffer"),
                    contents: bytemuck::cast_slice(&edge_indices(triangle_count)),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        let material_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shell material"),
                contents: bytemuck::bytes_of(&MaterialUniform::from_material(&material)),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let material_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shell material bind group"),
            layout: self.material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        tracing::debug!(
            "Uploaded shell {} ({} triangles, {:.2} MB)",
            shell_index,
            triangle_count,
            bytes as f64 / 1_000_000.0
        );

        Ok(self.store.insert(GpuMesh {
            shell_index,
            vertex_buffer,
            vertex_count: triangle_count * 3,
            edge_buffer,
            edge_count: triangle_count * 6,
            material_buffer,
            material_bind_group,
            wireframe: material.wireframe,
        }))
    }

    fn attach(&mut self, mesh: &MeshId) {
        self.store.attach(*mesh);
    }

    fn detach(&mut self, mesh: &MeshId) {
        self.store.detach(*mesh);
    }

    fn dispose(&mut self, mesh: MeshId) -> Result<(), SceneError> {
        match self.store.remove(mesh) {
            Some(gpu_mesh) => {
                gpu_mesh.destroy();
                Ok(())
            }
            None => Err(SceneError::Disposal(format!("unknown mesh {mesh:?}"))),
        }
    }

    fn max_mesh_triangles(&self) -> Option<usize> {
        Some(max_triangles_for(self.device.limits().max_buffer_size))
    }
}

/// Triangles whose vertex buffer fits in `max_buffer_size` bytes.
pub fn max_triangles_for(max_buffer_size: u64) -> usize {
    let bytes_per_triangle = (FLOATS_PER_TRIANGLE * std::mem::size_of::<f32>()) as u64;
    (max_buffer_size / bytes_per_triangle) as usize
}
