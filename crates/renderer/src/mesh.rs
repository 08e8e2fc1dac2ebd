//! Mesh data and GPU buffer management.

use wgpu::util::DeviceExt;

use crate::vertex::Vertex;

/// CPU-side mesh geometry, ready to upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Append another mesh, offsetting its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> Mesh {
        Mesh::new(device, &self.vertices, &self.indices, label)
    }
}

/// A mesh with GPU buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertices")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_indices")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }

    /// Unit cube centered at the origin. Scale through the instance matrix.
    pub fn cube(device: &wgpu::Device) -> Self {
        let data = cube_data();
        data.upload(device, "cube")
    }

    /// Unit quad in the XZ plane, normal +Y.
    pub fn plane(device: &wgpu::Device) -> Self {
        let h = 0.5;
        let vertices = [
            Vertex::new([-h, 0.0, -h], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([h, 0.0, -h], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([h, 0.0, h], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-h, 0.0, h], [0.0, 1.0, 0.0], [0.0, 1.0]),
        ];
        let indices = [0u32, 2, 1, 0, 3, 2];
        Self::new(device, &vertices, &indices, "plane")
    }

    /// Unit quad in the XY plane, facing +Z. Oriented per-instance for
    /// billboards.
    pub fn billboard_quad(device: &wgpu::Device) -> Self {
        let h = 0.5;
        let vertices = [
            Vertex::new([-h, -h, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex::new([h, -h, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([h, h, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([-h, h, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        Self::new(device, &vertices, &indices, "billboard_quad")
    }

    /// UV sphere of radius 1, centered at the origin.
    pub fn sphere(device: &wgpu::Device, segments: u32, rings: u32) -> Self {
        let data = sphere_data(segments, rings);
        data.upload(device, "sphere")
    }
}

pub fn cube_data() -> MeshData {
    let h = 0.5;
    // Six faces, four vertices each, CCW winding viewed from outside.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        (
            [1.0, 0.0, 0.0],
            [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [[-h, -h, h], [-h, h, h], [-h, h, -h], [-h, -h, -h]],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
        ),
        // +Z
        (
            [0.0, 0.0, 1.0],
            [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
        ),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let mut data = MeshData::default();
    for (normal, corners) in faces {
        let base = data.vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            data.vertices.push(Vertex::new(*corner, normal, uv));
        }
        data.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

pub fn sphere_data(segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut data = MeshData::default();
    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for seg in 0..=segments {
            let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let position = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            let uv = [seg as f32 / segments as f32, ring as f32 / rings as f32];
            data.vertices.push(Vertex::new(position, position, uv));
        }
    }
    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            data.indices.extend([a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_faces() {
        let data = cube_data();
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.indices.len(), 36);
    }

    #[test]
    fn sphere_vertices_lie_on_unit_radius() {
        let data = sphere_data(16, 8);
        for v in &data.vertices {
            let len = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2))
                .sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn append_offsets_indices() {
        let mut a = cube_data();
        let b = cube_data();
        a.append(&b);
        assert_eq!(a.vertices.len(), 48);
        assert_eq!(a.indices.len(), 72);
        assert!(a.indices[36..].iter().all(|&i| i >= 24));
    }
}
