use bytemuck::NoUninit;
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Build a mesh from a flat triangle soup (three xyz floats per vertex,
    /// three vertices per triangle). Each face gets a flat normal.
    pub fn from_triangle_soup(positions: &[f32]) -> Self {
        let mut mesh = Mesh::empty();
        for tri in positions.chunks_exact(9) {
            let a = Vec3::new(tri[0], tri[1], tri[2]);
            let b = Vec3::new(tri[3], tri[4], tri[5]);
            let c = Vec3::new(tri[6], tri[7], tri[8]);
            let normal = (b - a).cross(c - a).normalize_or_zero();
            for p in [a, b, c] {
                mesh.indices.push(mesh.vertices.len() as u32);
                mesh.vertices.push(Vertex {
                    pos: p.to_array(),
                    normal: normal.to_array(),
                });
            }
        }
        mesh
    }

    /// Translate all vertices so the bounding box midpoint sits at the origin.
    pub fn center(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            let p = Vec3::from_array(v.pos);
            min = min.min(p);
            max = max.max(p);
        }
        let mid = (min + max) * 0.5;
        for v in self.vertices.iter_mut() {
            v.pos[0] -= mid.x;
            v.pos[1] -= mid.y;
            v.pos[2] -= mid.z;
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Square plane in the XZ plane, centered at the origin, facing +Y.
pub fn create_plane_mesh(size: f32) -> Mesh {
    let h = size * 0.5;
    let normal = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex { pos: [-h, 0.0, -h], normal },
        Vertex { pos: [-h, 0.0, h], normal },
        Vertex { pos: [h, 0.0, h], normal },
        Vertex { pos: [h, 0.0, -h], normal },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_faces_up() {
        let plane = create_plane_mesh(8.0);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices.len(), 6);
        for v in &plane.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0], "plane normals must point +Y");
            assert_eq!(v.pos[1], 0.0);
            assert!(v.pos[0].abs() == 4.0 && v.pos[2].abs() == 4.0);
        }
    }

    #[test]
    fn test_triangle_soup_normals() {
        // One CCW triangle in the XY plane, should face +Z
        let soup = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::from_triangle_soup(&soup);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.normal).length() - 1.0).abs() < 1e-6);
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_center_moves_bbox_midpoint_to_origin() {
        let soup = [2.0, 3.0, 4.0, 4.0, 3.0, 4.0, 4.0, 5.0, 4.0];
        let mut mesh = Mesh::from_triangle_soup(&soup);
        mesh.center();

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.pos);
            min = min.min(p);
            max = max.max(p);
        }
        let mid = (min + max) * 0.5;
        assert!(mid.length() < 1e-6, "bbox midpoint should be at origin, got {mid:?}");
    }

    #[test]
    fn test_center_on_empty_mesh_is_noop() {
        let mut mesh = Mesh::empty();
        mesh.center();
        assert!(mesh.is_empty());
    }
}
