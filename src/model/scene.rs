use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

use crate::model::Camera;
use crate::utils::MeshBuffer;

/// Handle to a scene node. Nodes are append-only, so a handle stays valid for
/// the lifetime of the scene.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// One renderable object: a GPU mesh plus its transform and the per-node
/// uniform resources the mesh pipeline binds at group 1.
pub struct SceneNode {
    pub mesh: MeshBuffer,
    pub transform: Transform,
    pub transform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl SceneNode {
    pub fn new(
        device: &wgpu::Device,
        node_layout: &wgpu::BindGroupLayout,
        mesh: MeshBuffer,
        transform: Transform,
    ) -> Self {
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("node_transform"),
            contents: bytemuck::cast_slice(&transform.matrix().to_cols_array_2d()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("node_bind_group"),
            layout: node_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        Self {
            mesh,
            transform,
            transform_buffer,
            bind_group,
        }
    }
}

/// Ordered collection of renderables plus the camera and ambient light.
/// Append-only during setup and asset hand-off, read during render.
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub camera: Camera,
    pub ambient: f32,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            nodes: Vec::new(),
            camera,
            ambient: 0.8,
        }
    }

    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Overwrite a node's position and orientation verbatim. Scale is left
    /// untouched; the physics body has no notion of it.
    pub fn set_pose(&mut self, id: NodeId, position: Vec3, rotation: Quat) {
        let node = &mut self.nodes[id];
        node.transform.position = position;
        node.transform.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform_matrix() {
        let m = Transform::identity().matrix();
        assert_eq!(m, Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_matrix_translation_column() {
        let t = Transform::from_position(Vec3::new(1.0, -2.0, 3.0));
        let m = t.matrix();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_transform_matrix_applies_rotation() {
        let t = Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let rotated = t.matrix().transform_point3(Vec3::X);
        assert!((rotated - Vec3::Y).length() < 1e-6, "X should rotate onto Y, got {rotated:?}");
    }
}
