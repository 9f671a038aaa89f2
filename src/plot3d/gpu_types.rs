use bytemuck::{Pod, Zeroable};

/// Uniform buffer shared by the mesh and line pipelines.
/// Layout matches the WGSL struct exactly: 128 bytes = 8 * 16.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    /// View-projection matrix (column-major).
    pub view_proj: [[f32; 4]; 4],
    /// Camera world position (w unused).
    pub camera_pos: [f32; 4],
    /// RGBA color for line draws.
    pub color: [f32; 4],
    /// Viewport resolution in pixels.
    pub resolution: [f32; 2],
    /// Ambient light term for mesh shading.
    pub ambient: f32,
    /// Line width in pixels.
    pub line_width: f32,
    /// x: offset, in `vec4` slots, of the unit mesh behind the instance
    /// records in the storage buffer. Other lanes unused.
    pub mesh_info: [u32; 4],
}

/// One triangle-list vertex as read by `vs_mesh`: three `vec4<f32>` slots.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// xyz, w = 1.
    pub position: [f32; 4],
    /// xyz, w unused.
    pub normal: [f32; 4],
    pub color: [f32; 4],
}

/// Placement of one copy of a unit mesh: `world = center + local * scale`.
/// Same three-slot stride as `MeshVertex`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshInstance {
    pub center: [f32; 4],
    pub scale: [f32; 4],
    /// Multiplied into the vertex color.
    pub color: [f32; 4],
}

/// Line segment endpoint pairs for the ribbon pipeline.
#[derive(Debug, Clone)]
pub struct Line3DData {
    /// `[start, end, start, end, ...]`, each `[x, y, z, _pad]`.
    pub segments: Vec<[f32; 4]>,
    pub color: [f32; 4],
    /// Pixels.
    pub line_width: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 128);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 48);
        assert_eq!(std::mem::size_of::<MeshInstance>(), std::mem::size_of::<MeshVertex>());
    }
}
