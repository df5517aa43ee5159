//! CPU-side mesh representation produced by the chunk parser.

use crate::error::{AssetError, AssetResult};

/// Floats per interleaved record: position (3) + normal (3) + uv (2).
pub const FLOATS_PER_VERTEX: usize = 8;
/// Byte stride of one record.
pub const VERTEX_STRIDE: usize = FLOATS_PER_VERTEX * std::mem::size_of::<f32>();
/// Byte offsets of each attribute inside a record.
pub const POSITION_OFFSET: usize = 0;
pub const NORMAL_OFFSET: usize = 3 * std::mem::size_of::<f32>();
pub const UV_OFFSET: usize = 6 * std::mem::size_of::<f32>();

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    fn from_record(r: &[f32]) -> Self {
        Self {
            position: [r[0], r[1], r[2]],
            normal: [r[3], r[4], r[5]],
            uv: [r[6], r[7]],
        }
    }
}

/// Non-indexed triangle list with interleaved position/normal/uv records.
///
/// Built once per sub-object and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffer {
    name: String,
    data: Vec<f32>,
}

impl MeshBuffer {
    /// Object name from the asset (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interleaved floats, `FLOATS_PER_VERTEX` per vertex.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Number of emitted vertices (three per face); the draw range.
    pub fn vertex_count(&self) -> usize {
        self.data.len() / FLOATS_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn vertex(&self, i: usize) -> Option<MeshVertex> {
        let start = i.checked_mul(FLOATS_PER_VERTEX)?;
        self.data
            .get(start..start + FLOATS_PER_VERTEX)
            .map(MeshVertex::from_record)
    }

    pub fn vertices(&self) -> impl Iterator<Item = MeshVertex> + '_ {
        self.data
            .chunks_exact(FLOATS_PER_VERTEX)
            .map(MeshVertex::from_record)
    }

    /// Axis-aligned bounds of all positions, `None` for an empty buffer.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut it = self.vertices();
        let first = it.next()?.position;
        Some(it.fold((first, first), |(mut lo, mut hi), v| {
            for k in 0..3 {
                lo[k] = lo[k].min(v.position[k]);
                hi[k] = hi[k].max(v.position[k]);
            }
            (lo, hi)
        }))
    }
}

/// Geometry of one object as stored in the file, before expansion.
#[derive(Clone, Debug, Default)]
pub(crate) struct RawMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub faces: Vec<[u16; 3]>,
    pub uvs: Option<Vec<[f32; 2]>>,
}

impl RawMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate indices, synthesize flat normals and expand faces into records.
    pub fn into_buffer(self) -> AssetResult<MeshBuffer> {
        if self.faces.is_empty() {
            return Err(AssetError::EmptyMesh { object: self.name });
        }
        let vertex_count = self.positions.len();
        if let Some(&index) = self
            .faces
            .iter()
            .flatten()
            .find(|&&i| usize::from(i) >= vertex_count)
        {
            return Err(AssetError::FaceIndexOutOfRange {
                object: self.name,
                index,
                vertex_count,
            });
        }

        let uvs = self.uvs.filter(|uv| uv.len() == vertex_count);
        let mut data = Vec::with_capacity(self.faces.len() * 3 * FLOATS_PER_VERTEX);
        for face in &self.faces {
            let corners = face.map(|i| self.positions[usize::from(i)]);
            let normal = face_normal(corners[0], corners[1], corners[2]);
            for (&i, p) in face.iter().zip(corners) {
                let uv = uvs.as_ref().map_or([0.0, 0.0], |uv| uv[usize::from(i)]);
                data.extend_from_slice(&p);
                data.extend_from_slice(&normal);
                data.extend_from_slice(&uv);
            }
        }

        Ok(MeshBuffer {
            name: self.name,
            data,
        })
    }
}

/// Unit normal of a triangle by the right-hand rule: `(v1 - v0) x (v2 - v0)`.
/// Degenerate triangles yield the zero vector.
pub fn face_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f32::EPSILON {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0; 3]
    }
}
