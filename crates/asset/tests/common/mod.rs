//! Minimal 3DS writer used to build fixtures in memory.

#![allow(dead_code)]

use asset::max3ds::tags;

/// A chunk under construction: tag plus already-encoded content.
pub struct Chunk {
    tag: u16,
    body: Vec<u8>,
}

impl Chunk {
    pub fn new(tag: u16) -> Self {
        Self {
            tag,
            body: Vec::new(),
        }
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.body.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32s(mut self, vs: &[f32]) -> Self {
        for v in vs {
            self.body.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    pub fn cstr(mut self, s: &str) -> Self {
        self.body.extend_from_slice(s.as_bytes());
        self.body.push(0);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn child(mut self, c: Chunk) -> Self {
        self.body.extend(c.encode());
        self
    }

    pub fn encode(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.body.len());
        out.extend_from_slice(&self.tag.to_le_bytes());
        out.extend_from_slice(&((6 + self.body.len()) as u32).to_le_bytes());
        out.extend(self.body);
        out
    }
}

pub fn vertices(positions: &[[f32; 3]]) -> Chunk {
    let flat: Vec<f32> = positions.iter().flatten().copied().collect();
    Chunk::new(tags::VERTEX_LIST)
        .u16(positions.len() as u16)
        .f32s(&flat)
}

/// Face list with a zero flags word per face and no trailing sub-chunks.
pub fn faces(faces: &[[u16; 3]]) -> Chunk {
    let mut c = Chunk::new(tags::FACE_LIST).u16(faces.len() as u16);
    for f in faces {
        c = c.u16(f[0]).u16(f[1]).u16(f[2]).u16(0);
    }
    c
}

pub fn uvs(uvs: &[[f32; 2]]) -> Chunk {
    let flat: Vec<f32> = uvs.iter().flatten().copied().collect();
    Chunk::new(tags::MAPPING_LIST).u16(uvs.len() as u16).f32s(&flat)
}

pub fn object(name: &str, trimesh: Chunk) -> Chunk {
    Chunk::new(tags::OBJECT).cstr(name).child(trimesh)
}

/// MAIN > EDITOR > objects, with a version chunk in front like real exporters write.
pub fn file(objects: Vec<Chunk>) -> Vec<u8> {
    let mut editor = Chunk::new(tags::EDITOR);
    for o in objects {
        editor = editor.child(o);
    }
    Chunk::new(tags::MAIN)
        .child(Chunk::new(tags::VERSION).raw(&3u32.to_le_bytes()))
        .child(editor)
        .encode()
}

pub fn quad_positions() -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]
}
