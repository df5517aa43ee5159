//! 3D Studio (`.3ds`) loader: walks the chunk tree and emits one [`MeshBuffer`] per
//! triangle-mesh object.
//!
//! Only geometry is read. Materials, keyframes, lights, cameras and any vendor chunks
//! are skipped by their declared length.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};

use crate::{
    chunk::{ChunkHeader, ChunkReader},
    error::{AssetError, AssetResult},
    mesh::{MeshBuffer, RawMesh},
};

/// Chunk identifiers understood by the loader.
pub mod tags {
    pub const MAIN: u16 = 0x4D4D;
    pub const VERSION: u16 = 0x0002;
    pub const EDITOR: u16 = 0x3D3D;
    pub const OBJECT: u16 = 0x4000;
    pub const TRIMESH: u16 = 0x4100;
    pub const VERTEX_LIST: u16 = 0x4110;
    pub const FACE_LIST: u16 = 0x4120;
    pub const FACE_MATERIAL: u16 = 0x4130;
    pub const MAPPING_LIST: u16 = 0x4140;
    pub const SMOOTH_GROUP: u16 = 0x4150;
    pub const LOCAL_MATRIX: u16 = 0x4160;
    pub const MATERIAL: u16 = 0xAFFF;
    pub const KEYFRAMER: u16 = 0xB000;
}

/// Load a 3DS asset from a file path.
pub fn load_3ds_from_path(path: impl AsRef<Path>) -> Result<Vec<MeshBuffer>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open 3DS file: {}", path.display()))?;
    let meshes = load_3ds_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load 3DS file: {}", path.display()))?;
    log::info!(
        "Loaded {} with {} mesh(es), {} triangles",
        path.display(),
        meshes.len(),
        meshes.iter().map(MeshBuffer::triangle_count).sum::<usize>()
    );
    Ok(meshes)
}

/// Load a 3DS asset from any [`Read`] implementation. The whole stream is buffered.
pub fn load_3ds_from_reader<R: Read>(mut reader: R) -> Result<Vec<MeshBuffer>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("Failed to read 3DS stream")?;
    Ok(parse_3ds(&bytes)?)
}

/// Parse a complete 3DS byte buffer.
///
/// Objects that declare no triangles or reference missing vertices are dropped with a
/// warning; any structural problem in the chunk tree fails the whole asset.
pub fn parse_3ds(bytes: &[u8]) -> AssetResult<Vec<MeshBuffer>> {
    // Identify the format before trusting any length field.
    if let [lo, hi, ..] = *bytes {
        let tag = u16::from_le_bytes([lo, hi]);
        if tag != tags::MAIN {
            return Err(AssetError::UnsupportedFormat { tag });
        }
    }
    let mut reader = ChunkReader::new(bytes);
    let root = reader.read_header()?;

    let mut raw = Vec::new();
    reader.descend(&root, |r| walk_children(r, &mut raw))?;

    let mut meshes = Vec::with_capacity(raw.len());
    for mesh in raw {
        match mesh.into_buffer() {
            Ok(buffer) => meshes.push(buffer),
            Err(err) if err.is_object_local() => log::warn!("Dropping sub-mesh: {err}"),
            Err(err) => return Err(err),
        }
    }
    Ok(meshes)
}

/// Container chunks: descend into the ones that can hold objects, skip the rest.
fn walk_children(r: &mut ChunkReader<'_>, out: &mut Vec<RawMesh>) -> AssetResult<()> {
    while let Some(header) = r.next_child()? {
        match header.tag {
            tags::EDITOR => r.descend(&header, |r| walk_children(r, out))?,
            tags::OBJECT => {
                if let Some(mesh) = r.descend(&header, read_object)? {
                    out.push(mesh);
                }
            }
            _ => skip(r, &header),
        }
    }
    Ok(())
}

/// Named object. Returns `None` for objects that carry no triangle mesh (lights, cameras).
fn read_object(r: &mut ChunkReader<'_>) -> AssetResult<Option<RawMesh>> {
    let name = r.read_cstring()?;
    let mut mesh = None;
    while let Some(header) = r.next_child()? {
        match header.tag {
            tags::TRIMESH => {
                let target = mesh.get_or_insert_with(|| RawMesh::new(name.clone()));
                r.descend(&header, |r| read_trimesh(r, target))?;
            }
            _ => skip(r, &header),
        }
    }
    Ok(mesh)
}

fn read_trimesh(r: &mut ChunkReader<'_>, mesh: &mut RawMesh) -> AssetResult<()> {
    while let Some(header) = r.next_child()? {
        match header.tag {
            tags::VERTEX_LIST => {
                mesh.positions = r.descend(&header, |r| {
                    let count = usize::from(r.read_u16()?);
                    let flat = r.read_f32_array(count * 3)?;
                    Ok(flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect())
                })?;
            }
            tags::FACE_LIST => {
                mesh.faces = r.descend(&header, read_faces)?;
            }
            tags::MAPPING_LIST => {
                let uvs: Vec<[f32; 2]> = r.descend(&header, |r| {
                    let count = usize::from(r.read_u16()?);
                    let flat = r.read_f32_array(count * 2)?;
                    Ok(flat.chunks_exact(2).map(|t| [t[0], t[1]]).collect())
                })?;
                if uvs.len() != mesh.positions.len() {
                    log::debug!(
                        "Object '{}': {} UVs for {} vertices, using (0, 0)",
                        mesh.name,
                        uvs.len(),
                        mesh.positions.len()
                    );
                }
                mesh.uvs = Some(uvs);
            }
            _ => skip(r, &header),
        }
    }
    Ok(())
}

/// Face records followed by optional material/smoothing sub-chunks, which are skipped.
fn read_faces(r: &mut ChunkReader<'_>) -> AssetResult<Vec<[u16; 3]>> {
    let count = usize::from(r.read_u16()?);
    let mut faces = Vec::with_capacity(count.min(r.remaining() / 8));
    for _ in 0..count {
        let face = [r.read_u16()?, r.read_u16()?, r.read_u16()?];
        let _flags = r.read_u16()?;
        faces.push(face);
    }
    while let Some(header) = r.next_child()? {
        skip(r, &header);
    }
    Ok(faces)
}

/// Readable name for chunks the loader knows about but does not interpret.
fn chunk_name(tag: u16) -> &'static str {
    match tag {
        tags::VERSION => "version",
        tags::MATERIAL => "material",
        tags::KEYFRAMER => "keyframer",
        tags::FACE_MATERIAL => "face material",
        tags::SMOOTH_GROUP => "smoothing group",
        tags::LOCAL_MATRIX => "local matrix",
        _ => "unknown",
    }
}

fn skip(r: &mut ChunkReader<'_>, header: &ChunkHeader) {
    log::debug!(
        "Skipping {} chunk {:#06x} ({} bytes) at {}",
        chunk_name(header.tag),
        header.tag,
        header.length,
        header.offset
    );
    r.skip_chunk(header);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_foreign_root() {
        // A PNG signature is not a 3DS main chunk.
        let bytes = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(
            parse_3ds(&bytes),
            Err(AssetError::UnsupportedFormat { tag: 0x5089 })
        );
    }

    #[test]
    fn empty_main_chunk_has_no_meshes() {
        let mut bytes = tags::MAIN.to_le_bytes().to_vec();
        bytes.extend_from_slice(&6u32.to_le_bytes());
        assert_eq!(parse_3ds(&bytes), Ok(Vec::new()));
    }

    #[test]
    fn skipped_chunks_are_named() {
        assert_eq!(chunk_name(tags::MATERIAL), "material");
        assert_eq!(chunk_name(tags::KEYFRAMER), "keyframer");
        assert_eq!(chunk_name(0x7777), "unknown");
    }

    #[test]
    fn reader_wrapper_reports_context() {
        let err = load_3ds_from_reader(&[0x4Du8, 0x4D, 0x10][..]).unwrap_err();
        let asset = err.downcast_ref::<AssetError>().expect("typed error");
        assert!(matches!(asset, AssetError::TruncatedInput { .. }));
    }
}
