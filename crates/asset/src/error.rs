//! Error taxonomy for chunk-format parsing.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The byte source ran out before a declared field could be read.
    #[error(
        "truncated input{} at byte {offset}: needed {needed} bytes, {available} available",
        in_chunk(.tag)
    )]
    TruncatedInput {
        /// Innermost chunk being read, `None` outside any chunk.
        tag: Option<u16>,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A chunk's declared length disagrees with what its content actually occupies.
    #[error(
        "malformed chunk {tag:#06x} at byte {offset}: declared {declared} bytes, content occupies {consumed}"
    )]
    MalformedChunk {
        tag: u16,
        offset: usize,
        declared: usize,
        consumed: usize,
    },

    #[error("unsupported format: root chunk {tag:#06x} is not a 3DS main chunk")]
    UnsupportedFormat { tag: u16 },

    #[error("object '{object}' declares no triangles")]
    EmptyMesh { object: String },

    #[error("object '{object}' references vertex {index} but only has {vertex_count}")]
    FaceIndexOutOfRange {
        object: String,
        index: u16,
        vertex_count: usize,
    },
}

impl AssetError {
    /// `true` for errors that only invalidate one sub-object, not the whole asset.
    pub fn is_object_local(&self) -> bool {
        matches!(
            self,
            AssetError::EmptyMesh { .. } | AssetError::FaceIndexOutOfRange { .. }
        )
    }
}

fn in_chunk(tag: &Option<u16>) -> String {
    tag.map(|t| format!(" in chunk {t:#06x}")).unwrap_or_default()
}

pub type AssetResult<T> = Result<T, AssetError>;
