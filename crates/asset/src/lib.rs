//! Asset loading: 3D Studio chunk meshes and RGBA8 textures.

pub mod chunk;
pub mod error;
pub mod max3ds;
pub mod mesh;
pub mod texture;

pub use error::{AssetError, AssetResult};
pub use max3ds::{load_3ds_from_path, load_3ds_from_reader, parse_3ds};
pub use mesh::{MeshBuffer, MeshVertex};
pub use texture::TextureData;
