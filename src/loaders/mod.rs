pub mod gltf;

use std::path::Path;

use crate::scene::SceneAsset;

pub use self::gltf::{generate_normals, GltfDecoder, MAX_NODE_DEPTH};

/// Turns container bytes into a scene graph. `base` is the directory used
/// to resolve external buffer and image URIs, when there is one.
pub trait Decoder: Send + Sync {
    fn decode(&self, name: &str, bytes: &[u8], base: Option<&Path>) -> Result<SceneAsset, DecodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid glTF: {0}")]
    Gltf(#[from] ::gltf::Error),
    #[error("required extension {0} is not supported")]
    UnsupportedExtension(String),
    #[error("document has no scene")]
    NoScene,
    #[error("invalid node hierarchy: {0}")]
    InvalidHierarchy(String),
    #[error("primitive in {0} has no POSITION attribute")]
    MissingPositions(String),
    #[error("index {index} in {mesh} exceeds vertex count {vertices}")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertices: usize,
    },
    #[error("texture references missing image {0}")]
    MissingImage(usize),
}

/// Anything that can make a load request fail
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },
    #[error("could not start loader for {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
