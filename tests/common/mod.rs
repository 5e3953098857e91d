#![allow(dead_code)]

use serde_json::{json, Value};

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// One triangle in the XY plane, positions then u16 indices
pub fn triangle_buffer() -> Vec<u8> {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let indices: [u16; 3] = [0, 1, 2];

    let mut bin = Vec::new();
    for p in positions {
        bin.extend_from_slice(&p.to_le_bytes());
    }
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin
}

fn pad(mut bytes: Vec<u8>, filler: u8) -> Vec<u8> {
    while bytes.len() % 4 != 0 {
        bytes.push(filler);
    }
    bytes
}

/// Pack a document and its binary buffer into a GLB container
pub fn glb(document: &Value, bin: &[u8]) -> Vec<u8> {
    let json = pad(serde_json::to_vec(document).unwrap(), b' ');
    let bin = pad(bin.to_vec(), 0);
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);
    out
}

/// Document for `triangle_buffer`: root > child (mesh) > grandchild (mesh),
/// no normals. `buffer` is merged into the single buffer entry.
pub fn triangle_document(buffer: Value) -> Value {
    let mut buffer_entry = json!({ "byteLength": 42 });
    if let (Some(entry), Some(extra)) = (buffer_entry.as_object_mut(), buffer.as_object()) {
        for (k, v) in extra {
            entry.insert(k.clone(), v.clone());
        }
    }

    json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Scene", "nodes": [0] }],
        "nodes": [
            { "name": "root", "children": [1], "translation": [1.0, 0.0, 0.0] },
            { "name": "child", "mesh": 0, "children": [2] },
            { "name": "grandchild", "mesh": 0, "scale": [2.0, 2.0, 2.0] }
        ],
        "meshes": [{
            "name": "triangle",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
        }],
        "buffers": [buffer_entry],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
            },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    })
}

pub fn triangle_glb() -> Vec<u8> {
    glb(&triangle_document(json!({})), &triangle_buffer())
}

/// Same scene with a required extension nothing here understands
pub fn extension_glb() -> Vec<u8> {
    let mut document = triangle_document(json!({}));
    document["extensionsUsed"] = json!(["KHR_draco_mesh_compression"]);
    document["extensionsRequired"] = json!(["KHR_draco_mesh_compression"]);
    glb(&document, &triangle_buffer())
}

/// Valid container whose document has no scenes
pub fn sceneless_glb() -> Vec<u8> {
    let mut document = triangle_document(json!({}));
    if let Some(root) = document.as_object_mut() {
        root.remove("scene");
        root.remove("scenes");
    }
    glb(&document, &triangle_buffer())
}

pub fn invalid_bytes() -> Vec<u8> {
    b"glTF but not really a binary container".to_vec()
}

/// Unique scratch directory under the system temp dir
pub fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("glb-viewer-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
