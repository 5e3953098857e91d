use glam::{Mat4, Vec3};
use std::path::Path;

use super::{DecodeError, Decoder};
use crate::scene::{Material, Mesh, Primitive, SceneAsset, SceneNode, Texture};

/// Decodes `.glb` and `.gltf` documents with the `gltf` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfDecoder;

impl Decoder for GltfDecoder {
    fn decode(&self, name: &str, bytes: &[u8], base: Option<&Path>) -> Result<SceneAsset, DecodeError> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;

        // Nothing below interprets extension data, so any required one is fatal
        if let Some(extension) = document.extensions_required().next() {
            return Err(DecodeError::UnsupportedExtension(extension.to_string()));
        }

        let buffers = gltf::import_buffers(&document, base, blob)?;
        let images = gltf::import_images(&document, base, &buffers)?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(DecodeError::NoScene)?;

        let mut root = SceneNode::new(scene.name().map(str::to_string));
        let mut walk = NodeWalk::default();
        root.children = scene
            .nodes()
            .map(|node| walk.convert(&node))
            .collect::<Result<Vec<_>, _>>()?;

        let meshes = document
            .meshes()
            .map(|mesh| convert_mesh(&mesh, &buffers))
            .collect::<Result<Vec<_>, _>>()?;

        let materials = document.materials().map(|m| convert_material(&m)).collect();

        let textures = document
            .textures()
            .map(|texture| {
                images
                    .get(texture.source().index())
                    .map(convert_image)
                    .ok_or(DecodeError::MissingImage(texture.source().index()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Decoded {}: {} nodes, {} meshes, {} materials, {} textures",
            name,
            document.nodes().count(),
            meshes.len(),
            document.materials().count(),
            textures.len()
        );

        Ok(SceneAsset {
            name: name.to_string(),
            root,
            meshes,
            materials,
            textures,
        })
    }
}

/// Deepest node chain accepted from a document
pub const MAX_NODE_DEPTH: usize = 256;
/// Upper bound on converted nodes, counting every instance of a shared child
pub const MAX_NODE_INSTANCES: usize = 1 << 20;

/// Recursive node conversion that refuses cycles and unbounded expansion.
/// `ancestors` holds the indices on the path from the scene root.
#[derive(Default)]
struct NodeWalk {
    ancestors: Vec<usize>,
    instances: usize,
}

impl NodeWalk {
    fn convert(&mut self, node: &gltf::Node) -> Result<SceneNode, DecodeError> {
        let index = node.index();
        if self.ancestors.contains(&index) {
            return Err(DecodeError::InvalidHierarchy(format!("node {} is its own ancestor", index)));
        }
        if self.ancestors.len() >= MAX_NODE_DEPTH {
            return Err(DecodeError::InvalidHierarchy(format!(
                "node {} is nested deeper than {} levels",
                index, MAX_NODE_DEPTH
            )));
        }
        self.instances += 1;
        if self.instances > MAX_NODE_INSTANCES {
            return Err(DecodeError::InvalidHierarchy(format!(
                "more than {} node instances",
                MAX_NODE_INSTANCES
            )));
        }

        let mut converted = SceneNode::new(node.name().map(str::to_string));
        converted.transform = Mat4::from_cols_array_2d(&node.transform().matrix());
        converted.mesh = node.mesh().map(|mesh| mesh.index());

        self.ancestors.push(index);
        let children: Result<Vec<_>, _> = node.children().map(|child| self.convert(&child)).collect();
        self.ancestors.pop();

        converted.children = children?;
        Ok(converted)
    }
}

fn convert_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh, DecodeError> {
    let label = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh #{}", mesh.index()));
    let mut primitives = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping {:?} primitive in {}", primitive.mode(), label);
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| DecodeError::MissingPositions(label.clone()))?
            .collect();

        if positions.is_empty() {
            continue;
        }

        let mut indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            // No indices - treat as triangle list
            None => (0..positions.len() as u32).collect(),
        };
        indices.truncate(indices.len() - indices.len() % 3);

        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(DecodeError::IndexOutOfRange {
                mesh: label,
                index: bad,
                vertices: positions.len(),
            });
        }

        let normals = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => generate_normals(&positions, &indices),
        };

        let uvs = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        primitives.push(Primitive {
            positions,
            normals,
            uvs,
            indices,
            material: primitive.material().index(),
        });
    }

    Ok(Mesh {
        name: mesh.name().map(str::to_string),
        primitives,
    })
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material {
        base_color: pbr.base_color_factor(),
        base_color_texture: pbr.base_color_texture().map(|info| info.texture().index()),
        double_sided: material.double_sided(),
    }
}

/// Expand any 8/16-bit image layout to RGBA8
fn convert_image(image: &gltf::image::Data) -> Texture {
    use gltf::image::Format;

    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        // Little-endian 16-bit channels: keep the high byte
        Format::R16G16B16A16 => image.pixels.chunks_exact(2).map(|c| c[1]).collect(),
        Format::R16G16B16 => image
            .pixels
            .chunks_exact(6)
            .flat_map(|c| [c[1], c[3], c[5], 255])
            .collect(),
        Format::R16G16 => image
            .pixels
            .chunks_exact(4)
            .flat_map(|c| [c[1], c[3], 0, 255])
            .collect(),
        Format::R16 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|c| [c[1], c[1], c[1], 255])
            .collect(),
        other => {
            log::warn!("Unsupported texture format {:?}, using white", other);
            vec![255; image.width as usize * image.height as usize * 4]
        }
    };

    Texture {
        width: image.width,
        height: image.height,
        data,
    }
}

/// Area-weighted vertex normals from triangle faces
pub fn generate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (p0, p1, p2) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let face = (p1 - p0).cross(p2 - p0);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
