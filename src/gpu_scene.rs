use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::math::AABB;
use crate::scene::{Material, SceneAsset, Texture};
use crate::types::{DrawUniform, MaterialUniform, Vertex};

/// Bind group layouts the scene resources are created against
pub struct SceneLayouts {
    pub draw: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let draw = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("draw_bind_group_layout"),
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            draw,
            material,
            sampler,
        }
    }
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: usize,
}

struct GpuMaterial {
    bind_group: wgpu::BindGroup,
    double_sided: bool,
}

struct GpuNode {
    bind_group: wgpu::BindGroup,
    mesh: usize,
    cast_shadow: bool,
}

/// GPU copy of the displayed asset
pub struct GpuScene {
    pub generation: u64,
    pub bounds: Option<AABB>,
    meshes: Vec<Vec<GpuPrimitive>>,
    materials: Vec<GpuMaterial>,
    nodes: Vec<GpuNode>,
}

/// Device limits that asset data is checked against before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_texture_dimension: u32,
    pub max_buffer_size: u64,
}

impl UploadLimits {
    pub fn from_device(limits: &wgpu::Limits) -> Self {
        Self {
            max_texture_dimension: limits.max_texture_dimension_2d,
            max_buffer_size: limits.max_buffer_size,
        }
    }

    /// Whether the interleaved vertex buffer and the u32 index buffer of a
    /// primitive can both be created
    pub fn fits_primitive(&self, vertex_count: usize, index_count: usize) -> bool {
        let vertex_bytes = (vertex_count as u64).saturating_mul(std::mem::size_of::<Vertex>() as u64);
        let index_bytes = (index_count as u64).saturating_mul(std::mem::size_of::<u32>() as u64);
        index_count <= u32::MAX as usize
            && vertex_bytes <= self.max_buffer_size
            && index_bytes <= self.max_buffer_size
    }
}

/// Nearest-neighbour shrink by the smallest integer step that brings both
/// sides within `max_dimension`. `None` when the texture already fits.
/// Expects a texture that passes `Texture::is_valid`.
pub fn downscale_to_fit(texture: &Texture, max_dimension: u32) -> Option<Texture> {
    let max_dimension = max_dimension.max(1);
    let longest = texture.width.max(texture.height);
    if longest <= max_dimension {
        return None;
    }

    let step = longest.div_ceil(max_dimension);
    let width = texture.width.div_ceil(step);
    let height = texture.height.div_ceil(step);
    let source_width = texture.width as usize;

    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        let row = (y * step) as usize * source_width;
        for x in 0..width {
            let texel = (row + (x * step) as usize) * 4;
            data.extend_from_slice(&texture.data[texel..texel + 4]);
        }
    }

    Some(Texture { width, height, data })
}

/// Interleave one primitive's attribute streams
pub fn interleave(positions: &[[f32; 3]], normals: &[[f32; 3]], uvs: &[[f32; 2]]) -> Vec<Vertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// Inverse-transpose, identity for degenerate transforms
pub fn normal_matrix(world: Mat4) -> Mat4 {
    if world.determinant().abs() <= f32::EPSILON {
        Mat4::IDENTITY
    } else {
        world.inverse().transpose()
    }
}

impl GpuScene {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &SceneLayouts,
        asset: &SceneAsset,
        generation: u64,
        limits: &UploadLimits,
    ) -> Self {
        let textures: Vec<wgpu::TextureView> = asset
            .textures
            .iter()
            .enumerate()
            .map(|(i, texture)| upload_texture(device, queue, texture, &format!("Texture {}", i), limits))
            .collect();
        let white = upload_texture(device, queue, &Texture::white(), "Default Texture", limits);

        // Last entry serves primitives without a material
        let mut materials: Vec<GpuMaterial> = asset
            .materials
            .iter()
            .map(|material| {
                let view = material
                    .base_color_texture
                    .and_then(|i| textures.get(i))
                    .unwrap_or(&white);
                create_material(device, layouts, material, view)
            })
            .collect();
        materials.push(create_material(device, layouts, &Material::default(), &white));
        let default_material = materials.len() - 1;

        let meshes = asset
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .filter(|p| !p.indices.is_empty())
                    .filter(|p| {
                        let fits = limits.fits_primitive(p.positions.len(), p.indices.len());
                        if !fits {
                            log::error!(
                                "Skipping primitive in {}: {} vertices, {} indices exceed the {} byte buffer limit",
                                mesh.name.as_deref().unwrap_or("unnamed mesh"),
                                p.positions.len(),
                                p.indices.len(),
                                limits.max_buffer_size
                            );
                        }
                        fits
                    })
                    .map(|primitive| {
                        let vertices = interleave(&primitive.positions, &primitive.normals, &primitive.uvs);
                        GpuPrimitive {
                            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("Vertex Buffer"),
                                contents: bytemuck::cast_slice(&vertices),
                                usage: wgpu::BufferUsages::VERTEX,
                            }),
                            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("Index Buffer"),
                                contents: bytemuck::cast_slice(&primitive.indices),
                                usage: wgpu::BufferUsages::INDEX,
                            }),
                            index_count: primitive.indices.len() as u32,
                            material: primitive
                                .material
                                .filter(|&i| i < default_material)
                                .unwrap_or(default_material),
                        }
                    })
                    .collect()
            })
            .collect();

        let mut nodes = Vec::new();
        asset.root.traverse_world(Mat4::IDENTITY, &mut |node, world| {
            let Some(mesh) = node.mesh.filter(|&i| i < asset.meshes.len()) else {
                return;
            };
            let uniform = DrawUniform {
                model: world.to_cols_array_2d(),
                normal_matrix: normal_matrix(world).to_cols_array_2d(),
                flags: [if node.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            };
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Draw Uniform"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &layouts.draw,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some("draw_bind_group"),
            });
            nodes.push(GpuNode {
                bind_group,
                mesh,
                cast_shadow: node.cast_shadow,
            });
        });

        log::info!(
            "Uploaded {}: {} draw nodes, {} materials, {} textures",
            asset.name,
            nodes.len(),
            materials.len(),
            textures.len()
        );

        Self {
            generation,
            bounds: asset.bounds(),
            meshes,
            materials,
            nodes,
        }
    }

    /// Depth-only draws of every shadow-casting node
    pub fn draw_shadows(&self, pass: &mut wgpu::RenderPass<'_>) {
        for node in self.nodes.iter().filter(|n| n.cast_shadow) {
            pass.set_bind_group(1, &node.bind_group, &[]);
            for primitive in &self.meshes[node.mesh] {
                pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..primitive.index_count, 0, 0..1);
            }
        }
    }

    /// Shaded draws; `double_sided` selects which materials this pipeline takes
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, double_sided: bool) {
        for node in &self.nodes {
            pass.set_bind_group(1, &node.bind_group, &[]);
            for primitive in &self.meshes[node.mesh] {
                let material = &self.materials[primitive.material];
                if material.double_sided != double_sided {
                    continue;
                }
                pass.set_bind_group(2, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..primitive.index_count, 0, 0..1);
            }
        }
    }
}

fn create_material(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    material: &Material,
    view: &wgpu::TextureView,
) -> GpuMaterial {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Material Uniform"),
        contents: bytemuck::cast_slice(&[MaterialUniform {
            base_color: material.base_color,
        }]),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layouts.material,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&layouts.sampler),
            },
        ],
        label: Some("material_bind_group"),
    });

    GpuMaterial {
        bind_group,
        double_sided: material.double_sided,
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &Texture,
    label: &str,
    limits: &UploadLimits,
) -> wgpu::TextureView {
    let replacement;
    let texture = if !texture.is_valid() {
        log::warn!("{} has inconsistent dimensions, using white", label);
        replacement = Texture::white();
        &replacement
    } else if let Some(smaller) = downscale_to_fit(texture, limits.max_texture_dimension) {
        log::warn!(
            "{} is {}x{}, above the device limit of {}; downscaled to {}x{}",
            label,
            texture.width,
            texture.height,
            limits.max_texture_dimension,
            smaller.width,
            smaller.height
        );
        replacement = smaller;
        &replacement
    } else {
        texture
    };

    let gpu_texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: texture.width,
                height: texture.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texture.data,
    );
    gpu_texture.create_view(&wgpu::TextureViewDescriptor::default())
}
