use glam::{Mat4, Vec3};

use crate::math::AABB;

/// Triangle list for one material
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl Primitive {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    pub base_color_texture: Option<usize>,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            double_sided: false,
        }
    }
}

/// RGBA8 image, rows top to bottom
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Texture {
    /// 1x1 opaque white
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![255; 4],
        }
    }

    /// Non-empty with exactly width * height RGBA8 texels
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == self.width as usize * self.height as usize * 4
    }
}

/// Node in the decoded scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub transform: Mat4,
    pub mesh: Option<usize>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            transform: Mat4::IDENTITY,
            mesh: None,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Depth-first visit of this node and every descendant
    pub fn traverse<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    pub fn traverse_mut(&mut self, visit: &mut impl FnMut(&mut SceneNode)) {
        visit(self);
        for child in &mut self.children {
            child.traverse_mut(visit);
        }
    }

    /// Visit every node with its world transform
    pub fn traverse_world(&self, parent: Mat4, visit: &mut impl FnMut(&SceneNode, Mat4)) {
        let world = parent * self.transform;
        visit(self, world);
        for child in &self.children {
            child.traverse_world(world, visit);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |_| count += 1);
        count
    }
}

/// A fully decoded asset, ready to be swapped into the displayed scene
#[derive(Debug, Clone)]
pub struct SceneAsset {
    pub name: String,
    pub root: SceneNode,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
}

impl SceneAsset {
    /// Mark every mesh-bearing node as shadow casting and receiving
    pub fn enable_shadows(&mut self) -> usize {
        let mut marked = 0;
        self.root.traverse_mut(&mut |node| {
            if node.is_mesh() {
                node.cast_shadow = true;
                node.receive_shadow = true;
                marked += 1;
            }
        });
        marked
    }

    pub fn mesh_node_count(&self) -> usize {
        let mut count = 0;
        self.root.traverse(&mut |node| {
            if node.is_mesh() {
                count += 1;
            }
        });
        count
    }

    pub fn triangle_count(&self) -> usize {
        let mut count = 0;
        self.root.traverse(&mut |node| {
            if let Some(mesh) = node.mesh.and_then(|i| self.meshes.get(i)) {
                count += mesh.primitives.iter().map(Primitive::triangle_count).sum::<usize>();
            }
        });
        count
    }

    /// World-space bounds of every mesh vertex, `None` without geometry
    pub fn bounds(&self) -> Option<AABB> {
        let mut bounds: Option<AABB> = None;
        self.root.traverse_world(Mat4::IDENTITY, &mut |node, world| {
            let Some(mesh) = node.mesh.and_then(|i| self.meshes.get(i)) else {
                return;
            };
            for primitive in &mesh.primitives {
                for &position in &primitive.positions {
                    let p = world.transform_point3(Vec3::from_array(position));
                    let point = AABB::new(p, p);
                    bounds = Some(match bounds {
                        Some(b) => b.union(&point),
                        None => point,
                    });
                }
            }
        });
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        Mesh {
            name: Some("tri".into()),
            primitives: vec![Primitive {
                positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                normals: vec![[0.0, 0.0, 1.0]; 3],
                uvs: vec![[0.0, 0.0]; 3],
                indices: vec![0, 1, 2],
                material: None,
            }],
        }
    }

    fn sample_asset() -> SceneAsset {
        let mut group = SceneNode::new(Some("group".into()));
        let mut leaf = SceneNode::new(Some("leaf".into()));
        leaf.mesh = Some(0);
        leaf.transform = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let mut nested_leaf = SceneNode::new(Some("nested".into()));
        nested_leaf.mesh = Some(0);
        let mut inner = SceneNode::new(Some("inner".into()));
        inner.children.push(nested_leaf);
        group.children.push(leaf);
        group.children.push(inner);

        SceneAsset {
            name: "sample".into(),
            root: group,
            meshes: vec![unit_triangle()],
            materials: vec![],
            textures: vec![],
        }
    }

    #[test]
    fn test_enable_shadows_marks_only_mesh_nodes() {
        let mut asset = sample_asset();
        assert_eq!(asset.enable_shadows(), 2);

        asset.root.traverse(&mut |node| {
            assert_eq!(node.cast_shadow, node.is_mesh());
            assert_eq!(node.receive_shadow, node.is_mesh());
        });
    }

    #[test]
    fn test_counts() {
        let asset = sample_asset();
        assert_eq!(asset.root.node_count(), 4);
        assert_eq!(asset.mesh_node_count(), 2);
        assert_eq!(asset.triangle_count(), 2);
    }

    #[test]
    fn test_bounds_apply_node_transforms() {
        let bounds = sample_asset().bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 0.0));
    }

    #[test]
    fn test_texture_validity() {
        assert!(Texture::white().is_valid());
        let truncated = Texture {
            width: 2,
            height: 2,
            data: vec![0; 12],
        };
        assert!(!truncated.is_valid());
    }

    #[test]
    fn test_bounds_empty_scene() {
        let asset = SceneAsset {
            name: "empty".into(),
            root: SceneNode::new(None),
            meshes: vec![],
            materials: vec![],
            textures: vec![],
        };
        assert!(asset.bounds().is_none());
    }
}
