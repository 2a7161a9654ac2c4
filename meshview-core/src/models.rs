/// Built-in meshes and model selection
use std::f32::consts::PI;
use std::fmt;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{Attribute, Result};
use crate::geometry::{Mesh, Triangle, Vertex};
use crate::indexed::{AttributeList, FaceRecord, IndexedMesh};
use crate::loader::load_mesh;

/// Which mesh the viewer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Example,
    Generated,
    IndexedData,
    File,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Example,
        ModelKind::Generated,
        ModelKind::IndexedData,
        ModelKind::File,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Example => "Triangle",
            ModelKind::Generated => "Generated cone",
            ModelKind::IndexedData => "Unpacked tetrahedron",
            ModelKind::File => "Model loaded from file",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Produce the mesh for `kind`. `File` needs `path`; without one it shows the example.
pub fn load_model(kind: ModelKind, path: Option<&Path>) -> Result<Mesh> {
    match kind {
        ModelKind::Example => Ok(example_triangle()),
        ModelKind::Generated => Ok(cone(CONE_RADIUS, CONE_HEIGHT, CONE_SEGMENTS)),
        ModelKind::IndexedData => tetrahedron(),
        ModelKind::File => match path {
            Some(path) => load_mesh(path),
            None => Ok(example_triangle()),
        },
    }
}

/// A single triangle facing the default camera
pub fn example_triangle() -> Mesh {
    let normal = (0.0, 0.0, -1.0);
    let vertex = |x: f32, y: f32| Vertex::new(x, y, 0.0, normal.0, normal.1, normal.2);
    let mut mesh = Mesh::with_capacity(1);
    mesh.add_triangle(Triangle::new(
        vertex(0.0, 0.5),
        vertex(-0.5, -0.5),
        vertex(0.5, -0.5),
    ));
    mesh
}

pub const CONE_RADIUS: f32 = 0.25;
pub const CONE_HEIGHT: f32 = 1.0;
pub const CONE_SEGMENTS: usize = 40;

/// An upright cone with its tip at the origin and a closed base below it.
///
/// Each segment adds one side triangle and one base triangle, flat shaded.
pub fn cone(radius: f32, height: f32, segments: usize) -> Mesh {
    let step = 2.0 * PI / segments as f32;
    let rim = |i: usize| {
        let angle = step * (i % segments) as f32;
        Point3::new(angle.cos() * radius, -height, angle.sin() * radius)
    };
    let flat = |p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>| {
        let corner = |p: Point3<f32>| Vertex::from_parts(p, Vector3::zeros());
        let triangle = Triangle::new(corner(p0), corner(p1), corner(p2));
        let normal = triangle.face_normal().unwrap_or_else(Vector3::zeros);
        Triangle::new(
            Vertex::from_parts(p0, normal),
            Vertex::from_parts(p1, normal),
            Vertex::from_parts(p2, normal),
        )
    };

    let tip = Point3::origin();
    let base = Point3::new(0.0, -height, 0.0);
    (0..segments)
        .flat_map(|i| [flat(tip, rim(i), rim(i + 1)), flat(base, rim(i + 1), rim(i))])
        .collect()
}

/// Indexed data for a regular tetrahedron with outward face normals.
pub fn tetrahedron_data() -> IndexedMesh {
    let positions = vec![
        Point3::new(0.0, 0.407, 0.0),
        Point3::new(0.0, -0.3, -0.5),
        Point3::new(0.433, -0.3, 0.25),
        Point3::new(-0.433, -0.3, 0.25),
    ];
    let normals = vec![
        Vector3::new(0.8165, 0.3334, -0.4714),
        Vector3::new(0.0, 0.3334, 0.9428),
        Vector3::new(-0.8165, 0.3334, -0.4714),
        Vector3::new(0.0, -1.0, 0.0),
    ];
    let faces = vec![
        FaceRecord([0, 0, 1, 0, 2, 0]),
        FaceRecord([0, 2, 3, 2, 1, 2]),
        FaceRecord([0, 1, 2, 1, 3, 1]),
        FaceRecord([1, 3, 3, 3, 2, 3]),
    ];
    IndexedMesh {
        positions: AttributeList::from_vec(Attribute::Position, positions),
        normals: AttributeList::from_vec(Attribute::Normal, normals),
        faces,
    }
}

pub fn tetrahedron() -> Result<Mesh> {
    tetrahedron_data().unpack()
}

/// Floor quad under the model, already in world space.
pub fn reference_plane() -> Mesh {
    let vertex = |x: f32, z: f32| Vertex::new(x, -1.0, z, 0.0, 1.0, 0.0);
    let mut mesh = Mesh::with_capacity(2);
    mesh.add_triangle(Triangle::new(vertex(-1.0, -1.0), vertex(1.0, -1.0), vertex(1.0, 1.0)));
    mesh.add_triangle(Triangle::new(vertex(-1.0, -1.0), vertex(1.0, 1.0), vertex(-1.0, 1.0)));
    mesh
}
