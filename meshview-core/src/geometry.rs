/// Flat vertex-list mesh model
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    pub fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal for the clockwise-front winding every mesh in this crate uses.
    ///
    /// Returns `None` for a zero-area triangle.
    pub fn face_normal(&self) -> Option<Vector3<f32>> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge2.cross(&edge1).try_normalize(f32::EPSILON)
    }

    pub fn area(&self) -> f32 {
        let [v0, v1, v2] = self.vertices;
        (v1.position - v0.position)
            .cross(&(v2.position - v0.position))
            .norm()
            * 0.5
    }
}

/// A flat, renderer-ready vertex list; every three vertices form one triangle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.vertices.extend_from_slice(&triangle.vertices);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|v| Triangle::new(v[0], v[1], v[2]))
    }

    /// Interleaved `px py pz nx ny nz` floats, in vertex order.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertices.len() * 6);
        for v in &self.vertices {
            out.extend_from_slice(&[
                v.position.x,
                v.position.y,
                v.position.z,
                v.normal.x,
                v.normal.y,
                v.normal.z,
            ]);
        }
        out
    }
}

impl FromIterator<Triangle> for Mesh {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        let mut mesh = Mesh::new();
        for triangle in iter {
            mesh.add_triangle(triangle);
        }
        mesh
    }
}
