/// Indexed mesh data and unpacking into a flat vertex list
use nalgebra::{Point3, Vector3};

use crate::error::{Attribute, Error, Result};
use crate::geometry::{Mesh, Triangle, Vertex};

/// An append-only attribute list whose reads are bounds checked
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeList<T> {
    attribute: Attribute,
    items: Vec<T>,
}

impl<T: Copy> AttributeList<T> {
    pub fn new(attribute: Attribute) -> Self {
        Self {
            attribute,
            items: Vec::new(),
        }
    }

    pub fn from_vec(attribute: Attribute, items: Vec<T>) -> Self {
        Self { attribute, items }
    }

    /// Appends an item and returns its index.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    pub fn get(&self, index: usize) -> Result<T> {
        self.items
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                attribute: self.attribute,
                index,
                len: self.items.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

pub type Positions = AttributeList<Point3<f32>>;
pub type Normals = AttributeList<Vector3<f32>>;

/// One triangle as `(position, normal)` index pairs.
///
/// The layout matches the on-disk tuple `(p0, n0, p1, n1, p2, n2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRecord(pub [usize; 6]);

impl FaceRecord {
    pub fn new(corners: [(usize, usize); 3]) -> Self {
        let [(p0, n0), (p1, n1), (p2, n2)] = corners;
        Self([p0, n0, p1, n1, p2, n2])
    }

    /// Three corners sharing a single normal.
    pub fn flat(positions: [usize; 3], normal: usize) -> Self {
        let [a, b, c] = positions;
        Self([a, normal, b, normal, c, normal])
    }

    pub fn corners(&self) -> [(usize, usize); 3] {
        let f = self.0;
        [(f[0], f[1]), (f[2], f[3]), (f[4], f[5])]
    }
}

/// Shared attribute lists plus the faces that reference them
#[derive(Debug, Clone)]
pub struct IndexedMesh {
    pub positions: Positions,
    pub normals: Normals,
    pub faces: Vec<FaceRecord>,
}

impl IndexedMesh {
    pub fn new() -> Self {
        Self {
            positions: AttributeList::new(Attribute::Position),
            normals: AttributeList::new(Attribute::Normal),
            faces: Vec::new(),
        }
    }

    /// Expands every face into three vertices, in face order.
    pub fn unpack(&self) -> Result<Mesh> {
        unpack(&self.positions, &self.normals, &self.faces)
    }
}

impl Default for IndexedMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve each face's indices into a flat vertex list of `3 * faces.len()` entries.
///
/// No vertex sharing or reordering: output order is face order.
pub fn unpack(positions: &Positions, normals: &Normals, faces: &[FaceRecord]) -> Result<Mesh> {
    let mut mesh = Mesh::with_capacity(faces.len());
    for face in faces {
        let mut corners = [Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0); 3];
        for (vertex, (p, n)) in corners.iter_mut().zip(face.corners()) {
            *vertex = Vertex::from_parts(positions.get(p)?, normals.get(n)?);
        }
        mesh.add_triangle(Triangle::new(corners[0], corners[1], corners[2]));
    }
    Ok(mesh)
}
