/// meshview core library - mesh ingestion and shared viewer math
///
/// Loads meshes from OBJ and PLY files, ear clips polygonal faces, unpacks
/// indexed data into flat vertex lists, and provides the transforms and camera
/// used to display them.

pub mod error;
pub mod geometry;
pub mod indexed;
pub mod loader;
pub mod models;
pub mod obj;
pub mod ply;
pub mod projection;
pub mod transform;
pub mod triangulate;

mod text;

// Re-export commonly used types
pub use error::{Attribute, Error, ParseError, ParseErrorKind, PlyFormat, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use indexed::{unpack, AttributeList, FaceRecord, IndexedMesh};
pub use loader::{load_mesh, MeshFormat};
pub use models::{load_model, ModelKind};
pub use projection::OrbitCamera;
pub use transform::ModelTransform;
pub use triangulate::triangulate;
