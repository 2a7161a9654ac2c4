/// Mesh file loading with format detection
use std::fs;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::geometry::Mesh;
use crate::obj::parse_obj;
use crate::ply::parse_ply;

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Ply,
}

impl MeshFormat {
    /// `.obj` (any case) is OBJ; every other extension is read as PLY.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("obj") => MeshFormat::Obj,
            _ => MeshFormat::Ply,
        }
    }

    pub fn parse(&self, data: &[u8]) -> Result<Mesh> {
        match self {
            MeshFormat::Obj => parse_obj(data),
            MeshFormat::Ply => parse_ply(data),
        }
    }
}

/// Load a mesh file into a flat vertex list
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path);
    info!("Loading {:?} mesh from '{}'", format, path.display());

    let data = fs::read(path)?;
    let mesh = format.parse(&data)?;

    info!("Loaded {} triangles from '{}'", mesh.triangle_count(), path.display());
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path(Path::new("bunny.obj")), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("BUNNY.OBJ")), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("bunny.ply")), MeshFormat::Ply);
        assert_eq!(MeshFormat::from_path(Path::new("bunny.txt")), MeshFormat::Ply);
        assert_eq!(MeshFormat::from_path(Path::new("bunny")), MeshFormat::Ply);
    }
}
