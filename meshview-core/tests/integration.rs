use std::io::Write;

use approx::assert_relative_eq;
use meshview_core::{load_mesh, models, Error, Mesh, ParseErrorKind, PlyFormat};
use nalgebra::{Point3, Vector3};

const OBJ_TETRAHEDRON: &[u8] = include_bytes!("../../res/tetrahedron.obj");
const PLY_CUBE: &[u8] = include_bytes!("../../res/cube.ply");
const PLY_CONCAVE: &[u8] = include_bytes!("../../res/concave.ply");
const PLY_BINARY: &[u8] = include_bytes!("../../res/binary_header.ply");

fn res(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../res")
        .join(name)
}

fn total_area(mesh: &Mesh) -> f32 {
    mesh.triangles().map(|t| t.area()).sum()
}

#[test]
fn obj_tetrahedron_matches_builtin() {
    let mesh = meshview_core::obj::parse_obj(OBJ_TETRAHEDRON).unwrap();
    let builtin = models::tetrahedron().unwrap();
    assert_eq!(mesh.vertices().len(), 12);

    for (loaded, expected) in mesh.vertices().iter().zip(builtin.vertices()) {
        assert_relative_eq!(loaded.position, expected.position, epsilon = 1e-6);
        assert_relative_eq!(loaded.normal, expected.normal, epsilon = 1e-6);
    }
}

#[test]
fn ply_cube_quads_become_outward_triangles() {
    let mesh = meshview_core::ply::parse_ply(PLY_CUBE).unwrap();
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.vertices().len(), 36);
    assert_relative_eq!(total_area(&mesh), 24.0, epsilon = 1e-4);

    for triangle in mesh.triangles() {
        let normal = triangle.vertices[0].normal;
        assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-5);
        assert!(triangle.vertices.iter().all(|v| v.normal == normal));

        // Axis aligned and pointing away from the centre.
        assert_relative_eq!(normal.abs().max(), 1.0, epsilon = 1e-5);
        let centre = triangle
            .vertices
            .iter()
            .fold(Vector3::zeros(), |sum, v| sum + v.position.coords)
            / 3.0;
        assert!(centre.dot(&normal) > 0.0);
    }
}

#[test]
fn ply_concave_polygon_is_clipped_without_spill() {
    let mesh = meshview_core::ply::parse_ply(PLY_CONCAVE).unwrap();
    assert_eq!(mesh.triangle_count(), 3);
    assert_relative_eq!(total_area(&mesh), 3.0, epsilon = 1e-5);

    // The notch vertex never becomes the middle corner of a triangle.
    let notch = Point3::new(1.0, 1.0, 0.0);
    for triangle in mesh.triangles() {
        assert_ne!(triangle.vertices[1].position, notch);
        assert_relative_eq!(triangle.vertices[0].normal, Vector3::new(0.0, 0.0, -1.0));
    }
}

#[test]
fn ply_binary_header_is_rejected_at_format_line() {
    let err = meshview_core::ply::parse_ply(PLY_BINARY).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert!(matches!(
        err,
        Error::Parse(ref parse) if parse.kind == ParseErrorKind::UnsupportedFormat(PlyFormat::BinaryLittleEndian)
    ));
}

#[test]
fn load_mesh_dispatches_on_extension() {
    let obj = load_mesh(res("tetrahedron.obj")).unwrap();
    assert_eq!(obj.triangle_count(), 4);

    let ply = load_mesh(res("cube.ply")).unwrap();
    assert_eq!(ply.triangle_count(), 12);
}

#[test]
fn load_mesh_extension_is_case_insensitive() {
    let mut file = tempfile::Builder::new().suffix(".OBJ").tempfile().unwrap();
    file.write_all(OBJ_TETRAHEDRON).unwrap();
    file.flush().unwrap();

    let mesh = load_mesh(file.path()).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
}

#[test]
fn unknown_extension_is_read_as_ply() {
    let mut file = tempfile::Builder::new().suffix(".mesh").tempfile().unwrap();
    file.write_all(PLY_CUBE).unwrap();
    file.flush().unwrap();

    let mesh = load_mesh(file.path()).unwrap();
    assert_eq!(mesh.triangle_count(), 12);

    // OBJ content behind a non-.obj name is parsed as PLY and fails.
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(OBJ_TETRAHEDRON).unwrap();
    file.flush().unwrap();
    assert!(matches!(load_mesh(file.path()), Err(Error::Parse(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_mesh(dir.path().join("absent.ply")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn empty_mesh_files_load_as_empty_meshes() {
    let dir = tempfile::tempdir().unwrap();

    let obj = dir.path().join("empty.obj");
    std::fs::write(&obj, "# nothing here\n").unwrap();
    assert!(load_mesh(&obj).unwrap().vertices().is_empty());

    let ply = dir.path().join("empty.ply");
    std::fs::write(&ply, "ply\nformat ascii 1.0\nelement vertex 0\nelement face 0\nend_header\n").unwrap();
    assert!(load_mesh(&ply).unwrap().vertices().is_empty());
}
