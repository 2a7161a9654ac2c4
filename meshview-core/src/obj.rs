/// Wavefront OBJ parser for pre-triangulated ASCII meshes
use log::info;
use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::take_till1,
    character::complete::{char, space0, space1, u32 as index},
    combinator::{all_consuming, map, opt},
    multi::count,
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::geometry::Mesh;
use crate::indexed::{FaceRecord, IndexedMesh};
use crate::text;

/// One classified OBJ statement
#[derive(Debug, Clone, Copy, PartialEq)]
enum ObjLine {
    Position(Point3<f32>),
    Normal(Vector3<f32>),
    /// 1-based `(position, normal)` pairs; texture indices are dropped.
    Face([(u32, u32); 3]),
    Ignored,
}

/// Parse an OBJ file into its indexed form without unpacking it.
pub fn parse_obj_indexed(data: &[u8]) -> Result<IndexedMesh> {
    let input = text::from_utf8(data)?;
    let mut mesh = IndexedMesh::new();

    for (number, line) in text::numbered_lines(input) {
        let record = classify_line(line).map_err(|kind| ParseError::new(number, kind))?;
        match record {
            ObjLine::Position(p) => {
                mesh.positions.push(p);
            }
            ObjLine::Normal(n) => {
                mesh.normals.push(n);
            }
            ObjLine::Face(corners) => {
                let mut face = [(0, 0); 3];
                for (slot, (p, n)) in face.iter_mut().zip(corners) {
                    *slot = (to_zero_based(p, number)?, to_zero_based(n, number)?);
                }
                mesh.faces.push(FaceRecord::new(face));
            }
            ObjLine::Ignored => {}
        }
    }

    Ok(mesh)
}

/// Parse an OBJ file into a flat vertex list
pub fn parse_obj(data: &[u8]) -> Result<Mesh> {
    let indexed = parse_obj_indexed(data)?;
    let mesh = indexed.unpack()?;
    info!(
        "OBJ: {} positions, {} normals, {} triangles",
        indexed.positions.len(),
        indexed.normals.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn to_zero_based(index: u32, line: usize) -> Result<usize> {
    match index {
        0 => Err(ParseError::new(line, ParseErrorKind::InvalidIndex).into()),
        i => Ok(i as usize - 1),
    }
}

fn classify_line(line: &str) -> std::result::Result<ObjLine, ParseErrorKind> {
    let line = match line.find('#') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let line = line.trim();
    if line.is_empty() {
        return Ok(ObjLine::Ignored);
    }

    let (rest, word) = keyword(line)
        .map_err(|_| ParseErrorKind::Malformed(format!("unreadable statement '{}'", line)))?;

    let parsed = match word {
        "v" => map(record(vector3), |(x, y, z)| ObjLine::Position(Point3::new(x, y, z)))(rest),
        "vn" => map(record(vector3), |(x, y, z)| ObjLine::Normal(Vector3::new(x, y, z)))(rest),
        "f" => map(record(face), ObjLine::Face)(rest),
        _ => return Ok(ObjLine::Ignored),
    };

    parsed.map(|(_, record)| record).map_err(|_| {
        ParseErrorKind::Malformed(match word {
            "f" => format!("expected 'f p/t/n p/t/n p/t/n' or nine indices, got '{}'", line),
            _ => format!("expected '{} x y z', got '{}'", word, line),
        })
    })
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

/// Whole-line wrapper: the record must consume everything but trailing blanks.
fn record<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    all_consuming(terminated(parser, space0))
}

fn vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((
        preceded(space1, float),
        preceded(space1, float),
        preceded(space1, float),
    ))(input)
}

/// Three `p/t/n` triplets, or the same nine indices separated by blanks only.
fn face(input: &str) -> IResult<&str, [(u32, u32); 3]> {
    alt((
        map(
            tuple((
                preceded(space1, face_vertex),
                preceded(space1, face_vertex),
                preceded(space1, face_vertex),
            )),
            |(a, b, c)| [a, b, c],
        ),
        map(count(preceded(space1, index), 9), |i| {
            [(i[0], i[2]), (i[3], i[5]), (i[6], i[8])]
        }),
    ))(input)
}

/// `p/t/n` or `p//n`
fn face_vertex(input: &str) -> IResult<&str, (u32, u32)> {
    map(
        tuple((index, char('/'), opt(index), char('/'), index)),
        |(position, _, _texture, _, normal)| (position, normal),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Attribute, Error};

    const TRIANGLE: &str = "\
# one triangle
v 0.0 0.5 0.0
v -0.5 -0.5 0.0
v 0.5 -0.5 0.0
vt 0.0 0.0
vn 0.0 0.0 -1.0
vn 0.0 1.0 0.0
vn 1.0 0.0 0.0
f 1/1/1 2/1/2 3/1/3
";

    fn parse_err(input: &str) -> ParseError {
        match parse_obj(input.as_bytes()) {
            Err(Error::Parse(err)) => err,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_single_face() {
        let mesh = parse_obj(TRIANGLE.as_bytes()).unwrap();
        let vertices = mesh.vertices();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, Point3::new(0.0, 0.5, 0.0));
        assert_eq!(vertices[0].normal, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(vertices[1].position, Point3::new(-0.5, -0.5, 0.0));
        assert_eq!(vertices[1].normal, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(vertices[2].position, Point3::new(0.5, -0.5, 0.0));
        assert_eq!(vertices[2].normal, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_indices_shift_to_zero_based() {
        let indexed = parse_obj_indexed(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(indexed.faces, vec![FaceRecord([0, 0, 1, 1, 2, 2])]);
    }

    #[test]
    fn test_empty_texture_index() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let indexed = parse_obj_indexed(input.as_bytes()).unwrap();
        assert_eq!(indexed.faces, vec![FaceRecord::flat([0, 1, 2], 0)]);
    }

    #[test]
    fn test_blank_separated_face_fields() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 0 1 0\nf 1 1 1 2 1 2 3 1 1\n";
        let indexed = parse_obj_indexed(input.as_bytes()).unwrap();
        assert_eq!(indexed.faces, vec![FaceRecord([0, 0, 1, 1, 2, 0])]);

        let err = parse_err("v 0 0 0\nf 1 1 1 2 1 1 3 1\n");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_byte_order_mark_keeps_first_vertex() {
        let input = "\u{FEFF}v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";
        let indexed = parse_obj_indexed(input.as_bytes()).unwrap();
        assert_eq!(indexed.positions.len(), 3);
        assert_eq!(indexed.positions.as_slice()[0], Point3::new(0.0, 0.0, 0.0));

        let mesh = parse_obj(input.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_unused_statements_are_ignored() {
        let input = "mtllib a.mtl\no thing\ng group\ns off\nusemtl red\n\n   \nv 1 2 3 # trailing\n";
        let indexed = parse_obj_indexed(input.as_bytes()).unwrap();
        assert_eq!(indexed.positions.len(), 1);
        assert!(indexed.faces.is_empty());
    }

    #[test]
    fn test_quad_face_is_rejected() {
        let input = "v 0 0 0\nf 1/1/1 2/1/1 3/1/1 4/1/1\n";
        let err = parse_err(input);
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::Malformed(_)));
    }

    #[test]
    fn test_short_vertex_is_rejected() {
        let err = parse_err("v 1.0 2.0\n");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_non_numeric_normal_is_rejected() {
        let err = parse_err("v 0 0 0\nvn 0 x 1\n");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_zero_index_is_rejected() {
        let err = parse_err("v 0 0 0\nvn 0 0 1\nf 0/1/1 1/1/1 1/1/1\n");
        assert_eq!(err, ParseError::new(3, ParseErrorKind::InvalidIndex));
    }

    #[test]
    fn test_face_past_declared_normals() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1/1/1 2/1/2 3/1/1\n";
        let err = parse_obj(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                attribute: Attribute::Normal,
                index: 1,
                len: 1
            }
        ));
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = TRIANGLE.replace('\n', "\r\n");
        let mesh = parse_obj(input.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }
}
