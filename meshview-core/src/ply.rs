/// Stanford PLY parser (ASCII encoding)
///
/// Faces may be arbitrary simple polygons; they are ear clipped into triangles
/// and given one synthesized normal per triangle.
use log::{debug, info, warn};
use nalgebra::Point3;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{digit1, space0, space1, u32 as index},
    combinator::{all_consuming, eof, map, map_res, opt, peek, value},
    error::{Error as NomError, ErrorKind},
    multi::{count, separated_list1},
    number::complete::float,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use crate::error::{ParseError, ParseErrorKind, PlyFormat, Result};
use crate::geometry::Mesh;
use crate::indexed::IndexedMesh;
use crate::text;
use crate::triangulate::triangulate;

/// One classified header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderLine<'a> {
    Magic,
    Format(PlyFormat),
    Element { name: &'a str, count: usize },
    Property { name: &'a str },
    Comment,
    EndHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlyElement {
    name: String,
    count: usize,
    properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlyHeader {
    format: PlyFormat,
    elements: Vec<PlyElement>,
    /// Lines taken by the header, `end_header` included.
    lines: usize,
    /// Byte offset of the first body line.
    body_offset: usize,
}

/// Parse a PLY file into its indexed form without unpacking it.
pub fn parse_ply_indexed(data: &[u8]) -> Result<IndexedMesh> {
    let header = parse_header(data)?;
    debug!("PLY {} with {} elements", header.format, header.elements.len());
    let body = std::str::from_utf8(&data[header.body_offset..]).map_err(|e| {
        let line = header.lines + text::line_at(&data[header.body_offset..], e.valid_up_to());
        ParseError::new(line, ParseErrorKind::InvalidUtf8)
    })?;
    let last_line = header.lines + body.lines().count();

    let mut lines = text::numbered_lines(body)
        .map(|(number, line)| (number + header.lines, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let mut mesh = IndexedMesh::new();
    let mut polygons = Vec::new();

    for element in &header.elements {
        let columns = match element.name.as_str() {
            "vertex" => Some(vertex_columns(element, header.lines)?),
            _ => None,
        };
        if element.name != "vertex" && element.name != "face" {
            debug!("skipping {} '{}' records", element.count, element.name);
        }

        for _ in 0..element.count {
            let (number, line) = lines.next().ok_or_else(|| {
                ParseError::new(
                    last_line,
                    ParseErrorKind::UnexpectedEof {
                        element: element.name.clone(),
                    },
                )
            })?;

            match (element.name.as_str(), columns) {
                ("vertex", Some([x, y, z])) => {
                    let (_, row) = vertex_row(line).map_err(|_| {
                        ParseError::malformed(number, format!("expected vertex values, got '{}'", line))
                    })?;
                    let value = |column: usize| {
                        row.get(column).copied().ok_or_else(|| {
                            ParseError::malformed(
                                number,
                                format!("vertex has {} values, needs column {}", row.len(), column + 1),
                            )
                        })
                    };
                    mesh.positions
                        .push(Point3::new(value(x)?, value(y)?, value(z)?));
                }
                ("face", _) => {
                    let (_, polygon) = face_row(line).map_err(|_| {
                        ParseError::malformed(number, format!("expected 'k i0 .. ik-1', got '{}'", line))
                    })?;
                    if polygon.len() < 3 {
                        return Err(ParseError::malformed(
                            number,
                            format!("face needs at least 3 vertices, got {}", polygon.len()),
                        )
                        .into());
                    }
                    polygons.push((number, polygon));
                }
                _ => {}
            }
        }
    }

    // Faces may precede vertices in the header, so clip once every position is known.
    for (number, polygon) in polygons {
        let polygon: Vec<usize> = polygon.into_iter().map(|i| i as usize).collect();
        let faces = triangulate(&polygon, &mesh.positions, &mut mesh.normals).map_err(|err| {
            warn!("face on line {} could not be triangulated: {}", number, err);
            err
        })?;
        mesh.faces.extend(faces);
    }

    Ok(mesh)
}

/// Parse a PLY file into a flat vertex list
pub fn parse_ply(data: &[u8]) -> Result<Mesh> {
    let indexed = parse_ply_indexed(data)?;
    let mesh = indexed.unpack()?;
    info!(
        "PLY: {} positions, {} triangles",
        indexed.positions.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn parse_header(data: &[u8]) -> std::result::Result<PlyHeader, ParseError> {
    let mut format = None;
    let mut elements: Vec<PlyElement> = Vec::new();
    let mut offset = 0;
    let mut number = 0;

    while offset < data.len() {
        let end = data[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(data.len(), |i| offset + i + 1);
        let raw = &data[offset..end];
        offset = end;
        number += 1;

        let line = std::str::from_utf8(raw)
            .map_err(|_| ParseError::new(number, ParseErrorKind::InvalidUtf8))?;
        let line = match number {
            1 => text::strip_bom(line),
            _ => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        match classify_header_line(line).map_err(|kind| ParseError::new(number, kind))? {
            HeaderLine::Magic => {}
            HeaderLine::Format(PlyFormat::Ascii) => format = Some(PlyFormat::Ascii),
            HeaderLine::Format(binary) => {
                return Err(ParseError::new(number, ParseErrorKind::UnsupportedFormat(binary)));
            }
            HeaderLine::Element { name, count } => {
                debug!("element {} x{}", name, count);
                elements.push(PlyElement {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            HeaderLine::Property { name } => match elements.last_mut() {
                Some(element) => element.properties.push(name.to_string()),
                None => {
                    return Err(ParseError::malformed(number, "property declared before any element"));
                }
            },
            HeaderLine::Comment => {}
            HeaderLine::EndHeader => {
                if !data.starts_with(b"ply") && !data.starts_with(b"\xef\xbb\xbfply") {
                    warn!("PLY header does not start with 'ply'");
                }
                let format = format.unwrap_or_else(|| {
                    warn!("PLY header has no format line, assuming ascii");
                    PlyFormat::Ascii
                });
                return Ok(PlyHeader {
                    format,
                    elements,
                    lines: number,
                    body_offset: offset,
                });
            }
        }
    }

    Err(ParseError::new(number.max(1), ParseErrorKind::MissingEndHeader))
}

/// Column of x, y and z within a vertex row.
fn vertex_columns(element: &PlyElement, header_line: usize) -> std::result::Result<[usize; 3], ParseError> {
    if element.properties.is_empty() {
        return Ok([0, 1, 2]);
    }
    let column = |axis: &str| {
        element
            .properties
            .iter()
            .position(|p| p == axis)
            .ok_or_else(|| ParseError::malformed(header_line, format!("vertex element has no '{}' property", axis)))
    };
    Ok([column("x")?, column("y")?, column("z")?])
}

fn classify_header_line(line: &str) -> std::result::Result<HeaderLine<'_>, ParseErrorKind> {
    let (rest, word) = word(line)
        .map_err(|_| ParseErrorKind::Malformed(format!("unreadable header line '{}'", line)))?;

    let parsed = match word {
        "ply" => value(HeaderLine::Magic, all_consuming(space0))(rest),
        "format" => map(all_consuming(format_spec), HeaderLine::Format)(rest),
        "element" => map(all_consuming(element_spec), |(name, count)| {
            HeaderLine::Element { name, count }
        })(rest),
        "property" => map(all_consuming(property_spec), |name| HeaderLine::Property { name })(rest),
        "comment" | "obj_info" => return Ok(HeaderLine::Comment),
        "end_header" => value(HeaderLine::EndHeader, all_consuming(space0))(rest),
        other => {
            return Err(ParseErrorKind::Malformed(format!(
                "unknown header keyword '{}'",
                other
            )))
        }
    };

    parsed
        .map(|(_, header_line)| header_line)
        .map_err(|_| ParseErrorKind::Malformed(format!("invalid '{}' line: '{}'", word, line)))
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

/// `ascii 1.0`; the version is optional and not checked.
fn format_spec(input: &str) -> IResult<&str, PlyFormat> {
    terminated(
        preceded(
            space1,
            alt((
                value(PlyFormat::Ascii, tag("ascii")),
                value(PlyFormat::BinaryBigEndian, tag("binary_big_endian")),
                value(PlyFormat::BinaryLittleEndian, tag("binary_little_endian")),
            )),
        ),
        tuple((opt(preceded(space1, word)), space0)),
    )(input)
}

fn element_spec(input: &str) -> IResult<&str, (&str, usize)> {
    terminated(
        tuple((
            preceded(space1, word),
            preceded(space1, map_res(digit1, str::parse::<usize>)),
        )),
        space0,
    )(input)
}

/// `float x` or `list uchar int vertex_indices`; yields the property name.
fn property_spec(input: &str) -> IResult<&str, &str> {
    let list = map(
        tuple((tag("list"), space1, word, space1, word, space1, word)),
        |(_, _, _count_type, _, _item_type, _, name)| name,
    );
    let scalar = map(tuple((word, space1, word)), |(_type, _, name)| name);
    delimited(space1, alt((list, scalar)), space0)(input)
}

fn vertex_row(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(separated_list1(space1, float))(input)
}

/// `k i0 i1 .. ik-1`, any trailing per-face properties ignored.
fn face_row(input: &str) -> IResult<&str, Vec<u32>> {
    let (rest, k) = index::<_, NomError<&str>>(input)?;
    // Each index needs at least a separator and a digit.
    if k as usize > rest.len() / 2 {
        return Err(nom::Err::Error(NomError::new(rest, ErrorKind::Count)));
    }
    terminated(
        count(preceded(space1, index), k as usize),
        peek(alt((space1, eof))),
    )(rest)
}
