/// Ear-clipping triangulation of simple polygons
use std::f32::consts::PI;

use log::{debug, warn};
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::indexed::{FaceRecord, Normals, Positions};

/// Vertices whose interior angle is within this many radians of PI count as reflex.
const REFLEX_TOLERANCE: f32 = 1e-3;

/// Slack allowed on each barycentric weight when testing containment.
const CONTAINMENT_TOLERANCE: f32 = 1e-5;

/// Split a polygon of position indices into triangles by ear clipping.
///
/// Ears are taken in index order: each pass returns the first candidate that is
/// convex and holds no other remaining vertex. One flat-shaded normal is appended
/// to `normals` per emitted triangle. A pass that finds no ear fails with
/// [`Error::NoEar`] rather than retrying.
pub fn triangulate(
    polygon: &[usize],
    positions: &Positions,
    normals: &mut Normals,
) -> Result<Vec<FaceRecord>> {
    if polygon.len() < 3 {
        return Err(Error::TooFewVertices(polygon.len()));
    }

    let points = polygon
        .iter()
        .map(|&index| positions.get(index))
        .collect::<Result<Vec<_>>>()?;
    let winding = newell_normal(&points).try_normalize(f32::EPSILON);

    // Slots into `polygon`/`points`; shrinks by one per ear.
    let mut remaining: Vec<usize> = (0..polygon.len()).collect();
    let mut faces = Vec::with_capacity(polygon.len() - 2);

    if polygon.len() > 3 {
        let winding = winding.ok_or(Error::DegeneratePolygon {
            vertices: polygon.len(),
        })?;

        while remaining.len() > 3 {
            let tip = find_ear(&points, &remaining, &winding).ok_or(Error::NoEar {
                remaining: remaining.len(),
            })?;
            let (prev, next) = neighbours(remaining.len(), tip);
            let corners = [remaining[prev], remaining[tip], remaining[next]];
            debug!(
                "ear at {} between {} and {}",
                polygon[corners[1]], polygon[corners[0]], polygon[corners[2]]
            );
            faces.push(emit(polygon, &points, corners, Some(winding), normals));
            remaining.remove(tip);
        }
    }

    // The first scan candidate of the last triangle is its slot 0.
    let corners = [remaining[2], remaining[0], remaining[1]];
    faces.push(emit(polygon, &points, corners, winding, normals));

    Ok(faces)
}

fn find_ear(points: &[Point3<f32>], remaining: &[usize], winding: &Vector3<f32>) -> Option<usize> {
    (0..remaining.len()).find(|&tip| is_ear(points, remaining, tip, winding))
}

fn is_ear(points: &[Point3<f32>], remaining: &[usize], tip: usize, winding: &Vector3<f32>) -> bool {
    let (prev, next) = neighbours(remaining.len(), tip);
    let a = points[remaining[prev]];
    let b = points[remaining[tip]];
    let c = points[remaining[next]];

    if interior_angle(&a, &b, &c, winding) >= PI - REFLEX_TOLERANCE {
        return false;
    }

    !remaining
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != prev && k != tip && k != next)
        .any(|(_, &slot)| contains(&a, &b, &c, &points[slot]))
}

fn neighbours(len: usize, index: usize) -> (usize, usize) {
    ((index + len - 1) % len, (index + 1) % len)
}

fn emit(
    polygon: &[usize],
    points: &[Point3<f32>],
    [a, b, c]: [usize; 3],
    winding: Option<Vector3<f32>>,
    normals: &mut Normals,
) -> FaceRecord {
    let normal = (points[a] - points[b])
        .cross(&(points[c] - points[b]))
        .try_normalize(f32::EPSILON)
        .or_else(|| {
            warn!("zero-area triangle {} {} {}", polygon[a], polygon[b], polygon[c]);
            winding.map(|w| -w)
        })
        .unwrap_or_else(Vector3::zeros);
    let normal = normals.push(normal);
    FaceRecord::flat([polygon[a], polygon[b], polygon[c]], normal)
}

/// Interior angle at `b`, in `[0, 2*PI)`, for a polygon wound about `winding`.
fn interior_angle(
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
    winding: &Vector3<f32>,
) -> f32 {
    let (Some(ba), Some(bc)) = (
        (a - b).try_normalize(f32::EPSILON),
        (c - b).try_normalize(f32::EPSILON),
    ) else {
        return PI;
    };

    let angle = ba.dot(&bc).clamp(-1.0, 1.0).acos();
    if (b - a).cross(&(c - b)).dot(winding) < 0.0 {
        2.0 * PI - angle
    } else {
        angle
    }
}

/// Barycentric weights of `p` (projected onto the triangle's plane) for `a`, `b`, `c`.
fn barycentric(
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
    p: &Point3<f32>,
) -> Option<[f32; 3]> {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d02 = v0.dot(&v2);
    let d11 = v1.dot(&v1);
    let d12 = v1.dot(&v2);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= f32::EPSILON * d00 * d11 {
        return None;
    }

    let u = (d11 * d02 - d01 * d12) / denom;
    let v = (d00 * d12 - d01 * d02) / denom;
    Some([1.0 - u - v, v, u])
}

/// Closed containment: points on an edge or corner count as inside.
fn contains(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>, p: &Point3<f32>) -> bool {
    barycentric(a, b, c, p)
        .map_or(false, |weights| weights.iter().all(|&w| w >= -CONTAINMENT_TOLERANCE))
}

/// Newell's method; the length is twice the polygon's area.
fn newell_normal(points: &[Point3<f32>]) -> Vector3<f32> {
    let mut normal = Vector3::zeros();
    for (i, cur) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (cur.y - next.y) * (cur.z + next.z);
        normal.y += (cur.z - next.z) * (cur.x + next.x);
        normal.z += (cur.x - next.x) * (cur.y + next.y);
    }
    normal
}
