/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::transform::normal_matrix;
use meshview_core::{Mesh, OrbitCamera, Triangle};
use nalgebra::{Matrix3, Matrix4, Vector3};
use std::io::Write;

use crate::state::ShadingMode;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Distinct colours cycled by triangle index in high-visibility mode
const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

const HIGH_VISIBILITY_CHAR: char = '#';

/// Direction towards the light
fn light_direction() -> Vector3<f32> {
    Vector3::new(0.5, 0.5, -0.6).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub character: char,
    pub color: Color,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        character: ' ',
        color: Color::Reset,
    };
}

/// How one triangle's cells are filled
#[derive(Debug, Clone, Copy)]
enum Fill {
    Solid(Cell),
    /// Per-corner brightness, interpolated across the triangle
    Lit([f32; 3]),
}

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![Cell::EMPTY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(Cell::EMPTY);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    pub fn render_mesh(
        &mut self,
        mesh: &Mesh,
        model_matrix: &Matrix4<f32>,
        camera: &OrbitCamera,
        shading: ShadingMode,
    ) {
        let normals = normal_matrix(model_matrix);
        for (index, triangle) in mesh.triangles().enumerate() {
            let fill = match shading {
                ShadingMode::HighVisibility => Fill::Solid(Cell {
                    character: HIGH_VISIBILITY_CHAR,
                    color: PALETTE[index % PALETTE.len()],
                }),
                ShadingMode::Directional => Fill::Lit(corner_brightness(&triangle, &normals)),
            };
            self.render_triangle(&triangle, model_matrix, camera, fill);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        camera: &OrbitCamera,
        fill: Fill,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coord, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *coord = projected,
                None => return, // Triangle is clipped
            }
        }

        self.rasterize_triangle(&screen_coords, fill);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], fill: Fill) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to screen bounds
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as usize;
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as usize).min(self.width - 1);
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as usize;
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as usize).min(self.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y * self.width + x;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = match fill {
                        Fill::Solid(cell) => cell,
                        Fill::Lit([b0, b1, b2]) => lit_cell(w0 * b0 + w1 * b1 + w2 * b2),
                    };
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Brightness at each corner from its normal carried into world space
fn corner_brightness(triangle: &Triangle, normals: &Matrix3<f32>) -> [f32; 3] {
    let light = light_direction();
    triangle.vertices.map(|vertex| {
        (normals * vertex.normal)
            .try_normalize(f32::EPSILON)
            .map_or(0.0, |n| n.dot(&light).clamp(0.0, 1.0))
    })
}

/// Lit surfaces never drop to the blank ramp entry.
fn lit_cell(brightness: f32) -> Cell {
    let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
    let index = 1 + (brightness.clamp(0.0, 1.0) * steps).round() as usize;
    let character = LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)];

    // Color based on character intensity
    let color = match character {
        '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        _ => Color::Cyan,
    };
    Cell { character, color }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
