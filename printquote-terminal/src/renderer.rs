//! ASCII rasterizer for terminal rendering

use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Vector3};
use printquote_core::{Frame, RenderSurface, Rgb, SurfaceSize, Triangle};
use std::io::{self, Write};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light shining from the viewer towards the scene
const LIGHT_DIR: Vector3<f32> = Vector3::new(0.3, 0.4, 1.0);

/// Ambient share of the brightness so back-lit faces stay visible
const AMBIENT: f32 = 0.2;

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Rgb>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Rgb::default(); size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at a cell, for inspection.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn render_frame(&mut self, frame: &Frame<'_>) {
        let normal_matrix = frame.model_matrix.fixed_view::<3, 3>(0, 0).into_owned();
        for triangle in &frame.mesh.triangles {
            self.render_triangle(triangle, frame, &normal_matrix);
        }
    }

    fn render_triangle(&mut self, triangle: &Triangle, frame: &Frame<'_>, normal_matrix: &Matrix3<f32>) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coord, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match frame.camera.project_to_screen(
                &vertex.position,
                &frame.model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *coord = projected,
                None => return, // Triangle is clipped
            }
        }

        // Calculate face normal for shading, in world space
        let normal = (normal_matrix * triangle.calculate_normal())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let diffuse = normal.dot(&LIGHT_DIR.normalize()).max(0.0);
        let brightness = AMBIENT + (1.0 - AMBIENT) * diffuse;

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        // Rasterize triangle using scanline algorithm
        self.rasterize_triangle(&screen_coords, character, frame.color.shade(brightness));
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Rgb) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                            self.color_buffer[idx] = color;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];
                let Rgb { r, g, b } = self.color_buffer[idx];

                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Buffers the frame, then writes it to the wrapped terminal writer
pub struct TerminalSurface<'w, W: Write> {
    pub renderer: &'w mut AsciiRenderer,
    pub writer: &'w mut W,
}

impl<W: Write> RenderSurface for TerminalSurface<'_, W> {
    type Error = io::Error;

    fn draw(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render_frame(frame);
        self.renderer.draw(self.writer)
    }

    fn draw_empty(&mut self, size: SurfaceSize) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.draw(self.writer)?;
        let message = "Preview appears once a model is loaded";
        let x = (size.width as usize).saturating_sub(message.len()) / 2;
        self.writer.queue(cursor::MoveTo(x as u16, (size.height / 2) as u16))?;
        self.writer.queue(Print(message))?;
        Ok(())
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use printquote_core::{Mesh, ParsedModel, ViewportState};

    fn cube_viewport(width: u32, height: u32) -> ViewportState {
        let points = Mesh::cube(10.0)
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position.cast::<f64>()))
            .collect();
        let mut viewport = ViewportState::new(width, height);
        viewport.load(&ParsedModel::from_points(points));
        viewport
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_cube_covers_center_cell() {
        let viewport = cube_viewport(80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_frame(&viewport.frame().unwrap());
        assert_ne!(renderer.cell(40, 20), Some(' '));
        assert_eq!(renderer.cell(0, 0), Some(' '));
        assert_eq!(renderer.cell(80, 0), None);
    }

    #[test]
    fn test_surface_writes_frame() {
        let mut viewport = cube_viewport(20, 10);
        let mut renderer = AsciiRenderer::new(20, 10);
        let mut out = Vec::new();
        let mut surface = TerminalSurface {
            renderer: &mut renderer,
            writer: &mut out,
        };
        viewport.render(&mut surface).unwrap();
        assert!(!out.is_empty());
    }
}
