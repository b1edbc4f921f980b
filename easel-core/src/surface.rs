//! Software raster surface and the themed painter that draws onto it.

use crate::color::Color;
use crate::command::DrawSink;
use crate::error::{Result, ResultExt};
use crate::theme::Theme;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// A `width x height` RGBA pixmap with row-major storage.
///
/// All drawing is bounds-checked per pixel, so callers never have to
/// pre-validate coordinates. A freshly created or resized surface is
/// transparent black until the first clear.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Surface {
    /// Create a surface of the given dimensions, filled with transparent
    /// black.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::new(0); (width as usize) * (height as usize)],
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The raw pixel row-major slice.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Reallocate to new dimensions. Previous contents are discarded; the
    /// surface comes back transparent black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize((width as usize) * (height as usize), Color::new(0));
    }

    /// Fill every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Set one pixel. Coordinates outside the surface are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)] = color;
    }

    /// Read one pixel, or `None` when the coordinates are outside the
    /// surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Draw a line segment from `(x1, y1)` to `(x2, y2)`.
    ///
    /// The segment is first clipped to the surface rectangle (so wild guest
    /// coordinates cost nothing), then rasterized with integer Bresenham.
    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color) {
        let Some((cx1, cy1, cx2, cy2)) = self.clip_segment(x1, y1, x2, y2) else {
            return;
        };

        let mut x = cx1.round() as i64;
        let mut y = cy1.round() as i64;
        let end_x = cx2.round() as i64;
        let end_y = cy2.round() as i64;

        let dx = (end_x - x).abs();
        let dy = -(end_y - y).abs();
        let step_x = if x < end_x { 1 } else { -1 };
        let step_y = if y < end_y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set_pixel(x, y, color);
            if x == end_x && y == end_y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    /// Liang-Barsky clip of a segment against the surface rectangle.
    /// Returns `None` when the segment lies entirely outside.
    fn clip_segment(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Option<(f64, f64, f64, f64)> {
        let x_max = f64::from(self.width) - 1.0;
        let y_max = f64::from(self.height) - 1.0;
        let dx = x2 - x1;
        let dy = y2 - y1;

        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        let edges = [
            (-dx, x1),
            (dx, x_max - x1),
            (-dy, y1),
            (dy, y_max - y1),
        ];

        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    if r > t1 {
                        return None;
                    }
                    if r > t0 {
                        t0 = r;
                    }
                } else {
                    if r < t0 {
                        return None;
                    }
                    if r < t1 {
                        t1 = r;
                    }
                }
            }
        }

        Some((
            x1 + t0 * dx,
            y1 + t0 * dy,
            x1 + t1 * dx,
            y1 + t1 * dy,
        ))
    }

    /// Write the surface as a binary PPM (P6) image. Alpha is dropped.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut row = Vec::with_capacity((self.width as usize) * 3);
        for y in 0..self.height {
            row.clear();
            for x in 0..self.width {
                let px = self.pixels[(y as usize) * (self.width as usize) + (x as usize)];
                row.extend_from_slice(&[px.r(), px.g(), px.b()]);
            }
            writer.write_all(&row)?;
        }
        Ok(())
    }

    /// Write the surface as a PPM file at `path`.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_path(path)?;
        let mut writer = BufWriter::new(file);
        self.write_ppm(&mut writer).with_path(path)?;
        writer.flush().with_path(path)
    }
}

/// A [`DrawSink`] that rasterizes commands onto a [`Surface`], substituting
/// theme colors when the guest omits them: background for clears,
/// foreground for lines.
#[derive(Debug, Clone)]
pub struct Painter {
    surface: Surface,
    theme: Theme,
}

impl Painter {
    /// Create a painter over `surface` using `theme` for fallback colors.
    #[must_use]
    pub fn new(surface: Surface, theme: Theme) -> Self {
        Self { surface, theme }
    }

    /// The surface being painted.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to resize between renders.
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Consume the painter and keep the surface.
    #[must_use]
    pub fn into_surface(self) -> Surface {
        self.surface
    }

    /// The active theme.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the theme. Takes effect on the next replayed command; a
    /// render-only reload repaints existing guest state in the new colors.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

impl DrawSink for Painter {
    fn clear(&mut self, color: Option<Color>) {
        self.surface.fill(color.unwrap_or(self.theme.background));
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Option<Color>) {
        self.surface
            .draw_line(x1, y1, x2, y2, color.unwrap_or(self.theme.foreground));
    }
}
