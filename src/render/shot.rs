//! PNG shot of a frame

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::core::error::Result;
use crate::render::colors::{self, Color};
use crate::render::RenderFrame;
use crate::spatial::Coordinates;

/// Pixels per lattice cell
pub const CELL_PIXELS: u32 = 4;

fn pixel(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba8())
}

fn cell_origin(at: &Coordinates) -> (i64, i64) {
    (at.0[0] as i64 * CELL_PIXELS as i64, at.0[1] as i64 * CELL_PIXELS as i64)
}

fn put(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line between two pixel positions
fn draw_line(image: &mut RgbaImage, from: (i64, i64), to: (i64, i64), color: Rgba<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(image, x, y, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw the frame: particles as centre dots, agents as filled cells
/// (outlined if they acted), bonds as lines between cell centres.
pub fn render_image(frame: &RenderFrame) -> RgbaImage {
    let side = frame.size.max(1) * CELL_PIXELS;
    let mut image = RgbaImage::from_pixel(side, side, pixel(colors::BACKGROUND));
    let half = (CELL_PIXELS / 2) as i64;

    for particle in &frame.particles {
        let (x, y) = cell_origin(&particle.position);
        put(&mut image, x + half, y + half, pixel(colors::resource_color(particle.kind)));
    }

    for agent in &frame.agents {
        let (x0, y0) = cell_origin(&agent.position);
        let fill = pixel(colors::type_pair_color(agent.kind));
        let outline = pixel(colors::ACTED_OUTLINE);
        let last = CELL_PIXELS as i64 - 1;
        for dy in 0..CELL_PIXELS as i64 {
            for dx in 0..CELL_PIXELS as i64 {
                let edge = dx == 0 || dy == 0 || dx == last || dy == last;
                let color = if agent.acted && edge { outline } else { fill };
                put(&mut image, x0 + dx, y0 + dy, color);
            }
        }
    }

    let bond = pixel(colors::BOND);
    for agent in &frame.agents {
        let (x0, y0) = cell_origin(&agent.position);
        for other in &agent.bonded_to {
            let (x1, y1) = cell_origin(other);
            draw_line(&mut image, (x0 + half, y0 + half), (x1 + half, y1 + half), bond);
        }
    }

    image
}

pub fn write_png(frame: &RenderFrame, path: &Path) -> Result<()> {
    render_image(frame).save(path)?;
    tracing::info!(seed = frame.seed, path = %path.display(), title = %frame.title, "Shot written");
    Ok(())
}
