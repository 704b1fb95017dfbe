//! Software rasterizer used as the fitness oracle.
//!
//! Coverage comes from `imageproc`'s polygon fill, drawn into a coverage mask
//! the size of the triangle's visible bounding box. Covered pixels are then
//! composited with the Porter-Duff "over" operator onto the float canvas.
//! Vertices are truncated to integer pixel coordinates first, so coverage
//! matches a classic integer `fillConvexPoly`.
//!
//! Only the visible part of a triangle is handed to the fill: anything
//! further than one pixel outside the mask is clipped away beforehand. A
//! triangle with vertices at `±1e9` costs the same as one spanning the canvas
//! exactly. Degenerate triangles (repeated or collinear vertices) are skipped.

use crate::canvas::{CHANNELS, Canvas};
use crate::genome::{Genome, Triangle};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

const COVERED: Luma<u8> = Luma([u8::MAX]);

/// Renders `genome` onto a fresh `width x height` canvas.
pub fn render(genome: &Genome, width: u32, height: u32) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    render_into(genome, &mut canvas);
    canvas
}

/// Composites every triangle of `genome` onto `canvas` in painter's order.
///
/// The canvas is not cleared first. Output is clamped to `[0, 1]`.
pub fn render_into(genome: &Genome, canvas: &mut Canvas) {
    for tri in &genome.triangles {
        draw_triangle(canvas, tri);
    }
    for v in canvas.as_mut_slice() {
        *v = unit(*v);
    }
}

/// Clamps to `[0, 1]`, mapping NaN to 0.
#[inline]
fn unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn draw_triangle(canvas: &mut Canvas, tri: &Triangle) {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }

    let alpha = unit(tri.color[3]);
    if alpha == 0.0 {
        return;
    }
    let src = [
        unit(tri.color[0]) * alpha,
        unit(tri.color[1]) * alpha,
        unit(tri.color[2]) * alpha,
    ];
    let inv_alpha = 1.0 - alpha;

    // Saturating truncation toward zero; NaN becomes 0.
    let pts = tri
        .vertices
        .map(|[x, y]| (x as i32 as i64, y as i32 as i64));
    if is_degenerate(&pts) {
        return;
    }

    let min_x = pts.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = pts.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = pts.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = pts.iter().map(|p| p.1).max().unwrap_or(0);
    let (w, h) = (w as i64, h as i64);
    if max_x < 0 || max_y < 0 || min_x >= w || min_y >= h {
        return;
    }

    let origin = (min_x.max(0), min_y.max(0));
    let size = (
        max_x.min(w - 1) - origin.0 + 1,
        max_y.min(h - 1) - origin.1 + 1,
    );
    let Some(poly) = visible_polygon(&pts, origin, size) else {
        return;
    };

    let mut mask = GrayImage::new(size.0 as u32, size.1 as u32);
    draw_polygon_mut(&mut mask, &poly, COVERED);

    let data = canvas.as_mut_slice();
    for (mx, my, m) in mask.enumerate_pixels() {
        if m.0[0] == 0 {
            continue;
        }
        let x = origin.0 + mx as i64;
        let y = origin.1 + my as i64;
        let i = ((y * w + x) as usize) * CHANNELS;
        for c in 0..CHANNELS {
            data[i + c] = src[c] + data[i + c] * inv_alpha;
        }
    }
}

/// Repeated or collinear vertices. `draw_polygon_mut` panics when the first
/// and last points coincide, and a zero-area triangle covers nothing anyway.
fn is_degenerate(pts: &[(i64, i64); 3]) -> bool {
    let [p0, p1, p2] = *pts;
    if p0 == p1 || p1 == p2 || p0 == p2 {
        return true;
    }
    let cross = (p1.0 - p0.0) as i128 * (p2.1 - p0.1) as i128
        - (p2.0 - p0.0) as i128 * (p1.1 - p0.1) as i128;
    cross == 0
}

/// Clips the triangle to the mask box grown by one pixel on every side and
/// returns it in mask coordinates.
///
/// Vertices already inside that band are kept exactly. Clip edges land on the
/// band, which is never a visible row or column, so they add no coverage.
fn visible_polygon(
    pts: &[(i64, i64); 3],
    origin: (i64, i64),
    size: (i64, i64),
) -> Option<Vec<Point<i32>>> {
    let mut poly: Vec<[f64; 2]> = pts
        .iter()
        .map(|&(x, y)| [(x - origin.0) as f64, (y - origin.1) as f64])
        .collect();

    let planes = [
        (0, -1.0, 1.0),
        (0, size.0 as f64, -1.0),
        (1, -1.0, 1.0),
        (1, size.1 as f64, -1.0),
    ];
    for (axis, bound, sign) in planes {
        poly = clip_half_plane(&poly, axis, bound, sign);
        if poly.is_empty() {
            return None;
        }
    }

    let mut points: Vec<Point<i32>> = poly
        .iter()
        .map(|p| Point::new(p[0].round() as i32, p[1].round() as i32))
        .collect();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 || twice_area(&points) == 0 {
        return None;
    }
    Some(points)
}

/// One Sutherland-Hodgman pass keeping `sign * (p[axis] - bound) >= 0`.
fn clip_half_plane(poly: &[[f64; 2]], axis: usize, bound: f64, sign: f64) -> Vec<[f64; 2]> {
    let inside = |p: &[f64; 2]| sign * (p[axis] - bound) >= 0.0;
    let crossing = |a: &[f64; 2], b: &[f64; 2]| {
        let t = (bound - a[axis]) / (b[axis] - a[axis]);
        let mut p = [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])];
        p[axis] = bound;
        p
    };

    let mut out = Vec::with_capacity(poly.len() + 1);
    for (i, cur) in poly.iter().enumerate() {
        let prev = &poly[(i + poly.len() - 1) % poly.len()];
        match (inside(prev), inside(cur)) {
            (true, true) => out.push(*cur),
            (true, false) => out.push(crossing(prev, cur)),
            (false, true) => {
                out.push(crossing(prev, cur));
                out.push(*cur);
            }
            (false, false) => {}
        }
    }
    out
}

/// Shoelace sum; zero means rounding flattened the polygon.
fn twice_area(points: &[Point<i32>]) -> i64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum()
}
