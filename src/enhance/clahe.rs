//! Contrast-limited adaptive histogram equalization on a single 8-bit plane.
//!
//! The plane is split into a grid of tiles. Each tile gets its own
//! equalization LUT built from a clipped histogram, and every output pixel is
//! a bilinear blend of the LUTs of the four nearest tile centers, so tile
//! seams never show.
//!
//! Tile bounds are `i * len / tiles`, which keeps every tile non-empty for
//! any plane at least as large as the grid. Smaller planes shrink the grid.

const BINS: usize = 256;

/// Default tile grid (columns, rows).
pub const DEFAULT_GRID: (u32, u32) = (8, 8);

/// Equalize `plane` (row-major, `width * height` bytes).
///
/// `clip_limit` is relative to a flat histogram: a tile of `area` pixels
/// allows at most `clip_limit * area / 256` counts per bin. Zero or negative
/// disables clipping (plain adaptive equalization).
pub fn equalize(
    plane: &[u8],
    width: u32,
    height: u32,
    clip_limit: f32,
    grid: (u32, u32),
) -> Vec<u8> {
    debug_assert_eq!(plane.len(), (width as usize) * (height as usize));
    if plane.is_empty() {
        return Vec::new();
    }

    let tiles_x = grid.0.clamp(1, width) as usize;
    let tiles_y = grid.1.clamp(1, height) as usize;
    let (w, h) = (width as usize, height as usize);

    let x_bounds: Vec<usize> = (0..=tiles_x).map(|i| i * w / tiles_x).collect();
    let y_bounds: Vec<usize> = (0..=tiles_y).map(|i| i * h / tiles_y).collect();

    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; BINS];
            for y in y_bounds[ty]..y_bounds[ty + 1] {
                let row = &plane[y * w..(y + 1) * w];
                for &v in &row[x_bounds[tx]..x_bounds[tx + 1]] {
                    hist[v as usize] += 1;
                }
            }
            let tile_w = x_bounds[tx + 1] - x_bounds[tx];
            let tile_h = y_bounds[ty + 1] - y_bounds[ty];
            let area = (tile_w * tile_h) as u32;
            if clip_limit > 0.0 {
                let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
                clip_histogram(&mut hist, limit);
            }
            luts.push(build_lut(&hist, area));
        }
    }

    let mut out = vec![0u8; plane.len()];
    for y in 0..h {
        let (ty1, ty2, ya) = neighbours(y, h, tiles_y);
        for x in 0..w {
            let (tx1, tx2, xa) = neighbours(x, w, tiles_x);
            let v = plane[y * w + x] as usize;

            let lut = |tx: usize, ty: usize| luts[ty * tiles_x + tx][v] as f32;
            let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
            let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
            out[y * w + x] = (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Tile indices on either side of pixel `pos` and the blend weight toward the second.
#[inline]
fn neighbours(pos: usize, len: usize, tiles: usize) -> (usize, usize, f32) {
    let f = (pos as f32 + 0.5) * tiles as f32 / len as f32 - 0.5;
    let lower = f.floor();
    let weight = f - lower;
    let first = (lower as i64).clamp(0, tiles as i64 - 1) as usize;
    let second = (lower as i64 + 1).clamp(0, tiles as i64 - 1) as usize;
    (first, second, weight)
}

/// Cap every bin at `limit` and spread the excess evenly over all bins.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess % BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        for bin in hist.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *bin += 1;
            residual -= 1;
        }
    }
}

fn build_lut(hist: &[u32; BINS], area: u32) -> [u8; BINS] {
    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (i, &count) in hist.iter().enumerate() {
        sum += count;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
