//! Content-aware resizing by seam carving.
//!
//! A vertical seam is a top-to-bottom path of one pixel per row whose column moves by at most
//! `delta_x` between neighbouring rows. Shrinking removes the lowest-energy seam repeatedly;
//! growing finds the `k` lowest-energy seams and duplicates them (blended with their right
//! neighbour). Heights are carved on the transposed image.

use image::{Rgba, RgbaImage};

use crate::foundation::error::{MagikdError, MagikdResult};

/// Seam-carve `img` to exactly `width x height`.
///
/// Width is carved before height. Everything here is integer arithmetic, so the output only
/// depends on the input pixels.
pub fn liquid_rescale(
    img: &RgbaImage,
    width: u32,
    height: u32,
    delta_x: u32,
) -> MagikdResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(MagikdError::processing(format!(
            "seam carve target {width}x{height} must be non-zero"
        )));
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(MagikdError::processing("cannot seam carve an empty image"));
    }

    let delta = delta_x as usize;
    let mut plane = Plane::from_image(img);
    plane.carve_width(width as usize, delta);
    if plane.h != height as usize {
        let mut t = plane.transposed();
        t.carve_width(height as usize, delta);
        plane = t.transposed();
    }
    Ok(plane.into_image())
}

struct Plane {
    w: usize,
    h: usize,
    px: Vec<[u8; 4]>,
    lum: Vec<i32>,
}

impl Plane {
    fn from_image(img: &RgbaImage) -> Self {
        let px: Vec<[u8; 4]> = img.pixels().map(|p| p.0).collect();
        let lum = px.iter().copied().map(luminance).collect();
        Self {
            w: img.width() as usize,
            h: img.height() as usize,
            px,
            lum,
        }
    }

    fn into_image(self) -> RgbaImage {
        let w = self.w;
        RgbaImage::from_fn(self.w as u32, self.h as u32, |x, y| {
            Rgba(self.px[y as usize * w + x as usize])
        })
    }

    fn transposed(&self) -> Self {
        let mut px = Vec::with_capacity(self.px.len());
        let mut lum = Vec::with_capacity(self.lum.len());
        for x in 0..self.w {
            for y in 0..self.h {
                px.push(self.px[y * self.w + x]);
                lum.push(self.lum[y * self.w + x]);
            }
        }
        Self {
            w: self.h,
            h: self.w,
            px,
            lum,
        }
    }

    fn carve_width(&mut self, target: usize, delta: usize) {
        if self.w > target {
            let mut energy = energy_map(&self.lum, self.w, self.h);
            while self.w > target {
                let seam = find_vertical_seam(&energy, self.w, self.h, delta);
                remove_seam(&mut self.px, self.w, &seam);
                remove_seam(&mut self.lum, self.w, &seam);
                remove_seam(&mut energy, self.w, &seam);
                self.w -= 1;
                refresh_energy(&mut energy, &self.lum, self.w, self.h, &seam);
            }
        }
        while self.w < target {
            let step = (target - self.w).min((self.w / 2).max(1));
            self.insert_seams(step, delta);
        }
    }

    fn insert_seams(&mut self, count: usize, delta: usize) {
        let (w, h) = (self.w, self.h);

        // Seams are found on a shrinking copy; `orig` maps its columns back to ours.
        let mut lum = self.lum.clone();
        let mut energy = energy_map(&lum, w, h);
        let mut orig: Vec<usize> = (0..h).flat_map(|_| 0..w).collect();
        let mut work_w = w;
        let mut per_row: Vec<Vec<usize>> = vec![Vec::with_capacity(count); h];
        for _ in 0..count {
            let seam = find_vertical_seam(&energy, work_w, h, delta);
            for (y, &x) in seam.iter().enumerate() {
                per_row[y].push(orig[y * work_w + x]);
            }
            remove_seam(&mut lum, work_w, &seam);
            remove_seam(&mut orig, work_w, &seam);
            remove_seam(&mut energy, work_w, &seam);
            work_w -= 1;
            if work_w > 0 {
                refresh_energy(&mut energy, &lum, work_w, h, &seam);
            }
        }

        let new_w = w + count;
        let mut px = Vec::with_capacity(new_w * h);
        for (y, row) in per_row.iter_mut().enumerate() {
            row.sort_unstable();
            let mut k = 0;
            for x in 0..w {
                let p = self.px[y * w + x];
                px.push(p);
                while k < row.len() && row[k] == x {
                    let q = self.px[y * w + (x + 1).min(w - 1)];
                    px.push(average(p, q));
                    k += 1;
                }
            }
        }

        self.lum = px.iter().copied().map(luminance).collect();
        self.px = px;
        self.w = new_w;
    }
}

fn luminance(p: [u8; 4]) -> i32 {
    let l = (i32::from(p[0]) * 299 + i32::from(p[1]) * 587 + i32::from(p[2]) * 114) / 1000;
    l * i32::from(p[3]) / 255
}

fn average(a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = ((u16::from(a[i]) + u16::from(b[i]) + 1) / 2) as u8;
    }
    out
}

/// Gradient magnitude (L1) of the luminance plane, edges clamped.
fn energy_map(lum: &[i32], w: usize, h: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            out.push(pixel_energy(lum, w, h, x, y));
        }
    }
    out
}

fn pixel_energy(lum: &[i32], w: usize, h: usize, x: usize, y: usize) -> u32 {
    let row = y * w;
    let up = y.saturating_sub(1) * w;
    let down = (y + 1).min(h - 1) * w;
    let dx = (lum[row + (x + 1).min(w - 1)] - lum[row + x.saturating_sub(1)]).unsigned_abs();
    let dy = (lum[down + x] - lum[up + x]).unsigned_abs();
    dx + dy
}

/// Recompute the energy around a just-removed seam; `w` is the width after removal.
///
/// A surviving pixel's horizontal neighbours only change next to the seam in its own row, and
/// its vertical neighbours only change between the seam columns of adjacent rows. Everything
/// else was shifted along with the pixels and is still exact.
fn refresh_energy(energy: &mut [u32], lum: &[i32], w: usize, h: usize, seam: &[usize]) {
    for y in 0..h {
        let up = seam[y.saturating_sub(1)];
        let down = seam[(y + 1).min(h - 1)];
        let lo = seam[y].min(up).min(down).saturating_sub(1);
        let hi = (seam[y].max(up).max(down) + 1).min(w - 1);
        for x in lo..=hi {
            energy[y * w + x] = pixel_energy(lum, w, h, x, y);
        }
    }
}

/// Column index per row of the cheapest seam. Ties go to the leftmost candidate.
fn find_vertical_seam(energy: &[u32], w: usize, h: usize, delta: usize) -> Vec<usize> {
    let mut cost: Vec<u64> = Vec::with_capacity(w * h);
    cost.extend(energy[..w].iter().map(|&e| u64::from(e)));
    let mut back = vec![0usize; w * h];

    for y in 1..h {
        let prev = (y - 1) * w;
        for x in 0..w {
            let lo = x.saturating_sub(delta);
            let hi = (x + delta).min(w - 1);
            let mut best = lo;
            for cand in lo + 1..=hi {
                if cost[prev + cand] < cost[prev + best] {
                    best = cand;
                }
            }
            back[y * w + x] = best;
            cost.push(cost[prev + best] + u64::from(energy[y * w + x]));
        }
    }

    let last = (h - 1) * w;
    let mut x = 0;
    for cand in 1..w {
        if cost[last + cand] < cost[last + x] {
            x = cand;
        }
    }

    let mut seam = vec![0usize; h];
    for y in (0..h).rev() {
        seam[y] = x;
        x = back[y * w + x];
    }
    seam
}

/// Drop one column per row in place; `w` is the width before removal.
fn remove_seam<T: Copy>(data: &mut Vec<T>, w: usize, seam: &[usize]) {
    let mut write = 0;
    for (y, &skip) in seam.iter().enumerate() {
        let row = y * w;
        data.copy_within(row..row + skip, write);
        write += skip;
        data.copy_within(row + skip + 1..row + w, write);
        write += w - skip - 1;
    }
    data.truncate(write);
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/seam.rs"]
mod tests;
