//! Filled rasterization primitives.
//!
//! Every primitive checks the color with [`validate_color`] before touching a
//! sample, clips to the buffer and blends with `opacity`: `1` (or more)
//! overwrites, `0` (or less) leaves the buffer unchanged, anything between
//! mixes `old * (1 - opacity) + color * opacity`.
//!
//! Rectangles span every depth slice; the other primitives draw on slice 0.
use crate::color::validate_color;
use crate::error::{ImageError, Result};
use crate::image::{Image, ImageViewMut, Scalar};

#[inline]
fn blend<T: Scalar>(old: T, new: T, opacity: f32) -> T {
    if opacity >= 1.0 {
        new
    } else {
        let a = opacity as f64;
        T::from_f64(old.to_f64() * (1.0 - a) + new.to_f64() * a)
    }
}

/// Inclusive pixel range `[lo, hi]` clipped to `[0, extent)`.
fn clip(a: i32, b: i32, extent: usize) -> Option<(usize, usize)> {
    let (lo, hi) = (a.min(b) as i64, a.max(b) as i64);
    let last = extent as i64 - 1;
    if hi < 0 || lo > last {
        return None;
    }
    Some((lo.max(0) as usize, hi.min(last) as usize))
}

/// Largest `s` with `s * s <= n`, for `n >= 0`.
fn isqrt(n: i64) -> i64 {
    let mut s = (n as f64).sqrt() as i64;
    while s * s > n {
        s -= 1;
    }
    while (s + 1) * (s + 1) <= n {
        s += 1;
    }
    s
}

/// Even-odd test on the pixel centre, plus exact on-edge detection so that
/// boundary pixels are always painted.
fn polygon_covers(points: &[(i32, i32)], x: i64, y: i64) -> bool {
    let n = points.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (points[i].0 as i64, points[i].1 as i64);
        let (xj, yj) = (points[j].0 as i64, points[j].1 as i64);

        let cross = (xj - xi) * (y - yi) - (yj - yi) * (x - xi);
        if cross == 0
            && (xi.min(xj)..=xi.max(xj)).contains(&x)
            && (yi.min(yj)..=yi.max(yj)).contains(&y)
        {
            return true;
        }
        if (yi > y) != (yj > y) {
            // x < xi + (y - yi) * (xj - xi) / (yj - yi), without division.
            let lhs = (x - xi) * (yj - yi);
            let rhs = (y - yi) * (xj - xi);
            if (yj > yi && lhs < rhs) || (yj < yi && lhs > rhs) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

impl<T: Scalar> Image<T> {
    fn plot(&mut self, x: usize, y: usize, z: usize, color: &[T], opacity: f32) {
        for (c, &v) in color.iter().enumerate() {
            let old = self.get(x, y, z, c);
            self.set(x, y, z, c, blend(old, v, opacity));
        }
    }

    pub fn draw_point(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        color: &[T],
        opacity: f32,
    ) -> Result<&mut Self> {
        validate_color(color, self)?;
        if opacity <= 0.0 {
            return Ok(self);
        }
        if let (Some((x, _)), Some((y, _)), Some((z, _))) = (
            clip(x, x, self.width()),
            clip(y, y, self.height()),
            clip(z, z, self.depth()),
        ) {
            self.plot(x, y, z, color, opacity);
        }
        Ok(self)
    }

    /// Filled axis-aligned rectangle with inclusive corners, on every slice.
    pub fn draw_rectangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: &[T],
        opacity: f32,
    ) -> Result<&mut Self> {
        validate_color(color, self)?;
        if opacity <= 0.0 {
            return Ok(self);
        }
        let (Some((xa, xb)), Some((ya, yb))) =
            (clip(x0, x1, self.width()), clip(y0, y1, self.height()))
        else {
            return Ok(self);
        };
        for (c, &v) in color.iter().enumerate() {
            for z in 0..self.depth() {
                for y in ya..=yb {
                    for px in &mut self.row_mut(y, z, c)[xa..=xb] {
                        *px = blend(*px, v, opacity);
                    }
                }
            }
        }
        Ok(self)
    }

    /// Filled disc covering every `(dx, dy)` with `dx² + dy² <= r² + r`.
    pub fn draw_circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: i32,
        color: &[T],
        opacity: f32,
    ) -> Result<&mut Self> {
        validate_color(color, self)?;
        if opacity <= 0.0 || radius < 0 || self.is_empty() {
            return Ok(self);
        }
        let (r, cx, cy) = (radius as i64, cx as i64, cy as i64);
        let limit = r * r + r;
        // Only rows inside the buffer; each row is one clipped span.
        let (y0, y1) = ((cy - r).max(0), (cy + r).min(self.height() as i64 - 1));
        let last_col = self.width() as i64 - 1;
        for y in y0..=y1 {
            let dy = y - cy;
            let span = isqrt(limit - dy * dy);
            let (xa, xb) = ((cx - span).max(0), (cx + span).min(last_col));
            for x in xa..=xb {
                self.plot(x as usize, y as usize, 0, color, opacity);
            }
        }
        Ok(self)
    }

    pub fn draw_triangle(
        &mut self,
        p0: (i32, i32),
        p1: (i32, i32),
        p2: (i32, i32),
        color: &[T],
        opacity: f32,
    ) -> Result<&mut Self> {
        self.draw_polygon(&[p0, p1, p2], color, opacity)
    }

    /// Filled polygon; needs at least three vertices.
    pub fn draw_polygon(
        &mut self,
        points: &[(i32, i32)],
        color: &[T],
        opacity: f32,
    ) -> Result<&mut Self> {
        validate_color(color, self)?;
        if points.len() < 3 {
            return Err(ImageError::shape(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        if opacity <= 0.0 || self.is_empty() {
            return Ok(self);
        }
        let (xmin, xmax) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| {
            (lo.min(p.0), hi.max(p.0))
        });
        let (ymin, ymax) = points.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| {
            (lo.min(p.1), hi.max(p.1))
        });
        let (Some((xa, xb)), Some((ya, yb))) =
            (clip(xmin, xmax, self.width()), clip(ymin, ymax, self.height()))
        else {
            return Ok(self);
        };
        for y in ya..=yb {
            for x in xa..=xb {
                if polygon_covers(points, x as i64, y as i64) {
                    self.plot(x, y, 0, color, opacity);
                }
            }
        }
        Ok(self)
    }
}
