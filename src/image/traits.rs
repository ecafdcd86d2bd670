//! Row-oriented access shared by owned buffers and strided views.
//!
//! A row is the run of `width` samples at fixed `(y, z, c)`. Rows are visited
//! in storage order: `y` fastest, then `z`, then `c`.
pub trait ImageView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn depth(&self) -> usize;
    fn channel(&self) -> usize;

    fn row(&self, y: usize, z: usize, c: usize) -> &[Self::Pixel];

    /// Total number of rows (`height * depth * channel`).
    fn row_count(&self) -> usize {
        self.height() * self.depth() * self.channel()
    }

    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { image: self, r: 0 }
    }

    fn as_slice(&self) -> Option<&[Self::Pixel]> {
        None
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize, z: usize, c: usize) -> &mut [Self::Pixel];

    fn rows_mut(&mut self) -> RowsMut<'_, Self>
    where
        Self: Sized,
    {
        RowsMut { image: self, r: 0 }
    }

    fn as_mut_slice(&mut self) -> Option<&mut [Self::Pixel]> {
        None
    }
}

/// Split a linear row number into `(y, z, c)`.
#[inline]
pub(crate) fn row_coords(r: usize, height: usize, depth: usize) -> (usize, usize, usize) {
    let y = r % height;
    let zc = r / height;
    (y, zc % depth, zc / depth)
}

pub struct Rows<'a, I: ?Sized + ImageView> {
    image: &'a I,
    r: usize,
}

impl<'a, I: ImageView> Iterator for Rows<'a, I> {
    type Item = &'a [I::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.r >= self.image.row_count() {
            return None;
        }
        let (y, z, c) = row_coords(self.r, self.image.height(), self.image.depth());
        self.r += 1;
        Some(self.image.row(y, z, c))
    }
}

pub struct RowsMut<'a, I: ?Sized + ImageViewMut> {
    image: &'a mut I,
    r: usize,
}

impl<'a, I: ImageViewMut> Iterator for RowsMut<'a, I> {
    type Item = &'a mut [I::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.r >= self.image.row_count() {
            return None;
        }
        let (y, z, c) = row_coords(self.r, self.image.height(), self.image.depth());
        self.r += 1;
        let ptr = self.image as *mut I;
        // SAFETY: Each row is returned at most once and rows do not alias.
        Some(unsafe { (&mut *ptr).row_mut(y, z, c) })
    }
}
