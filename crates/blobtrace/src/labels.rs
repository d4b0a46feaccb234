//! Padded scratch grids shared by blob labeling and contour tracing.
//!
//! Both scans walk pixel neighborhoods. Surrounding the image with a
//! one-pixel frame of background lets every neighbor lookup skip bounds
//! checks: a frame cell is never foreground, so the walk stops there on
//! its own.
//!
//! Grids are allocated per call and dropped when the scan returns.

/// Label of a background cell the contour tracer has already examined.
pub const VISITED: i32 = -1;

/// Label of a cell nothing has touched yet.
pub const UNLABELED: i32 = 0;

/// First label handed out to a region. `0` and `1` stay free for
/// sentinels.
pub const FIRST_LABEL: i32 = 2;

/// A `(width + 2) x (height + 2)` grid indexed in padded coordinates.
///
/// Image pixel `(row, col)` lives at padded `(row + 1, col + 1)`.
#[derive(Debug, Clone)]
pub struct PaddedGrid<T> {
    stride: usize,
    cells: Vec<T>,
}

impl<T: Copy> PaddedGrid<T> {
    /// Allocate a grid for a `width x height` image with every cell,
    /// frame included, set to `fill`.
    pub fn new(width: u32, height: u32, fill: T) -> Self {
        let stride = width as usize + 2;
        Self {
            stride,
            cells: vec![fill; stride * (height as usize + 2)],
        }
    }

    /// Padded width (image width + 2).
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Flat index of padded `(row, col)`.
    pub const fn index(&self, row: usize, col: usize) -> usize {
        row * self.stride + col
    }

    /// Overwrite the cell at padded `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let i = self.index(row, col);
        self.cells[i] = value;
    }

    /// Cell at a flat padded index.
    pub fn get_at(&self, i: usize) -> T {
        self.cells[i]
    }

    /// Overwrite the cell at a flat padded index.
    pub fn set_at(&mut self, i: usize, value: T) {
        self.cells[i] = value;
    }
}

impl PaddedGrid<bool> {
    /// Foreground mask of a grayscale buffer: `true` where `is_fg` holds.
    /// The frame is background.
    pub fn mask(image: &image::GrayImage, is_fg: impl Fn(u8) -> bool) -> Self {
        let mut grid = Self::new(image.width(), image.height(), false);
        for (x, y, px) in image.enumerate_pixels() {
            grid.set(y as usize + 1, x as usize + 1, is_fg(px.0[0]));
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_surrounds_image() {
        let g = PaddedGrid::new(3, 2, 0i32);
        assert_eq!(g.stride(), 5);
        assert_eq!(g.cells.len(), 20);
        assert_eq!(g.index(1, 1), 6);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut g = PaddedGrid::new(4, 4, UNLABELED);
        g.set(2, 3, FIRST_LABEL);
        let i = g.index(2, 3);
        assert_eq!(g.get_at(i), FIRST_LABEL);
        g.set_at(i, VISITED);
        assert_eq!(g.get_at(g.index(2, 3)), VISITED);
    }

    #[test]
    fn mask_offsets_by_one_and_keeps_frame_background() {
        let mut img = image::GrayImage::new(3, 3);
        img.put_pixel(0, 0, image::Luma([200]));
        img.put_pixel(2, 1, image::Luma([1]));
        let m = PaddedGrid::mask(&img, |v| v > 0);
        assert!(m.get_at(m.index(1, 1)));
        assert!(m.get_at(m.index(2, 3)));
        assert!(!m.get_at(m.index(2, 2)));
        for col in 0..m.stride() {
            assert!(!m.get_at(m.index(0, col)));
            assert!(!m.get_at(m.index(4, col)));
        }
    }
}
