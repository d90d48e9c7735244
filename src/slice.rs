use image::{GrayImage, ImageBuffer, Luma};
use ndarray::{Array2, ArrayView2, s};

use crate::error::{Result, VolumeError};

/// Row-major 2-D sample buffer, `data[row * width + col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice2D<T> {
    data: Array2<T>,
}

impl<T> Slice2D<T> {
    pub fn new(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        let actual = data.len();
        let data = Array2::from_shape_vec((height, width), data).map_err(|_| {
            VolumeError::ShapeMismatch {
                expected: width.saturating_mul(height),
                actual,
            }
        })?;
        Ok(Self { data })
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.data.get((row, col))
    }

    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array2<T> {
        &self.data
    }

    /// Samples in row-major order.
    pub fn as_slice(&self) -> &[T] {
        self.data
            .as_slice()
            .expect("slice data is kept in standard layout")
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data.into_raw_vec_and_offset().0
    }
}

impl<T: Clone> Slice2D<T> {
    /// Wraps an array shaped (height, width), copying it into standard
    /// layout when it is not already.
    pub fn from_array(data: Array2<T>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { data }
    }

    /// Copies the `height x width` block starting at (`start_row`, `start_col`).
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::CropOutOfBounds`] if the block does not lie
    /// entirely inside the slice.
    pub fn crop(
        &self,
        start_row: usize,
        start_col: usize,
        height: usize,
        width: usize,
    ) -> Result<Self> {
        let fits = start_row
            .checked_add(height)
            .is_some_and(|end| end <= self.height())
            && start_col
                .checked_add(width)
                .is_some_and(|end| end <= self.width());
        if !fits {
            return Err(VolumeError::CropOutOfBounds {
                start_row,
                start_col,
                height,
                width,
                slice_height: self.height(),
                slice_width: self.width(),
            });
        }

        let block = self.data.slice(s![
            start_row..start_row + height,
            start_col..start_col + width
        ]);
        Ok(Self::from_array(block.to_owned()))
    }
}

/// See [`Slice2D::crop`].
pub fn crop_slice<T: Clone>(
    slice: &Slice2D<T>,
    start_row: usize,
    start_col: usize,
    height: usize,
    width: usize,
) -> Result<Slice2D<T>> {
    slice.crop(start_row, start_col, height, width)
}

impl Slice2D<u8> {
    /// Converts a display-ready slice into an 8-bit grayscale image.
    pub fn to_image(&self) -> GrayImage {
        let (width, height) = (self.width() as u32, self.height() as u32);
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(width, height, self.as_slice().to_vec())
            .expect("buffer length equals width * height")
    }
}
