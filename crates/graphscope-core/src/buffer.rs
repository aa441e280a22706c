//! Offscreen pick buffer contract.
//!
//! The pick buffer is an offscreen render target where each element is drawn
//! with its pick color. Reading one pixel under the pointer and decoding it
//! tells which element is there.

/// A render target that pick colors are drawn into and read back from.
///
/// Pixel coordinates are device pixels with the origin at the bottom-left.
/// Reads outside the buffer, or from a buffer that has not been sized yet,
/// return `[0; 4]`, which decodes to "no hit".
pub trait OffscreenBuffer {
    /// Clears color to `(0, 0, 0, 0)` and depth, ready for a pick pass.
    fn prepare(&mut self);

    /// Reads back the RGBA bytes at `(x, y)`.
    fn read_pixel(&self, x: u32, y: u32) -> [u8; 4];

    /// Reallocates the backing storage. Contents are not preserved.
    fn resize(&mut self, width: u32, height: u32);

    /// Returns the current size in pixels.
    fn size(&self) -> (u32, u32);
}

/// A CPU-side pick buffer.
///
/// Useful for hosts without a GPU and for driving the picking manager in
/// tests: write pick colors with [`write_pixel`](Self::write_pixel) or
/// [`fill_rect`](Self::fill_rect), then feed pointer events.
#[derive(Debug, Clone, Default)]
pub struct CpuPickBuffer {
    width: u32,
    height: u32,
    /// RGBA rows, bottom row first.
    pixels: Vec<u8>,
}

impl CpuPickBuffer {
    /// Creates a cleared buffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self::default();
        buffer.resize(width, height);
        buffer
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Writes one pixel. Out-of-bounds writes are ignored.
    pub fn write_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// Fills the rectangle `[x, x + w) x [y, y + h)`, clipped to the buffer.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.write_pixel(px, py, rgba);
            }
        }
    }
}

impl OffscreenBuffer for CpuPickBuffer {
    fn prepare(&mut self) {
        self.pixels.fill(0);
    }

    fn read_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.offset(x, y).map_or([0; 4], |i| {
            [
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            ]
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_buffer_reads_no_hit() {
        let buffer = CpuPickBuffer::default();
        assert_eq!(buffer.size(), (0, 0));
        assert_eq!(buffer.read_pixel(0, 0), [0; 4]);
    }

    #[test]
    fn test_write_and_read() {
        let mut buffer = CpuPickBuffer::new(4, 3);
        buffer.write_pixel(3, 2, [1, 2, 3, 4]);
        assert_eq!(buffer.read_pixel(3, 2), [1, 2, 3, 4]);
        assert_eq!(buffer.read_pixel(2, 2), [0; 4]);
        assert_eq!(buffer.read_pixel(4, 2), [0; 4]);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buffer = CpuPickBuffer::new(4, 4);
        buffer.fill_rect(2, 2, 10, 10, [0, 0, 0, 9]);
        assert_eq!(buffer.read_pixel(3, 3), [0, 0, 0, 9]);
        assert_eq!(buffer.read_pixel(1, 3), [0; 4]);
    }

    #[test]
    fn test_prepare_and_resize_clear() {
        let mut buffer = CpuPickBuffer::new(2, 2);
        buffer.fill_rect(0, 0, 2, 2, [5; 4]);
        buffer.prepare();
        assert_eq!(buffer.read_pixel(1, 1), [0; 4]);

        buffer.fill_rect(0, 0, 2, 2, [5; 4]);
        buffer.resize(3, 3);
        assert_eq!(buffer.size(), (3, 3));
        assert_eq!(buffer.read_pixel(1, 1), [0; 4]);
    }
}
