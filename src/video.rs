//! Video memory convention shared with the presentation loop.
//!
//! The core never interprets this region; programs draw by storing ARGB
//! words into it and the front-end reads it once per frame.

use crate::memory::{Bus, MemoryError};

pub const VIDEO_WIDTH: u32 = 320;
pub const VIDEO_HEIGHT: u32 = 240;
pub const FRAME_RATE: u32 = 60;
pub const BYTES_PER_PIXEL: u32 = 4;
pub const VIDEO_SIZE: u32 = VIDEO_WIDTH * VIDEO_HEIGHT * BYTES_PER_PIXEL;
/// Reachable from code as `mov r, #0xf0; lsh r, r, #16`.
pub const VIDEO_BASE: u32 = 0x00F0_0000;

/// Read-only view of the framebuffer inside a bus.
pub struct Framebuffer<'a, B: Bus> {
    bus: &'a B,
}

impl<'a, B: Bus> Framebuffer<'a, B> {
    pub fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    /// Callers keep (x, y) on screen.
    fn pixel_addr(x: u32, y: u32) -> u32 {
        VIDEO_BASE + (y * VIDEO_WIDTH + x) * BYTES_PER_PIXEL
    }

    /// ARGB value at (x, y). `None` outside the screen.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Result<u32, MemoryError>> {
        if x >= VIDEO_WIDTH || y >= VIDEO_HEIGHT {
            return None;
        }
        Some(self.bus.read_u32(Self::pixel_addr(x, y)))
    }

    /// Whole frame, row-major.
    pub fn frame(&self) -> Result<Vec<u32>, MemoryError> {
        (0..VIDEO_WIDTH * VIDEO_HEIGHT)
            .map(|i| self.bus.read_u32(VIDEO_BASE + i * BYTES_PER_PIXEL))
            .collect()
    }

    /// Binary PPM (P6) rendering of the frame; alpha is dropped.
    pub fn to_ppm(&self) -> Result<Vec<u8>, MemoryError> {
        let mut out = format!("P6\n{} {}\n255\n", VIDEO_WIDTH, VIDEO_HEIGHT).into_bytes();
        for argb in self.frame()? {
            let [_, r, g, b] = argb.to_be_bytes();
            out.extend_from_slice(&[r, g, b]);
        }
        Ok(out)
    }
}
