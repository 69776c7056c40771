use image::{Rgba, RgbaImage};

use crate::config::BoardConfig;
use crate::histogram::Histogram;

pub const BAR_COLOR: Rgba<u8> = Rgba([220, 20, 60, 255]);
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Draws a histogram as one bottom-anchored bar per image column.
pub struct Renderer {
    width: u32,
    height: u32,
    bar: Rgba<u8>,
    background: Rgba<u8>,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bar: BAR_COLOR,
            background: BACKGROUND,
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn with_colors(mut self, bar: Rgba<u8>, background: Rgba<u8>) -> Self {
        self.bar = bar;
        self.background = background;
        self
    }

    /// Bars are scaled so the fullest bin spans the whole height; heights truncate.
    /// Bins past the image width are not drawn.
    pub fn render(&self, histogram: &Histogram) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.width, self.height, self.background);
        let max_count = histogram.max_count();
        if max_count == 0 {
            return img;
        }

        for (x, &count) in histogram.bins().iter().enumerate().take(self.width as usize) {
            let bar_height = bar_height(count, max_count, self.height);
            for j in 0..bar_height {
                img.put_pixel(x as u32, self.height - 1 - j, self.bar);
            }
        }
        img
    }
}

// floor(count / max_count * height), in integers so full bins always reach the top
fn bar_height(count: u64, max_count: u64, height: u32) -> u32 {
    let scaled = count as u128 * height as u128 / max_count as u128;
    scaled.min(height as u128) as u32
}
