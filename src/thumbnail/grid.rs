//! Compositing slide images into a labelled grid.

use crate::presentation::Rect;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use std::path::Path;
use tracing::warn;

/// Space around and between thumbnails.
pub const PADDING: u32 = 10;

/// Height reserved under each thumbnail for its label.
pub const LABEL_HEIGHT: u32 = 20;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const LIGHT_GRAY: Rgb<u8> = Rgb([211, 211, 211]);

const OUTLINE_WIDTH: u32 = 2;
const LABEL_SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Geometry of one grid image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u32,
    pub thumb_width: u32,
    pub thumb_height: u32,
}

impl GridLayout {
    /// Canvas size for `count` thumbnails.
    pub fn canvas_size(&self, count: usize) -> (u32, u32) {
        let rows = (count as u32).div_ceil(self.cols).max(1);
        (
            self.cols * self.thumb_width + (self.cols + 1) * PADDING,
            rows * (self.thumb_height + LABEL_HEIGHT) + (rows + 1) * PADDING,
        )
    }

    /// Top-left corner of the `i`-th thumbnail.
    pub fn cell_origin(&self, i: usize) -> (u32, u32) {
        let row = i as u32 / self.cols;
        let col = i as u32 % self.cols;
        (
            col * self.thumb_width + (col + 1) * PADDING,
            row * (self.thumb_height + LABEL_HEIGHT) + (row + 1) * PADDING,
        )
    }
}

/// Shapes to outline on each slide, with the slide size they are relative to.
#[derive(Debug, Clone, Copy)]
pub struct Outlines<'a> {
    /// Bounds per slide, indexed by slide number.
    pub bounds: &'a [Vec<Rect>],
    pub slide_width: i64,
    pub slide_height: i64,
}

/// Build a grid from slide images. `first_slide` is the number shown on the
/// first label.
pub fn compose_grid<P: AsRef<Path>>(
    images: &[P],
    layout: &GridLayout,
    first_slide: usize,
    outlines: Option<Outlines<'_>>,
) -> RgbImage {
    let (width, height) = layout.canvas_size(images.len());
    let mut grid = RgbImage::from_pixel(width, height, WHITE);

    for (i, path) in images.iter().enumerate() {
        let path = path.as_ref();
        let slide = first_slide + i;
        let (x, y) = layout.cell_origin(i);

        match image::open(path) {
            Ok(img) => {
                let mut thumb = imageops::resize(
                    &img.to_rgb8(),
                    layout.thumb_width,
                    layout.thumb_height,
                    FilterType::Lanczos3,
                );
                if let Some(outlines) = outlines {
                    for rect in outlines.bounds.get(slide).into_iter().flatten() {
                        outline_shape(&mut thumb, rect, &outlines);
                    }
                }
                imageops::replace(&mut grid, &thumb, x as i64, y as i64);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable slide image");
                fill_rect(&mut grid, x, y, layout.thumb_width + 1, layout.thumb_height + 1, LIGHT_GRAY);
            }
        }

        let label = format!("Slide {}", slide);
        let label_x = (x + layout.thumb_width / 2).saturating_sub(text_width(&label) / 2);
        draw_text(&mut grid, &label, label_x, y + layout.thumb_height + 2, BLACK);
    }
    grid
}

fn outline_shape(thumb: &mut RgbImage, rect: &Rect, outlines: &Outlines<'_>) {
    if outlines.slide_width <= 0 || outlines.slide_height <= 0 {
        return;
    }
    let sx = thumb.width() as f64 / outlines.slide_width as f64;
    let sy = thumb.height() as f64 / outlines.slide_height as f64;
    let left = (rect.left as f64 * sx) as i64;
    let top = (rect.top as f64 * sy) as i64;
    let right = (rect.right() as f64 * sx) as i64;
    let bottom = (rect.bottom() as f64 * sy) as i64;
    draw_outline(thumb, left, top, right, bottom, OUTLINE_WIDTH, RED);
}

/// Rectangle outline between inclusive corners, `thickness` pixels inward.
pub fn draw_outline(
    img: &mut RgbImage,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = thickness as i64;
    for y in top..=bottom {
        for x in left..=right {
            let on_edge = x < left + t || x > right - t || y < top + t || y > bottom - t;
            if on_edge {
                put(img, x, y, color);
            }
        }
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..y.saturating_add(height) {
        for px in x..x.saturating_add(width) {
            put(img, px as i64, py as i64, color);
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Rendered width of `text` in pixels.
pub fn text_width(text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_WIDTH + 1) - 1) * LABEL_SCALE
}

/// Draw `text` with the built-in bitmap font, top-left at (`x`, `y`).
pub fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb<u8>) {
    let mut cursor = x as i64;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for dy in 0..LABEL_SCALE {
                        for dx in 0..LABEL_SCALE {
                            put(
                                img,
                                cursor + (col * LABEL_SCALE + dx) as i64,
                                y as i64 + (row as u32 * LABEL_SCALE + dy) as i64,
                                color,
                            );
                        }
                    }
                }
            }
        }
        cursor += ((GLYPH_WIDTH + 1) * LABEL_SCALE) as i64;
    }
}

/// 5×7 glyphs, one byte per row, high bit on the left.
fn glyph(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'd' => [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: GridLayout = GridLayout {
        cols: 3,
        thumb_width: 40,
        thumb_height: 30,
    };

    #[test]
    fn test_canvas_geometry() {
        // 3 cols * 40 + 4 * 10; 2 rows * 50 + 3 * 10
        assert_eq!(LAYOUT.canvas_size(4), (160, 130));
        assert_eq!(LAYOUT.canvas_size(3), (160, 70));
        assert_eq!(LAYOUT.cell_origin(0), (10, 10));
        assert_eq!(LAYOUT.cell_origin(4), (60, 70));
    }

    #[test]
    fn test_compose_with_outline_and_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("slide-1.png");
        RgbImage::from_pixel(100, 75, Rgb([0, 0, 255])).save(&good).unwrap();
        let bad = dir.path().join("slide-2.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let bounds = vec![vec![Rect::new(0, 0, 500, 500)], vec![]];
        let grid = compose_grid(
            &[good, bad],
            &LAYOUT,
            0,
            Some(Outlines {
                bounds: &bounds,
                slide_width: 1000,
                slide_height: 1000,
            }),
        );
        assert_eq!(grid.dimensions(), (160, 70));
        // outline corner, then thumbnail interior
        assert_eq!(*grid.get_pixel(10, 10), RED);
        assert_eq!(*grid.get_pixel(40, 35), Rgb([0, 0, 255]));
        // second cell is a gray tile
        assert_eq!(*grid.get_pixel(70, 20), LIGHT_GRAY);
        // padding stays white
        assert_eq!(*grid.get_pixel(5, 5), WHITE);
    }

    #[test]
    fn test_label_is_drawn() {
        let mut img = RgbImage::from_pixel(60, 20, WHITE);
        draw_text(&mut img, "Slide 1", 0, 0, BLACK);
        assert!(img.pixels().any(|p| *p == BLACK));
        assert_eq!(text_width("Slide 1"), (7 * 6 - 1) * 2);
    }
}
