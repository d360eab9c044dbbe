//! Annotated rendering: region bounding boxes and short identifier
//! labels drawn on copies of the reference and comparison images.
//!
//! Labels are rendered with a built-in 3×5 pixel glyph set covering the
//! region identifier alphabet (`D` plus digits), so no font asset is
//! required.

use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use plotwatch_pipeline::{Region, RgbImage};

/// Box outline thickness in pixels.
const BOX_THICKNESS: u32 = 2;

/// Integer scale applied to the 3×5 base glyphs.
const GLYPH_SCALE: u32 = 2;

/// Scaled glyph height.
const GLYPH_HEIGHT: u32 = 5 * GLYPH_SCALE;

/// Gap between the label baseline and the box's top edge.
const LABEL_GAP: u32 = 2;

/// Draw every region's bounding box on a copy of `image`, optionally
/// with the region's identifier above the box.
///
/// Boxes are clipped to the image by `imageproc`; labels that would
/// start above the top edge are pushed inside the box instead.
#[must_use]
pub fn draw_regions(
    image: &RgbImage,
    regions: &[Region],
    color: [u8; 3],
    with_labels: bool,
) -> RgbImage {
    let mut out = image.clone();
    for region in regions {
        draw_box(&mut out, region, color);
        if with_labels {
            draw_label(&mut out, region, color);
        }
    }
    out
}

/// Draw one region's hollow rectangle with [`BOX_THICKNESS`] nested
/// outlines.
#[allow(clippy::cast_possible_wrap)]
fn draw_box(image: &mut RgbImage, region: &Region, color: [u8; 3]) {
    let bbox = region.bbox;
    for inset in 0..BOX_THICKNESS {
        let (w, h) = (bbox.width.saturating_sub(2 * inset), bbox.height.saturating_sub(2 * inset));
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((bbox.x + inset) as i32, (bbox.y + inset) as i32).of_size(w, h);
        draw_hollow_rect_mut(image, rect, image::Rgb(color));
    }
}

/// Draw the region identifier just above its box's top-left corner.
fn draw_label(image: &mut RgbImage, region: &Region, color: [u8; 3]) {
    let y = region
        .bbox
        .y
        .checked_sub(GLYPH_HEIGHT + LABEL_GAP)
        .unwrap_or(region.bbox.y + BOX_THICKNESS + 1);
    let mut x = region.bbox.x;
    for ch in region.id.chars() {
        if let Some(rows) = glyph(ch) {
            blit_glyph(image, x, y, rows, color);
        }
        x += 4 * GLYPH_SCALE; // 3-wide glyph plus 1 column spacing
    }
}

/// Paint one scaled glyph at (`x0`, `y0`).
fn blit_glyph(image: &mut RgbImage, x0: u32, y0: u32, rows: [u8; 5], color: [u8; 3]) {
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..3u32 {
            if bits & (0b100 >> col) == 0 {
                continue;
            }
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    let x = x0 + col * GLYPH_SCALE + dx;
                    let y = y0 + row as u32 * GLYPH_SCALE + dy;
                    if x < image.width() && y < image.height() {
                        image.put_pixel(x, y, image::Rgb(color));
                    }
                }
            }
        }
    }
}

/// 3×5 bitmap for one identifier character: one byte per row, the low
/// three bits holding the columns with bit 2 as the left column.
const fn glyph(ch: char) -> Option<[u8; 5]> {
    Some(match ch {
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        _ => return None,
    })
}
