//! Region extraction: connected components of the cleaned change mask.
//!
//! Components are labelled with 8-connectivity and filtered by a
//! minimum pixel area. Surviving components are numbered in label order,
//! which for this implementation is the raster-scan order in which the
//! labelling first encounters each component. That is deterministic but
//! not a spatial or size ordering, so callers must treat region
//! identifiers as unique, not positional.

use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::diff::CHANGED;
use crate::types::{BoundingBox, GrayImage};

/// Geometry of one surviving connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionShape {
    /// Bounding box of the component, within mask bounds.
    pub bbox: BoundingBox,
    /// Pixel count of the component (mask pixels, not the box area).
    pub area_pixels: u64,
}

/// Per-label accumulator while scanning the label map.
#[derive(Debug, Clone, Copy)]
struct LabelStats {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u64,
}

/// Extract connected changed regions from a cleaned binary mask.
///
/// Returns the surviving region shapes in extraction order together with
/// the significant-region mask: the input mask restricted to pixels that
/// belong to a surviving region. Changed-pixel statistics and overlay
/// highlighting count only those pixels, so sub-threshold specks do not
/// inflate the change percentage.
///
/// A component survives when its pixel area is strictly greater than
/// `min_area`.
#[must_use]
pub fn extract_regions(mask: &GrayImage, min_area: u64) -> (Vec<RegionShape>, GrayImage) {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    // Accumulate bbox and area per label. Labels are assigned in
    // raster-scan order starting at 1; 0 is background.
    let mut stats: Vec<Option<LabelStats>> = Vec::new();
    for (x, y, p) in labels.enumerate_pixels() {
        let label = p.0[0] as usize;
        if label == 0 {
            continue;
        }
        if stats.len() < label {
            stats.resize(label, None);
        }
        let entry = &mut stats[label - 1];
        match entry {
            Some(s) => {
                s.min_x = s.min_x.min(x);
                s.min_y = s.min_y.min(y);
                s.max_x = s.max_x.max(x);
                s.max_y = s.max_y.max(y);
                s.area += 1;
            }
            None => {
                *entry = Some(LabelStats {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                    area: 1,
                });
            }
        }
    }

    // Survivor flags indexed by label, for the mask rebuild below.
    let mut survives = vec![false; stats.len()];
    let mut shapes = Vec::new();
    for (i, s) in stats.iter().enumerate() {
        let Some(s) = s else { continue };
        if s.area > min_area {
            survives[i] = true;
            shapes.push(RegionShape {
                bbox: BoundingBox {
                    x: s.min_x,
                    y: s.min_y,
                    width: s.max_x - s.min_x + 1,
                    height: s.max_y - s.min_y + 1,
                },
                area_pixels: s.area,
            });
        }
    }

    let region_mask = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let label = labels.get_pixel(x, y).0[0] as usize;
        Luma([if label > 0 && survives[label - 1] {
            CHANGED
        } else {
            0
        }])
    });

    (shapes, region_mask)
}
