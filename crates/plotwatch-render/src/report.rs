//! Report assembly: the transport-facing result shape.
//!
//! An [`AnalysisReport`] is what the surrounding service serializes to
//! JSON and what the result store holds: identifier, summary, regions,
//! source metadata, and the base64-encoded visualization images.

use plotwatch_pipeline::{Analysis, Region, SourceDimensions, Summary};
use serde::{Deserialize, Serialize};

/// The rendered visualization set, each image a base64-encoded JPEG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImages {
    /// Comparison image with changed pixels recolored.
    pub overlay: String,
    /// Comparison image with region boxes and labels.
    pub annotated_current: String,
    /// Reference image with region boxes.
    pub annotated_reference: String,
    /// Jet-colormapped difference blended with the comparison.
    pub heatmap: String,
    /// Cleaned binary change mask expanded to three channels.
    pub difference: String,
}

/// Source dimensions recorded on the report, formatted `WxH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Reference image dimensions.
    pub reference_dimensions: String,
    /// Comparison image dimensions as uploaded (pre-resize).
    pub comparison_dimensions: String,
}

impl From<SourceDimensions> for ReportMetadata {
    fn from(dims: SourceDimensions) -> Self {
        Self {
            reference_dimensions: dims.reference.to_string(),
            comparison_dimensions: dims.comparison.to_string(),
        }
    }
}

/// Complete result of one analysis run, constructed atomically and
/// never updated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Opaque short token, unique per run.
    pub result_id: String,
    /// Aggregate statistics.
    pub summary: Summary,
    /// Regions in extraction order.
    pub regions: Vec<Region>,
    /// Source dimension metadata.
    pub metadata: ReportMetadata,
    /// Rendered visualization images.
    pub images: EncodedImages,
}

impl AnalysisReport {
    /// Assemble a report from an analysis and its rendered images.
    #[must_use]
    pub fn assemble(analysis: &Analysis, images: EncodedImages) -> Self {
        Self {
            result_id: analysis.result_id.clone(),
            summary: analysis.summary.clone(),
            regions: analysis.regions.clone(),
            metadata: analysis.source_dimensions.into(),
            images,
        }
    }
}
