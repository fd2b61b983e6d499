//! Responsive image sizes from a layout grid.
//!
//! Given how many grid columns an image spans at each breakpoint, compute
//! the pixel width (and optionally height) to request from an image
//! renderer at each of the five breakpoints `xxs`, `xs`, `sm`, `md`, `lg`:
//!
//! ```text
//! width = (container + gutter - 2·margin) / columns · cols - gutter - 2·border
//! ```
//!
//! Sizes nest: an image inside a column inside a column is computed
//! against its parent [`ImageSize`] instead of the page container, and
//! inherits the parent's ratio, crop and explicit dimensions unless it
//! sets its own. The parent is passed in explicitly.
//!
//! When a ratio is set, heights are emitted too, and one of the two
//! dimensions carries a crop suffix `c<offset>`: the height when the file
//! is taller than the requested ratio, the width otherwise.
//!
//! The module is split into:
//! - **Calculations**: pure functions for the grid arithmetic
//! - **This module**: request/result types and [`compute_image_size`]

mod calculations;

pub use calculations::{cascade, container_widths, file_ratio, grid_width, scale_to_containers};

use crate::config::GridSettings;
use serde::{Serialize, Serializer};
use std::fmt;

/// Ratio assumed when nothing is known about the file: taller than any
/// sensible layout ratio, so heights get cropped.
pub const DEFAULT_FILE_RATIO: f64 = 500.0;

/// One value per breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Breakpoints<T> {
    pub xxs: T,
    pub xs: T,
    pub sm: T,
    pub md: T,
    pub lg: T,
}

impl<T> Breakpoints<T> {
    fn from_array([xxs, xs, sm, md, lg]: [T; 5]) -> Self {
        Self { xxs, xs, sm, md, lg }
    }

    fn map<U>(self, mut f: impl FnMut(T) -> U) -> Breakpoints<U> {
        Breakpoints {
            xxs: f(self.xxs),
            xs: f(self.xs),
            sm: f(self.sm),
            md: f(self.md),
            lg: f(self.lg),
        }
    }
}

/// Column spans per breakpoint, `xxs` shares `xs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Columns {
    pub xs: f64,
    pub sm: f64,
    pub md: f64,
    pub lg: f64,
}

impl Columns {
    fn as_array(self) -> [f64; 4] {
        [self.xs, self.sm, self.md, self.lg]
    }

    fn from_array([xs, sm, md, lg]: [f64; 4]) -> Self {
        Self { xs, sm, md, lg }
    }
}

/// A pixel dimension, optionally marked for cropping.
///
/// Displays as the number followed by `c<offset>` when cropped, e.g.
/// `585`, `585c` or `585c-50`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub px: f64,
    pub crop: Option<String>,
}

impl Dimension {
    pub fn new(px: f64) -> Self {
        Self { px, crop: None }
    }

    fn cropped(mut self, offset: &str) -> Self {
        self.crop = Some(offset.to_string());
        self
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.px)?;
        if let Some(offset) = &self.crop {
            write!(f, "c{offset}")?;
        }
        Ok(())
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Pixel size of the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDimensions {
    pub width: f64,
    pub height: f64,
    /// Crop area as JSON (`{"width":…,"height":…}`), if the file is cropped.
    pub crop: Option<String>,
}

/// What the template asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSizeRequest {
    /// Height/width in percent; crops when > 0.
    pub ratio: f64,
    /// Crop offset in percent (-100 top/left, 0 center, 100 bottom/right).
    pub crop: Option<String>,
    /// Column spans; zero means "same as the next smaller breakpoint".
    pub columns: Columns,
    /// Border width on each side.
    pub border: f64,
    /// Margin on each side, per breakpoint; zero cascades like columns.
    pub margins: Columns,
    /// Explicit width, overriding the grid.
    pub image_width: f64,
    /// Explicit height, overriding the grid.
    pub image_height: f64,
    pub file: Option<FileDimensions>,
}

impl Default for ImageSizeRequest {
    fn default() -> Self {
        Self {
            ratio: 0.0,
            crop: None,
            columns: Columns {
                xs: 12.0,
                sm: 0.0,
                md: 0.0,
                lg: 0.0,
            },
            border: 0.0,
            margins: Columns {
                xs: 0.0,
                sm: 0.0,
                md: 0.0,
                lg: 0.0,
            },
            image_width: 0.0,
            image_height: 0.0,
            file: None,
        }
    }
}

/// Computed image size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSize {
    pub image_width: f64,
    pub image_height: f64,
    pub width: Breakpoints<Dimension>,
    /// Empty unless a ratio is in effect.
    pub height: Breakpoints<Option<Dimension>>,
    /// Height/width as a fraction.
    pub ratio: f64,
    pub file_ratio: f64,
    pub crop: String,
    /// Items per row at each breakpoint (`columns / cols`).
    pub cols: Columns,
}

impl ImageSize {
    /// The outermost size: the page containers, one item per row.
    pub fn from_grid(grid: &GridSettings) -> Self {
        Self {
            image_width: 0.0,
            image_height: 0.0,
            width: Breakpoints::from_array(container_widths(grid)).map(Dimension::new),
            height: Breakpoints::default(),
            ratio: 0.0,
            file_ratio: DEFAULT_FILE_RATIO,
            crop: String::new(),
            cols: Columns::from_array([1.0; 4]),
        }
    }

    fn widths(&self) -> [f64; 5] {
        [
            self.width.xxs.px,
            self.width.xs.px,
            self.width.sm.px,
            self.width.md.px,
            self.width.lg.px,
        ]
    }
}

/// Compute the size of an image, inside `parent` if it is nested.
pub fn compute_image_size(
    grid: &GridSettings,
    request: &ImageSizeRequest,
    parent: Option<&ImageSize>,
) -> ImageSize {
    let columns = f64::from(grid.columns.max(1));
    let gutter = grid.gutter;

    let cols = cascade(request.columns.as_array());
    let margins = cascade(request.margins.as_array().map(|m| 2.0 * m));
    let border = 2.0 * request.border;

    let mut ratio = if request.ratio > 0.0 {
        request.ratio / 100.0
    } else {
        parent.map_or(0.0, |p| p.ratio)
    };
    let crop = request
        .crop
        .clone()
        .or_else(|| parent.map(|p| p.crop.clone()))
        .unwrap_or_default();
    let image_width = if request.image_width > 0.0 {
        request.image_width
    } else {
        parent.map_or(0.0, |p| p.image_width)
    };
    let image_height = if request.image_height > 0.0 {
        request.image_height
    } else {
        parent.map_or(0.0, |p| p.image_height)
    };
    if image_width > 0.0 && image_height > 0.0 {
        ratio = image_height / image_width;
    }

    let file_ratio = request
        .file
        .as_ref()
        .and_then(|file| calculations::file_ratio(file.width, file.height, file.crop.as_deref()))
        .or_else(|| parent.map(|p| p.file_ratio))
        .unwrap_or(DEFAULT_FILE_RATIO);

    let widths = if image_width > 0.0 || image_height > 0.0 {
        scale_to_containers(image_width, grid)
    } else {
        let base = parent.map_or_else(|| container_widths(grid), ImageSize::widths);
        // xxs shares the xs columns and margin
        let span = [cols[0], cols[0], cols[1], cols[2], cols[3]];
        let margin = [margins[0], margins[0], margins[1], margins[2], margins[3]];
        std::array::from_fn(|i| grid_width(base[i], gutter, margin[i], columns, span[i], border))
    };

    let mut width = Breakpoints::from_array(widths).map(Dimension::new);
    let mut height = Breakpoints::default();
    if ratio > 0.0 {
        let heights = Breakpoints::from_array(widths.map(|w| Dimension::new(w * ratio)));
        if file_ratio > ratio {
            height = heights.map(|h| Some(h.cropped(&crop)));
        } else {
            height = heights.map(Some);
            width = width.map(|w| w.cropped(&crop));
        }
    }

    ImageSize {
        image_width,
        image_height,
        width,
        height,
        ratio,
        file_ratio,
        crop,
        cols: Columns::from_array(cols.map(|c| if c > 0.0 { columns / c } else { 0.0 })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(xs: f64, md: f64) -> ImageSizeRequest {
        ImageSizeRequest {
            columns: Columns {
                xs,
                sm: 0.0,
                md,
                lg: 0.0,
            },
            ..ImageSizeRequest::default()
        }
    }

    fn px(widths: &Breakpoints<Dimension>) -> [f64; 5] {
        [widths.xxs.px, widths.xs.px, widths.sm.px, widths.md.px, widths.lg.px]
    }

    // =========================================================================
    // Grid widths
    // =========================================================================

    #[test]
    fn full_width_image_fills_containers() {
        let size = compute_image_size(&GridSettings::default(), &ImageSizeRequest::default(), None);
        assert_eq!(px(&size.width), [480.0, 750.0, 750.0, 970.0, 1170.0]);
        assert_eq!(size.height, Breakpoints::default());
        assert_eq!(size.cols, Columns::from_array([1.0; 4]));
        assert_eq!(size.file_ratio, DEFAULT_FILE_RATIO);
    }

    #[test]
    fn columns_cascade_to_larger_breakpoints() {
        let size = compute_image_size(&GridSettings::default(), &request(12.0, 6.0), None);
        // md: (970 + 30) / 12 * 6 - 30, lg inherits md's 6 columns
        assert_eq!(size.width.md.px, 470.0);
        assert_eq!(size.width.lg.px, 570.0);
        assert_eq!(size.width.sm.px, 750.0);
        assert_eq!(size.cols, Columns::from_array([1.0, 1.0, 2.0, 2.0]));
    }

    #[test]
    fn margins_and_border_are_doubled() {
        let req = ImageSizeRequest {
            border: 1.0,
            margins: Columns {
                xs: 15.0,
                sm: 0.0,
                md: 0.0,
                lg: 0.0,
            },
            ..ImageSizeRequest::default()
        };
        let size = compute_image_size(&GridSettings::default(), &req, None);
        // (480 + 30 - 30) / 12 * 12 - 30 - 2
        assert_eq!(size.width.xxs.px, 448.0);
        assert_eq!(size.width.lg.px, 1138.0);
    }

    // =========================================================================
    // Ratio and crop
    // =========================================================================

    #[test]
    fn ratio_crops_height_of_tall_files() {
        let req = ImageSizeRequest {
            ratio: 50.0,
            crop: Some("-50".into()),
            ..ImageSizeRequest::default()
        };
        let size = compute_image_size(&GridSettings::default(), &req, None);
        assert_eq!(size.ratio, 0.5);
        assert_eq!(size.height.lg.as_ref().unwrap().to_string(), "585c-50");
        assert_eq!(size.width.lg.to_string(), "1170");
    }

    #[test]
    fn ratio_crops_width_of_wide_files() {
        let req = ImageSizeRequest {
            ratio: 50.0,
            file: Some(FileDimensions {
                width: 1000.0,
                height: 400.0,
                crop: None,
            }),
            ..ImageSizeRequest::default()
        };
        let size = compute_image_size(&GridSettings::default(), &req, None);
        assert_eq!(size.width.lg.to_string(), "1170c");
        assert_eq!(size.height.lg.as_ref().unwrap().to_string(), "585");
        assert_eq!(size.file_ratio, 0.4);
    }

    #[test]
    fn explicit_dimensions_override_grid() {
        let req = ImageSizeRequest {
            image_width: 400.0,
            image_height: 300.0,
            ..ImageSizeRequest::default()
        };
        let size = compute_image_size(&GridSettings::default(), &req, None);
        assert_eq!(size.ratio, 0.75);
        assert_eq!(size.width.lg.px, 400.0);
        assert_eq!(size.height.lg.as_ref().unwrap().to_string(), "300c");
    }

    #[test]
    fn explicit_width_scales_other_breakpoints() {
        let req = ImageSizeRequest {
            image_width: 585.0,
            ..ImageSizeRequest::default()
        };
        let size = compute_image_size(&GridSettings::default(), &req, None);
        assert_eq!(px(&size.width), [240.0, 240.0, 375.0, 485.0, 585.0]);
        assert_eq!(size.ratio, 0.0);
    }

    // =========================================================================
    // Nesting
    // =========================================================================

    #[test]
    fn page_level_parent_changes_nothing() {
        let grid = GridSettings::default();
        let req = request(12.0, 4.0);
        let root = ImageSize::from_grid(&grid);
        assert_eq!(
            compute_image_size(&grid, &req, Some(&root)),
            compute_image_size(&grid, &req, None)
        );
    }

    #[test]
    fn nested_size_uses_parent_widths() {
        let grid = GridSettings::default();
        let parent = compute_image_size(&grid, &request(12.0, 6.0), None);
        let child = compute_image_size(&grid, &request(6.0, 0.0), Some(&parent));
        // lg: (570 + 30) / 12 * 6 - 30
        assert_eq!(child.width.lg.px, 270.0);
        // xxs: (480 + 30) / 12 * 6 - 30
        assert_eq!(child.width.xxs.px, 225.0);
    }

    #[test]
    fn nested_size_inherits_ratio_and_crop() {
        let grid = GridSettings::default();
        let parent_req = ImageSizeRequest {
            ratio: 50.0,
            crop: Some("20".into()),
            ..ImageSizeRequest::default()
        };
        let parent = compute_image_size(&grid, &parent_req, None);
        let child = compute_image_size(&grid, &request(6.0, 0.0), Some(&parent));
        assert_eq!(child.ratio, 0.5);
        assert_eq!(child.crop, "20");
        assert!(child.height.lg.as_ref().unwrap().to_string().ends_with("c20"));
    }

    #[test]
    fn own_values_beat_parent_values() {
        let grid = GridSettings::default();
        let parent = compute_image_size(
            &grid,
            &ImageSizeRequest {
                ratio: 50.0,
                ..ImageSizeRequest::default()
            },
            None,
        );
        let child = compute_image_size(
            &grid,
            &ImageSizeRequest {
                ratio: 100.0,
                ..ImageSizeRequest::default()
            },
            Some(&parent),
        );
        assert_eq!(child.ratio, 1.0);
    }

    #[test]
    fn size_serializes_dimensions_as_strings() {
        let req = ImageSizeRequest {
            ratio: 50.0,
            ..ImageSizeRequest::default()
        };
        let size = compute_image_size(&GridSettings::default(), &req, None);
        let value = serde_json::to_value(&size).unwrap();
        assert_eq!(value["width"]["lg"], "1170");
        assert_eq!(value["height"]["lg"], "585c");
        assert_eq!(value["cols"]["xs"], 1.0);
    }
}
