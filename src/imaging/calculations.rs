//! Pure calculation functions for grid-based image sizes.
//!
//! All functions here are pure and testable without any template state.

use crate::config::GridSettings;

/// Fill unset (zero) breakpoint values from the next smaller breakpoint.
///
/// Input and output are ordered `[xs, sm, md, lg]`; `xs` is never filled.
///
/// # Examples
/// ```
/// # use menutree::imaging::cascade;
/// assert_eq!(cascade([12.0, 0.0, 6.0, 0.0]), [12.0, 12.0, 6.0, 6.0]);
/// ```
pub fn cascade(values: [f64; 4]) -> [f64; 4] {
    let mut out = values;
    for i in 1..out.len() {
        if out[i] == 0.0 {
            out[i] = out[i - 1];
        }
    }
    out
}

/// Width of an element spanning `cols` of `columns` grid columns.
///
/// # Arguments
/// * `available` - Width of the surrounding container
/// * `gutter` - Space between columns
/// * `margin` - Outer margin (total, both sides)
/// * `columns` - Number of columns in the grid
/// * `cols` - Number of columns the element spans
/// * `border` - Border (total, both sides)
///
/// # Examples
/// ```
/// # use menutree::imaging::grid_width;
/// // Half of a 1170px container with 30px gutters
/// assert_eq!(grid_width(1170.0, 30.0, 0.0, 12.0, 6.0, 0.0), 570.0);
/// ```
pub fn grid_width(available: f64, gutter: f64, margin: f64, columns: f64, cols: f64, border: f64) -> f64 {
    (available + gutter - margin) / columns * cols - gutter - border
}

/// Container width an image may fill at each breakpoint, ordered
/// `[xxs, xs, sm, md, lg]`.
///
/// `xxs` always uses the `xs` container. A fluid breakpoint may grow up to
/// the next breakpoint's container.
pub fn container_widths(grid: &GridSettings) -> [f64; 5] {
    let c = &grid.container;
    let f = &grid.fluid;
    let pick = |fluid: bool, next: f64, own: f64| if fluid { next } else { own };
    [
        c.xs,
        pick(f.xs, c.sm, c.xs),
        pick(f.sm, c.md, c.sm),
        pick(f.md, c.lg, c.md),
        pick(f.lg, c.xl, c.lg),
    ]
}

/// Widths for an explicit image width, scaled against the `lg` container.
/// Ordered `[xxs, xs, sm, md, lg]`; `lg` is the explicit width itself.
pub fn scale_to_containers(image_width: f64, grid: &GridSettings) -> [f64; 5] {
    let c = &grid.container;
    let factor = if c.lg > 0.0 { image_width / c.lg } else { 0.0 };
    [
        factor * c.xs,
        factor * c.xs,
        factor * c.sm,
        factor * c.md,
        image_width,
    ]
}

/// Height/width ratio of a file, honouring a crop area if present.
///
/// The crop area is JSON with `width` and `height`, as stored by image
/// editors. Returns `None` for a zero-width result.
pub fn file_ratio(width: f64, height: f64, crop: Option<&str>) -> Option<f64> {
    let (w, h) = crop
        .and_then(|json| serde_json::from_str::<serde_json::Value>(json).ok())
        .and_then(|area| Some((area.get("width")?.as_f64()?, area.get("height")?.as_f64()?)))
        .unwrap_or((width, height));
    (w > 0.0).then(|| h / w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContainerWidths, FluidBreakpoints};

    // =========================================================================
    // cascade
    // =========================================================================

    #[test]
    fn cascade_fills_from_smaller_breakpoint() {
        assert_eq!(cascade([12.0, 0.0, 0.0, 0.0]), [12.0, 12.0, 12.0, 12.0]);
        assert_eq!(cascade([12.0, 6.0, 0.0, 3.0]), [12.0, 6.0, 6.0, 3.0]);
        assert_eq!(cascade([0.0, 0.0, 4.0, 0.0]), [0.0, 0.0, 4.0, 4.0]);
    }

    // =========================================================================
    // grid_width
    // =========================================================================

    #[test]
    fn full_width_equals_container() {
        assert_eq!(grid_width(970.0, 30.0, 0.0, 12.0, 12.0, 0.0), 970.0);
    }

    #[test]
    fn margin_and_border_reduce_width() {
        // (480 + 30 - 30) / 12 * 12 - 30 - 2
        assert_eq!(grid_width(480.0, 30.0, 30.0, 12.0, 12.0, 2.0), 448.0);
    }

    #[test]
    fn third_of_a_grid() {
        // (970 + 30) / 12 * 4 - 30
        let w = grid_width(970.0, 30.0, 0.0, 12.0, 4.0, 0.0);
        assert!((w - 303.333_333).abs() < 1e-3, "{w}");
    }

    // =========================================================================
    // Containers
    // =========================================================================

    #[test]
    fn fluid_breakpoints_use_next_container() {
        let grid = GridSettings::default();
        assert_eq!(container_widths(&grid), [480.0, 750.0, 750.0, 970.0, 1170.0]);

        let all_fluid = GridSettings {
            fluid: FluidBreakpoints {
                xs: true,
                sm: true,
                md: true,
                lg: true,
            },
            container: ContainerWidths {
                xl: 1400.0,
                ..ContainerWidths::default()
            },
            ..GridSettings::default()
        };
        assert_eq!(container_widths(&all_fluid), [480.0, 750.0, 970.0, 1170.0, 1400.0]);
    }

    #[test]
    fn explicit_width_scales_with_lg_container() {
        let grid = GridSettings::default();
        assert_eq!(
            scale_to_containers(585.0, &grid),
            [240.0, 240.0, 375.0, 485.0, 585.0]
        );
    }

    // =========================================================================
    // File ratio
    // =========================================================================

    #[test]
    fn file_ratio_from_dimensions_or_crop() {
        assert_eq!(file_ratio(1000.0, 400.0, None), Some(0.4));
        assert_eq!(
            file_ratio(1000.0, 400.0, Some(r#"{"x":0,"y":0,"width":200,"height":300}"#)),
            Some(1.5)
        );
        assert_eq!(file_ratio(1000.0, 400.0, Some("not json")), Some(0.4));
        assert_eq!(file_ratio(0.0, 400.0, None), None);
    }
}
