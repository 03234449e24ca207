use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::{
    contours::{BorderType, Contour, find_contours},
    definitions::Image,
    map::map_colors,
    region_labelling::{Connectivity, connected_components},
};
use itertools::{Itertools, MinMaxResult};

use crate::{
    cutout_kit::padding::{Border, add_border},
    error::PaddingError,
};

/// Axis-aligned rectangle in pixel coordinates, inclusive of its border pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Geometric queries on a traced contour.
pub trait ContourExt {
    /// Area enclosed by the contour polygon (shoelace formula).
    ///
    /// Degenerate contours (a single pixel or a one-pixel-wide line) enclose zero area.
    fn area(&self) -> f64;

    /// Smallest axis-aligned rectangle containing every contour point.
    ///
    /// Returns `None` for an empty contour.
    fn bounding_rect(&self) -> Option<BoundingBox>;
}

impl ContourExt for Contour<i32> {
    fn area(&self) -> f64 {
        let points = &self.points;
        if points.len() < 3 {
            return 0.0;
        }

        let twice_area: i64 = points
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
            .sum();

        twice_area.unsigned_abs() as f64 / 2.0
    }

    fn bounding_rect(&self) -> Option<BoundingBox> {
        let (min_x, max_x) = min_max_impl(self.points.iter().map(|p| p.x))?;
        let (min_y, max_y) = min_max_impl(self.points.iter().map(|p| p.y))?;

        Some(BoundingBox {
            x: u32::try_from(min_x).ok()?,
            y: u32::try_from(min_y).ok()?,
            width: u32::try_from(max_x - min_x + 1).ok()?,
            height: u32::try_from(max_y - min_y + 1).ok()?,
        })
    }
}

fn min_max_impl(values: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    match values.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Finds the outermost borders of the 8-connected foreground regions in `mask`.
///
/// Any non-zero pixel is foreground. Borders of holes, and of regions nested
/// inside holes, are not returned. Regions touching the image edge are traced
/// like any other; point coordinates are in `mask` space.
///
/// # Errors
///
/// * `PaddingError::DimensionOverflow` - When the mask is too large to frame
pub fn find_external_contours(mask: &GrayImage) -> Result<Vec<Contour<i32>>, PaddingError> {
    // Outer borders are only started away from column 0, so trace on a
    // zero-framed copy and shift the points back.
    let framed = add_border(mask, Border::uniform(1), Luma([0]))?;

    Ok(find_contours::<i32>(&framed)
        .into_iter()
        .filter(|contour| {
            matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
        })
        .map(|mut contour| {
            for point in &mut contour.points {
                point.x -= 1;
                point.y -= 1;
            }
            contour
        })
        .collect())
}

/// Picks the contour enclosing the largest area.
///
/// On ties the contour appearing last wins.
#[must_use]
pub fn largest_contour(contours: &[Contour<i32>]) -> Option<&Contour<i32>> {
    contours
        .iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
}

/// Draws `contour` filled solid (255) on a zero canvas the size of `mask`.
///
/// The filled region is the foreground component bounded by the contour
/// together with everything it encloses, so holes inside the silhouette are
/// closed. `contour` must have been traced from `mask`.
#[must_use]
pub fn fill_contour_mask(mask: &GrayImage, contour: &Contour<i32>) -> GrayImage {
    let (width, height) = mask.dimensions();
    let Some(seed) = contour.points.first() else {
        return GrayImage::new(width, height);
    };

    let components = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let target = components.get_pixel(seed.x as u32, seed.y as u32)[0];
    let region = map_colors(&components, |Luma([label])| {
        Luma([if label == target { u8::MAX } else { 0 }])
    });

    // Everything outside the region splits into 4-connected pieces; those
    // touching the canvas edge are outside the contour, the rest are holes.
    let outside = connected_components(&region, Connectivity::Four, Luma([u8::MAX]));
    let edge_labels = edge_labels_impl(&outside);

    map_colors(&outside, |Luma([label])| {
        Luma([if label == 0 || !edge_labels.contains(&label) {
            u8::MAX
        } else {
            0
        }])
    })
}

/// Collects the non-zero labels that appear on the canvas border.
fn edge_labels_impl(labels: &Image<Luma<u32>>) -> HashSet<u32> {
    let (width, height) = labels.dimensions();
    let last_x = width.saturating_sub(1);
    let last_y = height.saturating_sub(1);

    let horizontal = (0..width).flat_map(|x| [(x, 0), (x, last_y)]);
    let vertical = (0..height).flat_map(|y| [(0, y), (last_x, y)]);

    horizontal
        .chain(vertical)
        .map(|(x, y)| labels.get_pixel(x, y)[0])
        .filter(|&label| label != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use imageproc::point::Point;
    use itertools::iproduct;

    fn mask_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y, w, h) in rects {
            for (px, py) in iproduct!(x..x + w, y..y + h) {
                mask.put_pixel(px, py, Luma([255]));
            }
        }
        mask
    }

    fn contour_from(points: &[(i32, i32)]) -> Contour<i32> {
        Contour {
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            border_type: BorderType::Outer,
            parent: None,
        }
    }

    #[test]
    fn area_with_square_contour_returns_polygon_area() {
        let contour = contour_from(&[(0, 0), (0, 4), (4, 4), (4, 0)]);
        assert_eq!(contour.area(), 16.0);
    }

    #[test]
    fn area_with_degenerate_contour_returns_zero() {
        assert_eq!(contour_from(&[(3, 3)]).area(), 0.0);
        assert_eq!(contour_from(&[(0, 0), (5, 0)]).area(), 0.0);
    }

    #[test]
    fn bounding_rect_with_points_is_inclusive() {
        let contour = contour_from(&[(2, 3), (2, 7), (9, 7), (9, 3)]);
        assert_eq!(
            contour.bounding_rect(),
            Some(BoundingBox {
                x: 2,
                y: 3,
                width: 8,
                height: 5
            })
        );
        assert_eq!(contour_from(&[]).bounding_rect(), None);
    }

    #[test]
    fn find_external_contours_with_hollow_square_skips_hole_border() {
        let mut mask = mask_with_rects(12, 12, &[(2, 2, 8, 8)]);
        for (x, y) in iproduct!(4..8, 4..8) {
            mask.put_pixel(x, y, Luma([0]));
        }
        // Island inside the hole.
        mask.put_pixel(5, 5, Luma([255]));

        let contours = find_external_contours(&mask).unwrap();

        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].bounding_rect(),
            Some(BoundingBox {
                x: 2,
                y: 2,
                width: 8,
                height: 8
            })
        );
    }

    #[test]
    fn find_external_contours_with_empty_mask_returns_nothing() {
        assert!(find_external_contours(&GrayImage::new(8, 8)).unwrap().is_empty());
    }

    #[test]
    fn largest_contour_with_two_regions_picks_bigger_one() {
        let mask = mask_with_rects(30, 20, &[(1, 1, 4, 4), (10, 5, 12, 10)]);
        let contours = find_external_contours(&mask).unwrap();
        assert_eq!(contours.len(), 2);

        let largest = largest_contour(&contours).unwrap();

        assert_eq!(largest.bounding_rect().unwrap().x, 10);
    }

    #[test]
    fn largest_contour_with_equal_areas_picks_last() {
        let contours = vec![
            contour_from(&[(0, 0), (0, 2), (2, 2), (2, 0)]),
            contour_from(&[(5, 5), (5, 7), (7, 7), (7, 5)]),
        ];

        let largest = largest_contour(&contours).unwrap();

        assert_eq!(largest.points[0], Point::new(5, 5));
        assert!(largest_contour(&[]).is_none());
    }

    #[test]
    fn fill_contour_mask_with_hollow_square_closes_hole() {
        let mut mask = mask_with_rects(12, 12, &[(2, 2, 8, 8), (0, 11, 2, 1)]);
        for (x, y) in iproduct!(4..8, 4..8) {
            mask.put_pixel(x, y, Luma([0]));
        }

        let contours = find_external_contours(&mask).unwrap();
        let largest = largest_contour(&contours).unwrap();
        let filled = fill_contour_mask(&mask, largest);

        for (x, y) in iproduct!(0..12, 0..12) {
            let inside = (2..10).contains(&x) && (2..10).contains(&y);
            let expected = if inside { 255 } else { 0 };
            assert_eq!(filled.get_pixel(x, y)[0], expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn fill_contour_mask_with_region_touching_edge_fills_only_region() {
        let mask = mask_with_rects(6, 6, &[(0, 0, 3, 6)]);
        let contours = find_external_contours(&mask).unwrap();
        let filled = fill_contour_mask(&mask, &contours[0]);

        assert_eq!(filled, mask);
    }

    #[test]
    fn find_external_contours_with_region_on_each_edge_traces_region() {
        for (x, y, width, height) in [(0, 3, 3, 4), (7, 3, 3, 4), (3, 0, 4, 3), (3, 7, 4, 3)] {
            let mask = mask_with_rects(10, 10, &[(x, y, width, height)]);

            let contours = find_external_contours(&mask).unwrap();

            assert_eq!(contours.len(), 1, "region at ({x}, {y})");
            assert_eq!(
                contours[0].bounding_rect(),
                Some(BoundingBox {
                    x,
                    y,
                    width,
                    height
                }),
                "region at ({x}, {y})"
            );
        }
    }

    #[test]
    fn fill_contour_mask_with_full_frame_region_fills_everything() {
        let mask = mask_with_rects(5, 4, &[(0, 0, 5, 4)]);

        let contours = find_external_contours(&mask).unwrap();
        let filled = fill_contour_mask(&mask, largest_contour(&contours).unwrap());

        assert_eq!(contours.len(), 1);
        assert_eq!(filled, mask);
    }
}
