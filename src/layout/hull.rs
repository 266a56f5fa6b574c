use std::cmp::Ordering;

use eframe::egui::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterHull {
    pub cluster_id: String,
    pub cluster_type: String,
    /// Counter-clockwise (y up), closed implicitly.
    pub polygon: Vec<[f32; 2]>,
}

fn cross(origin: Vec2, a: Vec2, b: Vec2) -> f32 {
    let oa = a - origin;
    let ob = b - origin;
    (oa.x * ob.y) - (oa.y * ob.x)
}

/// Monotone-chain hull without collinear vertices. `None` for fewer than three
/// distinct non-collinear points or non-finite input.
pub fn convex_hull(points: &[Vec2]) -> Option<Vec<Vec2>> {
    if points.len() < 3 || points.iter().any(|point| !point.x.is_finite() || !point.y.is_finite()) {
        return None;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| match a.x.total_cmp(&b.x) {
        Ordering::Equal => a.y.total_cmp(&b.y),
        other => other,
    });
    sorted.dedup();
    if sorted.len() < 3 {
        return None;
    }

    let mut lower: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], point) <= 0.0
        {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], point) <= 0.0
        {
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    (lower.len() >= 3).then_some(lower)
}

/// Inclusive point-in-convex-polygon test for hulls produced by [`convex_hull`].
pub fn polygon_contains(polygon: &[[f32; 2]], point: Vec2, tolerance: f32) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    polygon.iter().enumerate().all(|(index, start)| {
        let end = polygon[(index + 1) % polygon.len()];
        let start = Vec2::new(start[0], start[1]);
        let end = Vec2::new(end[0], end[1]);
        let edge_length = (end - start).length().max(f32::EPSILON);
        cross(start, end, point) / edge_length >= -tolerance
    })
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn as_pairs(points: &[Vec2]) -> Vec<[f32; 2]> {
        points.iter().map(|point| [point.x, point.y]).collect()
    }

    #[test]
    fn square_with_interior_point() {
        let points = vec![
            vec2(0.0, 0.0),
            vec2(10.0, 0.0),
            vec2(10.0, 10.0),
            vec2(0.0, 10.0),
            vec2(5.0, 5.0),
        ];

        let hull = convex_hull(&points).unwrap();

        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&vec2(5.0, 5.0)));
        let polygon = as_pairs(&hull);
        for point in &points {
            assert!(polygon_contains(&polygon, *point, 1e-3));
        }
        assert!(!polygon_contains(&polygon, vec2(11.0, 5.0), 1e-3));
    }

    #[test]
    fn collinear_points_have_no_hull() {
        let points = vec![vec2(0.0, 0.0), vec2(1.0, 1.0), vec2(2.0, 2.0), vec2(3.0, 3.0)];
        assert!(convex_hull(&points).is_none());
    }

    #[test]
    fn too_few_or_duplicate_points_have_no_hull() {
        assert!(convex_hull(&[vec2(0.0, 0.0), vec2(1.0, 0.0)]).is_none());
        assert!(convex_hull(&[vec2(1.0, 1.0), vec2(1.0, 1.0), vec2(2.0, 3.0)]).is_none());
    }

    #[test]
    fn non_finite_points_have_no_hull() {
        let points = vec![vec2(0.0, 0.0), vec2(f32::NAN, 1.0), vec2(2.0, 0.0)];
        assert!(convex_hull(&points).is_none());
    }

    #[test]
    fn collinear_edge_points_stay_inside() {
        let points = vec![
            vec2(0.0, 0.0),
            vec2(5.0, 0.0),
            vec2(10.0, 0.0),
            vec2(5.0, 8.0),
        ];

        let hull = convex_hull(&points).unwrap();

        assert_eq!(hull.len(), 3);
        assert!(polygon_contains(&as_pairs(&hull), vec2(5.0, 0.0), 1e-3));
    }
}
