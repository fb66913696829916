//! Narrow phase: exact collision tests for every pair of shape kinds.
//!
//! All tests report a normal pointing from the first body towards the second.
//! Shapes that merely touch (zero overlap) are not colliding.

use crate::collision::result::CollisionResult;
use crate::math::vec2::Vec2;
use crate::objects::{Body, DEFAULT_LAYER};
use crate::shapes::{Rectangle, Shape};

const NORMAL_EPSILON: f64 = 1e-10;
const AXIS_ALIGNED_EPSILON: f64 = 1e-9;

/// Eligibility checks that run before any geometry: enabled flags, the legacy
/// layer rule, then the category/mask/group filter.
pub fn can_interact(a: &Body, b: &Body) -> bool {
    if !a.collision_enabled || !b.collision_enabled {
        return false;
    }
    if a.collision_layer != DEFAULT_LAYER
        && b.collision_layer != DEFAULT_LAYER
        && a.collision_layer != b.collision_layer
    {
        return false;
    }
    a.filter.can_collide(&b.filter)
}

/// Full collision test between two bodies, including the eligibility checks.
pub fn detect_collision(a: &Body, b: &Body) -> CollisionResult {
    if !can_interact(a, b) {
        return CollisionResult::NONE;
    }
    detect_shapes(a, b)
}

/// Geometric test only, dispatched on the shape pair.
pub fn detect_shapes(a: &Body, b: &Body) -> CollisionResult {
    let radius = |body: &Body| body.shape.round_radius().unwrap_or(0.0);

    match (&a.shape, &b.shape) {
        (Shape::Circle(_) | Shape::Point(_), Shape::Circle(_) | Shape::Point(_)) => {
            check_circle_circle(a.position, radius(a), b.position, radius(b))
        }
        (Shape::Circle(_) | Shape::Point(_), Shape::Rectangle(rect)) => {
            check_circle_rectangle(a.position, radius(a), b, rect)
        }
        (Shape::Rectangle(rect), Shape::Circle(_) | Shape::Point(_)) => {
            check_circle_rectangle(b.position, radius(b), a, rect).flipped()
        }
        (Shape::Rectangle(rect_a), Shape::Rectangle(rect_b)) => {
            if is_axis_aligned(a.rotation) && is_axis_aligned(b.rotation) {
                check_aabb_rectangles(a.position, rect_a, b.position, rect_b)
            } else {
                check_polygons_sat(a, b)
            }
        }
        (Shape::Circle(_) | Shape::Point(_), Shape::Polygon(_)) => {
            check_circle_polygon(a.position, radius(a), b)
        }
        (Shape::Polygon(_), Shape::Circle(_) | Shape::Point(_)) => {
            check_circle_polygon(b.position, radius(b), a).flipped()
        }
        (Shape::Rectangle(_) | Shape::Polygon(_), Shape::Rectangle(_) | Shape::Polygon(_)) => {
            check_polygons_sat(a, b)
        }
    }
}

/// A rectangle rotated by a multiple of PI keeps its extents on the world axes.
fn is_axis_aligned(rotation: f64) -> bool {
    rotation.sin().abs() < AXIS_ALIGNED_EPSILON
}

fn sign(value: f64) -> f64 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Circle against circle. Coincident centres report an upward normal.
pub fn check_circle_circle(center_a: Vec2, radius_a: f64, center_b: Vec2, radius_b: f64) -> CollisionResult {
    let dist_vec = center_b - center_a;
    let dist_sq = dist_vec.magnitude_squared();
    let radii_sum = radius_a + radius_b;

    if dist_sq >= radii_sum * radii_sum {
        return CollisionResult::NONE;
    }

    let distance = dist_sq.sqrt();
    let normal = if distance > NORMAL_EPSILON {
        dist_vec * (1.0 / distance)
    } else {
        Vec2::Y
    };
    CollisionResult::hit(normal, radii_sum - distance)
}

/// Circle (first) against a possibly rotated rectangle (second).
///
/// The circle centre is moved into the rectangle's frame and clamped to its
/// extents. A centre inside the rectangle is pushed out through the nearest face.
pub fn check_circle_rectangle(center: Vec2, radius: f64, rect_body: &Body, rect: &Rectangle) -> CollisionResult {
    let transform = rect_body.transform();
    let local = transform.apply_inverse(center);
    let half = rect.half_extents();

    if local.x.abs() <= half.x && local.y.abs() <= half.y {
        let dx = half.x - local.x.abs();
        let dy = half.y - local.y.abs();
        let (outward, depth) = if dx < dy {
            (Vec2::new(sign(local.x), 0.0), dx)
        } else {
            (Vec2::new(0.0, sign(local.y)), dy)
        };
        // `outward` points from the rectangle to the circle.
        return CollisionResult::hit(-transform.rotate(outward), radius + depth);
    }

    let closest = Vec2::new(local.x.clamp(-half.x, half.x), local.y.clamp(-half.y, half.y));
    let diff = local - closest;
    let dist_sq = diff.magnitude_squared();
    if dist_sq >= radius * radius {
        return CollisionResult::NONE;
    }
    let distance = dist_sq.sqrt();
    let outward = diff * (1.0 / distance);
    CollisionResult::hit(-transform.rotate(outward), radius - distance)
}

/// Two unrotated rectangles: overlap on both axes, resolved along the shallower one.
pub fn check_aabb_rectangles(pos_a: Vec2, rect_a: &Rectangle, pos_b: Vec2, rect_b: &Rectangle) -> CollisionResult {
    let d = pos_b - pos_a;
    let ha = rect_a.half_extents();
    let hb = rect_b.half_extents();
    let overlap_x = ha.x + hb.x - d.x.abs();
    let overlap_y = ha.y + hb.y - d.y.abs();

    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return CollisionResult::NONE;
    }
    if overlap_x < overlap_y {
        CollisionResult::hit(Vec2::new(sign(d.x), 0.0), overlap_x)
    } else {
        CollisionResult::hit(Vec2::new(0.0, sign(d.y)), overlap_y)
    }
}

// --- Projection Helpers for SAT ---

fn project_vertices(vertices: &[Vec2], axis: Vec2) -> (f64, f64) {
    vertices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        let p = v.dot(axis);
        (min.min(p), max.max(p))
    })
}

fn average(vertices: &[Vec2]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    for v in vertices {
        sum += *v;
    }
    sum / vertices.len() as f64
}

/// Overlap of two projected intervals; zero or negative means separated.
fn interval_overlap((min_a, max_a): (f64, f64), (min_b, max_b): (f64, f64)) -> f64 {
    (max_a - min_b).min(max_b - min_a)
}

/// Separating Axis Theorem over the edge normals of two polygonal shapes.
pub fn check_polygons_sat(a: &Body, b: &Body) -> CollisionResult {
    let (transform_a, transform_b) = (a.transform(), b.transform());
    let (Some(verts_a), Some(verts_b)) = (
        a.shape.world_vertices(&transform_a),
        b.shape.world_vertices(&transform_b),
    ) else {
        return CollisionResult::NONE;
    };

    let axes = a
        .shape
        .world_axes(&transform_a)
        .into_iter()
        .chain(b.shape.world_axes(&transform_b));

    let mut min_overlap = f64::INFINITY;
    let mut mtv_axis = Vec2::ZERO;
    for axis in axes {
        if axis.magnitude_squared() < NORMAL_EPSILON {
            continue;
        }
        let overlap = interval_overlap(project_vertices(&verts_a, axis), project_vertices(&verts_b, axis));
        if overlap <= 0.0 {
            return CollisionResult::NONE;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            mtv_axis = axis;
        }
    }
    if !min_overlap.is_finite() {
        return CollisionResult::NONE;
    }

    let center_to_center = average(&verts_b) - average(&verts_a);
    let normal = if center_to_center.dot(mtv_axis) < 0.0 { -mtv_axis } else { mtv_axis };
    CollisionResult::hit(normal, min_overlap)
}

/// Circle (first) against a polygonal shape (second) using SAT.
///
/// Candidate axes are the polygon's edge normals plus the axis from the circle
/// centre to the nearest polygon vertex.
pub fn check_circle_polygon(center: Vec2, radius: f64, polygon_body: &Body) -> CollisionResult {
    let transform = polygon_body.transform();
    let Some(vertices) = polygon_body.shape.world_vertices(&transform) else {
        return CollisionResult::NONE;
    };

    let mut axes = polygon_body.shape.world_axes(&transform);
    let closest_vertex = vertices
        .iter()
        .copied()
        .min_by(|p, q| p.distance_squared(center).total_cmp(&q.distance_squared(center)));
    if let Some(vertex) = closest_vertex {
        axes.push((vertex - center).normalize());
    }

    let mut min_overlap = f64::INFINITY;
    let mut mtv_axis = Vec2::ZERO;
    for axis in axes {
        if axis.magnitude_squared() < NORMAL_EPSILON {
            continue;
        }
        let center_proj = center.dot(axis);
        let circle_interval = (center_proj - radius, center_proj + radius);
        let overlap = interval_overlap(circle_interval, project_vertices(&vertices, axis));
        if overlap <= 0.0 {
            return CollisionResult::NONE;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            mtv_axis = axis;
        }
    }
    if !min_overlap.is_finite() {
        return CollisionResult::NONE;
    }

    let to_polygon = average(&vertices) - center;
    let normal = if to_polygon.dot(mtv_axis) < 0.0 { -mtv_axis } else { mtv_axis };
    CollisionResult::hit(normal, min_overlap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CollisionFilter;
    use crate::objects::BodyDesc;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
    const EPSILON: f64 = 1e-9;

    fn circle(r: f64, x: f64, y: f64) -> Body {
        BodyDesc::circle(r).unwrap().at(Vec2::new(x, y)).build().unwrap()
    }

    fn rect(w: f64, h: f64, x: f64, y: f64, rotation: f64) -> Body {
        BodyDesc::rectangle(w, h)
            .unwrap()
            .at(Vec2::new(x, y))
            .with_rotation(rotation)
            .build()
            .unwrap()
    }

    fn triangle(x: f64, y: f64) -> Body {
        BodyDesc::polygon(vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)])
            .unwrap()
            .at(Vec2::new(x, y))
            .build()
            .unwrap()
    }

    fn square_polygon(half: f64, x: f64, y: f64) -> Body {
        BodyDesc::polygon(vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ])
        .unwrap()
        .at(Vec2::new(x, y))
        .build()
        .unwrap()
    }

    fn point(x: f64, y: f64) -> Body {
        BodyDesc::point().at(Vec2::new(x, y)).build().unwrap()
    }

    fn assert_normal(result: &CollisionResult, x: f64, y: f64) {
        let n = result.normal.expect("collision normal");
        assert!((n.x - x).abs() < EPSILON && (n.y - y).abs() < EPSILON, "normal {:?}", n);
    }

    #[test]
    fn test_circle_circle_reference_example() {
        let result = detect_collision(&circle(10.0, 0.0, 0.0), &circle(10.0, 15.0, 0.0));
        assert!(result.collision);
        assert_normal(&result, 1.0, 0.0);
        assert!((result.penetration.unwrap() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_circle_touching_and_apart() {
        assert!(!detect_collision(&circle(1.0, 0.0, 0.0), &circle(1.0, 2.0, 0.0)).collision);
        let apart = detect_collision(&circle(1.0, 0.0, 0.0), &circle(1.0, 3.0, 0.0));
        assert_eq!(apart, CollisionResult::NONE);
        assert!(apart.normal.is_none() && apart.penetration.is_none());
    }

    #[test]
    fn test_circle_circle_concentric() {
        let result = detect_collision(&circle(2.0, 0.0, 0.0), &circle(1.0, 0.0, 0.0));
        assert!((result.penetration.unwrap() - 3.0).abs() < EPSILON);
        assert_normal(&result, 0.0, 1.0);
    }

    #[test]
    fn test_aabb_rectangles_min_overlap_axis() {
        let result = detect_collision(&rect(4.0, 4.0, 0.0, 0.0, 0.0), &rect(4.0, 4.0, 3.0, 1.0, 0.0));
        assert!(result.collision);
        // x overlap 1, y overlap 3
        assert_normal(&result, 1.0, 0.0);
        assert!((result.penetration.unwrap() - 1.0).abs() < EPSILON);

        let below = detect_collision(&rect(4.0, 4.0, 0.0, 0.0, 0.0), &rect(4.0, 4.0, 0.5, -3.5, 0.0));
        assert_normal(&below, 0.0, -1.0);
        assert!((below.penetration.unwrap() - 0.5).abs() < EPSILON);

        assert!(!detect_collision(&rect(2.0, 2.0, 0.0, 0.0, 0.0), &rect(2.0, 2.0, 2.0, 0.0, 0.0)).collision);
    }

    #[test]
    fn test_rotated_rectangles_use_sat() {
        let diamond = rect(2.0, 2.0, 0.0, 0.0, FRAC_PI_4);
        // Bounding boxes overlap, the shapes do not.
        let corner = rect(2.0, 2.0, 2.3, 2.3, 0.0);
        assert!(diamond.aabb().overlaps(&corner.aabb()));
        assert!(!detect_collision(&diamond, &corner).collision);

        let side = rect(2.0, 2.0, 1.9, 0.0, 0.0);
        let result = detect_collision(&diamond, &side);
        assert!(result.collision);
        assert_normal(&result, 1.0, 0.0);
        assert!((result.penetration.unwrap() - (2.0f64.sqrt() - 0.9)).abs() < 1e-6);
    }

    #[test]
    fn test_circle_rectangle_outside() {
        let result = detect_collision(&circle(1.0, 2.5, 0.0), &rect(4.0, 2.0, 0.0, 0.0, 0.0));
        assert!(result.collision);
        assert_normal(&result, -1.0, 0.0);
        assert!((result.penetration.unwrap() - 0.5).abs() < EPSILON);

        // Corner region: closest point is the corner (2, 1).
        let near_corner = detect_collision(&circle(1.0, 2.6, 1.6), &rect(4.0, 2.0, 0.0, 0.0, 0.0));
        assert!(near_corner.collision);
        let far_corner = detect_collision(&circle(1.0, 2.8, 1.8), &rect(4.0, 2.0, 0.0, 0.0, 0.0));
        assert!(!far_corner.collision);
    }

    #[test]
    fn test_circle_center_inside_rectangle() {
        let result = detect_collision(&circle(1.0, 1.5, 0.0), &rect(4.0, 2.0, 0.0, 0.0, 0.0));
        assert!(result.collision);
        assert_normal(&result, -1.0, 0.0);
        assert!((result.penetration.unwrap() - 1.5).abs() < EPSILON);
        let n = result.normal.unwrap();
        assert!((n.magnitude() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_circle_rotated_rectangle() {
        // Quarter-turned 4x2 box is 2 wide and 4 tall.
        let tall = rect(4.0, 2.0, 0.0, 0.0, FRAC_PI_2);
        let above = detect_collision(&circle(1.0, 0.0, 2.5), &tall);
        assert!(above.collision);
        assert_normal(&above, 0.0, -1.0);
        assert!((above.penetration.unwrap() - 0.5).abs() < 1e-6);
        assert!(!detect_collision(&circle(1.0, 2.5, 0.0), &tall).collision);
    }

    #[test]
    fn test_rectangle_circle_normal_flips() {
        let result = detect_collision(&rect(4.0, 2.0, 0.0, 0.0, 0.0), &circle(1.0, 2.5, 0.0));
        assert_normal(&result, 1.0, 0.0);
    }

    #[test]
    fn test_point_shapes() {
        assert!(detect_collision(&point(0.5, 0.5), &circle(1.0, 0.0, 0.0)).collision);
        assert!(!detect_collision(&point(1.5, 0.0), &circle(1.0, 0.0, 0.0)).collision);
        assert!(detect_collision(&point(0.5, 0.5), &rect(2.0, 2.0, 0.0, 0.0, 0.0)).collision);
        assert!(!detect_collision(&point(5.0, 0.0), &rect(2.0, 2.0, 0.0, 0.0, 0.0)).collision);
        assert!(detect_collision(&point(0.3, 0.3), &triangle(0.0, 0.0)).collision);
        assert!(!detect_collision(&point(1.5, 1.5), &triangle(0.0, 0.0)).collision);
    }

    #[test]
    fn test_polygon_polygon() {
        assert!(detect_collision(&triangle(0.0, 0.0), &triangle(1.0, 0.5)).collision);
        assert!(!detect_collision(&triangle(0.0, 0.0), &triangle(3.0, 3.0)).collision);
        // Hypotenuse x + y = 2 separates the triangle from a box just beyond it.
        assert!(!detect_collision(&triangle(0.0, 0.0), &rect(0.4, 0.4, 1.5, 1.5, 0.0)).collision);
        assert!(detect_collision(&triangle(0.0, 0.0), &rect(0.4, 0.4, 0.9, 0.9, 0.0)).collision);
    }

    #[test]
    fn test_circle_polygon() {
        let result = detect_collision(&circle(1.0, 1.5, 0.0), &square_polygon(1.0, 0.0, 0.0));
        assert!(result.collision);
        assert_normal(&result, -1.0, 0.0);
        assert!((result.penetration.unwrap() - 0.5).abs() < EPSILON);

        let flipped = detect_collision(&square_polygon(1.0, 0.0, 0.0), &circle(1.0, 1.5, 0.0));
        assert_normal(&flipped, 1.0, 0.0);

        // Diagonal beyond the corner: only the vertex axis separates.
        assert!(!detect_collision(&circle(1.0, 1.9, 1.9), &square_polygon(1.0, 0.0, 0.0)).collision);
    }

    #[test]
    fn test_disabled_body_never_collides() {
        let a = circle(5.0, 0.0, 0.0);
        let mut b = circle(5.0, 1.0, 0.0);
        b.collision_enabled = false;
        assert!(!detect_collision(&a, &b).collision);
        assert!(!detect_collision(&b, &a).collision);
    }

    #[test]
    fn test_layers() {
        let mut a = circle(5.0, 0.0, 0.0);
        let mut b = circle(5.0, 1.0, 0.0);
        a.collision_layer = 1;
        b.collision_layer = 2;
        assert!(!detect_collision(&a, &b).collision);
        b.collision_layer = DEFAULT_LAYER;
        assert!(detect_collision(&a, &b).collision);
        b.collision_layer = 1;
        assert!(detect_collision(&a, &b).collision);
    }

    #[test]
    fn test_filter_rejects_before_geometry() {
        let mut a = circle(5.0, 0.0, 0.0);
        let mut b = circle(5.0, 1.0, 0.0);
        a.filter = CollisionFilter::in_group(-1);
        b.filter = CollisionFilter::in_group(-1);
        assert_eq!(detect_collision(&a, &b), CollisionResult::NONE);
        // Geometry alone still overlaps.
        assert!(detect_shapes(&a, &b).collision);
    }

    #[test]
    fn test_swapping_bodies_keeps_collision_flag() {
        let filters = [
            CollisionFilter::default(),
            CollisionFilter::new(0b01, 0b10, 0),
            CollisionFilter::new(0b10, 0b01, 0),
            CollisionFilter::new(0b100, 0b111, 0),
            CollisionFilter::in_group(4),
            CollisionFilter::in_group(-4),
        ];
        let mut bodies = vec![
            circle(1.0, 0.0, 0.0),
            circle(1.0, 1.5, 0.0),
            rect(2.0, 2.0, 0.5, 0.5, 0.0),
            rect(2.0, 1.0, 2.0, 0.0, 0.3),
            triangle(-1.0, -1.0),
            point(0.2, 0.1),
        ];
        for (i, body) in bodies.iter_mut().enumerate() {
            body.filter = filters[i % filters.len()];
        }
        for a in &bodies {
            for b in &bodies {
                let ab = detect_collision(a, b);
                let ba = detect_collision(b, a);
                assert_eq!(ab.collision, ba.collision, "{:?} vs {:?}", a.shape, b.shape);
            }
        }
    }
}
