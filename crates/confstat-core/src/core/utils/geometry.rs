use crate::core::models::simulation_box::SimulationBox;
use nalgebra::{Point3, Vector3};

/// Minimum-image separation vector from `a` to `b`.
///
/// Each component of `b - a` is wrapped into `(-L/2, L/2]` for the box length `L`
/// along that axis. Box lengths are assumed positive, which [`SimulationBox`]
/// guarantees on construction.
#[inline]
pub fn minimum_image_vector(
    a: &Point3<f64>,
    b: &Point3<f64>,
    simulation_box: &SimulationBox,
) -> Vector3<f64> {
    let lengths = simulation_box.lengths();
    let diff = b - a;
    Vector3::from_fn(|axis, _| wrap_component(diff[axis], lengths[axis]))
}

#[inline]
fn wrap_component(d: f64, l: f64) -> f64 {
    d - l * (d / l - 0.5).ceil()
}

#[inline]
pub fn squared_distance(a: &Point3<f64>, b: &Point3<f64>, simulation_box: &SimulationBox) -> f64 {
    minimum_image_vector(a, b, simulation_box).norm_squared()
}

#[inline]
pub fn distance(a: &Point3<f64>, b: &Point3<f64>, simulation_box: &SimulationBox) -> f64 {
    squared_distance(a, b, simulation_box).sqrt()
}

/// Folds a position into the primary box `[0, L)` along every axis.
pub fn fold_position(p: &Point3<f64>, simulation_box: &SimulationBox) -> Point3<f64> {
    let lengths = simulation_box.lengths();
    Point3::from(Vector3::from_fn(|axis, _| {
        let l = lengths[axis];
        let folded = p[axis] - l * (p[axis] / l).floor();
        // Rounding can land exactly on the upper edge for tiny negative inputs.
        if folded >= l { 0.0 } else { folded }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn cube(l: f64) -> SimulationBox {
        SimulationBox::cubic(l).unwrap()
    }

    #[test]
    fn distance_across_boundary_uses_nearest_image() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(9.0, 0.0, 0.0);
        assert!(f64_approx_equal(distance(&a, &b, &cube(10.0)), 1.0));
    }

    #[test]
    fn minimum_image_vector_points_from_a_to_b() {
        let a = Point3::new(1.0, 1.0, 1.0);
        let b = Point3::new(9.5, 2.0, 0.5);
        let v = minimum_image_vector(&a, &b, &cube(10.0));
        assert!(f64_approx_equal(v.x, -1.5));
        assert!(f64_approx_equal(v.y, 1.0));
        assert!(f64_approx_equal(v.z, -0.5));
    }

    #[test]
    fn minimum_image_vector_wraps_half_box_to_positive_side() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let forward = minimum_image_vector(&a, &Point3::new(5.0, 0.0, 0.0), &cube(10.0));
        let backward = minimum_image_vector(&a, &Point3::new(-5.0, 0.0, 0.0), &cube(10.0));
        assert!(f64_approx_equal(forward.x, 5.0));
        assert!(f64_approx_equal(backward.x, 5.0));
    }

    #[test]
    fn minimum_image_handles_unfolded_positions_many_boxes_away() {
        let a = Point3::new(0.5, 0.0, 0.0);
        let b = Point3::new(30.0 + 9.5, 0.0, -20.0);
        assert!(f64_approx_equal(distance(&a, &b, &cube(10.0)), 1.0));
    }

    #[test]
    fn minimum_image_respects_anisotropic_boxes() {
        let simulation_box = SimulationBox::new(10.0, 4.0, 6.0).unwrap();
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.0, 3.0, 5.0);
        assert!(f64_approx_equal(
            squared_distance(&a, &b, &simulation_box),
            1.0 + 1.0
        ));
    }

    #[test]
    fn distance_is_symmetric() {
        let simulation_box = cube(7.0);
        let a = Point3::new(0.3, 6.1, 2.0);
        let b = Point3::new(6.9, 0.2, 5.5);
        assert!(f64_approx_equal(
            distance(&a, &b, &simulation_box),
            distance(&b, &a, &simulation_box)
        ));
    }

    #[test]
    fn fold_position_maps_into_primary_box() {
        let folded = fold_position(&Point3::new(-1.0, 12.5, 3.0), &cube(10.0));
        assert!(f64_approx_equal(folded.x, 9.0));
        assert!(f64_approx_equal(folded.y, 2.5));
        assert!(f64_approx_equal(folded.z, 3.0));
    }
}
