#![allow(dead_code)]

/// Asserts that two vectors are approximately equal, being at most
/// **max_dist** apart at every index.
///
/// # Panics
///
/// Panics if the length of both vectors are not equal.
pub(crate) fn assert_approx_equal_distance(a: &Vec<f32>, b: &Vec<f32>, max_dist: f32) -> () {
    assert_eq!(a.len(), b.len());

    a.iter().zip(b).for_each(|(x, y)| {
        assert!(
            (x - y).abs() <= max_dist,
            "expected {} to be at most {} away from {}",
            x,
            max_dist,
            y
        );
    });
}

/// Asserts that two matrices are approximately equal using
/// **assert_approx_equal_distance** on every row of both matrices.
///
/// # Panics
///
/// Panics if the amount of rows of both matrices are not equal.
pub(crate) fn assert_approx_equal_matrix(a: &Vec<Vec<f32>>, b: &Vec<Vec<f32>>, max_dist: f32) -> () {
    assert_eq!(a.len(), b.len());

    for (row_a, row_b) in a.iter().zip(b) {
        assert_approx_equal_distance(row_a, row_b, max_dist);
    }
}
