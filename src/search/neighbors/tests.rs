use super::*;

fn vector(entries: &[(usize, f64)]) -> SparseVector {
    SparseVector::from_entries(entries.to_vec())
}

fn rows() -> Vec<SparseVector> {
    vec![
        vector(&[(0, 1.0)]),
        vector(&[(1, 1.0)]),
        vector(&[(0, 1.0), (1, 1.0)]),
        vector(&[(2, 3.0)]),
    ]
}

#[test]
fn nearest_first() {
    let model = NearestNeighbors::fit(rows(), 4);
    let result = model.kneighbors(&vector(&[(0, 2.0)]));

    let order: Vec<usize> = result.iter().map(|n| n.row).collect();
    assert_eq!(order, vec![0, 2, 1, 3]);
    assert!(result[0].distance.abs() < 1e-12);
    assert!((result[1].distance - (1.0 - 1.0 / 2.0_f64.sqrt())).abs() < 1e-12);
    assert!((result[2].distance - 1.0).abs() < 1e-12);
}

#[test]
fn magnitude_does_not_matter() {
    let model = NearestNeighbors::fit(rows(), 1);
    let small = model.kneighbors(&vector(&[(2, 0.001)]));
    let large = model.kneighbors(&vector(&[(2, 1000.0)]));

    assert_eq!(small[0].row, 3);
    assert_eq!(large[0].row, 3);
    assert!((small[0].distance - large[0].distance).abs() < 1e-12);
}

#[test]
fn ties_break_by_row() {
    let model = NearestNeighbors::fit(rows(), 4);
    let result = model.kneighbors_k(&vector(&[(5, 1.0)]), 3);

    let order: Vec<usize> = result.iter().map(|n| n.row).collect();
    assert_eq!(order, vec![0, 1, 2]);
    assert!(result.iter().all(|n| (n.distance - 1.0).abs() < 1e-12));
}

#[test]
fn zero_query_returns_rows_in_order() {
    let model = NearestNeighbors::fit(rows(), 2);
    let result = model.kneighbors(&SparseVector::default());

    assert_eq!(
        result,
        vec![
            Neighbor {
                row: 0,
                distance: 1.0
            },
            Neighbor {
                row: 1,
                distance: 1.0
            },
        ]
    );
}

#[test]
fn zero_rows_are_maximally_distant() {
    let model = NearestNeighbors::fit(vec![SparseVector::default(), vector(&[(0, 1.0)])], 2);
    let result = model.kneighbors(&vector(&[(0, 1.0)]));

    assert_eq!(result[0].row, 1);
    assert_eq!(result[1].row, 0);
    assert_eq!(result[1].distance, 1.0);
}

#[test]
fn n_neighbors_is_clamped() {
    let model = NearestNeighbors::fit(rows(), 5);
    assert_eq!(model.n_neighbors(), 4);
    assert_eq!(model.len(), 4);
    assert_eq!(model.kneighbors(&vector(&[(0, 1.0)])).len(), 4);
    assert_eq!(model.kneighbors_k(&vector(&[(0, 1.0)]), 10).len(), 4);
    assert!(model.kneighbors_k(&vector(&[(0, 1.0)]), 0).is_empty());
}

#[test]
fn empty_model() {
    let model = NearestNeighbors::fit(Vec::new(), 5);
    assert!(model.is_empty());
    assert_eq!(model.n_neighbors(), 0);
    assert!(model.kneighbors(&vector(&[(0, 1.0)])).is_empty());
}
