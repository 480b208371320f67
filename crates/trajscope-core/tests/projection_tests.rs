//! Projection property tests over synthetic tensors

use pretty_assertions::assert_eq;
use trajscope_core::{
    BasisSelector, Figure, ModelData, ProjectionError, ProjectionRequest, Projector, Tensor3,
    MAX_TRAJECTORIES,
};

/// Deterministic pseudo-random fill so tests don't need a rng crate
fn filled(shape: [usize; 3], seed: u32) -> Tensor3 {
    let len: usize = shape.iter().product();
    let data = (0..len)
        .map(|i| {
            let v = (i as u32).wrapping_mul(2654435761).wrapping_add(seed) % 1000;
            v as f32 / 500.0 - 1.0
        })
        .collect();
    Tensor3::new(shape, data).unwrap()
}

fn model(feature_dim: usize, steps: usize, trajectories: usize, times: usize) -> ModelData {
    ModelData::new(
        filled([feature_dim, steps, trajectories], 7),
        filled([feature_dim, feature_dim, times], 13),
    )
    .unwrap()
}

#[test]
fn test_end_to_end_identity_scenario() {
    let trajectories = Tensor3::new([2, 3, 1], vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
    let basis = Tensor3::new([2, 2, 1], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
    let model = ModelData::new(trajectories, basis).unwrap();

    let out = Projector::new(&model)
        .project(&ProjectionRequest::new(0, vec![0, 1]))
        .unwrap();

    assert_eq!(out, vec![vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]]);
}

#[test]
fn test_output_capped_at_max_trajectories() {
    for count in [1, 99, 100, 101, 250] {
        let model = model(4, 3, count, 2);
        let out = Projector::new(&model)
            .project(&ProjectionRequest::new(1, vec![0, 1, 2]))
            .unwrap();
        assert_eq!(out.len(), count.min(MAX_TRAJECTORIES), "count {}", count);
    }
}

#[test]
fn test_every_point_has_one_component_per_basis() {
    let model = model(5, 6, 4, 3);
    for bases in [vec![0], vec![4, 4], vec![0, 1, 2], vec![3, 2, 1, 0]] {
        let out = Projector::new(&model)
            .project(&ProjectionRequest::new(2, bases.clone()))
            .unwrap();
        for trajectory in &out {
            assert_eq!(trajectory.len(), 6);
            assert!(trajectory.iter().all(|p| p.len() == bases.len()));
        }
    }
}

#[test]
fn test_exclusion_drops_exactly_one_step() {
    let model = model(3, 5, 7, 1);
    let projector = Projector::new(&model);
    let full = projector
        .project(&ProjectionRequest::new(0, vec![0, 1, 2]))
        .unwrap();
    let trimmed = projector
        .project(&ProjectionRequest::new(0, vec![0, 1, 2]).exclude_last_step(true))
        .unwrap();

    assert_eq!(full.len(), trimmed.len());
    for (f, t) in full.iter().zip(&trimmed) {
        assert_eq!(t.len() + 1, f.len());
        assert_eq!(&f[..t.len()], &t[..]);
    }
}

#[test]
fn test_projection_is_deterministic() {
    let model = model(8, 4, 3, 2);
    let projector = Projector::new(&model);
    let request = ProjectionRequest::new(1, vec![7, 0, 3]);

    let a = projector.project(&request).unwrap();
    let b = projector.project(&request).unwrap();

    let bits = |out: &Vec<Vec<Vec<f64>>>| -> Vec<u64> {
        out.iter().flatten().flatten().map(|v| v.to_bits()).collect()
    };
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn test_duplicate_bases_repeat_components() {
    let model = model(3, 2, 2, 1);
    let out = Projector::new(&model)
        .project(&ProjectionRequest::new(0, vec![1, 1]))
        .unwrap();
    for point in out.iter().flatten() {
        assert_eq!(point[0].to_bits(), point[1].to_bits());
    }
}

#[test]
fn test_time_one_past_end_is_rejected() {
    let model = model(3, 2, 2, 4);
    let err = Projector::new(&model)
        .project(&ProjectionRequest::new(4, vec![0]))
        .unwrap_err();
    assert_eq!(err, ProjectionError::TimeOutOfBounds { index: 4, len: 4 });
}

#[test]
fn test_rectangular_basis_uses_basis_stride() {
    // feature_dim 2, basis_count 3, two time steps
    let trajectories = Tensor3::new([2, 1, 1], vec![1.0, 10.0]).unwrap();
    let basis = Tensor3::new(
        [2, 3, 2],
        vec![
            1.0, 0.0, 0.0, 1.0, 1.0, 1.0, // t0
            2.0, 0.0, 0.0, 2.0, 2.0, 2.0, // t1
        ],
    )
    .unwrap();
    let model = ModelData::new(trajectories, basis).unwrap();

    let out = Projector::new(&model)
        .project(&ProjectionRequest::new(1, vec![0, 1, 2]))
        .unwrap();
    assert_eq!(out, vec![vec![vec![2.0, 20.0, 22.0]]]);
}

#[test]
fn test_selector_to_figure_pipeline() {
    let model = model(6, 4, 3, 2);
    let bases = BasisSelector::new(model.basis_count())
        .resolve("1, last-1, 3")
        .unwrap();
    assert_eq!(bases, vec![0, 5, 2]);

    let projected = Projector::new(&model)
        .project(&ProjectionRequest::new(0, bases))
        .unwrap();
    let figure = Figure::from_projection(&projected);

    assert_eq!(figure.data.len(), 3);
    assert!(figure.data.iter().all(|trace| trace.len() == 4));
    assert_eq!(figure.data[2].name, "Trajectory 3");
}
