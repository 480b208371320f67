//! Trajectory projection onto time-varying basis vectors
//!
//! For trajectory `t`, step `l` and selected basis `b` at time `τ`:
//!
//! ```text
//! p[t][l][k] = Σ_i basis[i, b_k, τ] · traj[i, l, t]
//! ```
//!
//! At most [`MAX_TRAJECTORIES`] trajectories are projected, in index order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tensor::ModelData;

/// Hard cap on projected trajectories per call.
pub const MAX_TRAJECTORIES: usize = 100;

/// One scalar per selected basis.
pub type ProjectedPoint = Vec<f64>;

/// Points of one trajectory in step order.
pub type ProjectedTrajectory = Vec<ProjectedPoint>;

/// Projection precondition failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("no basis vectors selected")]
    EmptySelection,

    #[error("time index {index} out of bounds (time steps: {len})")]
    TimeOutOfBounds { index: usize, len: usize },

    #[error("basis index {index} out of bounds (basis count: {len})")]
    BasisOutOfBounds { index: usize, len: usize },
}

/// Parameters of one projection call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub time_index: usize,
    pub bases: Vec<usize>,
    #[serde(default)]
    pub exclude_last_step: bool,
}

impl ProjectionRequest {
    pub fn new(time_index: usize, bases: Vec<usize>) -> Self {
        Self {
            time_index,
            bases,
            exclude_last_step: false,
        }
    }

    pub fn exclude_last_step(mut self, exclude: bool) -> Self {
        self.exclude_last_step = exclude;
        self
    }
}

/// Read-only projector over one model's tensors
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    model: &'a ModelData,
}

impl<'a> Projector<'a> {
    pub fn new(model: &'a ModelData) -> Self {
        Self { model }
    }

    /// Number of trajectories a projection will emit.
    pub fn trajectory_limit(&self) -> usize {
        self.model.trajectory_count().min(MAX_TRAJECTORIES)
    }

    /// Number of points each projected trajectory will hold.
    pub fn step_limit(&self, exclude_last_step: bool) -> usize {
        let steps = self.model.step_count();
        if exclude_last_step {
            steps.saturating_sub(1)
        } else {
            steps
        }
    }

    /// Validate `request` and gather the selected basis vectors at its time slice.
    ///
    /// Feature dimensions already agree: `ModelData::new` is the only constructor.
    fn basis_vectors(
        &self,
        request: &ProjectionRequest,
    ) -> Result<Vec<&'a [f32]>, ProjectionError> {
        if request.bases.is_empty() {
            return Err(ProjectionError::EmptySelection);
        }

        let model = self.model;
        let basis = model.basis();

        let time_steps = model.time_step_count();
        if request.time_index >= time_steps {
            return Err(ProjectionError::TimeOutOfBounds {
                index: request.time_index,
                len: time_steps,
            });
        }

        request
            .bases
            .iter()
            .map(|&layer| {
                basis
                    .lane(layer, request.time_index)
                    .ok_or(ProjectionError::BasisOutOfBounds {
                        index: layer,
                        len: model.basis_count(),
                    })
            })
            .collect()
    }

    /// Project every retained step of the first `trajectory_limit()` trajectories.
    pub fn project(
        &self,
        request: &ProjectionRequest,
    ) -> Result<Vec<ProjectedTrajectory>, ProjectionError> {
        let vectors = self.basis_vectors(request)?;
        let trajectories = self.model.trajectories();
        let data = trajectories.data();
        let dim = trajectories.dim();
        let steps = self.step_limit(request.exclude_last_step);

        let projected: Vec<ProjectedTrajectory> = (0..self.trajectory_limit())
            .map(|t| {
                (0..steps)
                    .map(|l| {
                        // l < step_count and t < trajectory_count: always in bounds
                        let start = trajectories.offset(l, t);
                        let features = &data[start..start + dim];
                        vectors
                            .iter()
                            .map(|v| dot(v, features))
                            .collect::<ProjectedPoint>()
                    })
                    .collect::<ProjectedTrajectory>()
            })
            .collect();

        Ok(projected)
    }
}

/// Dot product accumulated in f64. Lengths are equal by construction.
fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}
