//! Three-axis tensors and the trajectory/basis pair
//!
//! Tensors are stored flat with axis 0 varying fastest:
//! `index(i0, i1, i2) = i0 + d0 * (i1 + d1 * i2)`.
//!
//! - Trajectory tensor: `[feature_dim, step_count, trajectory_count]`
//! - Basis tensor: `[feature_dim, basis_count, time_step_count]`

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling tensors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    #[error("shape {shape:?} needs {expected} values, buffer holds {actual}")]
    LengthMismatch {
        shape: [usize; 3],
        expected: usize,
        actual: usize,
    },

    #[error("shape {0:?} overflows the addressable element count")]
    ShapeOverflow([usize; 3]),

    #[error("feature dimension mismatch: trajectories have {trajectories}, basis has {basis}")]
    DimensionMismatch { trajectories: usize, basis: usize },
}

/// Dense three-axis array of `f32` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTensor", into = "RawTensor")]
pub struct Tensor3 {
    shape: [usize; 3],
    data: Vec<f32>,
}

/// Wire form, validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawTensor {
    shape: [usize; 3],
    data: Vec<f32>,
}

impl TryFrom<RawTensor> for Tensor3 {
    type Error = TensorError;

    fn try_from(raw: RawTensor) -> Result<Self, Self::Error> {
        Tensor3::new(raw.shape, raw.data)
    }
}

impl From<Tensor3> for RawTensor {
    fn from(tensor: Tensor3) -> Self {
        RawTensor {
            shape: tensor.shape,
            data: tensor.data,
        }
    }
}

impl Tensor3 {
    /// Create a tensor, checking that the buffer length matches the shape.
    pub fn new(shape: [usize; 3], data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(TensorError::ShapeOverflow(shape))?;

        if data.len() != expected {
            return Err(TensorError::LengthMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Length of the fastest-varying axis.
    pub fn dim(&self) -> usize {
        self.shape[0]
    }

    /// Flat index where the axis-0 lane at `(i1, i2)` starts, i.e. the offset of
    /// `(0, i1, i2)`. Not bounds-checked.
    pub fn offset(&self, i1: usize, i2: usize) -> usize {
        self.shape[0] * (i1 + self.shape[1] * i2)
    }

    /// Contiguous axis-0 run at `(i1, i2)`, or `None` when out of range.
    pub fn lane(&self, i1: usize, i2: usize) -> Option<&[f32]> {
        if i1 >= self.shape[1] || i2 >= self.shape[2] {
            return None;
        }
        let start = self.offset(i1, i2);
        self.data.get(start..start + self.shape[0])
    }
}

/// A model's trajectory and basis tensors, always replaced together.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    trajectories: Tensor3,
    basis: Tensor3,
}

impl ModelData {
    /// Pair two tensors, rejecting a feature dimension mismatch.
    pub fn new(trajectories: Tensor3, basis: Tensor3) -> Result<Self, TensorError> {
        if trajectories.dim() != basis.dim() {
            return Err(TensorError::DimensionMismatch {
                trajectories: trajectories.dim(),
                basis: basis.dim(),
            });
        }
        Ok(Self {
            trajectories,
            basis,
        })
    }

    pub fn trajectories(&self) -> &Tensor3 {
        &self.trajectories
    }

    pub fn basis(&self) -> &Tensor3 {
        &self.basis
    }

    pub fn feature_dim(&self) -> usize {
        self.trajectories.dim()
    }

    pub fn step_count(&self) -> usize {
        self.trajectories.shape[1]
    }

    pub fn trajectory_count(&self) -> usize {
        self.trajectories.shape[2]
    }

    pub fn basis_count(&self) -> usize {
        self.basis.shape[1]
    }

    pub fn time_step_count(&self) -> usize {
        self.basis.shape[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let err = Tensor3::new([2, 2, 2], vec![0.0; 7]).unwrap_err();
        assert_eq!(
            err,
            TensorError::LengthMismatch {
                shape: [2, 2, 2],
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_zero_extent_is_empty() {
        let t = Tensor3::new([4, 0, 3], vec![]).unwrap();
        assert!(t.data().is_empty());
        assert_eq!(t.lane(0, 0), None);
    }

    #[test]
    fn test_overflowing_shape() {
        let err = Tensor3::new([usize::MAX, 2, 1], vec![]).unwrap_err();
        assert_eq!(err, TensorError::ShapeOverflow([usize::MAX, 2, 1]));
    }

    #[test]
    fn test_lane_axis_zero_fastest() {
        // shape [2, 3, 2]: lanes are pairs, i1 then i2
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let t = Tensor3::new([2, 3, 2], data).unwrap();
        assert_eq!(t.lane(0, 0), Some(&[0.0, 1.0][..]));
        assert_eq!(t.lane(2, 0), Some(&[4.0, 5.0][..]));
        assert_eq!(t.lane(1, 1), Some(&[8.0, 9.0][..]));
        assert_eq!(t.lane(3, 0), None);
        assert_eq!(t.lane(0, 2), None);
    }

    #[test]
    fn test_offset_is_lane_start() {
        let t = Tensor3::new([2, 3, 2], vec![0.0; 12]).unwrap();
        assert_eq!(t.offset(0, 0), 0);
        assert_eq!(t.offset(2, 0), 4);
        assert_eq!(t.offset(1, 1), 8);
        assert_eq!(t.offset(2, 1), 10);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Tensor3 = serde_json::from_str(r#"{"shape":[1,2,1],"data":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.shape(), [1, 2, 1]);

        let bad = serde_json::from_str::<Tensor3>(r#"{"shape":[1,2,2],"data":[1.0,2.0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_model_data_rejects_dim_mismatch() {
        let traj = Tensor3::new([3, 1, 1], vec![0.0; 3]).unwrap();
        let basis = Tensor3::new([2, 2, 1], vec![0.0; 4]).unwrap();
        assert_eq!(
            ModelData::new(traj, basis).unwrap_err(),
            TensorError::DimensionMismatch {
                trajectories: 3,
                basis: 2
            }
        );
    }

    #[test]
    fn test_model_data_accessors() {
        let traj = Tensor3::new([2, 3, 4], vec![0.0; 24]).unwrap();
        let basis = Tensor3::new([2, 5, 6], vec![0.0; 60]).unwrap();
        let model = ModelData::new(traj, basis).unwrap();
        assert_eq!(model.feature_dim(), 2);
        assert_eq!(model.step_count(), 3);
        assert_eq!(model.trajectory_count(), 4);
        assert_eq!(model.basis_count(), 5);
        assert_eq!(model.time_step_count(), 6);
    }
}
