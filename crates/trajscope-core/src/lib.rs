//! trajscope Core Engine
//!
//! Projects high-dimensional trajectories onto time-varying basis vectors
//! (typically singular vectors) and prepares the result for 3D line plots.
//!
//! # Example
//!
//! ```rust
//! use trajscope_core::{BasisSelector, Figure, ModelData, ProjectionRequest, Projector, Tensor3};
//!
//! // One trajectory of three 2-dimensional steps
//! let trajectories = Tensor3::new([2, 3, 1], vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
//! // Identity basis at a single time step
//! let basis = Tensor3::new([2, 2, 1], vec![1.0, 0.0, 0.0, 1.0]).unwrap();
//! let model = ModelData::new(trajectories, basis).unwrap();
//!
//! let bases = BasisSelector::new(model.basis_count()).resolve("1,2").unwrap();
//! let projected = Projector::new(&model)
//!     .project(&ProjectionRequest::new(0, bases))
//!     .unwrap();
//! assert_eq!(projected, vec![vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]]);
//!
//! let figure = Figure::from_projection(&projected);
//! assert_eq!(figure.data.len(), 1);
//! ```

pub mod figure;
pub mod projector;
pub mod selector;
pub mod tensor;

// Re-export main types at crate root
pub use figure::{axis_label, gradient_color, Figure, Layout, Rgb, Trace};
pub use projector::{
    ProjectedPoint, ProjectedTrajectory, ProjectionError, ProjectionRequest, Projector,
    MAX_TRAJECTORIES,
};
pub use selector::{BasisSelector, BasisToken, SelectorError};
pub use tensor::{ModelData, Tensor3, TensorError};
