//! K-Means++ seeding and Lloyd refinement over small in-memory point sets.
//!
//! ```no_run
//! use kmeans::{fit, Dataset, KmeansParams, KmeansPlusPlus};
//!
//! let data = Dataset::new(vec![
//!     (1, vec![0.0, 0.0]),
//!     (2, vec![0.0, 1.0]),
//!     (3, vec![10.0, 10.0]),
//!     (4, vec![10.0, 11.0]),
//! ])?;
//! let params = KmeansParams::new(2, 300, 0.001)?.with_seed(1234);
//! let report = fit(&data, &mut KmeansPlusPlus::new(params))?;
//! println!("{:?} {:?}", report.seeds, report.centroids);
//! # Ok::<(), kmeans::KmeansError>(())
//! ```

pub mod dataset;
pub mod error;
pub mod lloyd;
pub mod metrics;
pub mod params;
pub mod types;
mod euclidean_centers;
mod init_plusplus;

pub use dataset::Dataset;
pub use error::{KmeansError, Result};
pub use init_plusplus::set_centroid_by_data;
pub use lloyd::{assign_points, fit, KmeansPlusPlus, Round};
pub use params::{EmptyClusterPolicy, KmeansParams, SeedingFallback, DEFAULT_ITERATION, DEFAULT_SEED};
pub use types::{Assignment, Centroid, EuclideanDistance, FitReport};
