//! # Hotfire Core
//!
//! Numerical building blocks for post-processing a hot-fire test:
//! - Commanded throttle profile and tolerance band
//! - Gaussian smoothing with reflected edges
//! - Composite Simpson / trapezoid integration on non-uniform grids
//! - Clamped cubic splines and numerical differentiation
//!
//! Nothing in here touches the filesystem; loading and plotting live in
//! `hotfire-analysis` and `hotfire-plot`.

pub mod error;
pub mod integrate;
pub mod profile;
pub mod smoothing;
pub mod spline;
pub mod tridiag;

// Re-export core types
pub use error::{CoreError, CoreResult};
pub use integrate::{simpson, trapezoid};
pub use profile::{Phase, PhaseSchedule, ProfileSummary, ThrottleProfile, ThrustTrace};
pub use smoothing::{gaussian_filter, gaussian_kernel};
pub use spline::CubicSpline;

/// Standard gravity used throughout the test-stand reduction (m/s²).
pub const G0: f64 = 9.81;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
