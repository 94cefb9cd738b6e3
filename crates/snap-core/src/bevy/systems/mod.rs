//! Systems for snapping.
//!
//! Organized by functionality:
//! - detection: Box-overlap trigger and contact reporting
//! - grid: Grid snapping of settled bodies
//! - zone: Anchor zone discovery, claims and convergence
//! - surface: Face ray sweeps
//! - attach: Snap-and-attach on contact
//! - drag: Pointer rays and dragging
//! - scene_loader: Scene spawning

pub mod attach;
pub mod detection;
pub mod drag;
pub mod grid;
pub mod scene_loader;
pub mod surface;
pub mod zone;

pub use attach::*;
pub use detection::*;
pub use drag::*;
pub use grid::*;
pub use scene_loader::*;
pub use surface::*;
pub use zone::*;
