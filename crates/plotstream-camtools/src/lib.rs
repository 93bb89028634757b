//! # Plotstream CAM Tools
//!
//! Toolpath processing applied to a program before it is streamed.
//!
//! - **Arc Expander**: replaces G2/G3 arcs with G1 moves whose arc length is
//!   bounded by a configurable segment length

pub mod arc_expander;
pub mod error;

pub use arc_expander::{
    ArcExpander, ArcExpanderConfig, ArcPlan, ArcSegments, ArcZHandling, MAX_ARC_SEGMENTS,
};
pub use error::{ArcError, ArcResult};
