//! Flair Core
//!
//! Foundational types shared by the Flair animation and effects crates:
//!
//! - **Geometry**: points, sizes, and rectangles in logical pixels
//! - **Color**: RGBA colors, hex parsing, and gradient descriptions
//! - **Path**: vector paths for decorative strokes and outlines
//! - **Observable**: a value with explicit, drop-to-unsubscribe subscriptions

pub mod color;
pub mod geometry;
pub mod observable;
pub mod path;

pub use color::{Color, Gradient, GradientStop, GradientStops, ParseColorError};
pub use geometry::{Point, Rect, Size, Vec2};
pub use observable::{Observable, ObservableReader, Subscription};
pub use path::{Path, PathCommand};
