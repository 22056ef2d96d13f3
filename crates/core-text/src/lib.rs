//! Box-chunked text storage and byte-oriented layout.
//!
//! Content is an 8-bit byte stream held in a [`BoxStore`]. Layout walks it
//! with a [`Dot`] under a fixed wrap width, treating newline and tab
//! specially, and [`Mapper`] answers offset/point queries on top of both.

pub mod boxes;
pub mod dot;
pub mod error;
pub mod mapper;
pub mod metrics;

pub use boxes::{BoxStore, DEFAULT_BOX_CAPACITY, DEFAULT_BOX_SLOTS, TextBox};
pub use dot::Dot;
pub use error::BoxError;
pub use mapper::{Layout, Mapper, PointCache};
pub use metrics::{FixedMetrics, GlyphMetrics, Measure, TAB_SPACES, glyph_advance, measure_with};
