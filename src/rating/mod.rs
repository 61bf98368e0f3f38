pub mod engine;
pub mod timeline;

pub use engine::{apply_result, delta};
pub use timeline::{rating_timeline, RatingPoint};
