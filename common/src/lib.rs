pub mod types;

pub use types::{SlideContent, SlideRecord};
