pub mod core;
pub mod export;
pub mod heading;
pub mod layout;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod table;
pub mod text;

pub use core::config::OutlineConfig;
pub use core::error::DocOutlineError;
pub use core::model::{DocumentOutline, HeadingLevel, HeadingRecord};
pub use pipeline::OutlineEngine;
