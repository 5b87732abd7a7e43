pub mod json_export;

use anyhow::Result;

use crate::core::model::DocumentOutline;

pub use json_export::JsonExporter;

pub trait Exporter {
    fn export(&self, document: &DocumentOutline) -> Result<()>;
}
