//! Content interpretation, record assembly and JSON/CSV output for chatdig.

pub mod assemble;
pub mod content;
pub mod error;
pub mod exporter;
pub mod image;
pub mod record;
pub mod timestamp;
pub mod writer;

pub use assemble::assemble;
pub use content::{ContentMeta, ParsedContent, parse_content};
pub use error::ExportError;
pub use exporter::{ExportFormat, ExportSettings, ExportSummary, export_database};
pub use image::{ImageLocator, SidecarImages};
pub use record::{CSV_COLUMNS, ExportRecord};
pub use timestamp::{TimeZoneMode, format_timestamp};
pub use writer::{ExportDocument, csv_safe, write_csv, write_json};
