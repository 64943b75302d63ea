//! Photo ingestion: EXIF metadata, image derivatives and the upload pipeline.

pub mod imaging;
pub mod metadata;
pub mod pipeline;

pub use pipeline::{ClientMetadata, UploadFile, ingest};
