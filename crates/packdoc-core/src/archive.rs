//! ZIP bundling of rendered artifacts.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::documents::Artifact;
use crate::error::ArchiveError;

/// Archive file name for a date stamp.
pub fn archive_name(date_stamp: &str) -> String {
    format!("packing-files-{}.zip", date_stamp)
}

/// Bundle artifacts into an in-memory ZIP, one entry each, in the given order.
pub fn bundle(artifacts: &[Artifact]) -> Result<Vec<u8>, ArchiveError> {
    let mut seen = HashSet::new();
    for artifact in artifacts {
        if !seen.insert(artifact.name.as_str()) {
            return Err(ArchiveError::DuplicateEntry(artifact.name.clone()));
        }
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for artifact in artifacts {
        writer.start_file(artifact.name.as_str(), options)?;
        writer.write_all(&artifact.bytes)?;
        debug!("Added {} ({} bytes) to archive", artifact.name, artifact.bytes.len());
    }

    Ok(writer.finish()?.into_inner())
}
