//! CSV output. The file is written in one shot after scraping, header
//! first; an empty run leaves a header-only file behind.

use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::error::Result;
use crate::extract::ProfileRecord;

pub const CSV_HEADER: [&str; 4] = ["name", "about", "location", "profile_url"];

/// Writes all records to `path`, replacing whatever was there.
pub fn write_profiles(path: &Path, records: &[ProfileRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(target = "scout", rows = records.len(), path = %path.display(), "profiles written");
    Ok(())
}
