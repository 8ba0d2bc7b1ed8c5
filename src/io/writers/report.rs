use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::api::BuildReport;
use crate::error::Result;

/// Write the build report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &BuildReport) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!("Build report written to {:?}", path);
    Ok(())
}
