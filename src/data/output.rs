use crate::error::DedicationError;
use crate::optimization::report::PortfolioReport;
use std::io;

/// Write the holdings as `cusip,face_value,cost` rows.
pub fn write_holdings_csv<W: io::Write>(
    writer: W,
    report: &PortfolioReport,
) -> Result<(), DedicationError> {
    let mut writer = csv::Writer::from_writer(writer);
    for holding in &report.holdings {
        writer.serialize(holding)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the full report as pretty-printed JSON.
pub fn write_report_json<W: io::Write>(
    writer: W,
    report: &PortfolioReport,
) -> Result<(), DedicationError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
