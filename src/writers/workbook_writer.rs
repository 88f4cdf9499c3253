use crate::error::{ProcessingError, Result};
use crate::models::{CleanedRecord, CLEANED_COLUMNS};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Writes cleaned records to one workbook, one sheet per year.
pub struct WorkbookWriter {
    date_format: Format,
    header_format: Format,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            date_format: Format::new().set_num_format("yyyy-mm-dd"),
            header_format: Format::new().set_bold(),
        }
    }

    /// Group by year (ascending) and write each group to a sheet named after the year.
    ///
    /// Returns the sheet names written. No records means no sheets, and no file.
    pub fn write_workbook(&self, records: &[CleanedRecord], destination: &Path) -> Result<Vec<String>> {
        let mut by_year: BTreeMap<i32, Vec<&CleanedRecord>> = BTreeMap::new();
        for record in records {
            by_year.entry(record.year).or_default().push(record);
        }

        if by_year.is_empty() {
            info!("No records to export; workbook not written");
            return Ok(Vec::new());
        }

        let mut workbook = Workbook::new();
        let mut sheets = Vec::with_capacity(by_year.len());

        for (year, group) in &by_year {
            let name = year.to_string();
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&name)?;
            self.write_sheet(worksheet, group)?;
            sheets.push(name);
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProcessingError::Export {
                path: destination.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        workbook
            .save(destination)
            .map_err(|e| ProcessingError::Export {
                path: destination.to_path_buf(),
                message: e.to_string(),
            })?;

        info!(
            "Exported {} records to {} ({} sheets)",
            records.len(),
            destination.display(),
            sheets.len()
        );
        Ok(sheets)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet, records: &[&CleanedRecord]) -> Result<()> {
        for (col, header) in CLEANED_COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &self.header_format)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 0, &record.station_name)?;
            worksheet.write_string(row, 1, &record.province)?;
            worksheet.write_number(row, 2, record.station_id)?;
            worksheet.write_string(row, 3, &record.climate_id)?;
            worksheet.write_number(row, 4, record.longitude)?;
            worksheet.write_number(row, 5, record.latitude)?;
            worksheet.write_date_with_format(row, 6, &record.date, &self.date_format)?;
            worksheet.write_number(row, 7, record.year)?;
            worksheet.write_number(row, 8, record.month)?;
            if let Some(wmo_id) = &record.wmo_id {
                worksheet.write_string(row, 9, wmo_id)?;
            }
            if let Some(tc_id) = &record.tc_id {
                worksheet.write_string(row, 10, tc_id)?;
            }
            worksheet.write_number(row, 11, record.max_temp)?;
            worksheet.write_number(row, 12, record.min_temp)?;
            if let Some(mean) = record.mean_temp {
                worksheet.write_number(row, 13, mean)?;
            }
        }

        Ok(())
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}
