use crate::data::business::Business;
use crate::data::selection::SelectionSet;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Fixed header row of every lead export
pub const CSV_HEADERS: [&str; 6] = ["Name", "Phone", "Email", "Address", "Rating", "Reviews"];

/// Give up looking for a free filename after this many collisions
const MAX_FILENAME_ATTEMPTS: usize = 1000;

/// Summary of a finished export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub row_count: usize,
}

impl ExportSummary {
    pub fn describe(&self) -> String {
        format!(
            "Exported {} lead{} to {}",
            self.row_count,
            if self.row_count == 1 { "" } else { "s" },
            self.path.display()
        )
    }
}

/// Handles exporting leads to CSV
pub struct DataExporter;

impl DataExporter {
    /// Serialise businesses as CSV text: header plus one row each, in the
    /// order given. Records are `\n` separated without a trailing newline.
    pub fn leads_to_csv<'a, I>(businesses: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a Business>,
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADERS)?;
        for business in businesses {
            writer.write_record(Self::csv_row(business))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV output: {}", e))?;
        let mut text = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }

    /// CSV text for the selected rows, in original row order
    pub fn selected_to_csv(businesses: &[Business], selection: &SelectionSet) -> Result<String> {
        if selection.is_empty() {
            return Err(anyhow!("No rows selected"));
        }

        let rows = selection
            .indices()
            .into_iter()
            .filter_map(|idx| businesses.get(idx));
        Self::leads_to_csv(rows)
    }

    /// Write CSV text into `dir` under a fresh timestamped filename.
    ///
    /// Existing files are never overwritten: a numeric suffix is added
    /// until the name is free.
    pub fn write_export(dir: &Path, csv_text: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create export directory {}", dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let (mut file, path) = Self::create_unique(dir, &format!("leads_{}", timestamp))?;

        file.write_all(csv_text.as_bytes())?;
        file.flush()?;

        tracing::info!(target: "export", "Wrote {} bytes to {}", csv_text.len(), path.display());
        Ok(path)
    }

    /// Export the selected rows into `dir`
    pub fn export_selected(
        businesses: &[Business],
        selection: &SelectionSet,
        dir: &Path,
    ) -> Result<ExportSummary> {
        let csv_text = Self::selected_to_csv(businesses, selection)?;
        let path = Self::write_export(dir, &csv_text)?;
        Ok(ExportSummary {
            path,
            row_count: selection.count(),
        })
    }

    /// Export every row into `dir`
    pub fn export_all(businesses: &[Business], dir: &Path) -> Result<ExportSummary> {
        if businesses.is_empty() {
            return Err(anyhow!("No data to export"));
        }
        let csv_text = Self::leads_to_csv(businesses)?;
        let path = Self::write_export(dir, &csv_text)?;
        Ok(ExportSummary {
            path,
            row_count: businesses.len(),
        })
    }

    /// Tab separated contact line for clipboard operations
    pub fn format_row_for_clipboard(business: &Business) -> String {
        [
            business.name.as_str(),
            business.phone.as_deref().unwrap_or(""),
            business.email.as_deref().unwrap_or(""),
            business.address.as_deref().unwrap_or(""),
        ]
        .join("\t")
    }

    fn csv_row(business: &Business) -> [String; 6] {
        [
            business.name.clone(),
            business.phone.clone().unwrap_or_default(),
            business.email.clone().unwrap_or_default(),
            business.address.clone().unwrap_or_default(),
            business.rating.map(|r| r.to_string()).unwrap_or_default(),
            business
                .reviews_count
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ]
    }

    fn create_unique(dir: &Path, stem: &str) -> Result<(File, PathBuf)> {
        for attempt in 0..MAX_FILENAME_ATTEMPTS {
            let filename = if attempt == 0 {
                format!("{}.csv", stem)
            } else {
                format!("{}_{}.csv", stem, attempt)
            };
            let path = dir.join(filename);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Could not create {}", path.display()))
                }
            }
        }
        Err(anyhow!("Could not find a free export filename in {}", dir.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn business(name: &str) -> Business {
        Business::new(name)
    }

    #[test]
    fn test_missing_fields_are_empty_not_null() {
        let mut b = business("B");
        b.email = Some("b@x.com".to_string());

        let csv = DataExporter::leads_to_csv([&b]).unwrap();
        assert_eq!(csv, "Name,Phone,Email,Address,Rating,Reviews\nB,,b@x.com,,,");
    }

    #[test]
    fn test_numeric_fields_use_decimal_form() {
        let mut b = business("Acme");
        b.rating = Some(4.5);
        b.reviews_count = Some(120);
        let mut c = business("Beta");
        c.rating = Some(4.0);

        let csv = DataExporter::leads_to_csv([&b, &c]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "Acme,,,,4.5,120");
        assert_eq!(lines[2], "Beta,,,,4,");
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let mut b = business("Joe's \"Best\" Pizza");
        b.address = Some("1 Main St, Toronto".to_string());

        let csv = DataExporter::leads_to_csv([&b]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "\"Joe's \"\"Best\"\" Pizza\",,,\"1 Main St, Toronto\",,");
    }

    #[test]
    fn test_selected_rows_follow_original_order() {
        let rows = vec![business("A"), business("B"), business("C")];
        let mut selection = SelectionSet::new(rows.len());
        selection.toggle(2);
        selection.toggle(0);

        let csv = DataExporter::selected_to_csv(&rows, &selection).unwrap();
        assert_eq!(csv, "Name,Phone,Email,Address,Rating,Reviews\nA,,,,,\nC,,,,,");
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let rows = vec![business("A")];
        let selection = SelectionSet::new(rows.len());
        let err = DataExporter::selected_to_csv(&rows, &selection).unwrap_err();
        assert_eq!(err.to_string(), "No rows selected");
    }

    #[test]
    fn test_repeated_exports_get_distinct_files() {
        let dir = tempdir().unwrap();
        let first = DataExporter::write_export(dir.path(), "a").unwrap();
        let second = DataExporter::write_export(dir.path(), "b").unwrap();
        let third = DataExporter::write_export(dir.path(), "c").unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(&third).unwrap(), "c");
    }

    #[test]
    fn test_export_all_writes_every_row() {
        let dir = tempdir().unwrap();
        let rows = vec![business("A"), business("B")];
        let summary = DataExporter::export_all(&rows, dir.path()).unwrap();

        assert_eq!(summary.row_count, 2);
        let text = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(summary.describe().contains("Exported 2 leads"));
    }

    #[test]
    fn test_clipboard_row_format() {
        let mut b = business("Acme");
        b.phone = Some("555-1".to_string());
        assert_eq!(DataExporter::format_row_for_clipboard(&b), "Acme\t555-1\t\t");
    }
}
