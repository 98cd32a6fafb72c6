use crate::data::business::Business;
use crate::data::data_exporter::DataExporter;
use anyhow::Result;
use arboard::Clipboard;

/// Manages clipboard operations for lead contact data
pub struct YankManager;

/// Result of a yank operation
pub struct YankResult {
    pub description: String,
    pub preview: String,
    pub full_value: String,
}

impl YankManager {
    /// Text placed on the clipboard for one row, with a short preview
    pub fn prepare_row(business: &Business) -> YankResult {
        let value = DataExporter::format_row_for_clipboard(business);
        let preview = if value.chars().count() > 40 {
            let truncated: String = value.chars().take(37).collect();
            format!("{}...", truncated)
        } else {
            value.clone()
        };

        YankResult {
            description: business.name.clone(),
            preview: preview.replace('\t', " | "),
            full_value: value,
        }
    }

    /// Yank a lead's contact line (name, phone, email, address) to the clipboard
    pub fn yank_row(business: &Business) -> Result<YankResult> {
        let result = Self::prepare_row(business);

        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(&result.full_value)?;
        tracing::debug!(target: "ui", "Yanked contact for {}", result.description);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_row_preview() {
        let mut business = Business::new("Acme Plumbing");
        business.phone = Some("555-1".to_string());

        let result = YankManager::prepare_row(&business);
        assert_eq!(result.description, "Acme Plumbing");
        assert_eq!(result.full_value, "Acme Plumbing\t555-1\t\t");
        assert_eq!(result.preview, "Acme Plumbing | 555-1 |  | ");
    }

    #[test]
    fn test_prepare_row_truncates_long_preview() {
        let mut business = Business::new("A Very Long Business Name Incorporated");
        business.address = Some("1234 Somewhere Avenue, Toronto".to_string());

        let result = YankManager::prepare_row(&business);
        assert!(result.preview.ends_with("..."));
        assert!(result.full_value.ends_with("Toronto"));
    }
}
