#![cfg(feature = "web")]

use crate::error::{DashboardError, Result};
use axum::body::Bytes;
use axum::extract::Multipart;

/// Extension accepted for uploads, compared case-insensitively
pub const SPREADSHEET_EXTENSION: &str = "xlsx";

/// A workbook received from the form; lives for one request only
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Whether `filename` names an `.xlsx` workbook
pub fn has_spreadsheet_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SPREADSHEET_EXTENSION))
}

/// Pull the workbook out of the multipart body
///
/// Fields other than `field_name` are drained and ignored. A missing field, an
/// empty upload or a filename without the `.xlsx` extension all produce
/// `DashboardError::MissingFile`, as does a body that stops being valid
/// multipart partway through.
pub async fn extract_upload(multipart: &mut Multipart, field_name: &str) -> Result<UploadedFile> {
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                log::debug!("malformed multipart body: {}", e);
                return Err(DashboardError::MissingFile);
            }
        };

        if field.name() != Some(field_name) || upload.is_some() {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            log::debug!("failed reading upload field '{}': {}", field_name, e);
            DashboardError::MissingFile
        })?;
        upload = Some(UploadedFile { filename, bytes });
    }

    let upload = upload.ok_or(DashboardError::MissingFile)?;
    if upload.bytes.is_empty() || !has_spreadsheet_extension(&upload.filename) {
        log::debug!("rejected upload '{}' ({} bytes)", upload.filename, upload.bytes.len());
        return Err(DashboardError::MissingFile);
    }

    log::info!("received '{}' ({} bytes)", upload.filename, upload.bytes.len());
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check() {
        assert!(has_spreadsheet_extension("payroll.xlsx"));
        assert!(has_spreadsheet_extension("PAYROLL.XLSX"));
        assert!(!has_spreadsheet_extension("payroll.xls"));
        assert!(!has_spreadsheet_extension("payroll.csv"));
        assert!(!has_spreadsheet_extension("xlsx"));
        assert!(!has_spreadsheet_extension(""));
    }
}
