//! Evidence upload policy. Checks run in a fixed order and the first
//! failure wins; content type comes from the bytes, never the client.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::utils::formatting::format_file_size;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Cursor;

pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv", "jpg", "jpeg", "png", "gif",
    "webp", "svg", "zip", "rar",
];

pub const DANGEROUS_EXTENSIONS: &[&str] = &[
    "php", "phtml", "php3", "php4", "php5", "phps", "pht", "exe", "com", "bat", "cmd", "sh",
    "bash", "ps1", "js", "vbs", "jar", "app", "dmg", "msi", "sql", "sqlite", "db",
];

const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MIME_PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    MIME_DOCX,
    "application/vnd.ms-excel",
    MIME_XLSX,
    "application/vnd.ms-powerpoint",
    MIME_PPTX,
    "text/plain",
    "text/csv",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
];

/// Case-insensitive markers of script or server-side code.
const EXECUTABLE_SIGNATURES: &[&str] = &[
    "<?php",
    "<?=",
    "<%",
    "<script",
    "eval(",
    "exec(",
    "system(",
    "passthru(",
    "shell_exec(",
    "base64_decode(",
];

const SCAN_WINDOW: usize = 1024;

/// An upload that passed every check.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedUpload {
    pub original_name: String,
    pub extension: String,
    pub mime_type: String,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_size: u64,
}

impl UploadPolicy {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.max_upload_size)
    }

    pub fn validate(&self, field: &str, file_name: &str, bytes: &[u8]) -> AppResult<ValidatedUpload> {
        let reject = |reason: String| {
            log::warn!("upload rejected: field={field} file={file_name:?} reason={reason}");
            AppError::UploadRejected(reason)
        };

        if file_name.trim().is_empty() || bytes.is_empty() {
            return Err(reject("Invalid file upload: empty file".into()));
        }

        let size = bytes.len() as u64;
        if size > self.max_size {
            return Err(reject(format!(
                "File size exceeds maximum allowed size of {}",
                format_file_size(self.max_size)
            )));
        }

        let extension = extension_of(file_name);
        if DANGEROUS_EXTENSIONS.contains(&extension.as_str()) {
            return Err(reject("File type not allowed for security reasons.".into()));
        }
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(reject(format!(
                "File extension .{extension} is not allowed. Allowed types: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let mime = sniff_mime(bytes);
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(reject(format!("File type {mime} is not allowed.")));
        }

        if has_double_extension(file_name) {
            return Err(reject(
                "Files with double extensions are not allowed for security reasons.".into(),
            ));
        }

        if !mime_matches_extension(mime, &extension) {
            return Err(reject("File content does not match its extension.".into()));
        }

        if contains_executable_content(bytes) {
            return Err(reject("File contains potentially dangerous content.".into()));
        }

        log::info!("upload accepted: field={field} file={file_name:?} size={size} mime={mime}");

        Ok(ValidatedUpload {
            original_name: file_name.to_string(),
            extension,
            mime_type: mime.to_string(),
            size,
            sha256: hex::encode(Sha256::digest(bytes)),
        })
    }
}

/// Lower-cased text after the last dot; empty without one.
pub fn extension_of(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// `report.php.pdf`: a dangerous extension anywhere before the last one.
pub fn has_double_extension(file_name: &str) -> bool {
    let parts: Vec<&str> = file_name.split('.').collect();
    if parts.len() < 3 {
        return false;
    }
    parts[..parts.len() - 1]
        .iter()
        .any(|p| DANGEROUS_EXTENSIONS.contains(&p.to_ascii_lowercase().as_str()))
}

pub fn mime_matches_extension(mime: &str, extension: &str) -> bool {
    let allowed: &[&str] = match extension {
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => &[MIME_DOCX],
        "xls" => &["application/vnd.ms-excel"],
        "xlsx" => &[MIME_XLSX],
        "ppt" => &["application/vnd.ms-powerpoint"],
        "pptx" => &[MIME_PPTX],
        "txt" => &["text/plain"],
        "csv" => &["text/csv", "text/plain", "application/csv"],
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "svg" => &["image/svg+xml"],
        "zip" => &["application/zip", "application/x-zip-compressed"],
        "rar" => &["application/x-rar-compressed"],
        _ => &[],
    };
    allowed.contains(&mime)
}

fn contains_executable_content(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SCAN_WINDOW)];
    let head = String::from_utf8_lossy(window).to_ascii_lowercase();
    EXECUTABLE_SIGNATURES.iter().any(|sig| head.contains(sig))
}

/// Content type from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const OLE2: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

    if bytes.starts_with(b"%PDF-") {
        "application/pdf"
    } else if bytes.starts_with(PNG) {
        "image/png"
    } else if bytes.starts_with(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"Rar!\x1A\x07") {
        "application/x-rar-compressed"
    } else if bytes.starts_with(OLE2) {
        sniff_ole2(bytes)
    } else if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06") {
        sniff_zip(bytes)
    } else {
        sniff_text(bytes)
    }
}

/// Compound documents are told apart by their main stream name (UTF-16LE).
fn sniff_ole2(bytes: &[u8]) -> &'static str {
    let has_stream = |name: &str| {
        let needle: Vec<u8> = name.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        bytes.windows(needle.len()).any(|w| w == needle.as_slice())
    };

    if has_stream("WordDocument") {
        "application/msword"
    } else if has_stream("Workbook") || has_stream("Book") {
        "application/vnd.ms-excel"
    } else if has_stream("PowerPoint Document") {
        "application/vnd.ms-powerpoint"
    } else {
        "application/CDFV2"
    }
}

/// OOXML packages are zips with a well-known top-level folder.
fn sniff_zip(bytes: &[u8]) -> &'static str {
    let Ok(archive) = zip::ZipArchive::new(Cursor::new(bytes)) else {
        return "application/zip";
    };

    let mut kind = "application/zip";
    for name in archive.file_names() {
        if name.starts_with("word/") {
            kind = MIME_DOCX;
        } else if name.starts_with("xl/") {
            kind = MIME_XLSX;
        } else if name.starts_with("ppt/") {
            kind = MIME_PPTX;
        } else {
            continue;
        }
        break;
    }
    kind
}

fn sniff_text(bytes: &[u8]) -> &'static str {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return "application/octet-stream";
    };
    if text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0C'))
    {
        return "application/octet-stream";
    }

    let head: String = text
        .trim_start_matches('\u{feff}')
        .chars()
        .take(SCAN_WINDOW)
        .collect::<String>()
        .to_ascii_lowercase();
    if head.contains("<svg") {
        return "image/svg+xml";
    }

    if looks_like_csv(text) {
        "text/csv"
    } else {
        "text/plain"
    }
}

/// At least two lines sharing the same non-zero comma count.
fn looks_like_csv(text: &str) -> bool {
    let counts: Vec<usize> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .map(|l| l.matches(',').count())
        .collect();
    counts.len() >= 2 && counts[0] > 0 && counts.iter().all(|c| *c == counts[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

    fn policy() -> UploadPolicy {
        UploadPolicy::new(10 * 1024 * 1024)
    }

    fn reason(name: &str, bytes: &[u8]) -> String {
        policy().validate("evidence", name, bytes).unwrap_err().to_string()
    }

    #[test]
    fn accepts_a_real_pdf() {
        let ok = policy().validate("evidence", "Laporan Q1.PDF", PDF).unwrap();
        assert_eq!(ok.extension, "pdf");
        assert_eq!(ok.mime_type, "application/pdf");
        assert_eq!(ok.sha256.len(), 64);
    }

    #[test]
    fn size_limit_names_the_limit() {
        let small = UploadPolicy::new(10);
        let err = small.validate("evidence", "a.pdf", PDF).unwrap_err().to_string();
        assert_eq!(err, "File size exceeds maximum allowed size of 10.00 B");
        assert!(reason("a.pdf", &vec![b'a'; 11 * 1024 * 1024]).contains("10.00 MB"));
    }

    #[test]
    fn checks_run_in_order() {
        assert_eq!(reason("shell.php", b"<?php echo 1;"), "File type not allowed for security reasons.");
        assert!(reason("movie.mp4", b"....").starts_with("File extension .mp4 is not allowed."));
        assert_eq!(
            reason("blob.pdf", b"\x00\x01\x02binary"),
            "File type application/octet-stream is not allowed."
        );
        assert_eq!(
            reason("invoice.php.pdf", PDF),
            "Files with double extensions are not allowed for security reasons."
        );
        assert_eq!(reason("photo.png", PDF), "File content does not match its extension.");
        assert_eq!(
            reason("notes.txt", b"hello <?php system('id'); ?>"),
            "File contains potentially dangerous content."
        );
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n...."), "image/png");
        assert_eq!(sniff_mime(b"\xFF\xD8\xFF\xE0JFIF"), "image/jpeg");
        assert_eq!(sniff_mime(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime(b"Rar!\x1A\x07\x00"), "application/x-rar-compressed");
        assert_eq!(sniff_mime(b"<?xml version=\"1.0\"?><svg></svg>"), "image/svg+xml");
        assert_eq!(sniff_mime(b"kode,nama\nA,B\nC,D\n"), "text/csv");
        assert_eq!(sniff_mime(b"catatan lapangan"), "text/plain");
    }

    #[test]
    fn svg_with_script_is_rejected() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert(1)</script></svg>";
        assert_eq!(reason("chart.svg", svg), "File contains potentially dangerous content.");
    }

    #[test]
    fn double_extension_only_counts_dangerous_parts() {
        assert!(has_double_extension("a.exe.jpg"));
        assert!(!has_double_extension("laporan.final.pdf"));
        assert!(!has_double_extension("a.pdf"));
    }
}
