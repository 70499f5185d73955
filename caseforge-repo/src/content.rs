//! Decoding of host-delivered file content

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use caseforge_core::{CaseforgeError, CaseforgeResult, ErrorContext, FileMatch};

use crate::api::{RemoteFile, SourceHost};

/// Decode a remote file to text.
///
/// The payload must be base64 (line breaks allowed). Bytes that are not
/// valid UTF-8 are replaced with U+FFFD rather than rejected.
pub fn decode_text(file: &RemoteFile) -> CaseforgeResult<String> {
    if file.encoding != "base64" {
        return Err(CaseforgeError::Decode {
            message: format!(
                "Unexpected encoding '{}' for {}",
                file.encoding, file.path
            ),
            source: None,
            context: ErrorContext::new("content")
                .with_operation("decode_text")
                .with_suggestion("Files over 1 MB are not delivered inline by the contents API"),
        });
    }

    let cleaned: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| CaseforgeError::Decode {
            message: format!("Failed to decode base64 content of {}: {}", file.path, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("content").with_operation("decode_text"),
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetch and decode the full text of a located file
pub async fn fetch_text(host: &dyn SourceHost, file_match: &FileMatch) -> CaseforgeResult<String> {
    let file = host
        .get_file(&file_match.repository, &file_match.branch, &file_match.path)
        .await?;
    decode_text(&file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(encoding: &str, content: &str) -> RemoteFile {
        RemoteFile {
            path: "jobs/report.py".to_string(),
            encoding: encoding.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_decodes_wrapped_base64() {
        // GitHub wraps base64 content at 60 columns
        let encoded = BASE64.encode("def report():\n    return 42\n");
        let (head, tail) = encoded.split_at(10);
        let file = remote("base64", &format!("{}\n{}\n", head, tail));

        assert_eq!(decode_text(&file).unwrap(), "def report():\n    return 42\n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let encoded = BASE64.encode([b'%', b'P', b'D', b'F', 0xff, 0xfe, b'!']);
        let text = decode_text(&remote("base64", &encoded)).unwrap();

        assert!(text.starts_with("%PDF"));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_non_base64_encoding_fails() {
        let err = decode_text(&remote("none", "")).unwrap_err();
        assert!(matches!(err, CaseforgeError::Decode { .. }));
    }

    #[test]
    fn test_corrupt_base64_fails() {
        let err = decode_text(&remote("base64", "not*base64")).unwrap_err();
        assert!(matches!(err, CaseforgeError::Decode { .. }));
    }
}
