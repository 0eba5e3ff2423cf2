//! Text decoding and encoding with byte-order-mark awareness.
//!
//! Files are sniffed for a UTF-8 or UTF-16 BOM with `encoding_rs`. Files
//! without a BOM must be valid UTF-8 to count as text. Re-encoding keeps the
//! source encoding; whether the BOM is written back is the caller's choice.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::TransformError;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Decoded file content plus what is needed to write it back faithfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub content: String,
    pub encoding: TextEncoding,
    pub had_bom: bool,
}

impl TextDocument {
    /// Encode `content` in this document's encoding, with or without a BOM.
    pub fn encode(&self, content: &str, with_bom: bool) -> Vec<u8> {
        encode(content, self.encoding, with_bom)
    }
}

/// Decode raw bytes. Returns `None` when the bytes are not text we understand.
pub fn decode(bytes: &[u8]) -> Option<TextDocument> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let body = &bytes[bom_len..];
        let content = encoding
            .decode_without_bom_handling_and_without_replacement(body)?
            .into_owned();
        let encoding = if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            debug_assert!(encoding == UTF_8);
            TextEncoding::Utf8
        };
        return Some(TextDocument {
            content,
            encoding,
            had_bom: true,
        });
    }

    let content = std::str::from_utf8(bytes).ok()?.to_string();
    Some(TextDocument {
        content,
        encoding: TextEncoding::Utf8,
        had_bom: false,
    })
}

pub fn encode(content: &str, encoding: TextEncoding, with_bom: bool) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => {
            let mut out = Vec::with_capacity(content.len() + 3);
            if with_bom {
                out.extend_from_slice(&UTF8_BOM);
            }
            out.extend_from_slice(content.as_bytes());
            out
        }
        TextEncoding::Utf16Le => {
            let mut out = Vec::with_capacity(content.len() * 2 + 2);
            if with_bom {
                out.extend_from_slice(&[0xFF, 0xFE]);
            }
            for unit in content.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
        TextEncoding::Utf16Be => {
            let mut out = Vec::with_capacity(content.len() * 2 + 2);
            if with_bom {
                out.extend_from_slice(&[0xFE, 0xFF]);
            }
            for unit in content.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            out
        }
    }
}

/// Read and decode a file. `Ok(None)` means the file exists but is not text.
pub fn read_document(path: &Path) -> Result<Option<TextDocument>, TransformError> {
    let bytes = std::fs::read(path).map_err(|e| TransformError::io(path, e))?;
    Ok(decode(&bytes))
}

/// Read a file that must be text.
pub fn read_required(path: &Path) -> Result<TextDocument, TransformError> {
    read_document(path)?.ok_or_else(|| TransformError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

/// Collapse `\r\n` to `\n`, then expand `\n` to `newline`.
pub fn normalize_newlines(value: &str, newline: &str) -> String {
    let unix = value.replace("\r\n", "\n");
    if newline == "\n" {
        unix
    } else {
        unix.replace('\n', newline)
    }
}
