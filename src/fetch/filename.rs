//! File name, extension and MIME derivation for fetched bodies
//!
//! Name: Content-Disposition, else a random numeric id.
//! Extension: sniffed from the body, else the Content-Type subtype, else none.

use rand::Rng;
use std::path::Path;

/// Number of digits in generated file names
pub const RANDOM_ID_DIGITS: usize = 6;

/// A file type recognized from leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub extension: &'static str,
    pub mime: &'static str,
}

struct Signature {
    /// Every `(offset, bytes)` part must match
    parts: &'static [(usize, &'static [u8])],
    extension: &'static str,
    mime: &'static str,
}

const SIGNATURES: &[Signature] = &[
    Signature { parts: &[(0, b"\xFF\xD8\xFF")], extension: "jpg", mime: "image/jpeg" },
    Signature { parts: &[(0, b"\x89PNG\r\n\x1A\n")], extension: "png", mime: "image/png" },
    Signature { parts: &[(0, b"GIF87a")], extension: "gif", mime: "image/gif" },
    Signature { parts: &[(0, b"GIF89a")], extension: "gif", mime: "image/gif" },
    Signature { parts: &[(0, b"RIFF"), (8, b"WEBP")], extension: "webp", mime: "image/webp" },
    Signature { parts: &[(0, b"II*\x00")], extension: "tif", mime: "image/tiff" },
    Signature { parts: &[(0, b"MM\x00*")], extension: "tif", mime: "image/tiff" },
    Signature { parts: &[(0, b"\x00\x00\x01\x00")], extension: "ico", mime: "image/x-icon" },
    Signature { parts: &[(0, b"BM")], extension: "bmp", mime: "image/bmp" },
    Signature { parts: &[(0, b"%PDF")], extension: "pdf", mime: "application/pdf" },
    Signature { parts: &[(0, b"PK\x03\x04")], extension: "zip", mime: "application/zip" },
    Signature { parts: &[(0, b"\x1F\x8B\x08")], extension: "gz", mime: "application/gzip" },
    Signature { parts: &[(0, b"7z\xBC\xAF\x27\x1C")], extension: "7z", mime: "application/x-7z-compressed" },
    Signature { parts: &[(0, b"Rar!\x1A\x07")], extension: "rar", mime: "application/vnd.rar" },
    Signature { parts: &[(0, b"ID3")], extension: "mp3", mime: "audio/mpeg" },
    Signature { parts: &[(0, b"fLaC")], extension: "flac", mime: "audio/x-flac" },
    Signature { parts: &[(0, b"OggS")], extension: "ogg", mime: "audio/ogg" },
    Signature { parts: &[(0, b"RIFF"), (8, b"WAVE")], extension: "wav", mime: "audio/x-wav" },
    Signature { parts: &[(0, b"RIFF"), (8, b"AVI ")], extension: "avi", mime: "video/x-msvideo" },
    Signature { parts: &[(4, b"ftyp")], extension: "mp4", mime: "video/mp4" },
    Signature { parts: &[(0, b"\x1A\x45\xDF\xA3")], extension: "webm", mime: "video/webm" },
    Signature { parts: &[(0, b"wOFF")], extension: "woff", mime: "font/woff" },
    Signature { parts: &[(0, b"wOF2")], extension: "woff2", mime: "font/woff2" },
];

/// Recognizes a file type from its magic bytes
pub fn sniff(content: &[u8]) -> Option<Sniffed> {
    SIGNATURES
        .iter()
        .find(|sig| {
            sig.parts.iter().all(|(offset, magic)| {
                content
                    .get(*offset..*offset + magic.len())
                    .is_some_and(|window| window == *magic)
            })
        })
        .map(|sig| Sniffed {
            extension: sig.extension,
            mime: sig.mime,
        })
}

/// MIME essence of a Content-Type header (`text/html; charset=utf-8` -> `text/html`)
pub fn content_type_essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_lowercase();
    essence.contains('/').then_some(essence)
}

/// Extension derived from a Content-Type subtype
///
/// Parameters and structured-syntax suffixes are dropped, so
/// `image/svg+xml; charset=utf-8` gives `svg`. Opaque binary types give nothing.
pub fn extension_from_content_type(content_type: &str) -> Option<String> {
    let essence = content_type_essence(content_type)?;
    let subtype = essence.split('/').nth(1)?;
    let subtype = subtype.split('+').next().unwrap_or(subtype).trim();

    if subtype.is_empty() || subtype == "octet-stream" || subtype == "*" {
        return None;
    }
    Some(subtype.to_string())
}

/// Resolves the extension by priority: sniffed, then Content-Type, then none
pub fn resolve_extension(content: &[u8], content_type: Option<&str>) -> Option<String> {
    let candidates = [
        sniff(content).map(|s| s.extension.to_string()),
        content_type.and_then(extension_from_content_type),
    ];
    candidates.into_iter().flatten().next()
}

/// Resolves the MIME type: sniffed, then the Content-Type essence, then empty
pub fn resolve_mime(content: &[u8], content_type: Option<&str>) -> String {
    sniff(content)
        .map(|s| s.mime.to_string())
        .or_else(|| content_type.and_then(content_type_essence))
        .unwrap_or_default()
}

/// Builds the on-disk name for a fetched body
///
/// The resolved extension is appended only when the base name has none.
pub fn resolve_filename(
    content_disposition: Option<&str>,
    content: &[u8],
    content_type: Option<&str>,
) -> String {
    let base = content_disposition
        .and_then(parse_content_disposition)
        .and_then(|name| sanitize_filename(&name))
        .unwrap_or_else(|| random_id(RANDOM_ID_DIGITS));

    match resolve_extension(content, content_type) {
        Some(ext) if Path::new(&base).extension().is_none() => format!("{}.{}", base, ext),
        _ => base,
    }
}

/// Parses the file name out of a Content-Disposition header
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example%20file.pdf` (RFC 5987, preferred)
pub fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                let decoded = decoded.trim_matches('"').to_string();
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + 9..].trim();

    let name = match value.strip_prefix('"') {
        Some(quoted) => &quoted[..quoted.find('"')?],
        None => value[..value.find(';').unwrap_or(value.len())].trim(),
    };

    (!name.is_empty()).then(|| name.to_string())
}

/// Makes a server-supplied name safe to use as a single path segment
///
/// Returns None when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Only the last path segment counts
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let sanitized: String = last
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim().trim_start_matches('.').to_string();
    (!sanitized.is_empty()).then_some(sanitized)
}

/// Random decimal identifier with the given number of digits
pub fn random_id(digits: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..digits)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
