use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;

use crate::domain::Blob;

pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

static XML_OR_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:text/[^\s;]*|application/xml|[^\s/]+/[^\s;]*\+xml)\s*;\s*charset\s*=\s*utf-8",
    )
    .expect("BOM pattern is valid")
});

static DATA_URL_MEDIA_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:[^;]*;").expect("data URL pattern is valid"));

/// True for UTF-8 text and XML MIME types that get a BOM under `auto_bom`.
pub fn should_prepend_bom(mime: &str) -> bool {
    XML_OR_TEXT.is_match(mime)
}

/// Returns the blob with a BOM chunk in front when `auto_bom` applies, or a
/// clone of the original otherwise.
pub fn apply_bom(blob: &Blob, auto_bom: bool) -> Blob {
    if auto_bom && should_prepend_bom(blob.mime()) {
        blob.prepend(UTF8_BOM)
    } else {
        blob.clone()
    }
}

/// Encode a blob as a base64 `data:` URL.
pub fn to_data_url(blob: &Blob) -> String {
    let mime = if blob.mime().is_empty() {
        "application/octet-stream"
    } else {
        blob.mime()
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(blob.to_bytes());
    format!("data:{};base64,{}", mime, encoded)
}

/// Swap the media type of a `data:` URL for `attachment/file` so that the
/// host offers it as a download instead of rendering it.
pub fn force_attachment(data_url: &str) -> String {
    DATA_URL_MEDIA_TYPE
        .replace(data_url, "data:attachment/file;")
        .into_owned()
}

/// Decode the payload of a base64 `data:` URL.
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return Some(payload.as_bytes().to_vec());
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string()
}
