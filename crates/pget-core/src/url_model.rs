//! Deriving a destination filename from the download URL.

/// Fallback when the URL path has no usable final segment.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a Linux-safe destination filename from `url`.
///
/// Takes the last path segment, sanitizes it, and falls back to
/// `download.bin` when the URL has no usable segment (root path,
/// unparseable URL, or a segment that sanitizes to nothing).
pub fn derive_filename(url: &str) -> String {
    let candidate = filename_from_url_path(url)
        .map(|s| sanitize_filename(&s))
        .unwrap_or_default();
    if candidate.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        candidate
    }
}

/// Last non-empty path segment of the URL, or `None` for root/unparseable.
fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Sanitizes a candidate filename for safe use on Linux: path separators,
/// whitespace, and control characters become `_` (runs collapsed), edge
/// dots and underscores are trimmed, and the result is capped at
/// NAME_MAX bytes on a char boundary.
fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = c == '\0'
            || c == '/'
            || c == '\\'
            || c == ' '
            || c == '\t'
            || c == '_'
            || c.is_control();
        if bad {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.len() > NAME_MAX {
        let mut end = NAME_MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        trimmed[..end].to_string()
    } else {
        trimmed.to_string()
    }
}
