/// Characters no mainstream filesystem accepts in a single path component.
const FORBIDDEN_IN_NAME: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

pub const JPG_SUFFIX: &str = ".jpg";

/// Turns user or date derived input into a file name that stays inside the current directory
/// and always carries a `.jpg` suffix.
pub fn normalize_proposed_name(value: &str) -> String {
    ensure_jpg_suffix(&sanitize_filename(value))
}

pub fn ensure_jpg_suffix(value: &str) -> String {
    if has_jpg_suffix(value) {
        value.to_string()
    } else {
        format!("{}{}", value, JPG_SUFFIX)
    }
}

pub fn has_jpg_suffix(value: &str) -> bool {
    let len = value.len();
    len >= JPG_SUFFIX.len()
        && value.is_char_boundary(len - JPG_SUFFIX.len())
        && value[len - JPG_SUFFIX.len()..].eq_ignore_ascii_case(JPG_SUFFIX)
}

/// Splits `name.JPG` into (`name`, `.JPG`) keeping the suffix as written.
pub fn split_jpg_suffix(value: &str) -> (&str, &str) {
    if has_jpg_suffix(value) {
        value.split_at(value.len() - JPG_SUFFIX.len())
    } else {
        (value, "")
    }
}

/// Replaces forbidden characters with `_`, trims trailing dots and spaces, and keeps the name
/// off the DOS device names so the file can be copied to Windows volumes.
pub fn sanitize_filename(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|ch| {
            if ch.is_control() || FORBIDDEN_IN_NAME.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .collect();

    let trimmed = replaced.trim_end_matches([' ', '.']).trim();
    if trimmed.is_empty() {
        return "untitled".to_string();
    }

    let (stem, suffix) = split_jpg_suffix(trimmed);
    if is_device_name(stem.split('.').next().unwrap_or(stem)) {
        format!("{}_file{}", stem, suffix)
    } else {
        trimmed.to_string()
    }
}

/// `CON`, `PRN`, `AUX`, `NUL`, `COM1`-`COM9` and `LPT1`-`LPT9`, any case.
fn is_device_name(component: &str) -> bool {
    let upper = component.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => ["COM", "LPT"].iter().any(|prefix| {
            upper
                .strip_prefix(prefix)
                .is_some_and(|digit| matches!(digit.as_bytes(), [b'1'..=b'9']))
        }),
    }
}
