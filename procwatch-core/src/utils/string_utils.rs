//! String helpers shared by the rule engine, the icon cache and display code.
//!
//! Path comparison throughout procwatch is case-insensitive with both `/` and
//! `\` treated as the same separator. [`normalize_path`] produces that canonical
//! form; everything that compares or keys on paths goes through it.

/// Canonical separator after normalization.
pub const SEPARATOR: char = '/';

/// Lowercases `raw` and maps every `\` to `/`.
///
/// Trailing separators are kept; callers decide whether they carry meaning.
///
/// # Examples
///
/// ```
/// use procwatch_core::utils::string_utils::normalize_path;
///
/// assert_eq!(normalize_path(r"C:\Program Files\App.EXE"), "c:/program files/app.exe");
/// assert_eq!(normalize_path("/usr/Bin/"), "/usr/bin/");
/// ```
pub fn normalize_path(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(|c| if c == '\\' { '/'.to_lowercase() } else { c.to_lowercase() })
        .collect()
}

/// Normalizes `raw` and strips any trailing separators.
///
/// A bare root (`/`) is returned unchanged so it still names something.
pub fn normalize_path_trimmed(raw: &str) -> String {
    let normalized = normalize_path(raw);
    let trimmed = normalized.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        normalized
    } else {
        trimmed.to_string()
    }
}

/// Returns the final component of an already normalized path.
///
/// # Examples
///
/// ```
/// use procwatch_core::utils::string_utils::base_name;
///
/// assert_eq!(base_name("c:/a/x.exe"), "x.exe");
/// assert_eq!(base_name("x.exe"), "x.exe");
/// ```
pub fn base_name(normalized: &str) -> &str {
    match normalized.rfind(SEPARATOR) {
        Some(idx) => &normalized[idx + SEPARATOR.len_utf8()..],
        None => normalized,
    }
}

/// Number of separators in a normalized path.
pub fn separator_count(normalized: &str) -> usize {
    normalized.matches(SEPARATOR).count()
}

/// Truncates a string to `max_len` characters, appending "..." if shortened.
///
/// # Examples
///
/// ```
/// use procwatch_core::utils::string_utils::truncate_string;
///
/// assert_eq!(truncate_string("firefox", 20), "firefox");
/// assert_eq!(truncate_string("/usr/lib/firefox/firefox-bin", 10), "/usr/li...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let ellipsis = "...";
    let keep = max_len.saturating_sub(ellipsis.len());
    let mut result: String = s.chars().take(keep).collect();
    result.push_str(ellipsis);
    result
}
