//! Separator-agnostic path string helpers
//!
//! Paths come from the server verbatim and may use either `/` or `\`.
//! Nothing here touches the local file system.

const ELLIPSIS: &str = "...";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn last_separator(path: &str) -> Option<usize> {
    path.rfind(is_separator)
}

/// Parent directory of `path`.
///
/// Falls back to `base_dir` when there is no separator past position 0,
/// i.e. the path is already at (or above) the configured base.
pub fn parent_of(path: &str, base_dir: &str) -> String {
    match last_separator(path) {
        Some(idx) if idx > 0 => path[..idx].to_string(),
        _ => base_dir.to_string(),
    }
}

/// Final component of `path`, or the whole string when it has no separator
pub fn filename_of(path: &str) -> &str {
    match last_separator(path) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Lowercased extension of the final component, if any
pub fn extension_of(path: &str) -> Option<String> {
    let name = filename_of(path);
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => Some(name[idx + 1..].to_lowercase()),
        _ => None,
    }
}

/// Whether `path` is `base` itself or lies below it
pub fn is_under(base: &str, path: &str) -> bool {
    if base.is_empty() || !path.starts_with(base) {
        return false;
    }

    let rest = &path[base.len()..];
    rest.is_empty() || base.ends_with(is_separator) || rest.starts_with(is_separator)
}

fn tail_chars(s: &str, count: usize) -> &str {
    let total = s.chars().count();
    if count >= total {
        return s;
    }
    let skip = total - count;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// Shorten a path for a fixed-width label.
///
/// Keeps the file name and as many whole trailing directories as fit in
/// `max_length` characters, prefixed with `...`. A file name that alone
/// exceeds the budget is cut to its last `max_length - 3` characters.
pub fn truncate_for_display(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let budget = max_length.saturating_sub(ELLIPSIS.len());
    let filename = filename_of(path);
    if filename.chars().count() > budget {
        return format!("{}{}", ELLIPSIS, tail_chars(filename, budget));
    }

    let mut best = format!("{}{}", ELLIPSIS, filename);
    let separators: Vec<usize> = path
        .char_indices()
        .filter(|(_, c)| is_separator(*c))
        .map(|(i, _)| i)
        .collect();

    for &idx in separators.iter().rev() {
        let suffix = &path[idx + 1..];
        if ELLIPSIS.len() + suffix.chars().count() > max_length {
            break;
        }
        best = format!("{}{}", ELLIPSIS, suffix);
    }

    best
}
