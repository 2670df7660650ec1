//! Locating the filter value inside a raw query string

use percent_encoding::percent_decode_str;

/// Find the value of the first recognized filter parameter and URL-decode it.
///
/// Keys match case-insensitively, and only at the start of the string or
/// right after `&` or `?`. The value runs to the first `&` outside
/// parentheses and single-quoted strings, so unencoded filters such as
/// `name = 'A&B'` survive. Returns `None` when no key is present or the
/// value is blank.
pub fn locate_filter<S: AsRef<str>>(query: &str, keys: &[S]) -> Option<String> {
    let mut start = 0;

    while start <= query.len() {
        let rest = &query[start..];

        if let Some(value_start) = keys.iter().find_map(|key| match_key(rest, key.as_ref())) {
            let raw = value_extent(&rest[value_start..]);
            let decoded = decode(raw);
            return if decoded.trim().is_empty() { None } else { Some(decoded) };
        }

        // next parameter boundary
        match rest.find(['&', '?']) {
            Some(i) => start += i + 1,
            None => break,
        }
    }

    None
}

/// Offset just past `key=` when `text` starts with it
fn match_key(text: &str, key: &str) -> Option<usize> {
    let name = text.get(..key.len())?;
    if name.eq_ignore_ascii_case(key) && text[key.len()..].starts_with('=') {
        Some(key.len() + 1)
    } else {
        None
    }
}

/// The filter value up to its terminating top-level `&`
fn value_extent(value: &str) -> &str {
    let mut depth = 0usize;
    let mut in_string = false;

    for (i, c) in value.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            '&' if !in_string && depth == 0 => return &value[..i],
            _ => {}
        }
    }

    value
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
