use std::env;

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Expand Windows-style `%VAR%` references. Unknown variables and unmatched
/// `%` are left untouched.
pub fn parse_windows_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match env::var(name) {
                    Ok(value) => {
                        result.push_str(&value);
                        rest = &after[end + 1..];
                    }
                    Err(_) => {
                        // Closing % may open the next reference
                        result.push('%');
                        result.push_str(name);
                        rest = &after[end..];
                    }
                }
            }
            _ => {
                result.push('%');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Expand Unix-style `$VAR` and `${VAR}` references. Unknown variables are
/// left untouched.
pub fn parse_unix_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('$') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                match env::var(name) {
                    Ok(value) if !name.is_empty() => result.push_str(&value),
                    _ => result.push_str(&rest[start..start + end + 3]),
                }
                rest = &braced[end + 1..];
                continue;
            }
            result.push('$');
            rest = after;
            continue;
        }

        let name_len = after.find(|c: char| !is_var_char(c)).unwrap_or(after.len());
        let name = &after[..name_len];
        match env::var(name) {
            Ok(value) if !name.is_empty() => result.push_str(&value),
            _ => {
                result.push('$');
                result.push_str(name);
            }
        }
        rest = &after[name_len..];
    }

    result.push_str(rest);
    result
}

/// Normalize path separators for the current OS
pub fn normalize_path_for_os(path: &str) -> String {
    if cfg!(windows) {
        path.replace('/', "\\")
    } else {
        path.replace('\\', "/")
    }
}

/// Expand both variable styles then normalize separators.
pub fn expand_path(path: &str) -> String {
    let mut expanded = path.to_string();
    if expanded.contains('%') {
        expanded = parse_windows_env_vars(&expanded);
    }
    if expanded.contains('$') {
        expanded = parse_unix_env_vars(&expanded);
    }
    normalize_path_for_os(&expanded)
}
