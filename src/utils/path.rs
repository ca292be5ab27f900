//! Path normalization for source locations reported by the toolchain.
//!
//! Debug info frequently carries build-directory relative paths such as
//! `project/build/../src/main.c`. Every path attached to a symbol goes through
//! [`normalize_path`] so the same file always ends up under the same key.

/// Resolve `..`, `.` and empty segments of a `/`-separated path.
///
/// A leading `/` is preserved. `..` segments that cannot be resolved against a
/// preceding segment are kept for relative paths and dropped for absolute ones.
///
/// # Example
/// ```
/// use puncover_core::utils::path::normalize_path;
/// assert_eq!(normalize_path("a/build/../src/x.c"), "a/src/x.c");
/// ```
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Final component of a path
pub fn base_file(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Directory part of a normalized path, `None` when there is none.
///
/// The filesystem root itself is not treated as a directory.
pub fn parent_dir(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

/// Strip `root` from the front of `path`, if `path` lives below it.
///
/// Both arguments are normalized first. Returns `None` for paths outside the root.
pub fn relative_to(path: &str, root: &str) -> Option<String> {
    let path = normalize_path(path);
    let root = normalize_path(root);
    let rest = path.strip_prefix(root.trim_end_matches('/'))?;
    let rest = rest.strip_prefix('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}
