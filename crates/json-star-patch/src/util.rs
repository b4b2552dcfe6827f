//! JSON Pointer (RFC 6901) rendering of patch paths.

/// Escapes a path component: `~` becomes `~0` and `/` becomes `~1`.
pub fn escape_component(component: &str) -> String {
    if !component.contains(['/', '~']) {
        return component.to_string();
    }
    // `~` first, or the `~` of `~1` would be escaped again.
    component.replace('~', "~0").replace('/', "~1")
}

/// Formats path components as a JSON Pointer; the root is `""`.
pub fn format_pointer(path: &[String]) -> String {
    let mut out = String::with_capacity(path.iter().map(|c| c.len() + 1).sum());
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}
