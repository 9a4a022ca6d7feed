// PageGate - Pathname Handling
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single source of truth for pathname normalization and tokenization.
// Every pathname entering the dispatcher passes through normalize() first;
// matcher, registry, and redirects all operate on normalized forms.

/// Parameter marker for dynamic route segments (e.g. "/lessons/:lessonId")
pub const PARAM_MARKER: char = ':';

/// Split a browser-style location into (pathname, query).
/// Fragment is discarded — it never reaches the dispatcher in a real navigation.
pub fn split_location(location: &str) -> (&str, &str) {
    let location = location.split('#').next().unwrap_or("");
    match location.split_once('?') {
        Some((path, query)) => (path, query),
        None => (location, ""),
    }
}

/// Normalize a pathname for matching:
/// - leading slash enforced
/// - duplicate slashes collapsed
/// - trailing slash trimmed (root "/" stays "/")
///
/// Literal segment case is preserved — matching is case-sensitive.
pub fn normalize(pathname: &str) -> String {
    let mut out = String::with_capacity(pathname.len() + 1);
    out.push('/');
    for seg in pathname.split('/').filter(|s| !s.is_empty()) {
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(seg);
    }
    out
}

/// Tokenize a normalized path into segments, dropping empties
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// A segment beginning with ':' binds a named parameter
pub fn is_param(segment: &str) -> bool {
    segment.starts_with(PARAM_MARKER)
}

/// Parameter name without the marker (":lessonId" -> "lessonId")
pub fn param_name(segment: &str) -> &str {
    segment.trim_start_matches(PARAM_MARKER)
}

/// Look up a key in a raw query string ("a=1&b=2").
/// First occurrence wins; no decoding — portal queries are plain ASCII flags.
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_trailing_slash() {
        assert_eq!(normalize("/teacher/lessons/"), "/teacher/lessons");
        assert_eq!(normalize("/auth/login"), "/auth/login");
    }

    #[test]
    fn normalize_collapses_duplicate_slashes() {
        assert_eq!(normalize("//student//classes"), "/student/classes");
    }

    #[test]
    fn normalize_root_stays_root() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn normalize_adds_leading_slash() {
        assert_eq!(normalize("dashboard"), "/dashboard");
    }

    #[test]
    fn split_location_separates_query() {
        let (path, query) = split_location("/auth/login?agentMode=true");
        assert_eq!(path, "/auth/login");
        assert_eq!(query, "agentMode=true");

        let (path, query) = split_location("/dashboard");
        assert_eq!(path, "/dashboard");
        assert_eq!(query, "");
    }

    #[test]
    fn split_location_drops_fragment() {
        let (path, query) = split_location("/dashboard?x=1#section");
        assert_eq!(path, "/dashboard");
        assert_eq!(query, "x=1");
    }

    #[test]
    fn segment_tokenization() {
        assert_eq!(segments("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(segments("/"), Vec::<&str>::new());
    }

    #[test]
    fn param_segments_detected() {
        assert!(is_param(":lessonId"));
        assert!(!is_param("lessons"));
        assert_eq!(param_name(":lessonId"), "lessonId");
    }

    #[test]
    fn query_param_lookup() {
        assert_eq!(query_param("agentMode=true&x=1", "agentMode"), Some("true"));
        assert_eq!(query_param("x=1", "agentMode"), None);
        assert_eq!(query_param("", "agentMode"), None);
    }
}
