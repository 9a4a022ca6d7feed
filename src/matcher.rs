// PageGate - Path Matcher
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Resolves a navigation pathname against one registry universe.
// Exact literal match short-circuits. Otherwise candidates are filtered
// segment-wise and ranked by a deterministic priority score:
//
//   score = base-3 positional number, digits left to right,
//           literal segment = 2, parameter segment = 1
//
// Candidates always share a segment count, so digit-wise comparison holds:
// a literal outranks a parameter at the same index, earlier segments
// dominate later ones, and a fully-literal pattern is maximal. Ties
// (identical shapes) fall to registration order — first registered wins,
// every run, every call.

use crate::paths;
use crate::registry::RouteRegistry;
use crate::route::{MatchResult, RouteConfig};

/// Resolve a pathname to the single best route config, or None.
/// Input need not be normalized; trailing slashes are trimmed here.
pub fn resolve(pathname: &str, registry: &RouteRegistry) -> Option<MatchResult> {
    let path = paths::normalize(pathname);

    // Fast path: exact literal hit wins outright
    if let Some(config) = registry.exact(&path) {
        log::trace!("exact match: {} -> {}", path, config.module_id);
        return Some(MatchResult {
            config: config.clone(),
            params: Vec::new(),
        });
    }

    let want = paths::segments(&path);
    let mut best: Option<(u128, &RouteConfig)> = None;

    for config in registry.iter() {
        let pattern = paths::segments(&config.path);
        if !is_candidate(&want, &pattern) {
            continue;
        }
        let score = priority_score(&pattern);
        // Strictly-greater replacement: equal scores keep the earlier registration
        if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
            best = Some((score, config));
        }
    }

    best.map(|(_, config)| {
        let pattern = paths::segments(&config.path);
        log::trace!("pattern match: {} -> {}", path, config.module_id);
        MatchResult {
            config: config.clone(),
            params: bind_params(&pattern, &want),
        }
    })
}

/// Candidate iff equal segment count AND every pattern segment is either
/// a parameter or literally equal (case-sensitive) at the same index.
fn is_candidate(want: &[&str], pattern: &[&str]) -> bool {
    want.len() == pattern.len()
        && pattern
            .iter()
            .zip(want)
            .all(|(p, w)| paths::is_param(p) || p == w)
}

/// Deterministic ranking for ambiguous patterns. See module header.
/// u128 keeps the positional encoding exact far past any plausible depth.
fn priority_score(pattern: &[&str]) -> u128 {
    pattern.iter().fold(0u128, |acc, seg| {
        acc * 3 + if paths::is_param(seg) { 1 } else { 2 }
    })
}

/// Extract parameter bindings: literal segments skipped, parameter
/// segments bound to the pathname segment at the same index.
fn bind_params(pattern: &[&str], actual: &[&str]) -> Vec<(String, String)> {
    pattern
        .iter()
        .zip(actual)
        .filter(|(p, _)| paths::is_param(p))
        .map(|(p, a)| (paths::param_name(p).to_string(), a.to_string()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
