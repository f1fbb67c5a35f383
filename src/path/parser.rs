//! Path Expression Parser
//!
//! Parses terser-style path strings into a `PathSpec`. Includes an LRU cache
//! for parsed expressions to avoid re-parsing repeated queries.
//!
//! Syntax: `SEG.F.C.S` or `SEG-F-C-S`, where `SEG` is a segment type
//! (`PID`) or a one-based segment index (`2`), with an optional repetition
//! attached to the field as `F(R)`. Examples: `PID.3.1`, `MSH-9-2`,
//! `PID.3(2).1.2`, `2.5`.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Global LRU cache for parsed path expressions
static PATH_CACHE: Mutex<Option<LruCache<String, PathSpec>>> = Mutex::new(None);

/// Cache capacity - tuned for typical interface-engine query sets
const CACHE_CAPACITY: usize = 256;

/// How the segment level of a path is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSelector {
    /// One-based segment index.
    Index(usize),
    /// Segment type; resolves to the first match (or all matches for the
    /// plural accessors).
    Kind(String),
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub segment: SegmentSelector,
    pub field: Option<usize>,
    pub repetition: Option<usize>,
    pub component: Option<usize>,
    pub subcomponent: Option<usize>,
}

/// Parse a path expression string (with caching).
pub fn parse_cached(path: &str) -> Result<PathSpec, String> {
    {
        let mut guard = PATH_CACHE.lock().unwrap();
        let cache = guard
            .get_or_insert_with(|| LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).unwrap()));
        if let Some(spec) = cache.get(path) {
            return Ok(spec.clone());
        }
    }

    let spec = parse(path)?;

    {
        let mut guard = PATH_CACHE.lock().unwrap();
        let cache = guard
            .get_or_insert_with(|| LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).unwrap()));
        cache.put(path.to_string(), spec.clone());
    }

    Ok(spec)
}

/// Parse a path expression string without caching.
pub fn parse(path: &str) -> Result<PathSpec, String> {
    let mut parts = path.split(['.', '-']);

    let head = parts.next().filter(|p| !p.is_empty()).ok_or_else(|| {
        format!("empty path expression: {:?}", path)
    })?;
    let segment = if head.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = head
            .parse()
            .map_err(|_| format!("segment index out of range: {:?}", head))?;
        if index == 0 {
            return Err("segment index is one-based".to_string());
        }
        SegmentSelector::Index(index)
    } else {
        if !head.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(format!("invalid segment type: {:?}", head));
        }
        SegmentSelector::Kind(head.to_ascii_uppercase())
    };

    let mut spec = PathSpec {
        segment,
        field: None,
        repetition: None,
        component: None,
        subcomponent: None,
    };

    if let Some(part) = parts.next() {
        let (field, repetition) = parse_field_part(part)?;
        spec.field = Some(field);
        spec.repetition = repetition;
    }
    if let Some(part) = parts.next() {
        spec.component = Some(parse_index(part)?);
    }
    if let Some(part) = parts.next() {
        spec.subcomponent = Some(parse_index(part)?);
    }
    if let Some(extra) = parts.next() {
        return Err(format!("trailing path part: {:?}", extra));
    }

    Ok(spec)
}

/// Parse `F` or `F(R)`.
fn parse_field_part(part: &str) -> Result<(usize, Option<usize>), String> {
    match part.split_once('(') {
        None => Ok((parse_index(part)?, None)),
        Some((field, rest)) => {
            let rep = rest
                .strip_suffix(')')
                .ok_or_else(|| format!("unclosed repetition in {:?}", part))?;
            Ok((parse_index(field)?, Some(parse_index(rep)?)))
        }
    }
}

#[inline]
fn parse_index(part: &str) -> Result<usize, String> {
    part.parse()
        .map_err(|_| format!("invalid path index: {:?}", part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_path() {
        let spec = parse("PID.3.1").unwrap();
        assert_eq!(spec.segment, SegmentSelector::Kind("PID".to_string()));
        assert_eq!(spec.field, Some(3));
        assert_eq!(spec.repetition, None);
        assert_eq!(spec.component, Some(1));
        assert_eq!(spec.subcomponent, None);
    }

    #[test]
    fn test_parse_dash_form() {
        assert_eq!(parse("MSH-9-2").unwrap(), parse("MSH.9.2").unwrap());
    }

    #[test]
    fn test_parse_index_segment() {
        let spec = parse("2.5").unwrap();
        assert_eq!(spec.segment, SegmentSelector::Index(2));
        assert_eq!(spec.field, Some(5));
    }

    #[test]
    fn test_parse_repetition() {
        let spec = parse("PID.3(2).1.2").unwrap();
        assert_eq!(spec.field, Some(3));
        assert_eq!(spec.repetition, Some(2));
        assert_eq!(spec.component, Some(1));
        assert_eq!(spec.subcomponent, Some(2));
    }

    #[test]
    fn test_parse_segment_only() {
        let spec = parse("pid").unwrap();
        assert_eq!(spec.segment, SegmentSelector::Kind("PID".to_string()));
        assert_eq!(spec.field, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("P!D.3").is_err());
        assert!(parse("0.1").is_err());
        assert!(parse("PID.x").is_err());
        assert!(parse("PID.3(2").is_err());
        assert!(parse("PID.1.2.3.4").is_err());
    }

    #[test]
    fn test_cached_parse_matches_uncached() {
        let path = "OBX.5(1).2.1";
        assert_eq!(parse_cached(path).unwrap(), parse(path).unwrap());
        // Second hit comes from the cache
        assert_eq!(parse_cached(path).unwrap(), parse(path).unwrap());
    }
}
