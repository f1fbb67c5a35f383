//! Path Access
//!
//! Composite descent keyed by (segment, field, repetition, component,
//! subcomponent). Descent stops at the first omitted index and returns the
//! node reached so far, so `get_field(seg, Some(3), None, None, None)` is the
//! whole field. String expressions (`"PID.3.1"`) go through the cached
//! parser.

pub mod parser;

pub use parser::{PathSpec, SegmentSelector};

use crate::dom::{Element, Message};

/// Resolve a segment selector against a message.
fn select_segment(message: &Message, segment: &SegmentSelector) -> Option<Element> {
    match segment {
        SegmentSelector::Index(index) => message.segment(*index),
        SegmentSelector::Kind(kind) => message.first_segment(kind),
    }
}

/// Descend from a segment while the next index is present.
fn descend(
    segment: Element,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
) -> Option<Element> {
    let Some(field) = field else { return Some(segment) };
    let node = segment.child(field)?;
    let Some(repetition) = repetition else { return Some(node) };
    let node = node.child(repetition)?;
    let Some(component) = component else { return Some(node) };
    let node = node.child(component)?;
    let Some(subcomponent) = subcomponent else { return Some(node) };
    node.child(subcomponent)
}

/// Element at the given position; the first `None` index returns the
/// ancestor reached so far.
pub fn get_field(
    message: &Message,
    segment: &SegmentSelector,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
) -> Option<Element> {
    let seg = select_segment(message, segment)?;
    descend(seg, field, repetition, component, subcomponent)
}

/// Same descent applied to every segment of type `kind`.
pub fn get_fields(
    message: &Message,
    kind: &str,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
) -> Vec<Element> {
    message
        .segments(kind)
        .into_iter()
        .filter_map(|seg| descend(seg, field, repetition, component, subcomponent))
        .collect()
}

/// Leaf string at the given position.
pub fn get_value(
    message: &Message,
    segment: &SegmentSelector,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
) -> Option<String> {
    get_field(message, segment, field, repetition, component, subcomponent)?.value()
}

/// Leaf strings across every segment of type `kind`; absent or empty leaves
/// yield empty strings.
pub fn get_values(
    message: &Message,
    kind: &str,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
) -> Vec<String> {
    get_fields(message, kind, field, repetition, component, subcomponent)
        .into_iter()
        .map(|e| e.value().unwrap_or_default())
        .collect()
}

/// Evaluate a parsed path against a message. A repetition omitted above a
/// deeper index defaults to the first repetition.
pub fn eval(message: &Message, spec: &PathSpec) -> Option<Element> {
    let repetition = match (spec.repetition, spec.component, spec.subcomponent) {
        (None, None, None) => None,
        (None, _, _) => Some(1),
        (rep, _, _) => rep,
    };
    get_field(
        message,
        &spec.segment,
        spec.field,
        repetition,
        spec.component,
        spec.subcomponent,
    )
}

/// Evaluate a path expression string, returning the element it addresses.
pub fn query_element(message: &Message, path: &str) -> Result<Option<Element>, String> {
    let spec = parser::parse_cached(path)?;
    Ok(eval(message, &spec))
}

/// Evaluate a path expression string, returning the leaf string.
pub fn query(message: &Message, path: &str) -> Result<Option<String>, String> {
    Ok(query_element(message, path)?.and_then(|e| e.value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementKind;

    const SAMPLE: &str =
        "MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3\rPID|1||12345^^^HOSP^MR~67890^^^CLINIC^PI||DOE^JOHN\rOBX|1|TX|NOTE\rOBX|2|TX|MORE";

    fn sample() -> Message {
        Message::parse(SAMPLE).unwrap()
    }

    #[test]
    fn test_omitted_indices_return_ancestor() {
        let m = sample();
        let seg = get_field(&m, &SegmentSelector::Kind("PID".into()), None, None, None, None)
            .unwrap();
        assert!(matches!(seg.kind(), ElementKind::Segment));

        let field =
            get_field(&m, &SegmentSelector::Kind("PID".into()), Some(3), None, None, None)
                .unwrap();
        assert!(matches!(field.kind(), ElementKind::Field));
        assert_eq!(field.value().unwrap(), "12345^^^HOSP^MR~67890^^^CLINIC^PI");
    }

    #[test]
    fn test_full_descent() {
        let m = sample();
        let value = get_value(
            &m,
            &SegmentSelector::Kind("PID".into()),
            Some(3),
            Some(2),
            Some(4),
            None,
        );
        assert_eq!(value.unwrap(), "CLINIC");
    }

    #[test]
    fn test_index_selector() {
        let m = sample();
        let value = get_value(&m, &SegmentSelector::Index(2), Some(1), None, None, None);
        assert_eq!(value.unwrap(), "1");
        assert!(get_field(&m, &SegmentSelector::Index(0), None, None, None, None).is_none());
    }

    #[test]
    fn test_get_values_across_segments() {
        let m = sample();
        let values = get_values(&m, "OBX", Some(3), None, None, None);
        assert_eq!(values, vec!["NOTE", "MORE"]);
    }

    #[test]
    fn test_query_strings() {
        let m = sample();
        assert_eq!(query(&m, "PID.3.1").unwrap().unwrap(), "12345");
        assert_eq!(query(&m, "PID.3(2).1").unwrap().unwrap(), "67890");
        assert_eq!(query(&m, "MSH.9.2").unwrap().unwrap(), "A01");
        assert_eq!(query(&m, "MSH-10").unwrap().unwrap(), "1");
        assert_eq!(query(&m, "PID.9").unwrap(), None);
        assert!(query(&m, "PID..3").is_err());
    }

    #[test]
    fn test_query_missing_segment() {
        let m = sample();
        assert_eq!(query(&m, "ZZZ.1").unwrap(), None);
    }
}
