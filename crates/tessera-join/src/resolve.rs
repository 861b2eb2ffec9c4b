//! Field-path resolution into logical value sets.
//!
//! The walk is an explicit work stack of `(depth, value, origin)` frames, so
//! deeply nested documents never grow the call stack. Arrays are traversed
//! one level per segment: a segment is applied to every element, and a
//! numeric segment is additionally applied as a position. Both readings are
//! pushed as independent frames and their results meet in the set.

use bson::RawDocument;
use bson::raw::RawBsonRef;
use tessera_query::FieldPath;

use crate::error::JoinError;
use crate::member::Member;
use crate::set::LogicalValueSet;

/// Which input of the join a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The side supplying the values to match (`localField`).
    ///
    /// Leaf arrays contribute their elements only. Dead-end branches
    /// contribute nothing; an empty result becomes `{Missing}`. Resolving to
    /// `undefined` is an error.
    Local,
    /// The side being matched against (`foreignField`).
    ///
    /// Leaf arrays contribute their elements and the array itself. A field
    /// absent from a document, or a scalar reached through a field with
    /// segments left, contributes `Missing`.
    Foreign,
}

/// How a frame's value was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Through a document field (or the root).
    Field,
    /// As one element of a traversed array.
    Element,
    /// Through a numeric segment used as an array position.
    Position,
}

struct Frame<'a> {
    depth: usize,
    value: RawBsonRef<'a>,
    origin: Origin,
}

/// Resolve `path` against `doc` for the given join side.
pub fn resolve<'a>(
    doc: &'a RawDocument,
    path: &FieldPath,
    side: Side,
) -> Result<LogicalValueSet<'a>, JoinError> {
    let components = path.components();
    let mut set = LogicalValueSet::new();
    let mut stack = vec![Frame {
        depth: 0,
        value: RawBsonRef::Document(doc),
        origin: Origin::Field,
    }];

    while let Some(frame) = stack.pop() {
        if frame.depth == components.len() {
            emit_leaf(&mut set, frame.value, side, path)?;
            continue;
        }

        let component = &components[frame.depth];
        match frame.value {
            RawBsonRef::Document(sub) => match sub.get(component.name())? {
                Some(value) => stack.push(Frame {
                    depth: frame.depth + 1,
                    value,
                    origin: Origin::Field,
                }),
                None => emit_missing(&mut set, side)?,
            },
            // Arrays nested directly in arrays are not flattened further.
            RawBsonRef::Array(arr) if frame.origin != Origin::Element => {
                if let Some(index) = component.index()
                    && let Some(value) = arr.get(index)?
                {
                    stack.push(Frame {
                        depth: frame.depth + 1,
                        value,
                        origin: Origin::Position,
                    });
                }
                for elem in arr {
                    stack.push(Frame {
                        depth: frame.depth,
                        value: elem?,
                        origin: Origin::Element,
                    });
                }
            }
            RawBsonRef::Array(_) => {}
            // A scalar with segments left: the path does not exist below it.
            _ if frame.origin == Origin::Field => emit_missing(&mut set, side)?,
            _ => {}
        }
    }

    if side == Side::Local && set.is_empty() {
        set.insert(Member::Missing)?;
    }
    Ok(set)
}

/// Resolve the predicate-supplying side. Fails if any resolved value is
/// `undefined`.
pub fn resolve_local<'a>(
    doc: &'a RawDocument,
    path: &FieldPath,
) -> Result<LogicalValueSet<'a>, JoinError> {
    resolve(doc, path, Side::Local)
}

/// Resolve the matched side. Fails only on malformed BSON.
pub fn resolve_foreign<'a>(
    doc: &'a RawDocument,
    path: &FieldPath,
) -> Result<LogicalValueSet<'a>, JoinError> {
    resolve(doc, path, Side::Foreign)
}

fn emit_leaf<'a>(
    set: &mut LogicalValueSet<'a>,
    value: RawBsonRef<'a>,
    side: Side,
    path: &FieldPath,
) -> Result<(), JoinError> {
    if let RawBsonRef::Array(arr) = value {
        for elem in arr {
            emit_value(set, elem?, side, path)?;
        }
        if side == Side::Foreign {
            set.insert(Member::Value(value))?;
        }
        return Ok(());
    }
    emit_value(set, value, side, path)
}

fn emit_value<'a>(
    set: &mut LogicalValueSet<'a>,
    value: RawBsonRef<'a>,
    side: Side,
    path: &FieldPath,
) -> Result<(), JoinError> {
    // Checked before insertion: `undefined` shares a slot with `null` and
    // could otherwise be absorbed by an earlier null.
    if side == Side::Local && value == RawBsonRef::Undefined {
        return Err(JoinError::undefined_comparison(path.as_str()));
    }
    set.insert(Member::Value(value))?;
    Ok(())
}

fn emit_missing(set: &mut LogicalValueSet<'_>, side: Side) -> Result<(), JoinError> {
    if side == Side::Foreign {
        set.insert(Member::Missing)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{RawBson, RawDocumentBuf, rawdoc};

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    fn has(set: &LogicalValueSet<'_>, value: RawBsonRef<'_>) -> bool {
        set.contains(&Member::Value(value)).unwrap()
    }

    fn has_array(set: &LogicalValueSet<'_>, doc: &RawDocumentBuf, field: &str) -> bool {
        let value = doc.get(field).unwrap().unwrap();
        has(set, value)
    }

    #[test]
    fn top_level_scalar() {
        let doc = rawdoc! { "a": 1_i32 };
        for side in [Side::Local, Side::Foreign] {
            let set = resolve(&doc, &path("a"), side).unwrap();
            assert_eq!(set.len(), 1);
            assert!(has(&set, RawBsonRef::Int32(1)));
        }
    }

    #[test]
    fn missing_top_level() {
        let doc = rawdoc! { "b": 1_i32 };
        let local = resolve_local(&doc, &path("a")).unwrap();
        let foreign = resolve_foreign(&doc, &path("a")).unwrap();
        assert_eq!(local.members().copied().collect::<Vec<_>>(), vec![Member::Missing]);
        assert_eq!(foreign.members().copied().collect::<Vec<_>>(), vec![Member::Missing]);
    }

    #[test]
    fn leaf_array_unwraps_one_level() {
        let doc = rawdoc! { "a": [1_i32, 2_i32, 3_i32] };
        let set = resolve_local(&doc, &path("a")).unwrap();
        assert_eq!(set.len(), 3);
        for n in 1..=3 {
            assert!(has(&set, RawBsonRef::Int32(n)));
        }
    }

    #[test]
    fn leaf_array_whole_value_on_foreign_side_only() {
        let doc = rawdoc! { "a": [1_i32, 2_i32], "probe": [1_i32, 2_i32] };
        let local = resolve_local(&doc, &path("a")).unwrap();
        let foreign = resolve_foreign(&doc, &path("a")).unwrap();
        assert!(!has_array(&local, &doc, "probe"));
        assert!(has_array(&foreign, &doc, "probe"));
        assert_eq!(foreign.len(), 3);
    }

    #[test]
    fn nested_array_stays_whole() {
        let doc = rawdoc! { "a": [[1_i32, 2_i32], 3_i32], "probe": [1_i32, 2_i32] };
        let set = resolve_local(&doc, &path("a")).unwrap();
        assert!(has_array(&set, &doc, "probe"));
        assert!(has(&set, RawBsonRef::Int32(3)));
        assert!(!has(&set, RawBsonRef::Int32(1)));
    }

    #[test]
    fn traverses_arrays_of_documents() {
        let doc = rawdoc! { "a": [{ "x": 1_i32 }, { "x": 2_i32 }, { "y": 3_i32 }] };
        let local = resolve_local(&doc, &path("a.x")).unwrap();
        assert_eq!(local.len(), 2);
        assert!(!local.contains_nullish());

        let foreign = resolve_foreign(&doc, &path("a.x")).unwrap();
        assert_eq!(foreign.len(), 3);
        assert!(foreign.contains_nullish());
    }

    #[test]
    fn scalars_inside_arrays_are_skipped() {
        let doc = rawdoc! { "a": [1_i32, null] };
        let foreign = resolve_foreign(&doc, &path("a.x")).unwrap();
        assert!(foreign.is_empty());
        let local = resolve_local(&doc, &path("a.x")).unwrap();
        assert!(local.contains_nullish());
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn scalar_on_path_is_missing_on_foreign_side() {
        let doc = rawdoc! { "a": { "b": 1_i32 } };
        let foreign = resolve_foreign(&doc, &path("a.b.c")).unwrap();
        assert_eq!(foreign.members().copied().collect::<Vec<_>>(), vec![Member::Missing]);
    }

    #[test]
    fn nested_arrays_on_path_are_not_flattened() {
        let doc = rawdoc! { "a": [[{ "x": 1_i32 }]] };
        let foreign = resolve_foreign(&doc, &path("a.x")).unwrap();
        assert!(foreign.is_empty());
        let local = resolve_local(&doc, &path("a.x")).unwrap();
        assert!(!has(&local, RawBsonRef::Int32(1)));
    }

    #[test]
    fn numeric_segment_is_positional() {
        let doc = rawdoc! { "a": [{ "x": 1_i32 }, { "x": 2_i32 }] };
        let local = resolve_local(&doc, &path("a.0.x")).unwrap();
        assert_eq!(local.len(), 1);
        assert!(has(&local, RawBsonRef::Int32(1)));
    }

    #[test]
    fn numeric_segment_is_also_a_field_name() {
        let doc = rawdoc! { "a": [{ "0": { "x": 5_i32 } }, { "x": 2_i32 }] };
        let local = resolve_local(&doc, &path("a.0.x")).unwrap();
        assert!(has(&local, RawBsonRef::Int32(5)));
        assert!(!has(&local, RawBsonRef::Int32(2)));

        let doc = rawdoc! { "a": { "0": { "x": 7_i32 } } };
        let local = resolve_local(&doc, &path("a.0.x")).unwrap();
        assert!(has(&local, RawBsonRef::Int32(7)));
    }

    #[test]
    fn numeric_segment_foreign_side_explores_both_readings() {
        // Position 0 gives x = 1; element documents lack a "0" field.
        let doc = rawdoc! { "a": [{ "x": 1_i32 }, { "y": 1_i32 }] };
        let foreign = resolve_foreign(&doc, &path("a.0.x")).unwrap();
        assert!(has(&foreign, RawBsonRef::Int32(1)));
        assert!(foreign.contains_nullish());
    }

    #[test]
    fn positional_scalar_is_a_dead_end() {
        let doc = rawdoc! { "a": [1_i32, 2_i32] };
        assert!(resolve_foreign(&doc, &path("a.0.x")).unwrap().is_empty());
    }

    #[test]
    fn positional_out_of_range() {
        let doc = rawdoc! { "a": [{ "x": 1_i32 }] };
        let local = resolve_local(&doc, &path("a.5.x")).unwrap();
        assert!(local.contains_nullish());
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn positional_leaf_array_unwraps() {
        let doc = rawdoc! { "a": [[1_i32, 2_i32], 3_i32] };
        let local = resolve_local(&doc, &path("a.0")).unwrap();
        assert!(has(&local, RawBsonRef::Int32(1)));
        assert!(has(&local, RawBsonRef::Int32(2)));
        assert!(!has(&local, RawBsonRef::Int32(3)));
    }

    #[test]
    fn empty_leaf_array() {
        let doc = rawdoc! { "a": [], "probe": [] };
        let local = resolve_local(&doc, &path("a")).unwrap();
        assert!(local.contains_nullish());
        assert_eq!(local.len(), 1);

        let foreign = resolve_foreign(&doc, &path("a")).unwrap();
        assert!(!foreign.contains_nullish());
        assert!(has_array(&foreign, &doc, "probe"));
    }

    #[test]
    fn undefined_on_local_side_is_rejected() {
        let doc = rawdoc! { "b": RawBson::Undefined };
        match resolve_local(&doc, &path("b")) {
            Err(JoinError::Validation(msg)) => assert!(msg.contains("undefined")),
            other => panic!("expected validation error, got {other:?}"),
        }

        // Also when hidden behind an earlier null in the same array.
        let doc = rawdoc! { "b": [null, RawBson::Undefined] };
        assert!(matches!(
            resolve_local(&doc, &path("b")),
            Err(JoinError::Validation(_))
        ));
    }

    #[test]
    fn undefined_on_foreign_side_is_a_value() {
        let doc = rawdoc! { "b": RawBson::Undefined };
        let foreign = resolve_foreign(&doc, &path("b")).unwrap();
        assert!(foreign.contains_nullish());
    }

    #[test]
    fn nested_undefined_is_not_rejected() {
        let doc = rawdoc! { "a": { "x": RawBson::Undefined } };
        assert!(resolve_local(&doc, &path("a")).is_ok());
    }

    #[test]
    fn resolution_is_deterministic() {
        let doc = rawdoc! { "a": [{ "b": [1_i32, 2_i32] }, { "b": { "c": 3_i32 } }, 4_i32] };
        let p = path("a.b");
        let first: Vec<_> = resolve_foreign(&doc, &p).unwrap().keys().cloned().collect();
        let second: Vec<_> = resolve_foreign(&doc, &p).unwrap().keys().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut doc = bson::Document::new();
        doc.insert("x", 1_i32);
        let mut dotted = String::from("x");
        for _ in 0..200 {
            let mut outer = bson::Document::new();
            outer.insert("n", doc);
            doc = outer;
            dotted.insert_str(0, "n.");
        }
        let raw = RawDocumentBuf::try_from(&doc).unwrap();
        let set = resolve_local(&raw, &path(&dotted)).unwrap();
        assert!(has(&set, RawBsonRef::Int32(1)));
    }
}
