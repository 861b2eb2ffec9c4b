//! Canonical byte keys for join equality.
//!
//! Two members join iff their keys are byte-equal. The encoding folds every
//! numeric type into one form (see [`Number`]), treats strings and symbols as
//! one type, and recurses into arrays and documents in order. Composite
//! encodings are length-prefixed or marker-terminated, so no key is a prefix
//! of another key of a different value.

use std::fmt;

use bson::raw::{RawBsonRef, RawDocument};
use bson::spec::ElementType;

use crate::decimal::Number;
use crate::member::Member;

/// Top-level null class: `Missing`, `null` and `undefined`.
const NULLISH: u8 = 0x00;

/// Marks one field or element inside a composite encoding.
const ENTRY: u8 = 0x01;
/// Terminates a composite encoding.
const END: u8 = 0x00;

// Number sub-tags, after the shared numeric tag.
const NUM_NAN: u8 = 0x00;
const NUM_NEG_INF: u8 = 0x01;
const NUM_FINITE: u8 = 0x02;
const NUM_POS_INF: u8 = 0x03;
const NUM_BINARY: u8 = 0x04;

/// The canonical equality key of a [`Member`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey(Vec<u8>);

impl JoinKey {
    /// Encode a member as it appears at the top of a value set.
    ///
    /// Fails only on malformed BSON inside arrays or sub-documents.
    pub fn of(member: &Member<'_>) -> Result<Self, bson::error::Error> {
        let mut buf = Vec::with_capacity(16);
        match member.value() {
            Some(value) if !member.is_nullish() => encode_value(&mut buf, value)?,
            _ => buf.push(NULLISH),
        }
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True for the shared key of `Missing`, `null` and `undefined`.
    pub fn is_nullish(&self) -> bool {
        self.0 == [NULLISH]
    }
}

/// Nested values keep `null` and `undefined` apart; only the top level
/// folds them together.
fn encode_value(buf: &mut Vec<u8>, value: RawBsonRef<'_>) -> Result<(), bson::error::Error> {
    match value {
        RawBsonRef::Double(f) => encode_number(buf, Number::from_f64(f)),
        RawBsonRef::Int32(n) => encode_number(buf, Number::from_i64(i64::from(n))),
        RawBsonRef::Int64(n) => encode_number(buf, Number::from_i64(n)),
        RawBsonRef::Decimal128(d) => encode_number(buf, Number::from_decimal128(d)),
        RawBsonRef::String(s) | RawBsonRef::Symbol(s) => {
            buf.push(ElementType::String as u8);
            encode_bytes(buf, s.as_bytes());
        }
        RawBsonRef::Document(doc) => encode_document(buf, doc)?,
        RawBsonRef::Array(arr) => {
            buf.push(ElementType::Array as u8);
            for elem in arr {
                buf.push(ENTRY);
                encode_value(buf, elem?)?;
            }
            buf.push(END);
        }
        RawBsonRef::Binary(bin) => {
            buf.push(ElementType::Binary as u8);
            buf.push(u8::from(bin.subtype));
            encode_bytes(buf, bin.bytes);
        }
        RawBsonRef::Undefined => buf.push(ElementType::Undefined as u8),
        RawBsonRef::ObjectId(oid) => {
            buf.push(ElementType::ObjectId as u8);
            buf.extend_from_slice(&oid.bytes());
        }
        RawBsonRef::Boolean(b) => {
            buf.push(ElementType::Boolean as u8);
            buf.push(u8::from(b));
        }
        RawBsonRef::DateTime(dt) => {
            buf.push(ElementType::DateTime as u8);
            buf.extend_from_slice(&dt.timestamp_millis().to_be_bytes());
        }
        RawBsonRef::Null => buf.push(ElementType::Null as u8),
        RawBsonRef::RegularExpression(re) => {
            buf.push(ElementType::RegularExpression as u8);
            encode_text(buf, &re.pattern);
            encode_text(buf, &re.options);
        }
        RawBsonRef::DbPointer(ptr) => {
            buf.push(ElementType::DbPointer as u8);
            encode_bytes(buf, format!("{ptr:?}").as_bytes());
        }
        RawBsonRef::JavaScriptCode(code) => {
            buf.push(ElementType::JavaScriptCode as u8);
            encode_bytes(buf, code.as_bytes());
        }
        RawBsonRef::JavaScriptCodeWithScope(cws) => {
            buf.push(ElementType::JavaScriptCodeWithScope as u8);
            encode_bytes(buf, cws.code.as_bytes());
            encode_document(buf, cws.scope)?;
        }
        RawBsonRef::Timestamp(ts) => {
            buf.push(ElementType::Timestamp as u8);
            buf.extend_from_slice(&ts.time.to_be_bytes());
            buf.extend_from_slice(&ts.increment.to_be_bytes());
        }
        RawBsonRef::MaxKey => buf.push(ElementType::MaxKey as u8),
        RawBsonRef::MinKey => buf.push(ElementType::MinKey as u8),
    }
    Ok(())
}

fn encode_number(buf: &mut Vec<u8>, n: Number) {
    // Every numeric type shares the Double tag.
    buf.push(ElementType::Double as u8);
    match n {
        Number::NaN => buf.push(NUM_NAN),
        Number::Infinity { negative: true } => buf.push(NUM_NEG_INF),
        Number::Infinity { negative: false } => buf.push(NUM_POS_INF),
        Number::Finite {
            negative,
            coefficient,
            exponent,
        } => {
            buf.push(NUM_FINITE);
            buf.push(u8::from(negative));
            buf.extend_from_slice(&exponent.to_be_bytes());
            buf.extend_from_slice(&coefficient.to_be_bytes());
        }
        Number::Binary {
            negative,
            mantissa,
            exponent,
        } => {
            buf.push(NUM_BINARY);
            buf.push(u8::from(negative));
            buf.extend_from_slice(&exponent.to_be_bytes());
            buf.extend_from_slice(&mantissa.to_be_bytes());
        }
    }
}

fn encode_document(buf: &mut Vec<u8>, doc: &RawDocument) -> Result<(), bson::error::Error> {
    buf.push(ElementType::EmbeddedDocument as u8);
    for entry in doc.iter() {
        let (name, value) = entry?;
        buf.push(ENTRY);
        encode_bytes(buf, name.as_str().as_bytes());
        encode_value(buf, value)?;
    }
    buf.push(END);
    Ok(())
}

fn encode_text(buf: &mut Vec<u8>, text: &impl fmt::Display) {
    encode_bytes(buf, text.to_string().as_bytes());
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}
