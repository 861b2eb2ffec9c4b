use bson::raw::RawBsonRef;

/// One member of a [`LogicalValueSet`](crate::LogicalValueSet).
///
/// `Missing` is a resolution outcome, never a stored value: it records that a
/// path ran out of document before it ran out of segments. For matching it is
/// interchangeable with `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'a> {
    Missing,
    Value(RawBsonRef<'a>),
}

impl<'a> Member<'a> {
    /// The stored value, if this member is not `Missing`.
    pub fn value(&self) -> Option<RawBsonRef<'a>> {
        match self {
            Self::Missing => None,
            Self::Value(v) => Some(*v),
        }
    }

    /// True for `Missing`, `null` and `undefined`, the values an equality
    /// with `null` accepts.
    pub fn is_nullish(&self) -> bool {
        matches!(
            self,
            Self::Missing | Self::Value(RawBsonRef::Null) | Self::Value(RawBsonRef::Undefined)
        )
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Value(RawBsonRef::Undefined))
    }
}

impl<'a> From<RawBsonRef<'a>> for Member<'a> {
    fn from(value: RawBsonRef<'a>) -> Self {
        Self::Value(value)
    }
}
