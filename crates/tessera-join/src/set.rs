use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::JoinError;
use crate::key::JoinKey;
use crate::member::Member;

/// The values a field path denotes within one document.
///
/// Members are deduplicated by [`JoinKey`]: `1`, `1.0` and `NumberLong(1)`
/// occupy one slot, as do `Missing`, `null` and `undefined`. The first member
/// inserted for a key is the one kept. Iteration follows key order.
#[derive(Debug, Clone, Default)]
pub struct LogicalValueSet<'a> {
    members: BTreeMap<JoinKey, Member<'a>>,
}

impl<'a> LogicalValueSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. Returns false if an equal member was already present.
    pub fn insert(&mut self, member: Member<'a>) -> Result<bool, JoinError> {
        let key = JoinKey::of(&member)?;
        match self.members.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(member);
                Ok(true)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Membership under join equality.
    pub fn contains(&self, member: &Member<'_>) -> Result<bool, JoinError> {
        Ok(self.members.contains_key(&JoinKey::of(member)?))
    }

    pub fn contains_key(&self, key: &JoinKey) -> bool {
        self.members.contains_key(key)
    }

    /// True if the set holds `Missing`, `null` or `undefined`.
    pub fn contains_nullish(&self) -> bool {
        self.members.keys().any(JoinKey::is_nullish)
    }

    pub fn keys(&self) -> impl Iterator<Item = &JoinKey> {
        self.members.keys()
    }

    pub fn members(&self) -> impl Iterator<Item = &Member<'a>> {
        self.members.values()
    }
}
