//! Hardware types and the interned type database.
//!
//! Aggregate types ([`Type::Array`], [`Type::Record`]) determine the shape of a
//! value's field tree. Two values of the same [`TypeId`] have congruent field
//! trees, which is what makes selector paths transferable between an original
//! value and its rebased copy.

use crate::ids::TypeId;
use crate::value::Selector;
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// A hardware type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    /// A single bit.
    Bit,
    /// A clock.
    Clock,
    /// A bit vector of known width.
    BitVec {
        /// The number of bits.
        width: u32,
        /// Whether arithmetic on the vector is signed.
        signed: bool,
    },
    /// A fixed-length vector of identically typed elements.
    Array {
        /// The element type.
        element: TypeId,
        /// The number of elements.
        size: u32,
    },
    /// A bundle of named fields.
    Record {
        /// The record type name.
        name: Ident,
        /// Named fields with their types, in declaration order.
        fields: Vec<(Ident, TypeId)>,
    },
}

impl Type {
    /// Returns `true` for types that own a field tree.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::Record { .. })
    }
}

/// Central type database.
///
/// Each unique [`Type`] is stored once, so type equality is ID equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDb {
    types: Vec<Type>,
}

impl TypeDb {
    /// Creates an empty type database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, returning the existing ID if an identical type exists.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(i) = self.types.iter().position(|existing| existing == &ty) {
            return TypeId::from_raw(i as u32);
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Returns the type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.as_raw() as usize]
    }

    /// Returns `true` if `id` names an aggregate type.
    pub fn is_aggregate(&self, id: TypeId) -> bool {
        self.get(id).is_aggregate()
    }

    /// Returns the selectors and element types of an aggregate's direct
    /// children, in field-tree order. Ground types have no children.
    pub fn child_selectors(&self, id: TypeId) -> Vec<(Selector, TypeId)> {
        match self.get(id) {
            Type::Array { element, size } => (0..*size)
                .map(|index| (Selector::Index(index), *element))
                .collect(),
            Type::Record { fields, .. } => fields
                .iter()
                .map(|(name, ty)| (Selector::Field(*name), *ty))
                .collect(),
            Type::Bit | Type::Clock | Type::BitVec { .. } => Vec::new(),
        }
    }

    /// Returns the child position `selector` resolves to within type `id`.
    ///
    /// `None` means the selector does not fit the declared shape: a missing
    /// field name, an index past the array length, or any selector applied to
    /// a ground type.
    pub fn child_position(&self, id: TypeId, selector: &Selector) -> Option<usize> {
        match (self.get(id), selector) {
            (Type::Array { size, .. }, Selector::Index(index)) if index < size => {
                Some(*index as usize)
            }
            (Type::Record { fields, .. }, Selector::Field(name)) => {
                fields.iter().position(|(field, _)| field == name)
            }
            _ => None,
        }
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types have been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
