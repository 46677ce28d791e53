//! This module contains the implicit conversion rules between semantic
//! types, and the unification of two operand types into their common type.

use crate::types::Type;

/// Checks if a value of type `from` is implicitly convertible to the type
/// `to`.
///
/// The conversions are deliberately narrow: identical types, widening of the
/// literal types to their concrete counterparts, non-narrowing integer
/// widening within the same signedness, forgetting payability of an address,
/// and pointers to equal types regardless of data location.
#[must_use]
pub fn implicitly_castable(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }

    match (from, to) {
        (Type::IntLiteral, Type::Int { .. }) => true,
        (Type::StringLiteral, Type::Pointer { to, .. }) => {
            matches!(to.as_ref(), Type::Bytes | Type::String)
        }
        (
            Type::Int {
                bits: from_bits,
                signed: from_signed,
            },
            Type::Int {
                bits: to_bits,
                signed: to_signed,
            },
        ) => from_signed == to_signed && from_bits <= to_bits,
        (Type::Address { .. }, Type::Address { payable: false }) => true,
        (Type::Pointer { to: from_to, .. }, Type::Pointer { to: to_to, .. }) => from_to == to_to,
        _ => false,
    }
}

/// Unifies the types of two operands into the common type that both sides
/// are implicitly convertible to, or [`None`] when neither side converts to
/// the other.
#[must_use]
pub fn unify(left: &Type, right: &Type) -> Option<Type> {
    if implicitly_castable(left, right) {
        Some(right.clone())
    } else if implicitly_castable(right, left) {
        Some(left.clone())
    } else {
        None
    }
}
