//! This module contains the algebra of semantic types that the checker
//! assigns to annotation expressions, together with its structural equality
//! and canonical pretty printing.
//!
//! # General and Specialized Types
//!
//! The algebra distinguishes *general* types, which carry no data location
//! and describe type templates (the result of ingesting a host type name),
//! from *specialized* types, in which every reference type is wrapped in a
//! location-tagged [`Type::Pointer`]. Expressions always have specialized
//! types; type literals and `using for` targets are general. Conversion in
//! both directions lives in [`ingest`].
//!
//! # Well-Formedness
//!
//! A specialized type never exposes a bare reference type (arrays, `bytes`,
//! `string`, mappings, structs and contracts): those occur only as the target
//! of a pointer. Value types, tuples and the checker-internal variants never
//! occur inside a pointer.

pub mod ingest;

use std::fmt::{Display, Formatter};

use derivative::Derivative;
use ethnum::U256;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    ast::ExprId,
    sol::{FunctionId, Mutability, TypeDefRef, VarId, Visibility},
};

/// The data location qualifying a reference type.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLocation {
    Storage,
    Memory,
    CallData,
}

impl Display for DataLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Self::Storage => "storage",
            Self::Memory => "memory",
            Self::CallData => "calldata",
        };
        write!(f, "{str}")
    }
}

/// A member of an overload set: either a host function or a public state
/// variable standing in for its synthesised getter.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Callable {
    Function(FunctionId),
    Getter(VarId),
}

/// The closed sum of semantic types.
///
/// # Invariants
///
/// Each individual variant in the enum describes the invariants placed upon
/// it. It is the responsibility of the code constructing these values to
/// ensure that the invariants are satisfied; code consuming them assumes that
/// they hold.
#[derive(Clone, Debug, Derivative, Deserialize, Eq, Serialize)]
#[derivative(PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Bool,

    /// An address, `payable` or not.
    Address { payable: bool },

    /// An integer of a given width in bits, where `8 <= bits <= 256` and
    /// `bits % 8 == 0`.
    Int { bits: u16, signed: bool },

    /// The type of an integer literal before it is widened to a concrete
    /// [`Self::Int`] by unification or an implicit cast. Never the final type
    /// of a stored value.
    IntLiteral,

    /// A byte array of fixed `width`, where `1 <= width <= 32`.
    FixedBytes { width: u8 },

    /// A dynamically-sized byte array. A reference type.
    Bytes,

    /// A dynamically-sized string. A reference type.
    String,

    /// The type of a string or hex literal before it is converted to
    /// [`Self::Bytes`] or [`Self::String`] by an implicit cast.
    StringLiteral,

    /// An array of `element` values, dynamically sized when `size` is
    /// [`None`]. A reference type.
    Array {
        element: Box<Type>,
        size: Option<U256>,
    },

    /// A mapping from `key` to `value`. A reference type that only ever
    /// lives in storage.
    Mapping { key: Box<Type>, value: Box<Type> },

    /// A user-defined struct, enum or contract type. Structs and contracts
    /// are reference types; enums are value types.
    UserDefined { name: String, def: TypeDefRef },

    /// A tuple of values. Tuples are not first class: they arise only as the
    /// type of a multi-return call or of the right-hand side of a `let`, and
    /// never occur inside a pointer.
    Tuple { elements: Vec<Type> },

    /// A reference type qualified with the data `location` it lives in.
    Pointer { to: Box<Type>, location: DataLocation },

    /// A function value.
    Function {
        params: Vec<Type>,
        returns: Vec<Type>,
        visibility: Visibility,
        mutability: Mutability,
    },

    /// One of the builtin environment structs (`block`, `msg`, `tx`), as a
    /// flat member table.
    BuiltinStruct {
        name: String,
        members: Vec<(String, Type)>,
    },

    /// The type of a builtin type literal used as an expression, such as the
    /// callee of the cast `uint64(x)`.
    TypeName { inner: Box<Type> },

    /// The type of a user-defined type literal used as an expression.
    UserTypeName { name: String, def: TypeDefRef },

    /// An unresolved overload set, produced by name or member resolution and
    /// narrowed to a single definition at its call site.
    ///
    /// When the set was produced by a `using for` lookup, `default_arg` holds
    /// the receiver expression to prepend to the call's arguments. The
    /// receiver does not participate in equality: two sets naming the same
    /// definitions are the same type.
    FunctionSet {
        defs: Vec<Callable>,
        #[derivative(PartialEq = "ignore", Hash = "ignore")]
        default_arg: Option<ExprId>,
    },
}

impl Type {
    /// Constructs a boolean type.
    #[must_use]
    pub fn bool() -> Self {
        Self::Bool
    }

    /// Constructs an address type.
    #[must_use]
    pub fn address(payable: bool) -> Self {
        Self::Address { payable }
    }

    /// Constructs a signed integer of the provided width in `bits`.
    #[must_use]
    pub fn int(bits: u16) -> Self {
        Self::Int { bits, signed: true }
    }

    /// Constructs an unsigned integer of the provided width in `bits`.
    #[must_use]
    pub fn uint(bits: u16) -> Self {
        Self::Int {
            bits,
            signed: false,
        }
    }

    /// Constructs a fixed-size byte array of the provided `width`.
    #[must_use]
    pub fn fixed_bytes(width: u8) -> Self {
        Self::FixedBytes { width }
    }

    /// Constructs an array of `element` values, dynamically sized when
    /// `size` is [`None`].
    #[must_use]
    pub fn array(element: Type, size: impl Into<Option<U256>>) -> Self {
        Self::Array {
            element: Box::new(element),
            size: size.into(),
        }
    }

    /// Constructs a mapping from `key` to `value`.
    #[must_use]
    pub fn mapping(key: Type, value: Type) -> Self {
        Self::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Constructs a tuple of the provided `elements`.
    #[must_use]
    pub fn tuple(elements: Vec<Type>) -> Self {
        Self::Tuple { elements }
    }

    /// Constructs a pointer to `to` in the provided `location`.
    #[must_use]
    pub fn pointer(to: Type, location: DataLocation) -> Self {
        Self::Pointer {
            to: Box::new(to),
            location,
        }
    }

    /// Constructs a function type.
    #[must_use]
    pub fn function(
        params: Vec<Type>,
        returns: Vec<Type>,
        visibility: Visibility,
        mutability: Mutability,
    ) -> Self {
        Self::Function {
            params,
            returns,
            visibility,
            mutability,
        }
    }

    /// Constructs the type of a builtin type literal.
    #[must_use]
    pub fn type_name(inner: Type) -> Self {
        Self::TypeName {
            inner: Box::new(inner),
        }
    }

    /// Constructs an overload set over the provided definitions.
    #[must_use]
    pub fn fun_set(defs: Vec<Callable>) -> Self {
        Self::FunctionSet {
            defs,
            default_arg: None,
        }
    }

    /// Constructs an overload set with a receiver expression to prepend at
    /// the call site.
    #[must_use]
    pub fn fun_set_with_receiver(defs: Vec<Callable>, receiver: ExprId) -> Self {
        Self::FunctionSet {
            defs,
            default_arg: Some(receiver),
        }
    }

    /// Checks if `self` is an integer or integer-literal type.
    #[must_use]
    pub fn is_int_like(&self) -> bool {
        matches!(self, Self::Int { .. } | Self::IntLiteral)
    }

    /// Checks if `self` is a reference type, i.e. one that only occurs as
    /// the target of a pointer in a specialized type.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        match self {
            Self::Array { .. } | Self::Bytes | Self::String | Self::Mapping { .. } => true,
            Self::UserDefined { def, .. } => {
                matches!(def, TypeDefRef::Struct(_) | TypeDefRef::Contract(_))
            }
            _ => false,
        }
    }

    /// Checks that `self` satisfies the well-formedness invariant for
    /// specialized types: every reference type is wrapped in a pointer, and
    /// pointers wrap nothing else.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Pointer { to, .. } => {
                to.is_reference()
                    && match to.as_ref() {
                        Self::Array { element, .. } => element.is_well_formed(),
                        Self::Mapping { key, value } => {
                            key.is_well_formed() && value.is_well_formed()
                        }
                        _ => true,
                    }
            }
            Self::Array { .. }
            | Self::Bytes
            | Self::String
            | Self::Mapping { .. } => false,
            Self::UserDefined { def, .. } => matches!(def, TypeDefRef::Enum(_)),
            Self::Tuple { elements } => elements.iter().all(Type::is_well_formed),
            Self::Function { params, returns, .. } => {
                params.iter().all(Type::is_well_formed)
                    && returns.iter().all(Type::is_well_formed)
            }
            _ => true,
        }
    }
}

impl Display for Type {
    /// Prints the type in the canonical host-language form where one exists,
    /// and in an unambiguous internal form for the checker-internal variants.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Address { payable } => {
                if *payable {
                    write!(f, "address payable")
                } else {
                    write!(f, "address")
                }
            }
            Self::Int { bits, signed } => {
                write!(f, "{}int{bits}", if *signed { "" } else { "u" })
            }
            Self::IntLiteral => write!(f, "int_const"),
            Self::FixedBytes { width } => write!(f, "bytes{width}"),
            Self::Bytes => write!(f, "bytes"),
            Self::String => write!(f, "string"),
            Self::StringLiteral => write!(f, "literal_string"),
            Self::Array { element, size } => match size {
                Some(size) => write!(f, "{element}[{size}]"),
                None => write!(f, "{element}[]"),
            },
            Self::Mapping { key, value } => write!(f, "mapping({key} => {value})"),
            Self::UserDefined { name, .. } => write!(f, "{name}"),
            Self::Tuple { elements } => {
                write!(f, "({})", elements.iter().join(", "))
            }
            Self::Pointer { to, location } => write!(f, "{to} {location}"),
            Self::Function {
                params,
                returns,
                mutability,
                visibility,
            } => {
                write!(f, "function({})", params.iter().join(", "))?;
                match mutability {
                    Mutability::Pure => write!(f, " pure")?,
                    Mutability::View => write!(f, " view")?,
                    Mutability::Payable => write!(f, " payable")?,
                    Mutability::NonPayable => (),
                }
                if *visibility == Visibility::External {
                    write!(f, " external")?;
                }
                if !returns.is_empty() {
                    write!(f, " returns ({})", returns.iter().join(", "))?;
                }
                Ok(())
            }
            Self::BuiltinStruct { name, .. } => write!(f, "{name}"),
            Self::TypeName { inner } => write!(f, "type({inner})"),
            Self::UserTypeName { name, .. } => write!(f, "type({name})"),
            Self::FunctionSet { defs, .. } => {
                write!(f, "function_set({} candidates)", defs.len())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        sol::{EnumId, StructId, TypeDefRef},
        types::{DataLocation, Type},
    };

    #[test]
    fn equality_is_structural() {
        assert_eq!(Type::uint(256), Type::uint(256));
        assert_ne!(Type::uint(256), Type::int(256));
        assert_ne!(Type::uint(256), Type::uint(128));
        assert_ne!(Type::address(true), Type::address(false));

        let a = Type::pointer(
            Type::array(Type::uint(8), None),
            DataLocation::Memory,
        );
        let b = Type::pointer(
            Type::array(Type::uint(8), None),
            DataLocation::Memory,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn user_defined_types_compare_by_declaration() {
        let a = Type::UserDefined {
            name: "Vault.Position".into(),
            def: TypeDefRef::Struct(StructId(0)),
        };
        let b = Type::UserDefined {
            name: "Vault.Position".into(),
            def: TypeDefRef::Struct(StructId(0)),
        };
        let c = Type::UserDefined {
            name: "Mode".into(),
            def: TypeDefRef::Enum(EnumId(0)),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn prints_the_canonical_host_form() {
        assert_eq!(Type::uint(256).to_string(), "uint256");
        assert_eq!(Type::int(128).to_string(), "int128");
        assert_eq!(Type::fixed_bytes(4).to_string(), "bytes4");
        assert_eq!(
            Type::mapping(Type::uint(32), Type::int(64)).to_string(),
            "mapping(uint32 => int64)"
        );
        assert_eq!(
            Type::pointer(Type::String, DataLocation::Memory).to_string(),
            "string memory"
        );
        assert_eq!(
            Type::array(Type::uint(8), None).to_string(),
            "uint8[]"
        );
    }

    #[test]
    fn reference_types_must_sit_behind_pointers() {
        assert!(Type::uint(8).is_well_formed());
        assert!(!Type::Bytes.is_well_formed());
        assert!(Type::pointer(Type::Bytes, DataLocation::Memory).is_well_formed());
        assert!(!Type::pointer(Type::Bool, DataLocation::Memory).is_well_formed());
        assert!(!Type::pointer(
            Type::array(Type::Bytes, None),
            DataLocation::Memory
        )
        .is_well_formed());
    }
}
