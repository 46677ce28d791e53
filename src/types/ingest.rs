//! This module contains the ingestion of host-language type names and
//! variable declarations into the semantic type algebra, together with the
//! specialization of general types to data locations and its inverse.
//!
//! Ingestion trusts the host frontend: the host AST has already been fully
//! resolved and type checked, so a malformed host type name here is an
//! internal error rather than a user diagnostic.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    constant::{BYTE_SIZE_BITS, DEFAULT_INT_BITS, MAX_FIXED_BYTES_WIDTH, MAX_INT_BITS},
    sol::{ArrayLength, Namespace, SolTypeName, TypeDefRef, VarId, VarScope, Visibility},
    types::{DataLocation, Type},
};

lazy_static! {
    /// Signed and unsigned integer tokens, with an optional explicit width.
    static ref INT_TYPE_RE: Regex =
        Regex::new(r"^(u?)int([0-9]*)$").expect("integer type pattern is valid");

    /// Fixed-size byte array tokens. The bare `bytes` token is the dynamic
    /// byte array and is matched separately.
    static ref FIXED_BYTES_RE: Regex =
        Regex::new(r"^bytes([0-9]+)$").expect("fixed bytes pattern is valid");

    /// The internal token the host frontend gives to integer constants.
    static ref INT_CONST_RE: Regex =
        Regex::new(r"^int_const ").expect("integer constant pattern is valid");
}

/// Parses an elementary type token into the algebra, returning [`None`] for
/// tokens that are not an elementary type (including integer widths and byte
/// widths outside their valid ranges).
pub(crate) fn elementary_type(name: &str) -> Option<Type> {
    match name {
        "bool" => return Some(Type::Bool),
        "address" => return Some(Type::address(false)),
        "address payable" => return Some(Type::address(true)),
        "byte" => return Some(Type::fixed_bytes(1)),
        "bytes" => return Some(Type::Bytes),
        "string" => return Some(Type::String),
        _ => (),
    }

    if INT_CONST_RE.is_match(name) {
        return Some(Type::IntLiteral);
    }

    if let Some(caps) = INT_TYPE_RE.captures(name) {
        let signed = caps[1].is_empty();
        let bits = if caps[2].is_empty() {
            DEFAULT_INT_BITS
        } else {
            caps[2].parse::<u16>().ok()?
        };
        if bits == 0 || bits > MAX_INT_BITS || bits % BYTE_SIZE_BITS != 0 {
            return None;
        }
        return Some(Type::Int { bits, signed });
    }

    if let Some(caps) = FIXED_BYTES_RE.captures(name) {
        let width = caps[1].parse::<u8>().ok()?;
        if width == 0 || width > MAX_FIXED_BYTES_WIDTH {
            return None;
        }
        return Some(Type::fixed_bytes(width));
    }

    None
}

/// Converts a host type name into a general (location-free) semantic type.
///
/// # Panics
///
/// Panics when the type name is one a resolved host AST can never produce: an
/// unknown elementary token, an array length that is not an integer literal,
/// or a function type over untyped variables.
#[must_use]
pub fn type_name_to_type(ns: &Namespace, type_name: &SolTypeName) -> Type {
    match type_name {
        SolTypeName::Elementary { name } => elementary_type(name)
            .unwrap_or_else(|| panic!("unknown elementary type name `{name}`")),
        SolTypeName::Array { element, length } => {
            let element = type_name_to_type(ns, element);
            let size = match length {
                ArrayLength::Dynamic => None,
                ArrayLength::Fixed(size) => Some(*size),
                ArrayLength::Unresolved => {
                    panic!("array length is not an integer literal")
                }
            };
            Type::array(element, size)
        }
        SolTypeName::UserDefined { def } => Type::UserDefined {
            name: ns.qualified_name(*def),
            def: *def,
        },
        SolTypeName::Function {
            params,
            returns,
            visibility,
            mutability,
        } => {
            let ingest_all = |vars: &[VarId]| {
                vars.iter()
                    .map(|v| {
                        variable_to_type(ns, *v, None)
                            .expect("function type over an untyped variable")
                    })
                    .collect()
            };
            Type::function(
                ingest_all(params),
                ingest_all(returns),
                *visibility,
                *mutability,
            )
        }
        SolTypeName::Mapping { key, value } => Type::mapping(
            type_name_to_type(ns, key),
            type_name_to_type(ns, value),
        ),
    }
}

/// Ingests the declared type of `var` and specializes it to the variable's
/// effective data location.
///
/// The effective location is the declared one when present; otherwise it is
/// implied by the declaration site: storage for state variables, calldata for
/// the parameters and returns of external functions and memory for those of
/// any other function, and the container's location (`base_loc`) for struct
/// fields.
///
/// Returns [`None`] when the frontend recorded no resolvable type for the
/// variable.
#[must_use]
pub fn variable_to_type(ns: &Namespace, var: VarId, base_loc: Option<DataLocation>) -> Option<Type> {
    let decl = ns.variable(var);
    let general = type_name_to_type(ns, decl.type_name.as_ref()?);

    let implied = match decl.scope {
        VarScope::ContractState(_) => Some(DataLocation::Storage),
        VarScope::Parameter(f) | VarScope::Return(f) => {
            if ns.function(f).visibility == Visibility::External {
                Some(DataLocation::CallData)
            } else {
                Some(DataLocation::Memory)
            }
        }
        VarScope::StructField(_) => base_loc,
    };

    match decl.location.or(implied) {
        Some(loc) => Some(specialize(general, loc)),
        None => {
            debug_assert!(!general.is_reference(), "reference type with no location");
            Some(general)
        }
    }
}

/// Specializes the general type `ty` to the data location `loc` by wrapping
/// every reference type in a pointer.
///
/// Contracts and mappings ignore the requested location: both always live in
/// storage, and a mapping's keys are always memory copies while its values
/// stay in storage.
#[must_use]
pub fn specialize(ty: Type, loc: DataLocation) -> Type {
    match ty {
        Type::Bytes | Type::String => Type::pointer(ty, loc),
        Type::Array { element, size } => {
            Type::pointer(Type::Array { element: Box::new(specialize(*element, loc)), size }, loc)
        }
        Type::Mapping { key, value } => Type::pointer(
            Type::mapping(
                specialize(*key, DataLocation::Memory),
                specialize(*value, DataLocation::Storage),
            ),
            DataLocation::Storage,
        ),
        Type::UserDefined { def, .. } => match def {
            TypeDefRef::Contract(_) => Type::pointer(ty, DataLocation::Storage),
            TypeDefRef::Struct(_) => Type::pointer(ty, loc),
            TypeDefRef::Enum(_) => ty,
        },
        other => other,
    }
}

/// Strips every pointer from `ty`, recovering the general type it was
/// specialized from.
///
/// This is the left inverse of specialization: for any general `t` and
/// location `l`, `despecialize(specialize(t, l)) == t`.
#[must_use]
pub fn despecialize(ty: &Type) -> Type {
    match ty {
        Type::Pointer { to, .. } => despecialize(to),
        Type::Array { element, size } => Type::array(despecialize(element), *size),
        Type::Mapping { key, value } => Type::mapping(despecialize(key), despecialize(value)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod test {
    use crate::{
        sol::{ContractKind, Namespace, SolTypeName, TypeDefRef, Visibility},
        types::{
            ingest::{despecialize, elementary_type, specialize, type_name_to_type},
            DataLocation,
            Type,
        },
    };

    #[test]
    fn parses_elementary_type_tokens() {
        assert_eq!(elementary_type("bool"), Some(Type::Bool));
        assert_eq!(elementary_type("address"), Some(Type::address(false)));
        assert_eq!(
            elementary_type("address payable"),
            Some(Type::address(true))
        );
        assert_eq!(elementary_type("uint"), Some(Type::uint(256)));
        assert_eq!(elementary_type("int"), Some(Type::int(256)));
        assert_eq!(elementary_type("uint48"), Some(Type::uint(48)));
        assert_eq!(elementary_type("byte"), Some(Type::fixed_bytes(1)));
        assert_eq!(elementary_type("bytes32"), Some(Type::fixed_bytes(32)));
        assert_eq!(elementary_type("bytes"), Some(Type::Bytes));
        assert_eq!(elementary_type("string"), Some(Type::String));
        assert_eq!(elementary_type("int_const 57"), Some(Type::IntLiteral));
    }

    #[test]
    fn rejects_out_of_range_widths() {
        assert_eq!(elementary_type("uint255"), None);
        assert_eq!(elementary_type("int264"), None);
        assert_eq!(elementary_type("uint0"), None);
        assert_eq!(elementary_type("bytes33"), None);
        assert_eq!(elementary_type("bytes0"), None);
        assert_eq!(elementary_type("fixed128x18"), None);
    }

    #[test]
    fn specialization_wraps_reference_types() {
        let array = Type::array(Type::uint(8), None);
        assert_eq!(
            specialize(array.clone(), DataLocation::Memory),
            Type::pointer(array, DataLocation::Memory)
        );

        // Value types are untouched.
        assert_eq!(
            specialize(Type::uint(64), DataLocation::Storage),
            Type::uint(64)
        );

        // Mapping keys are memory copies; values stay in storage.
        let mapping = Type::mapping(Type::String, Type::Bytes);
        assert_eq!(
            specialize(mapping, DataLocation::Memory),
            Type::pointer(
                Type::mapping(
                    Type::pointer(Type::String, DataLocation::Memory),
                    Type::pointer(Type::Bytes, DataLocation::Storage),
                ),
                DataLocation::Storage,
            )
        );
    }

    #[test]
    fn despecialize_inverts_specialize() {
        let mut ns = Namespace::new();
        let unit = ns.add_source_unit();
        let vault = ns.declare_contract(unit, "Vault", ContractKind::Contract, vec![]);
        let position = ns.declare_struct(unit, Some(vault), "Position");
        ns.add_field(
            position,
            "size",
            SolTypeName::elementary("uint256"),
            None,
        );

        let generals = vec![
            type_name_to_type(&ns, &SolTypeName::elementary("uint256")),
            type_name_to_type(&ns, &SolTypeName::elementary("bytes")),
            type_name_to_type(&ns, &SolTypeName::array(SolTypeName::elementary("string"))),
            type_name_to_type(
                &ns,
                &SolTypeName::fixed_array(
                    SolTypeName::array(SolTypeName::elementary("uint8")),
                    7_u32,
                ),
            ),
            type_name_to_type(
                &ns,
                &SolTypeName::mapping(
                    SolTypeName::elementary("address"),
                    SolTypeName::array(SolTypeName::elementary("bytes4")),
                ),
            ),
            type_name_to_type(
                &ns,
                &SolTypeName::user_defined(TypeDefRef::Struct(position)),
            ),
            type_name_to_type(&ns, &SolTypeName::user_defined(TypeDefRef::Contract(vault))),
        ];

        for general in generals {
            for loc in [
                DataLocation::Storage,
                DataLocation::Memory,
                DataLocation::CallData,
            ] {
                let specialized = specialize(general.clone(), loc);
                assert!(specialized.is_well_formed() || !general.is_reference());
                assert_eq!(despecialize(&specialized), general);
            }
        }
    }

    #[test]
    fn state_variables_default_to_storage() {
        let mut ns = Namespace::new();
        let unit = ns.add_source_unit();
        let vault = ns.declare_contract(unit, "Vault", ContractKind::Contract, vec![]);
        let names = ns.declare_state_var(
            vault,
            "names",
            SolTypeName::array(SolTypeName::elementary("string")),
            None,
            Visibility::Internal,
        );

        assert_eq!(
            super::variable_to_type(&ns, names, None),
            Some(Type::pointer(
                Type::array(
                    Type::pointer(Type::String, DataLocation::Storage),
                    None
                ),
                DataLocation::Storage,
            ))
        );
    }
}
