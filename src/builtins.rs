//! This module contains the registry of builtin symbols available to every
//! annotation expression: the environment structs (`block`, `msg`, `tx`), the
//! global functions of the host language, and the members available on
//! address values.
//!
//! The registry is a pure lookup table; none of the builtins are evaluated.

use crate::{
    constant::DEFAULT_INT_BITS,
    sol::{Mutability, Visibility},
    types::{ingest, DataLocation, Type},
};

/// Recognises the builtin type tokens (`bool`, `uint256`, `bytes4`, ..) that
/// may appear as a bare identifier, returning the type of the corresponding
/// type literal.
///
/// Out-of-range widths such as `uint255` or `bytes33` are not builtin types
/// and resolve to [`None`].
#[must_use]
pub fn type_name(name: &str) -> Option<Type> {
    ingest::elementary_type(name).map(Type::type_name)
}

/// Looks up the type of the builtin symbol `name`.
#[must_use]
pub fn symbol(name: &str) -> Option<Type> {
    let uint256 = || Type::uint(DEFAULT_INT_BITS);
    let payable_address = || Type::address(true);
    let memory_bytes = || Type::pointer(Type::Bytes, DataLocation::Memory);
    let pure_fn = |params, returns| {
        Type::function(params, returns, Visibility::Internal, Mutability::Pure)
    };
    let view_fn = |params, returns| {
        Type::function(params, returns, Visibility::Internal, Mutability::View)
    };

    let ty = match name {
        "block" => Type::BuiltinStruct {
            name: "block".into(),
            members: vec![
                ("coinbase".into(), payable_address()),
                ("difficulty".into(), uint256()),
                ("gaslimit".into(), uint256()),
                ("number".into(), uint256()),
                ("timestamp".into(), uint256()),
            ],
        },
        "msg" => Type::BuiltinStruct {
            name: "msg".into(),
            members: vec![
                ("data".into(), Type::pointer(Type::Bytes, DataLocation::CallData)),
                ("sender".into(), payable_address()),
                ("sig".into(), Type::fixed_bytes(4)),
                ("value".into(), uint256()),
            ],
        },
        "tx" => Type::BuiltinStruct {
            name: "tx".into(),
            members: vec![
                ("gasprice".into(), uint256()),
                ("origin".into(), payable_address()),
            ],
        },
        "blockhash" => view_fn(vec![uint256()], vec![Type::fixed_bytes(32)]),
        "gasleft" => view_fn(vec![], vec![uint256()]),
        "now" => uint256(),
        "addmod" | "mulmod" => {
            pure_fn(vec![uint256(), uint256(), uint256()], vec![uint256()])
        }
        "keccak256" | "sha256" => {
            pure_fn(vec![memory_bytes()], vec![Type::fixed_bytes(32)])
        }
        "ripemd160" => pure_fn(vec![memory_bytes()], vec![Type::fixed_bytes(20)]),
        "ecrecover" => pure_fn(
            vec![
                Type::fixed_bytes(32),
                Type::uint(8),
                Type::fixed_bytes(32),
                Type::fixed_bytes(32),
            ],
            vec![Type::address(false)],
        ),
        _ => return None,
    };

    Some(ty)
}

/// Looks up the type of the builtin member `name` available on address
/// values (and on contract values, which coerce to addresses for member
/// access).
#[must_use]
pub fn address_member(name: &str) -> Option<Type> {
    let memory_bytes = || Type::pointer(Type::Bytes, DataLocation::Memory);
    let external_fn = |params, returns, mutability| {
        Type::function(params, returns, Visibility::External, mutability)
    };

    let ty = match name {
        "balance" => Type::uint(DEFAULT_INT_BITS),
        "transfer" => external_fn(
            vec![Type::uint(DEFAULT_INT_BITS)],
            vec![],
            Mutability::NonPayable,
        ),
        "send" => external_fn(
            vec![Type::uint(DEFAULT_INT_BITS)],
            vec![Type::Bool],
            Mutability::NonPayable,
        ),
        "call" => external_fn(
            vec![memory_bytes()],
            vec![Type::Bool, memory_bytes()],
            Mutability::Payable,
        ),
        "delegatecall" => external_fn(
            vec![memory_bytes()],
            vec![Type::Bool, memory_bytes()],
            Mutability::NonPayable,
        ),
        "staticcall" => external_fn(
            vec![memory_bytes()],
            vec![Type::Bool, memory_bytes()],
            Mutability::View,
        ),
        _ => return None,
    };

    Some(ty)
}
