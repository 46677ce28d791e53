//! Tests for index and member access.

mod common;

use annotation_typechecker::{
    ast::ExprArena,
    error::typecheck::Error,
    sol::TypeDefRef,
    types::{DataLocation, Type},
    TypeChecker,
};
use common::fixture;

#[test]
fn byte_arrays_index_to_single_bytes() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();

    let s_by = arena.ident("sBy", 0..3);
    let one = arena.number(1, 4..5);
    let dynamic = arena.index(s_by, one, 0..6);

    let s_fb32 = arena.ident("sFB32", 9..14);
    let zero = arena.number(0, 15..16);
    let fixed = arena.index(s_fb32, zero, 9..17);

    let ctx = f.contract_ctx();
    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(dynamic, &ctx)?, Type::uint(8));
    assert_eq!(checker.check(fixed, &ctx)?, Type::uint(8));
    Ok(())
}

#[test]
fn arrays_index_to_their_element_type() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();
    let s_arr = arena.ident("sArr", 0..4);
    let zero = arena.number(0, 5..6);
    let element = arena.index(s_arr, zero, 0..7);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(element, &f.contract_ctx())?, Type::uint(64));
    Ok(())
}

#[test]
fn array_indices_must_be_integers() {
    let f = fixture();
    let mut arena = ExprArena::new();
    let s_arr = arena.ident("sArr", 0..4);
    let s_b = arena.ident("sB", 5..7);
    let element = arena.index(s_arr, s_b, 0..8);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    let err = checker.check(element, &f.contract_ctx()).unwrap_err();

    assert!(matches!(err.kind, Error::WrongType { .. }));
    assert_eq!(err.range, (5..7).into());
}

#[test]
fn mappings_index_by_castable_keys() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();

    let balances = arena.ident("balances", 0..8);
    let s_a = arena.ident("sA", 9..11);
    let entry = arena.index(balances, s_a, 0..12);

    let balances2 = arena.ident("balances", 15..23);
    let s_b = arena.ident("sB", 24..26);
    let bad = arena.index(balances2, s_b, 15..27);

    let ctx = f.contract_ctx();
    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(entry, &ctx)?, Type::uint(64));

    let err = checker.check(bad, &ctx).unwrap_err();
    assert!(matches!(err.kind, Error::WrongType { .. }));
    assert_eq!(err.range, (24..26).into());
    Ok(())
}

#[test]
fn only_reference_shapes_are_indexable() {
    let f = fixture();
    let mut arena = ExprArena::new();
    let s_v = arena.ident("sV", 0..2);
    let zero = arena.number(0, 3..4);
    let indexed = arena.index(s_v, zero, 0..5);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    let err = checker.check(indexed, &f.contract_ctx()).unwrap_err();

    assert!(matches!(err.kind, Error::WrongType { .. }));
    assert_eq!(err.range, (0..2).into());
}

#[test]
fn arrays_expose_their_length() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();
    let s_arr = arena.ident("sArr", 0..4);
    let length = arena.member(s_arr, "length", 0..11);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(length, &f.contract_ctx())?, Type::uint(256));
    Ok(())
}

#[test]
fn struct_fields_inherit_the_container_location() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();

    let s_pair = arena.ident("sPair", 0..5);
    let amount = arena.member(s_pair, "amount", 0..12);

    let s_pair2 = arena.ident("sPair", 15..20);
    let blob = arena.member(s_pair2, "blob", 15..25);

    let ctx = f.contract_ctx();
    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(amount, &ctx)?, Type::uint(128));
    // `sPair` lives in storage, so its `bytes` field does too.
    assert_eq!(
        checker.check(blob, &ctx)?,
        Type::pointer(Type::Bytes, DataLocation::Storage)
    );
    Ok(())
}

#[test]
fn missing_struct_fields_are_reported() {
    let f = fixture();
    let mut arena = ExprArena::new();
    let s_pair = arena.ident("sPair", 0..5);
    let missing = arena.member(s_pair, "weight", 0..12);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    let err = checker.check(missing, &f.contract_ctx()).unwrap_err();

    assert!(matches!(err.kind, Error::NoField { .. }));
    assert_eq!(err.range, (0..12).into());
}

#[test]
fn enum_constants_have_the_enum_type() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();
    let foo_enum = arena.ident("FooEnum", 0..7);
    let a = arena.member(foo_enum, "A", 0..9);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    let ty = checker.check(a, &f.contract_ctx())?;

    assert_eq!(
        ty,
        Type::UserDefined {
            name: "Foo.FooEnum".into(),
            def: TypeDefRef::Enum(f.foo_enum),
        }
    );
    Ok(())
}

#[test]
fn missing_enum_constants_are_reported() {
    let f = fixture();
    let mut arena = ExprArena::new();
    let foo_enum = arena.ident("FooEnum", 0..7);
    let x = arena.member(foo_enum, "X", 0..9);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    let err = checker.check(x, &f.contract_ctx()).unwrap_err();

    assert_eq!(
        err.kind,
        Error::NoField {
            base: Type::UserTypeName {
                name: "Foo.FooEnum".into(),
                def: TypeDefRef::Enum(f.foo_enum),
            },
            member: "X".into(),
        }
    );
}

#[test]
fn addresses_expose_the_builtin_members() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();

    let s_a = arena.ident("sA", 0..2);
    let balance = arena.member(s_a, "balance", 0..10);

    let s_a2 = arena.ident("sA", 13..15);
    let missing = arena.member(s_a2, "frobnicate", 13..26);

    let ctx = f.contract_ctx();
    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(balance, &ctx)?, Type::uint(256));

    let err = checker.check(missing, &ctx).unwrap_err();
    assert!(matches!(err.kind, Error::NoField { .. }));
    Ok(())
}

#[test]
fn contract_values_fall_back_to_address_members() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();
    let this = arena.ident("this", 0..4);
    let balance = arena.member(this, "balance", 0..12);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(checker.check(balance, &f.contract_ctx())?, Type::uint(256));
    Ok(())
}

#[test]
fn environment_struct_members_miss_with_a_diagnostic() {
    let f = fixture();
    let mut arena = ExprArena::new();
    let msg = arena.ident("msg", 0..3);
    let missing = arena.member(msg, "nonsense", 0..12);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    let err = checker.check(missing, &f.contract_ctx()).unwrap_err();

    assert!(matches!(err.kind, Error::NoField { .. }));
}

#[test]
fn library_members_resolve_through_the_type_name() -> anyhow::Result<()> {
    let f = fixture();
    let mut arena = ExprArena::new();

    let lib = arena.ident("Lib", 0..3);
    let ladd = arena.member(lib, "ladd", 0..8);
    let selector = arena.member(ladd, "selector", 0..17);

    let mut checker = TypeChecker::new(&f.ns, &arena);
    assert_eq!(
        checker.check(selector, &f.contract_ctx())?,
        Type::fixed_bytes(4)
    );
    Ok(())
}
