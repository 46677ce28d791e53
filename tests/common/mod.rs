//! This module contains common testing utilities for testing this library.
#![allow(dead_code)] // Not every test binary uses every helper.

use annotation_typechecker::{
    scope::TypingContext,
    sol::{
        ContractId,
        ContractKind,
        EnumId,
        FunctionId,
        Mutability,
        Namespace,
        SolTypeName,
        SourceUnitId,
        StructId,
        TypeDefRef,
        VarId,
        Visibility,
    },
};

/// A host program with one library and one contract, covering the
/// declaration shapes the checker has to resolve against:
///
/// ```solidity
/// library Lib {
///     function ladd(uint32 a, uint32 b) public pure returns (uint32) { .. }
/// }
///
/// contract Foo {
///     using Lib for uint32;
///
///     enum FooEnum { A, B, C }
///     struct Pair { uint128 amount; bytes blob; }
///
///     int128 sV1;
///     uint sV;
///     bool sB;
///     bytes sBy;
///     bytes32 sFB32;
///     address sA;
///     uint32 u32a;
///     uint32 u32b;
///     uint public sPub;
///     FooEnum public sMode;
///     Pair sPair;
///     uint64[] sArr;
///     mapping(address => uint64) balances;
///
///     function add(int8 x, uint64 y) public returns (uint64 add) { .. }
///     function idPair(uint x, uint y) public returns (uint, uint) { .. }
///     function shl(uint x) public { .. }
///     function noRet() public { .. }
/// }
/// ```
pub struct Fixture {
    pub ns: Namespace,
    pub unit: SourceUnitId,
    pub lib: ContractId,
    pub foo: ContractId,
    pub foo_enum: EnumId,
    pub pair: StructId,
    pub s_pair: VarId,
    pub ladd: FunctionId,
    pub add: FunctionId,
    pub id_pair: FunctionId,
    pub shl: FunctionId,
    pub no_ret: FunctionId,
}

impl Fixture {
    /// The typing context of an annotation on the contract itself.
    pub fn contract_ctx(&self) -> TypingContext {
        TypingContext::new(vec![self.unit], self.foo)
    }

    /// The typing context of an annotation on the given function of the
    /// contract.
    pub fn function_ctx(&self, function: FunctionId) -> TypingContext {
        self.contract_ctx().enter_function(function)
    }
}

/// Builds the fixture program described on [`Fixture`].
pub fn fixture() -> Fixture {
    let mut ns = Namespace::new();
    let unit = ns.add_source_unit();

    let lib = ns.declare_contract(unit, "Lib", ContractKind::Library, vec![]);
    let ladd = ns.declare_function(lib, "ladd", Visibility::Public, Mutability::Pure);
    ns.add_param(ladd, "a", SolTypeName::elementary("uint32"), None);
    ns.add_param(ladd, "b", SolTypeName::elementary("uint32"), None);
    ns.add_return(ladd, "", SolTypeName::elementary("uint32"), None);

    let foo = ns.declare_contract(unit, "Foo", ContractKind::Contract, vec![]);
    ns.add_using(foo, lib, Some(SolTypeName::elementary("uint32")));

    let foo_enum = ns.declare_enum(unit, Some(foo), "FooEnum", &["A", "B", "C"]);

    let pair = ns.declare_struct(unit, Some(foo), "Pair");
    ns.add_field(pair, "amount", SolTypeName::elementary("uint128"), None);
    ns.add_field(pair, "blob", SolTypeName::elementary("bytes"), None);

    let internal = Visibility::Internal;
    ns.declare_state_var(foo, "sV1", SolTypeName::elementary("int128"), None, internal);
    ns.declare_state_var(foo, "sV", SolTypeName::elementary("uint"), None, internal);
    ns.declare_state_var(foo, "sB", SolTypeName::elementary("bool"), None, internal);
    ns.declare_state_var(foo, "sBy", SolTypeName::elementary("bytes"), None, internal);
    ns.declare_state_var(foo, "sFB32", SolTypeName::elementary("bytes32"), None, internal);
    ns.declare_state_var(foo, "sA", SolTypeName::elementary("address"), None, internal);
    ns.declare_state_var(foo, "u32a", SolTypeName::elementary("uint32"), None, internal);
    ns.declare_state_var(foo, "u32b", SolTypeName::elementary("uint32"), None, internal);
    ns.declare_state_var(
        foo,
        "sPub",
        SolTypeName::elementary("uint"),
        None,
        Visibility::Public,
    );
    ns.declare_state_var(
        foo,
        "sMode",
        SolTypeName::user_defined(TypeDefRef::Enum(foo_enum)),
        None,
        Visibility::Public,
    );
    let s_pair = ns.declare_state_var(
        foo,
        "sPair",
        SolTypeName::user_defined(TypeDefRef::Struct(pair)),
        None,
        internal,
    );
    ns.declare_state_var(
        foo,
        "sArr",
        SolTypeName::array(SolTypeName::elementary("uint64")),
        None,
        internal,
    );
    ns.declare_state_var(
        foo,
        "balances",
        SolTypeName::mapping(
            SolTypeName::elementary("address"),
            SolTypeName::elementary("uint64"),
        ),
        None,
        internal,
    );

    let add = ns.declare_function(foo, "add", Visibility::Public, Mutability::NonPayable);
    ns.add_param(add, "x", SolTypeName::elementary("int8"), None);
    ns.add_param(add, "y", SolTypeName::elementary("uint64"), None);
    ns.add_return(add, "add", SolTypeName::elementary("uint64"), None);

    let id_pair = ns.declare_function(foo, "idPair", Visibility::Public, Mutability::Pure);
    ns.add_param(id_pair, "x", SolTypeName::elementary("uint"), None);
    ns.add_param(id_pair, "y", SolTypeName::elementary("uint"), None);
    ns.add_return(id_pair, "", SolTypeName::elementary("uint"), None);
    ns.add_return(id_pair, "", SolTypeName::elementary("uint"), None);

    let shl = ns.declare_function(foo, "shl", Visibility::Public, Mutability::Pure);
    ns.add_param(shl, "x", SolTypeName::elementary("uint"), None);

    let no_ret = ns.declare_function(foo, "noRet", Visibility::Public, Mutability::NonPayable);

    Fixture {
        ns,
        unit,
        lib,
        foo,
        foo_enum,
        pair,
        s_pair,
        ladd,
        add,
        id_pair,
        shl,
        no_ret,
    }
}
