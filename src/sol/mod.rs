//! This module contains the model of the resolved host-language program that
//! annotation expressions are checked against.
//!
//! The model is deliberately dumb data: a [`Namespace`] owns every declaration
//! in flat, arena-style tables, and everything else refers to declarations
//! through copyable typed ids. Semantic types hold these ids as lookup
//! handles rather than owning references, which keeps the (cyclic)
//! declaration graph entirely inside the namespace.
//!
//! The checker only ever reads this model. It is expected to be produced by
//! a host-language frontend that has already resolved every symbol, so the
//! model stores resolved data only: linearized base chains, resolved array
//! lengths, and type references that point straight at their declarations.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::types::DataLocation;

/// The id of a source unit in a [`Namespace`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SourceUnitId(pub usize);

/// The id of a contract declaration in a [`Namespace`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ContractId(pub usize);

/// The id of a function declaration in a [`Namespace`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct FunctionId(pub usize);

/// The id of a variable declaration in a [`Namespace`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct VarId(pub usize);

/// The id of a struct declaration in a [`Namespace`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct StructId(pub usize);

/// The id of an enum declaration in a [`Namespace`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EnumId(pub usize);

/// A resolved reference to a user-defined type declaration.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDefRef {
    Struct(StructId),
    Enum(EnumId),
    Contract(ContractId),
}

/// The kind of a contract declaration.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContractKind {
    Contract,
    Interface,
    Library,
}

/// The visibility of a function or state variable.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Internal,
    Public,
    External,
}

/// The state mutability of a function.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

/// The resolved length of a host-language array type.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ArrayLength {
    /// The array is dynamically sized.
    Dynamic,

    /// The array length was an integer literal with the given value.
    Fixed(U256),

    /// The array length was an expression the frontend could not fold to a
    /// literal. Such types cannot be ingested.
    Unresolved,
}

/// A host-language type name, as it appears at a declaration site.
///
/// Elementary types are kept as their source token (`"uint256"`, `"bytes4"`,
/// `"address payable"`, ..) and matched against the elementary grammar at
/// ingestion time.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SolTypeName {
    /// An elementary type token.
    Elementary { name: String },

    /// An array of `element` values with the given `length`.
    Array {
        element: Box<SolTypeName>,
        length: ArrayLength,
    },

    /// A reference to a user-defined type declaration.
    UserDefined { def: TypeDefRef },

    /// A function type.
    Function {
        params: Vec<VarId>,
        returns: Vec<VarId>,
        visibility: Visibility,
        mutability: Mutability,
    },

    /// A mapping from `key` to `value`.
    Mapping {
        key: Box<SolTypeName>,
        value: Box<SolTypeName>,
    },
}

impl SolTypeName {
    /// Constructs an elementary type name from its source token.
    #[must_use]
    pub fn elementary(name: impl Into<String>) -> Self {
        Self::Elementary { name: name.into() }
    }

    /// Constructs a dynamically-sized array of `element`.
    #[must_use]
    pub fn array(element: SolTypeName) -> Self {
        Self::Array {
            element: Box::new(element),
            length: ArrayLength::Dynamic,
        }
    }

    /// Constructs a fixed-size array of `element` with `length` elements.
    #[must_use]
    pub fn fixed_array(element: SolTypeName, length: impl Into<U256>) -> Self {
        Self::Array {
            element: Box::new(element),
            length: ArrayLength::Fixed(length.into()),
        }
    }

    /// Constructs a reference to the user-defined type `def`.
    #[must_use]
    pub fn user_defined(def: TypeDefRef) -> Self {
        Self::UserDefined { def }
    }

    /// Constructs a mapping from `key` to `value`.
    #[must_use]
    pub fn mapping(key: SolTypeName, value: SolTypeName) -> Self {
        Self::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// The declaration site that owns a variable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VarScope {
    /// A state variable of the given contract.
    ContractState(ContractId),

    /// A parameter of the given function.
    Parameter(FunctionId),

    /// A return value of the given function.
    Return(FunctionId),

    /// A field of the given struct.
    StructField(StructId),
}

/// A resolved variable declaration.
#[derive(Clone, Debug)]
pub struct VarDecl {
    /// The declared name. Return values may be unnamed, in which case this is
    /// empty and the variable can never be found by name lookup.
    pub name: String,

    /// The declared type, if the frontend could resolve one.
    pub type_name: Option<SolTypeName>,

    /// The explicitly declared data location, if any.
    pub location: Option<DataLocation>,

    /// The declared visibility. Only meaningful for state variables, where
    /// [`Visibility::Public`] causes a getter to be synthesised.
    pub visibility: Visibility,

    /// The declaration site that owns this variable.
    pub scope: VarScope,
}

/// A resolved function declaration.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: String,

    /// The contract the function is declared in.
    pub contract: ContractId,

    pub params: Vec<VarId>,
    pub returns: Vec<VarId>,
    pub visibility: Visibility,
    pub mutability: Mutability,
}

/// A resolved struct declaration.
#[derive(Clone, Debug)]
pub struct StructDecl {
    pub name: String,

    /// The contract the struct is nested in, if it is not a top-level
    /// declaration.
    pub contract: Option<ContractId>,

    pub fields: Vec<VarId>,
}

/// A resolved enum declaration.
#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: String,

    /// The contract the enum is nested in, if it is not a top-level
    /// declaration.
    pub contract: Option<ContractId>,

    /// The enum constants, in declaration order.
    pub members: Vec<String>,
}

/// A `using L for T` directive attaching the functions of a library to values
/// of a target type.
#[derive(Clone, Debug)]
pub struct UsingDirective {
    /// The library whose functions are attached.
    pub library: ContractId,

    /// The target type, or [`None`] for an unrestricted `using L for *`.
    pub target: Option<SolTypeName>,
}

/// A resolved contract declaration.
#[derive(Clone, Debug)]
pub struct ContractDecl {
    pub name: String,
    pub kind: ContractKind,

    /// The linearized inheritance chain, most-derived first. The first entry
    /// is always the contract itself.
    pub linearized: Vec<ContractId>,

    pub state_vars: Vec<VarId>,
    pub functions: Vec<FunctionId>,
    pub structs: Vec<StructId>,
    pub enums: Vec<EnumId>,
    pub using: Vec<UsingDirective>,
}

/// A source unit and its top-level declarations.
#[derive(Clone, Debug, Default)]
pub struct SourceUnit {
    pub contracts: Vec<ContractId>,
    pub structs: Vec<StructId>,
    pub enums: Vec<EnumId>,
}

/// The owner of every declaration in the resolved host program.
///
/// Declarations are stored in flat tables and addressed by typed ids, so that
/// anything else in the crate can refer to a declaration without owning it.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    source_units: Vec<SourceUnit>,
    contracts: Vec<ContractDecl>,
    functions: Vec<FunctionDecl>,
    variables: Vec<VarDecl>,
    structs: Vec<StructDecl>,
    enums: Vec<EnumDecl>,
}

impl Namespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty source unit.
    pub fn add_source_unit(&mut self) -> SourceUnitId {
        self.source_units.push(SourceUnit::default());
        SourceUnitId(self.source_units.len() - 1)
    }

    /// Declares a contract in the provided `unit`.
    ///
    /// The `bases` are the contract's parents in already-linearized order,
    /// most-derived first; the new contract is prepended to form its full
    /// linearization.
    pub fn declare_contract(
        &mut self,
        unit: SourceUnitId,
        name: impl Into<String>,
        kind: ContractKind,
        bases: Vec<ContractId>,
    ) -> ContractId {
        let id = ContractId(self.contracts.len());
        let mut linearized = vec![id];
        linearized.extend(bases);
        self.contracts.push(ContractDecl {
            name: name.into(),
            kind,
            linearized,
            state_vars: Vec::new(),
            functions: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            using: Vec::new(),
        });
        self.source_units[unit.0].contracts.push(id);
        id
    }

    /// Declares a state variable of `contract`.
    pub fn declare_state_var(
        &mut self,
        contract: ContractId,
        name: impl Into<String>,
        type_name: impl Into<Option<SolTypeName>>,
        location: Option<DataLocation>,
        visibility: Visibility,
    ) -> VarId {
        let id = self.push_var(VarDecl {
            name: name.into(),
            type_name: type_name.into(),
            location,
            visibility,
            scope: VarScope::ContractState(contract),
        });
        self.contracts[contract.0].state_vars.push(id);
        id
    }

    /// Declares a function of `contract` with no parameters or returns; these
    /// are attached separately with [`Self::add_param`] and
    /// [`Self::add_return`].
    pub fn declare_function(
        &mut self,
        contract: ContractId,
        name: impl Into<String>,
        visibility: Visibility,
        mutability: Mutability,
    ) -> FunctionId {
        let id = FunctionId(self.functions.len());
        self.functions.push(FunctionDecl {
            name: name.into(),
            contract,
            params: Vec::new(),
            returns: Vec::new(),
            visibility,
            mutability,
        });
        self.contracts[contract.0].functions.push(id);
        id
    }

    /// Adds a parameter to `function`.
    pub fn add_param(
        &mut self,
        function: FunctionId,
        name: impl Into<String>,
        type_name: impl Into<Option<SolTypeName>>,
        location: Option<DataLocation>,
    ) -> VarId {
        let id = self.push_var(VarDecl {
            name: name.into(),
            type_name: type_name.into(),
            location,
            visibility: Visibility::Internal,
            scope: VarScope::Parameter(function),
        });
        self.functions[function.0].params.push(id);
        id
    }

    /// Adds a return value to `function`. Pass an empty name for an unnamed
    /// return.
    pub fn add_return(
        &mut self,
        function: FunctionId,
        name: impl Into<String>,
        type_name: impl Into<Option<SolTypeName>>,
        location: Option<DataLocation>,
    ) -> VarId {
        let id = self.push_var(VarDecl {
            name: name.into(),
            type_name: type_name.into(),
            location,
            visibility: Visibility::Internal,
            scope: VarScope::Return(function),
        });
        self.functions[function.0].returns.push(id);
        id
    }

    /// Declares a struct, nested in `contract` when one is provided and
    /// otherwise at the top level of `unit`.
    pub fn declare_struct(
        &mut self,
        unit: SourceUnitId,
        contract: Option<ContractId>,
        name: impl Into<String>,
    ) -> StructId {
        let id = StructId(self.structs.len());
        self.structs.push(StructDecl {
            name: name.into(),
            contract,
            fields: Vec::new(),
        });
        match contract {
            Some(c) => self.contracts[c.0].structs.push(id),
            None => self.source_units[unit.0].structs.push(id),
        }
        id
    }

    /// Adds a field to `def`.
    pub fn add_field(
        &mut self,
        def: StructId,
        name: impl Into<String>,
        type_name: impl Into<Option<SolTypeName>>,
        location: Option<DataLocation>,
    ) -> VarId {
        let id = self.push_var(VarDecl {
            name: name.into(),
            type_name: type_name.into(),
            location,
            visibility: Visibility::Internal,
            scope: VarScope::StructField(def),
        });
        self.structs[def.0].fields.push(id);
        id
    }

    /// Declares an enum with the provided `members`, nested in `contract`
    /// when one is provided and otherwise at the top level of `unit`.
    pub fn declare_enum(
        &mut self,
        unit: SourceUnitId,
        contract: Option<ContractId>,
        name: impl Into<String>,
        members: &[&str],
    ) -> EnumId {
        let id = EnumId(self.enums.len());
        self.enums.push(EnumDecl {
            name: name.into(),
            contract,
            members: members.iter().map(|m| (*m).to_string()).collect(),
        });
        match contract {
            Some(c) => self.contracts[c.0].enums.push(id),
            None => self.source_units[unit.0].enums.push(id),
        }
        id
    }

    /// Attaches a `using library for target` directive to `contract`. A
    /// target of [`None`] attaches the library to every type.
    pub fn add_using(
        &mut self,
        contract: ContractId,
        library: ContractId,
        target: Option<SolTypeName>,
    ) {
        self.contracts[contract.0]
            .using
            .push(UsingDirective { library, target });
    }

    fn push_var(&mut self, decl: VarDecl) -> VarId {
        self.variables.push(decl);
        VarId(self.variables.len() - 1)
    }
}

/// Declaration accessors.
///
/// All of these panic when handed an id minted by a different namespace, as
/// there is no legitimate way to obtain such an id.
impl Namespace {
    #[must_use]
    pub fn source_unit(&self, id: SourceUnitId) -> &SourceUnit {
        &self.source_units[id.0]
    }

    #[must_use]
    pub fn contract(&self, id: ContractId) -> &ContractDecl {
        &self.contracts[id.0]
    }

    #[must_use]
    pub fn function(&self, id: FunctionId) -> &FunctionDecl {
        &self.functions[id.0]
    }

    #[must_use]
    pub fn variable(&self, id: VarId) -> &VarDecl {
        &self.variables[id.0]
    }

    #[must_use]
    pub fn struct_decl(&self, id: StructId) -> &StructDecl {
        &self.structs[id.0]
    }

    #[must_use]
    pub fn enum_decl(&self, id: EnumId) -> &EnumDecl {
        &self.enums[id.0]
    }
}

/// Name-resolution queries over the declaration tables.
impl Namespace {
    /// Gets the source name of the declaration behind `def`.
    #[must_use]
    pub fn def_name(&self, def: TypeDefRef) -> &str {
        match def {
            TypeDefRef::Struct(id) => &self.struct_decl(id).name,
            TypeDefRef::Enum(id) => &self.enum_decl(id).name,
            TypeDefRef::Contract(id) => &self.contract(id).name,
        }
    }

    /// Gets the qualified name of the declaration behind `def`:
    /// `Contract.Name` for declarations nested in a contract and the bare
    /// name otherwise.
    #[must_use]
    pub fn qualified_name(&self, def: TypeDefRef) -> String {
        let contract = match def {
            TypeDefRef::Struct(id) => self.struct_decl(id).contract,
            TypeDefRef::Enum(id) => self.enum_decl(id).contract,
            TypeDefRef::Contract(_) => None,
        };
        match contract {
            Some(c) => format!("{}.{}", self.contract(c).name, self.def_name(def)),
            None => self.def_name(def).to_string(),
        }
    }

    /// Finds the state variable called `name` on `contract`, searching its
    /// linearized base chain in order.
    #[must_use]
    pub fn resolve_state_var(&self, contract: ContractId, name: &str) -> Option<VarId> {
        self.contract(contract)
            .linearized
            .iter()
            .flat_map(|base| self.contract(*base).state_vars.iter())
            .copied()
            .find(|v| self.variable(*v).name == name)
    }

    /// Finds the public state variable called `name` on `contract`, searching
    /// its linearized base chain in order.
    #[must_use]
    pub fn resolve_public_state_var(&self, contract: ContractId, name: &str) -> Option<VarId> {
        self.resolve_state_var(contract, name)
            .filter(|v| self.variable(*v).visibility == Visibility::Public)
    }

    /// Collects every function called `name` on `contract`, searching its
    /// linearized base chain in order.
    ///
    /// A base-chain function is skipped when a more-derived contract already
    /// contributed a function with an identical parameter list, as that one
    /// overrides it.
    #[must_use]
    pub fn resolve_functions(&self, contract: ContractId, name: &str) -> Vec<FunctionId> {
        let mut found: Vec<FunctionId> = Vec::new();
        for base in &self.contract(contract).linearized {
            for f in &self.contract(*base).functions {
                let decl = self.function(*f);
                if decl.name != name {
                    continue;
                }
                let overridden = found
                    .iter()
                    .any(|prior| self.params_match(*prior, &decl.params));
                if !overridden {
                    found.push(*f);
                }
            }
        }
        found
    }

    /// Finds the struct or enum called `name` on `contract`, searching its
    /// linearized base chain in order. Structs shadow enums of the same name.
    #[must_use]
    pub fn resolve_nested_type(&self, contract: ContractId, name: &str) -> Option<TypeDefRef> {
        for base in &self.contract(contract).linearized {
            let decl = self.contract(*base);
            if let Some(s) = decl
                .structs
                .iter()
                .copied()
                .find(|s| self.struct_decl(*s).name == name)
            {
                return Some(TypeDefRef::Struct(s));
            }
            if let Some(e) = decl
                .enums
                .iter()
                .copied()
                .find(|e| self.enum_decl(*e).name == name)
            {
                return Some(TypeDefRef::Enum(e));
            }
        }
        None
    }

    /// Gets the linearized base chain of `contract`, most-derived first.
    #[must_use]
    pub fn linearized(&self, contract: ContractId) -> &[ContractId] {
        &self.contract(contract).linearized
    }

    fn params_match(&self, function: FunctionId, params: &[VarId]) -> bool {
        let own = &self.function(function).params;
        own.len() == params.len()
            && own
                .iter()
                .zip(params)
                .all(|(a, b)| self.variable(*a).type_name == self.variable(*b).type_name)
    }
}
