//! This module contains the [`TypeChecker`] that assigns a semantic type to
//! every node of an annotation expression.
//!
//! Checking is a single recursive pass over the expression tree. The result
//! for every node is recorded in a [`TypeCache`] keyed by node identity, so
//! re-checking a node is a lookup rather than a recomputation, and identifier
//! nodes additionally receive a def-site annotation recording what they
//! resolved to. The first diagnostic raised aborts the expression; there is
//! no recovery and no partial result.

pub mod binary;
pub mod call;
pub mod coerce;
pub mod ident;
pub mod member;

use std::collections::HashMap;

use crate::{
    ast::{Expr, ExprArena, ExprId, ExprKind, UnaryOp},
    constant::BYTE_SIZE_BITS,
    error::typecheck::{Diagnostics, Error, Result},
    scope::{DefSite, TypingContext},
    sol::Namespace,
    types::Type,
};

/// The per-run side tables of the checker: the type assigned to each visited
/// node, and the def-site each identifier resolved to.
///
/// Both tables are written exactly once per node during a checking run, with
/// a single exception: the entry for the callee of a call is overwritten when
/// its overload set is narrowed to the one surviving definition. Entries are
/// never removed.
#[derive(Clone, Debug, Default)]
pub struct TypeCache {
    types: HashMap<ExprId, Type>,
    def_sites: HashMap<ExprId, DefSite>,
}

impl TypeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the type recorded for `id`, if it has been checked.
    #[must_use]
    pub fn type_of(&self, id: ExprId) -> Option<&Type> {
        self.types.get(&id)
    }

    /// Gets the def-site recorded for the identifier node `id`, if it has
    /// been resolved.
    #[must_use]
    pub fn def_site(&self, id: ExprId) -> Option<&DefSite> {
        self.def_sites.get(&id)
    }

    /// Gets the number of nodes with a recorded type.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Checks if no node has a recorded type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn record_type(&mut self, id: ExprId, ty: Type) {
        self.types.insert(id, ty);
    }

    fn record_def_site(&mut self, id: ExprId, site: DefSite) {
        self.def_sites.insert(id, site);
    }
}

/// The `TypeChecker` resolves names and assigns types over a fixed host
/// program and expression arena.
///
/// The host program is read-only throughout; everything the checker discovers
/// lands in its [`TypeCache`], which can be taken out and handed back to
/// later checkers to share work across annotations.
#[derive(Debug)]
pub struct TypeChecker<'a> {
    /// The resolved host program annotations are checked against.
    ns: &'a Namespace,

    /// The arena owning the expressions being checked.
    arena: &'a ExprArena,

    /// The types and def-sites resolved so far.
    cache: TypeCache,
}

impl<'a> TypeChecker<'a> {
    /// Constructs a checker over the host program `ns` and the expression
    /// arena `arena`, with an empty cache.
    #[must_use]
    pub fn new(ns: &'a Namespace, arena: &'a ExprArena) -> Self {
        Self::with_cache(ns, arena, TypeCache::new())
    }

    /// Constructs a checker that continues from the `cache` of an earlier
    /// run over the same arena and host program.
    #[must_use]
    pub fn with_cache(ns: &'a Namespace, arena: &'a ExprArena, cache: TypeCache) -> Self {
        Self { ns, arena, cache }
    }

    /// Gets the cache accumulated so far.
    #[must_use]
    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    /// Consumes the checker, returning its cache.
    #[must_use]
    pub fn into_cache(self) -> TypeCache {
        self.cache
    }

    /// Assigns a type to the expression rooted at `id` in the context `ctx`,
    /// recording the types of all of its subexpressions along the way.
    ///
    /// Checking is deterministic given the same context, and a node that is
    /// already in the cache is returned from it without recomputation.
    ///
    /// # Errors
    ///
    /// Returns the first diagnostic raised anywhere in the expression; the
    /// check of this expression stops at that point.
    pub fn check(&mut self, id: ExprId, ctx: &TypingContext) -> Result<Type> {
        if let Some(ty) = self.cache.type_of(id) {
            return Ok(ty.clone());
        }

        let arena = self.arena;
        let expr = arena.get(id);
        let ty = match &expr.kind {
            ExprKind::Number { .. } => Type::IntLiteral,
            ExprKind::Bool { .. } => Type::Bool,
            ExprKind::StringLiteral { .. } | ExprKind::HexLiteral { .. } => Type::StringLiteral,
            ExprKind::AddressLiteral { .. } => Type::address(true),
            ExprKind::Identifier { name } => self.check_ident(expr, name, ctx)?,
            ExprKind::Result => self.check_result(expr, ctx)?,
            ExprKind::Unary { op, operand } => self.check_unary(*op, *operand, ctx)?,
            ExprKind::Binary { op, left, right } => {
                self.check_binary(expr, *op, *left, *right, ctx)?
            }
            ExprKind::Conditional {
                condition,
                if_true,
                if_false,
            } => self.check_conditional(expr, *condition, *if_true, *if_false, ctx)?,
            ExprKind::Index { base, index } => self.check_index(*base, *index, ctx)?,
            ExprKind::Member { base, member } => self.check_member(expr, *base, member, ctx)?,
            ExprKind::Let { names, rhs, body } => {
                self.check_let(expr, names, *rhs, *body, ctx)?
            }
            ExprKind::Call { callee, args } => self.check_call(expr, *callee, args, ctx)?,
        };

        self.cache.record_type(id, ty.clone());
        Ok(ty)
    }

    /// Checks each expression of `exprs` in the context `ctx`. Each failing
    /// expression files one diagnostic; the rest of the batch still runs.
    ///
    /// # Errors
    ///
    /// Returns the filed diagnostics, in source order, if any expression
    /// failed to check.
    pub fn check_all(
        &mut self,
        exprs: &[ExprId],
        ctx: &TypingContext,
    ) -> std::result::Result<Vec<Type>, Diagnostics> {
        let mut types = Vec::with_capacity(exprs.len());
        let mut diagnostics = Diagnostics::new();

        for id in exprs {
            match self.check(*id, ctx) {
                Ok(ty) => types.push(ty),
                Err(d) => diagnostics.push(d),
            }
        }

        if diagnostics.is_empty() {
            Ok(types)
        } else {
            Err(diagnostics)
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: ExprId, ctx: &TypingContext) -> Result<Type> {
        let operand_ty = self.check(operand, ctx)?;
        let operand_range = self.arena.get(operand).range;

        match op {
            UnaryOp::Not => {
                if operand_ty != Type::Bool {
                    return Err(Error::WrongType {
                        actual: operand_ty,
                        expected: "bool".into(),
                    }
                    .at(operand_range));
                }
                Ok(Type::Bool)
            }
            UnaryOp::Neg => {
                if !operand_ty.is_int_like() {
                    return Err(Error::WrongType {
                        actual: operand_ty,
                        expected: "an integer or integer literal".into(),
                    }
                    .at(operand_range));
                }
                Ok(operand_ty)
            }
            // `old(e)` is a semantic marker only and leaves the type alone.
            UnaryOp::Old => Ok(operand_ty),
        }
    }

    fn check_conditional(
        &mut self,
        expr: &Expr,
        condition: ExprId,
        if_true: ExprId,
        if_false: ExprId,
        ctx: &TypingContext,
    ) -> Result<Type> {
        let condition_ty = self.check(condition, ctx)?;
        if condition_ty != Type::Bool {
            return Err(Error::WrongType {
                actual: condition_ty,
                expected: "bool".into(),
            }
            .at(self.arena.get(condition).range));
        }

        let true_ty = self.check(if_true, ctx)?;
        let false_ty = self.check(if_false, ctx)?;
        self.unify_or_fail(&true_ty, &false_ty, expr)
    }

    fn check_index(&mut self, base: ExprId, index: ExprId, ctx: &TypingContext) -> Result<Type> {
        let base_ty = self.check(base, ctx)?;
        let index_ty = self.check(index, ctx)?;
        let index_range = self.arena.get(index).range;

        let expect_int_index = |result: Type| -> Result<Type> {
            if index_ty.is_int_like() {
                Ok(result)
            } else {
                Err(Error::WrongType {
                    actual: index_ty.clone(),
                    expected: "an integer index".into(),
                }
                .at(index_range))
            }
        };

        match &base_ty {
            Type::FixedBytes { .. } => expect_int_index(Type::uint(BYTE_SIZE_BITS)),
            Type::Pointer { to, .. } => match to.as_ref() {
                Type::Bytes => expect_int_index(Type::uint(BYTE_SIZE_BITS)),
                Type::Array { element, .. } => expect_int_index(element.as_ref().clone()),
                Type::Mapping { key, value } => {
                    if coerce::implicitly_castable(&index_ty, key) {
                        Ok(value.as_ref().clone())
                    } else {
                        Err(Error::WrongType {
                            actual: index_ty.clone(),
                            expected: format!("a key castable to {key}"),
                        }
                        .at(index_range))
                    }
                }
                _ => Err(Error::WrongType {
                    actual: base_ty.clone(),
                    expected: "an indexable type".into(),
                }
                .at(self.arena.get(base).range)),
            },
            _ => Err(Error::WrongType {
                actual: base_ty.clone(),
                expected: "an indexable type".into(),
            }
            .at(self.arena.get(base).range)),
        }
    }

    fn check_let(
        &mut self,
        expr: &Expr,
        names: &[String],
        rhs: ExprId,
        body: ExprId,
        ctx: &TypingContext,
    ) -> Result<Type> {
        let rhs_ty = self.check(rhs, ctx)?;

        let bound = match &rhs_ty {
            Type::Tuple { elements } => elements.len(),
            _ => 1,
        };
        if bound != names.len() {
            return Err(Error::CountMismatch {
                expected: names.len(),
                actual: bound,
            }
            .at(self.arena.get(rhs).range));
        }

        let extended = ctx.enter_let(expr.id);
        self.check(body, &extended)
    }

    fn unify_or_fail(&self, left: &Type, right: &Type, at: &Expr) -> Result<Type> {
        coerce::unify(left, right).ok_or_else(|| {
            Error::IncompatibleTypes {
                left: left.clone(),
                right: right.clone(),
            }
            .at(at.range)
        })
    }
}
