//! This module contains the typing rules for the binary operators of the
//! annotation language.
//!
//! The arithmetic, bitwise and relational operators work over integers (with
//! the bitwise, shift and relational forms also accepting fixed-size byte
//! arrays); mixed operand types are reconciled by unification, which widens
//! literals and narrower integers. The logical operators, including the
//! implication `==>`, work over booleans only.

use ethnum::I256;

use crate::{
    ast::{BinaryOp, Expr, ExprId, ExprKind, UnaryOp},
    checker::TypeChecker,
    error::typecheck::{Error, Result},
    scope::TypingContext,
    types::Type,
};

impl TypeChecker<'_> {
    pub(super) fn check_binary(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        ctx: &TypingContext,
    ) -> Result<Type> {
        let left_ty = self.check(left, ctx)?;
        let right_ty = self.check(right, ctx)?;

        match op {
            BinaryOp::Pow => {
                self.expect_int_like(&left_ty, left)?;
                self.expect_int_like(&right_ty, right)?;
                self.expect_valid_exponent(&right_ty, right)?;
                if left_ty == Type::IntLiteral {
                    Ok(right_ty)
                } else {
                    Ok(left_ty)
                }
            }
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Add | BinaryOp::Sub => {
                self.expect_int_like(&left_ty, left)?;
                self.expect_int_like(&right_ty, right)?;
                self.unify_or_fail(&left_ty, &right_ty, expr)
            }
            BinaryOp::Shl | BinaryOp::Shr => {
                self.expect_int_like_or_fixed_bytes(&left_ty, left)?;
                self.expect_int_like(&right_ty, right)?;
                if left_ty == Type::IntLiteral {
                    Ok(right_ty)
                } else {
                    Ok(left_ty)
                }
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                self.expect_int_like_or_fixed_bytes(&left_ty, left)?;
                self.expect_int_like_or_fixed_bytes(&right_ty, right)?;
                self.unify_or_fail(&left_ty, &right_ty, expr)?;
                Ok(Type::Bool)
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                self.unify_or_fail(&left_ty, &right_ty, expr)?;
                Ok(Type::Bool)
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                self.expect_int_like_or_fixed_bytes(&left_ty, left)?;
                self.expect_int_like_or_fixed_bytes(&right_ty, right)?;
                self.unify_or_fail(&left_ty, &right_ty, expr)
            }
            BinaryOp::And | BinaryOp::Or | BinaryOp::Implies => {
                self.expect_bool(&left_ty, left)?;
                self.expect_bool(&right_ty, right)?;
                Ok(Type::Bool)
            }
        }
    }

    fn expect_bool(&self, ty: &Type, at: ExprId) -> Result<()> {
        if *ty == Type::Bool {
            Ok(())
        } else {
            Err(Error::WrongType {
                actual: ty.clone(),
                expected: "bool".into(),
            }
            .at(self.arena.get(at).range))
        }
    }

    fn expect_int_like(&self, ty: &Type, at: ExprId) -> Result<()> {
        if ty.is_int_like() {
            Ok(())
        } else {
            Err(Error::WrongType {
                actual: ty.clone(),
                expected: "an integer or integer literal".into(),
            }
            .at(self.arena.get(at).range))
        }
    }

    fn expect_int_like_or_fixed_bytes(&self, ty: &Type, at: ExprId) -> Result<()> {
        if ty.is_int_like() || matches!(ty, Type::FixedBytes { .. }) {
            Ok(())
        } else {
            Err(Error::WrongType {
                actual: ty.clone(),
                expected: "an integer or fixed-size byte array".into(),
            }
            .at(self.arena.get(at).range))
        }
    }

    /// Checks that an exponent is usable: concrete exponents must be
    /// unsigned, and literal exponents must not be negative.
    fn expect_valid_exponent(&self, ty: &Type, at: ExprId) -> Result<()> {
        if matches!(ty, Type::Int { signed: true, .. }) {
            return Err(Error::WrongType {
                actual: ty.clone(),
                expected: "an unsigned exponent".into(),
            }
            .at(self.arena.get(at).range));
        }

        let value = match &self.arena.get(at).kind {
            ExprKind::Number { value } => Some(*value),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => match &self.arena.get(*operand).kind {
                ExprKind::Number { value } => Some(-*value),
                _ => None,
            },
            _ => None,
        };
        if value.is_some_and(|v| v < I256::ZERO) {
            return Err(Error::WrongType {
                actual: ty.clone(),
                expected: "a non-negative exponent".into(),
            }
            .at(self.arena.get(at).range));
        }

        Ok(())
    }
}
