//! This module contains the AST for the annotation expression language, along
//! with the arena that owns the nodes of each annotation.
//!
//! Nodes are allocated in an [`ExprArena`] and addressed by [`ExprId`]. The
//! identity of a node is its id, which is what the checker keys its type cache
//! and def-site annotations on. The arena itself is immutable once built; all
//! information discovered during checking lives in side tables.

use std::fmt::{Display, Formatter};

use ethnum::I256;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A half-open range of byte offsets into the annotation source text.
///
/// Every node carries the range it was parsed from, and every diagnostic
/// reports the range of the offending subexpression. The checker never
/// fabricates ranges of its own.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct SourceRange {
    /// The byte offset at which the node starts.
    pub start: usize,

    /// The byte offset one past the end of the node.
    pub end: usize,
}

impl SourceRange {
    /// Constructs a new range covering `start..end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<std::ops::Range<usize>> for SourceRange {
    fn from(value: std::ops::Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

impl Display for SourceRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The identity of an expression node within its [`ExprArena`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ExprId(u32);

impl ExprId {
    /// Gets the arena index of this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The unary operators of the annotation language.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnaryOp {
    /// Logical negation `!e`.
    Not,

    /// Arithmetic negation `-e`.
    Neg,

    /// The `old(e)` marker, referring to the value of `e` in the pre-state.
    ///
    /// It is a purely semantic marker and has no effect on the type of its
    /// operand.
    Old,
}

/// The binary operators of the annotation language.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    /// Logical implication `a ==> b`, an extension over the host language.
    Implies,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Self::Pow => "**",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::And => "&&",
            Self::Or => "||",
            Self::Implies => "==>",
        };
        write!(f, "{str}")
    }
}

/// An expression node, consisting of its identity, the source range it was
/// parsed from, and the variant-specific data.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// The identity of the node within its arena.
    pub id: ExprId,

    /// The source range the node was parsed from.
    pub range: SourceRange,

    /// The variant-specific payload.
    pub kind: ExprKind,
}

/// The closed set of expression variants understood by the checker.
///
/// New syntax is added by extending this enum; the checker dispatches on it
/// exhaustively.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// An integer literal. The value is signed so that drivers that fold
    /// negated literals can still represent them directly.
    Number { value: I256 },

    /// A boolean literal.
    Bool { value: bool },

    /// A string literal.
    StringLiteral { value: String },

    /// A hex string literal (`hex"..."`); the raw hex digits are kept
    /// verbatim.
    HexLiteral { value: String },

    /// An address literal (`0x`-prefixed, twenty bytes).
    AddressLiteral { value: String },

    /// An identifier reference.
    Identifier { name: String },

    /// The `$result` keyword, referring to the return value of the enclosing
    /// function.
    Result,

    /// A unary operation.
    Unary { op: UnaryOp, operand: ExprId },

    /// A binary operation.
    Binary { op: BinaryOp, left: ExprId, right: ExprId },

    /// The ternary conditional `condition ? if_true : if_false`.
    Conditional {
        condition: ExprId,
        if_true: ExprId,
        if_false: ExprId,
    },

    /// An index access `base[index]`.
    Index { base: ExprId, index: ExprId },

    /// A member access `base.member`.
    Member { base: ExprId, member: String },

    /// A binding form `let n1, .., nk = rhs in body`.
    Let {
        names: Vec<String>,
        rhs: ExprId,
        body: ExprId,
    },

    /// A function call or cast `callee(args..)`.
    Call { callee: ExprId, args: Vec<ExprId> },
}

/// The arena that owns the expression nodes of one or more annotations.
///
/// Ids minted by one arena are meaningless in any other; the checker assumes
/// that every id it is handed belongs to the arena it was constructed with.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the node with the provided `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different arena.
    #[must_use]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    /// Gets the number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the arena contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: ExprKind, range: impl Into<SourceRange>) -> ExprId {
        let id = ExprId(u32::try_from(self.nodes.len()).expect("arena node count exceeds u32"));
        self.nodes.push(Expr {
            id,
            range: range.into(),
            kind,
        });
        id
    }

    /// Allocates an integer literal node.
    pub fn number(&mut self, value: impl Into<I256>, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(
            ExprKind::Number {
                value: value.into(),
            },
            range,
        )
    }

    /// Allocates a boolean literal node.
    pub fn boolean(&mut self, value: bool, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(ExprKind::Bool { value }, range)
    }

    /// Allocates a string literal node.
    pub fn string(&mut self, value: impl Into<String>, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(
            ExprKind::StringLiteral {
                value: value.into(),
            },
            range,
        )
    }

    /// Allocates a hex string literal node.
    pub fn hex(&mut self, value: impl Into<String>, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(
            ExprKind::HexLiteral {
                value: value.into(),
            },
            range,
        )
    }

    /// Allocates an address literal node.
    pub fn address(&mut self, value: impl Into<String>, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(
            ExprKind::AddressLiteral {
                value: value.into(),
            },
            range,
        )
    }

    /// Allocates an identifier node.
    pub fn ident(&mut self, name: impl Into<String>, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(ExprKind::Identifier { name: name.into() }, range)
    }

    /// Allocates a `$result` node.
    pub fn result(&mut self, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(ExprKind::Result, range)
    }

    /// Allocates a unary operation node.
    pub fn unary(&mut self, op: UnaryOp, operand: ExprId, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(ExprKind::Unary { op, operand }, range)
    }

    /// Allocates a binary operation node.
    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        range: impl Into<SourceRange>,
    ) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right }, range)
    }

    /// Allocates a conditional node.
    pub fn conditional(
        &mut self,
        condition: ExprId,
        if_true: ExprId,
        if_false: ExprId,
        range: impl Into<SourceRange>,
    ) -> ExprId {
        self.alloc(
            ExprKind::Conditional {
                condition,
                if_true,
                if_false,
            },
            range,
        )
    }

    /// Allocates an index access node.
    pub fn index(&mut self, base: ExprId, index: ExprId, range: impl Into<SourceRange>) -> ExprId {
        self.alloc(ExprKind::Index { base, index }, range)
    }

    /// Allocates a member access node.
    pub fn member(
        &mut self,
        base: ExprId,
        member: impl Into<String>,
        range: impl Into<SourceRange>,
    ) -> ExprId {
        self.alloc(
            ExprKind::Member {
                base,
                member: member.into(),
            },
            range,
        )
    }

    /// Allocates a `let .. in ..` node.
    pub fn let_in(
        &mut self,
        names: Vec<&str>,
        rhs: ExprId,
        body: ExprId,
        range: impl Into<SourceRange>,
    ) -> ExprId {
        let names = names.into_iter().map_into().collect();
        self.alloc(ExprKind::Let { names, rhs, body }, range)
    }

    /// Allocates a call node.
    pub fn call(
        &mut self,
        callee: ExprId,
        args: Vec<ExprId>,
        range: impl Into<SourceRange>,
    ) -> ExprId {
        self.alloc(ExprKind::Call { callee, args }, range)
    }

    /// Renders the expression rooted at `id` back into source-like text.
    ///
    /// The rendering is meant for inclusion in diagnostics and makes no
    /// attempt to reproduce the exact input; in particular it parenthesises
    /// every compound expression.
    #[must_use]
    pub fn render(&self, id: ExprId) -> String {
        match &self.get(id).kind {
            ExprKind::Number { value } => value.to_string(),
            ExprKind::Bool { value } => value.to_string(),
            ExprKind::StringLiteral { value } => format!("\"{value}\""),
            ExprKind::HexLiteral { value } => format!("hex\"{value}\""),
            ExprKind::AddressLiteral { value } | ExprKind::Identifier { name: value } => {
                value.clone()
            }
            ExprKind::Result => "$result".to_string(),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => format!("!{}", self.render(*operand)),
                UnaryOp::Neg => format!("-{}", self.render(*operand)),
                UnaryOp::Old => format!("old({})", self.render(*operand)),
            },
            ExprKind::Binary { op, left, right } => {
                format!("({} {op} {})", self.render(*left), self.render(*right))
            }
            ExprKind::Conditional {
                condition,
                if_true,
                if_false,
            } => format!(
                "({} ? {} : {})",
                self.render(*condition),
                self.render(*if_true),
                self.render(*if_false)
            ),
            ExprKind::Index { base, index } => {
                format!("{}[{}]", self.render(*base), self.render(*index))
            }
            ExprKind::Member { base, member } => format!("{}.{member}", self.render(*base)),
            ExprKind::Let { names, rhs, body } => format!(
                "(let {} = {} in {})",
                names.iter().join(", "),
                self.render(*rhs),
                self.render(*body)
            ),
            ExprKind::Call { callee, args } => format!(
                "{}({})",
                self.render(*callee),
                args.iter().map(|a| self.render(*a)).join(", ")
            ),
        }
    }
}
