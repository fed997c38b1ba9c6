//! The tree produced by [`crate::Parser`].
//!
//! Every node that represents a statement carries a `line`; expression
//! nodes carry one only where the grammar makes it meaningful (e.g. the
//! callee of a call). Node kinds follow the alphabet the transformer
//! (`lucov-transform`) is built against: `Block`, `Function`, `Id`,
//! `String`, `Number`, `Index` are non-executable constructors, while
//! the variants of [`Stat`] marked "executable" below are the ones that
//! receive a tracking call.

/// Reserved namespace the generated tracking calls are issued against.
pub const TRACK_NAMESPACE: &str = "TRACK_NS";
/// Reserved method on [`TRACK_NAMESPACE`] that records a line hit.
pub const TRACK_FN: &str = "track";

/// A comment attached to the statement that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// An ordered, mutable sequence of statements with a position.
///
/// Prepending to a block is the primary rewrite primitive the
/// transformer uses to insert tracking calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stats: Vec<Stat>,
    /// Line of the block's first token, if it has one (the root block of
    /// an empty file has none).
    pub line: Option<u32>,
    /// Comments lexed after this block's last statement, with no
    /// following statement to attach to — a trailing comment before
    /// `end`/`else`/`elseif`/`until`/EOF, or the entire content of a
    /// comment-only block.
    pub trailing_comments: Vec<Comment>,
}

impl Block {
    pub fn new(stats: Vec<Stat>, line: Option<u32>) -> Self {
        Self {
            stats,
            line,
            trailing_comments: Vec::new(),
        }
    }

    /// Prepend a statement, the primary rewrite primitive.
    pub fn prepend(&mut self, stat: Stat) {
        self.stats.insert(0, stat);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    /// `base.field` — a syntactically valid identifier literal.
    Name(String),
    /// `base[expr]` — an arbitrary expression key.
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    Len,
}

/// Table-constructor field: `[k] = v`, `name = v`, or a bare positional `v`.
#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    Positional(Expr),
    Named(String, Expr),
    Keyed(Expr, Expr),
}

/// A quoting style preserved from the source so code generation does not
/// need to invent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Single,
    Double,
    /// Long-bracket string, `[[...]]` / `[=[...]=]`, carrying its level.
    Long(u32),
}

/// Non-executable constructors (expressions) per Table 3.1, plus the
/// operator/literal machinery the grammar needs to build them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil,
    True,
    False,
    Vararg,
    Number {
        value: f64,
        /// Original textual form, preserved so codegen round-trips hex
        /// literals (`0x1F`) and exponents faithfully.
        raw: String,
    },
    Str {
        value: String,
        quote: QuoteStyle,
    },
    Id(String),
    Index {
        base: Box<Expr>,
        key: IndexKey,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        line: Option<u32>,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        line: Option<u32>,
    },
    Function {
        params: Vec<String>,
        is_vararg: bool,
        body: Block,
        line: Option<u32>,
    },
    Table {
        fields: Vec<TableField>,
    },
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    UnOp {
        op: UnOp,
        expr: Box<Expr>,
    },
    Paren(Box<Expr>),
}

impl Expr {
    /// Build the callee for a synthesised tracking call:
    /// `TRACK_NS.track`.
    pub fn track_callee() -> Expr {
        Expr::Index {
            base: Box::new(Expr::Id(TRACK_NAMESPACE.to_string())),
            key: IndexKey::Name(TRACK_FN.to_string()),
        }
    }
}

/// Executable and non-executable statement kinds. The variants
/// annotated "executable" are exactly Table 3.1's tracked set; the
/// transformer inserts one tracking call immediately before each.
#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    /// `local n1, n2 = e1, e2` — executable.
    LocalDecl {
        names: Vec<String>,
        exprs: Vec<Expr>,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `local function f(...) ... end` — executable.
    LocalRecDecl {
        name: String,
        params: Vec<String>,
        is_vararg: bool,
        body: Block,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `lhs_list = rhs_list` — executable.
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `return e?` — executable, even with no arguments.
    Return {
        values: Vec<Expr>,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `if c1 then b1 elseif c2 then b2 ... [else be] end` — executable.
    ///
    /// `clauses` holds `(condition, body)` pairs for the `if`/`elseif`
    /// chain; an odd total child count at the source level corresponds
    /// to a trailing `else_block` being `Some`.
    If {
        clauses: Vec<(Expr, Block)>,
        else_block: Option<Block>,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `for i = start, stop[, step] do body end` — executable.
    NumericFor {
        var: String,
        start: Expr,
        stop: Expr,
        step: Option<Expr>,
        body: Block,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `for n1, n2 in e1, e2 do body end` — executable.
    GenericFor {
        names: Vec<String>,
        exprs: Vec<Expr>,
        body: Block,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `repeat body until cond` — executable.
    RepeatUntil {
        body: Block,
        cond: Expr,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `while cond do body end` — executable.
    While {
        cond: Expr,
        body: Block,
        line: u32,
        comments: Vec<Comment>,
    },
    /// A bare call used as a statement: `f(args)` — executable.
    Call {
        call: Expr,
        line: u32,
        comments: Vec<Comment>,
    },
    /// A bare method invocation used as a statement: `obj:m(args)` —
    /// executable. Kept distinct from `Call` only so the code generator
    /// can preserve colon syntax on output.
    MethodInvoke {
        call: Expr,
        line: u32,
        comments: Vec<Comment>,
    },
    /// `do ... end` — outside Table 3.1's tracked alphabet; parsed for
    /// grammar completeness but never receives a tracking call.
    Do { body: Block, line: u32, comments: Vec<Comment> },
    /// `break` — likewise untracked.
    Break { line: u32, comments: Vec<Comment> },
    /// `::label::` — likewise untracked.
    Label { name: String, line: u32, comments: Vec<Comment> },
    /// `goto label` — likewise untracked.
    Goto { name: String, line: u32, comments: Vec<Comment> },
}

impl Stat {
    /// The 1-based source line this statement starts on, if any.
    pub fn line(&self) -> Option<u32> {
        match self {
            Stat::LocalDecl { line, .. }
            | Stat::LocalRecDecl { line, .. }
            | Stat::Assign { line, .. }
            | Stat::Return { line, .. }
            | Stat::If { line, .. }
            | Stat::NumericFor { line, .. }
            | Stat::GenericFor { line, .. }
            | Stat::RepeatUntil { line, .. }
            | Stat::While { line, .. }
            | Stat::Call { line, .. }
            | Stat::MethodInvoke { line, .. }
            | Stat::Do { line, .. }
            | Stat::Break { line, .. }
            | Stat::Label { line, .. }
            | Stat::Goto { line, .. } => Some(*line),
        }
    }

    /// Whether this is one of the executable kinds the transformer
    /// inserts tracking calls before (Table 3.1).
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            Stat::LocalDecl { .. }
                | Stat::LocalRecDecl { .. }
                | Stat::Assign { .. }
                | Stat::Return { .. }
                | Stat::If { .. }
                | Stat::NumericFor { .. }
                | Stat::GenericFor { .. }
                | Stat::RepeatUntil { .. }
                | Stat::While { .. }
                | Stat::Call { .. }
                | Stat::MethodInvoke { .. }
        )
    }

    pub fn comments(&self) -> &[Comment] {
        match self {
            Stat::LocalDecl { comments, .. }
            | Stat::LocalRecDecl { comments, .. }
            | Stat::Assign { comments, .. }
            | Stat::Return { comments, .. }
            | Stat::If { comments, .. }
            | Stat::NumericFor { comments, .. }
            | Stat::GenericFor { comments, .. }
            | Stat::RepeatUntil { comments, .. }
            | Stat::While { comments, .. }
            | Stat::Call { comments, .. }
            | Stat::MethodInvoke { comments, .. }
            | Stat::Do { comments, .. }
            | Stat::Break { comments, .. }
            | Stat::Label { comments, .. }
            | Stat::Goto { comments, .. } => comments,
        }
    }
}
