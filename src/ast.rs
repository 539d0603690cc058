//! The abstract syntax tree produced by the parser.
//!
//! Every node carries the [`Position`] of the token that introduced it, for diagnostics, and
//! implements [`fmt::Display`] to print a canonical, re-parseable form of itself.

use std::fmt;

use crate::token::Position;

pub type Program = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub enum PrefixOp {
    Bang,
    Minus,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOp::Bang => "!",
            PrefixOp::Minus => "-",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::LtEq => "<=",
            InfixOp::GtEq => ">=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
            InfixOp::BitAnd => "&",
            InfixOp::BitOr => "|",
            InfixOp::BitXor => "^",
            InfixOp::Shl => "<<",
            InfixOp::Shr => ">>",
        })
    }
}

/// A compound-assignment operator, or plain `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    /// The underlying arithmetic operator for a compound assignment, if any.
    pub fn as_infix(self) -> Option<InfixOp> {
        Some(match self {
            AssignOp::Assign => return None,
            AssignOp::AddAssign => InfixOp::Add,
            AssignOp::SubAssign => InfixOp::Sub,
            AssignOp::MulAssign => InfixOp::Mul,
            AssignOp::DivAssign => InfixOp::Div,
            AssignOp::ModAssign => InfixOp::Mod,
        })
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub position: Position,
    pub name: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A statement. See spec §3.2.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        position: Position,
        name: Identifier,
        value: Expr,
    },
    Function {
        position: Position,
        name: Identifier,
        params: Vec<Identifier>,
        body: Block,
    },
    Return {
        position: Position,
        value: Option<Expr>,
    },
    If {
        position: Position,
        condition: Expr,
        consequence: Block,
        alternative: Option<Block>,
    },
    For {
        position: Position,
        value: Identifier,
        index: Option<Identifier>,
        container: Expr,
        body: Block,
    },
    /// A `.word` directive. Only `.quit` is meaningful (spec §4.3.1); anything else errors at
    /// evaluation time.
    Instruction {
        position: Position,
        word: String,
    },
    Expression {
        position: Position,
        expr: Expr,
    },
}

impl Stmt {
    pub fn position(&self) -> Position {
        match self {
            Stmt::Let { position, .. }
            | Stmt::Function { position, .. }
            | Stmt::Return { position, .. }
            | Stmt::If { position, .. }
            | Stmt::For { position, .. }
            | Stmt::Instruction { position, .. }
            | Stmt::Expression { position, .. } => *position,
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value, .. } => write!(f, "let {name} = {value};"),
            Stmt::Function {
                name, params, body, ..
            } => {
                let params = params
                    .iter()
                    .map(|p| p.name.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "func {name}({params}) {body}")
            }
            Stmt::Return { value, .. } => match value {
                Some(v) => write!(f, "return {v};"),
                None => write!(f, "return;"),
            },
            Stmt::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({condition}) {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Stmt::For {
                value,
                index,
                container,
                body,
                ..
            } => match index {
                Some(idx) => write!(f, "for {idx}, {value} in {container} {body}"),
                None => write!(f, "for {value} in {container} {body}"),
            },
            Stmt::Instruction { word, .. } => write!(f, ".{word}"),
            Stmt::Expression { expr, .. } => write!(f, "{expr};"),
        }
    }
}

/// A brace-delimited sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub position: Position,
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for stmt in &self.statements {
            write!(f, "{stmt} ")?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashLiteralPair {
    pub key: Expr,
    pub value: Expr,
}

/// An expression. See spec §3.2.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntegerLiteral {
        position: Position,
        value: i64,
    },
    FloatLiteral {
        position: Position,
        value: f64,
    },
    BooleanLiteral {
        position: Position,
        value: bool,
    },
    StringLiteral {
        position: Position,
        value: String,
    },
    NullLiteral {
        position: Position,
    },
    ArrayLiteral {
        position: Position,
        elements: Vec<Expr>,
    },
    HashLiteral {
        position: Position,
        pairs: Vec<HashLiteralPair>,
    },
    Identifier(Identifier),
    Prefix {
        position: Position,
        op: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        position: Position,
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        position: Position,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        position: Position,
        collection: Box<Expr>,
        key: Box<Expr>,
    },
    Assignment {
        position: Position,
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    /// `receiver.method(args)`, parsed through the dot-instruction mechanism when a `.` follows
    /// an expression rather than starting a statement (spec §3.2).
    MethodCall {
        position: Position,
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::IntegerLiteral { position, .. }
            | Expr::FloatLiteral { position, .. }
            | Expr::BooleanLiteral { position, .. }
            | Expr::StringLiteral { position, .. }
            | Expr::NullLiteral { position }
            | Expr::ArrayLiteral { position, .. }
            | Expr::HashLiteral { position, .. }
            | Expr::Prefix { position, .. }
            | Expr::Infix { position, .. }
            | Expr::Call { position, .. }
            | Expr::Index { position, .. }
            | Expr::Assignment { position, .. }
            | Expr::MethodCall { position, .. } => *position,
            Expr::Identifier(ident) => ident.position,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntegerLiteral { value, .. } => write!(f, "{value}"),
            Expr::FloatLiteral { value, .. } => write!(f, "{value}"),
            Expr::BooleanLiteral { value, .. } => write!(f, "{value}"),
            Expr::StringLiteral { value, .. } => write!(f, "\"{value}\""),
            Expr::NullLiteral { .. } => f.write_str("null"),
            Expr::ArrayLiteral { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{items}]")
            }
            Expr::HashLiteral { pairs, .. } => {
                let items = pairs
                    .iter()
                    .map(|p| format!("{}: {}", p.key, p.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{items}}}")
            }
            Expr::Identifier(ident) => write!(f, "{ident}"),
            Expr::Prefix { op, right, .. } => write!(f, "({op}{right})"),
            Expr::Infix {
                op, left, right, ..
            } => write!(f, "({left} {op} {right})"),
            Expr::Call { callee, args, .. } => {
                let args = args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{callee}({args})")
            }
            Expr::Index {
                collection, key, ..
            } => write!(f, "({collection}[{key}])"),
            Expr::Assignment {
                target, op, value, ..
            } => write!(f, "({target} {op} {value})"),
            Expr::MethodCall {
                receiver,
                method,
                args,
                ..
            } => {
                let args = args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{receiver}.{method}({args})")
            }
        }
    }
}
