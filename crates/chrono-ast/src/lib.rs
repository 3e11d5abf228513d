#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod span {
    use serde::Serialize;
    use std::fmt;

    /// A 1-based line/column location in the source text.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
    pub struct Position {
        pub line: u32,
        pub column: u32,
    }

    impl Position {
        pub const fn new(line: u32, column: u32) -> Self {
            Self { line, column }
        }
    }

    impl Default for Position {
        fn default() -> Self {
            Self::new(1, 1)
        }
    }

    impl fmt::Display for Position {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

pub mod ast {
    use super::span::Position;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct Ident {
        pub name: String,
        pub pos: Position,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct Literal {
        pub value: String,
        pub pos: Position,
    }

    // ======= expressions =======

    #[derive(Debug, Clone, Serialize)]
    pub enum Expr {
        /// An expression that failed to parse.
        Bad { pos: Position },
        Ident(Ident),
        Literal(Literal),
        Paren {
            inner: Box<Expr>,
            start: Position,
            end: Position,
        },
        Call {
            func: Ident,
            args: Vec<Expr>,
            pos: Position,
        },
        Math {
            lhs: Box<Expr>,
            rhs: Box<Expr>,
            op: Operator,
            pos: Position,
        },
    }

    impl Expr {
        pub fn position(&self) -> Position {
            match self {
                Expr::Bad { pos } => *pos,
                Expr::Ident(id) => id.pos,
                Expr::Literal(lit) => lit.pos,
                Expr::Paren { start, .. } => *start,
                Expr::Call { pos, .. } => *pos,
                Expr::Math { pos, .. } => *pos,
            }
        }

        /// Whether the expression could be evaluated before emission.
        ///
        /// A math expression is computable when both of its operands are.
        pub fn is_computable(&self) -> bool {
            match self {
                Expr::Bad { .. } | Expr::Ident(_) | Expr::Call { .. } => false,
                Expr::Literal(_) => true,
                Expr::Paren { inner, .. } => inner.is_computable(),
                Expr::Math { lhs, rhs, .. } => lhs.is_computable() && rhs.is_computable(),
            }
        }
    }

    /// Operators known to the expression parser, including the assignment
    /// forms and brackets which only take part in precedence decisions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum Operator {
        Assign,
        AssignRegistered,
        LeftShift,
        RightShift,
        Add,
        Sub,
        Mul,
        Div,
        Bracket,
        Equals,
        GreaterEq,
        LessEq,
        Greater,
        Less,
    }

    impl Operator {
        pub fn from_symbol(sym: &str) -> Option<Self> {
            let op = match sym {
                "=" => Operator::Assign,
                "<-" => Operator::AssignRegistered,
                "<<" => Operator::LeftShift,
                ">>" => Operator::RightShift,
                "+" => Operator::Add,
                "-" => Operator::Sub,
                "*" => Operator::Mul,
                "/" => Operator::Div,
                "(" | ")" => Operator::Bracket,
                "==" => Operator::Equals,
                ">=" => Operator::GreaterEq,
                "<=" => Operator::LessEq,
                ">" => Operator::Greater,
                "<" => Operator::Less,
                _ => return None,
            };
            Some(op)
        }

        // Precedence (low -> high):
        //   0: = <-
        //   1: == >= <= > <
        //   2: << >>
        //   3: + -
        //   4: * /
        //   5: ( )
        pub fn precedence(self) -> u8 {
            match self {
                Operator::Assign | Operator::AssignRegistered => 0,
                Operator::Equals
                | Operator::GreaterEq
                | Operator::LessEq
                | Operator::Greater
                | Operator::Less => 1,
                Operator::LeftShift | Operator::RightShift => 2,
                Operator::Add | Operator::Sub => 3,
                Operator::Mul | Operator::Div => 4,
                Operator::Bracket => 5,
            }
        }
    }

    // ======= statements =======

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum AssignOp {
        /// `=`
        Plain,
        /// `<-`
        Registered,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Block {
        pub stmts: Vec<Stmt>,
        pub start: Position,
        pub end: Position,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Stmt {
        /// A statement that failed to parse.
        Bad { pos: Position },
        Decl { decl: Decl, pos: Position },
        Expr { expr: Expr, pos: Position },
        Assign {
            op: AssignOp,
            lhs: Ident,
            rhs: Expr,
            pos: Position,
        },
        /// A statement evaluated on the edge of `clock`.
        Sequence {
            clock: Clock,
            inner: Box<Stmt>,
            pos: Position,
        },
        Return { result: Expr, pos: Position },
        Block(Block),
        If {
            cond: Expr,
            body: Box<Stmt>,
            else_: Option<Box<Stmt>>,
            pos: Position,
        },
        Loop {
            cond: Expr,
            body: Box<Stmt>,
            pos: Position,
        },
    }

    impl Stmt {
        pub fn position(&self) -> Position {
            match self {
                Stmt::Bad { pos }
                | Stmt::Decl { pos, .. }
                | Stmt::Expr { pos, .. }
                | Stmt::Assign { pos, .. }
                | Stmt::Sequence { pos, .. }
                | Stmt::Return { pos, .. }
                | Stmt::If { pos, .. }
                | Stmt::Loop { pos, .. } => *pos,
                Stmt::Block(block) => block.start,
            }
        }
    }

    // ======= declarations =======

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
    pub enum Storage {
        #[default]
        Wire,
        Reg,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum Direction {
        In,
        Out,
        InOut,
    }

    /// Ties a register to the clock it samples on.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct Clock {
        pub name: Ident,
        /// Triggered on the falling edge (`@!clk`).
        pub negated: bool,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Decl {
        Value(ValueDecl),
        Signal(SignalDecl),
        Param(ParamDecl),
        Module(ModuleDecl),
    }

    impl Decl {
        pub fn position(&self) -> Position {
            match self {
                Decl::Value(d) => d.name.pos,
                Decl::Signal(d) => d.name.pos,
                Decl::Param(d) => d.signal.name.pos,
                Decl::Module(d) => d.name.pos,
            }
        }
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ValueDecl {
        pub name: Ident,
        pub ty: String,
        pub value: Expr,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct SignalDecl {
        pub name: Ident,
        pub width: u32,
        pub storage: Storage,
        pub clock: Option<Clock>,
    }

    impl SignalDecl {
        /// Registers are either declared `reg` or sampled on a clock.
        pub fn is_register(&self) -> bool {
            self.storage == Storage::Reg || self.clock.is_some()
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct ParamDecl {
        pub signal: SignalDecl,
        pub direction: Direction,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ModuleDecl {
        pub name: Ident,
        pub params: Vec<ParamDecl>,
        pub body: Block,
    }

    impl ModuleDecl {
        pub fn position(&self) -> Position {
            self.name.pos
        }
    }
}
