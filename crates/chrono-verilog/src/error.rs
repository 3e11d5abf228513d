use chrono_ast::span::Position;
use std::fmt;

/// Errors that can occur while emitting Verilog
#[derive(Debug)]
pub enum EmitError {
    /// A node kind the emitter has no rule for
    UnsupportedNode { node: &'static str, pos: Position },
    /// Reference to a signal that is not in scope
    UndeclaredSignal { name: String, pos: Position },
    /// A second declaration of a name in the same scope
    DuplicateSignal {
        name: String,
        first: Position,
        pos: Position,
    },
    /// Registered assignment to a signal without a clock tie
    MissingClock { name: String, pos: Position },
    /// Continuous assignment to a reg, or procedural assignment to a wire
    StorageMismatch {
        name: String,
        pos: Position,
        needs_reg: bool,
    },
    /// Registered assignment inside a combinational block
    RegisteredInCombinational { name: String, pos: Position },
    /// Failure writing the output
    Io(std::io::Error),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmitError::UnsupportedNode { node, pos } => {
                write!(f, "unsupported node at {}: {} cannot be emitted", pos, node)
            }
            EmitError::UndeclaredSignal { name, pos } => {
                write!(f, "undeclared signal '{}' at {}", name, pos)
            }
            EmitError::DuplicateSignal { name, first, pos } => {
                write!(
                    f,
                    "signal '{}' at {} is already declared at {}",
                    name, pos, first
                )
            }
            EmitError::MissingClock { name, pos } => {
                write!(
                    f,
                    "registered assignment to '{}' at {} but the signal has no clock",
                    name, pos
                )
            }
            EmitError::StorageMismatch {
                name,
                pos,
                needs_reg,
            } => {
                if *needs_reg {
                    write!(
                        f,
                        "'{}' at {} is assigned inside an always block and must be declared reg",
                        name, pos
                    )
                } else {
                    write!(
                        f,
                        "'{}' at {} is a reg and cannot be driven by a continuous assignment",
                        name, pos
                    )
                }
            }
            EmitError::RegisteredInCombinational { name, pos } => {
                write!(
                    f,
                    "registered assignment to '{}' at {} outside a clocked sequence",
                    name, pos
                )
            }
            EmitError::Io(e) => write!(f, "failed to write output: {}", e),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EmitError {
    fn from(e: std::io::Error) -> Self {
        EmitError::Io(e)
    }
}
