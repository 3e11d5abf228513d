//! Verilog emission.
//!
//! Walks the module list and renders Verilog-2001 text. Statements at module
//! level are continuous (`assign`, `always` blocks); statements inside an
//! `always` block are procedural.
//!
//! Chrono blocks nest scopes but a Verilog module has a single namespace.
//! Every declaration therefore gets a name that is unique in its module
//! (`t`, then `t_1`, `t_2`, ...), and declarations made inside an `always`
//! block are hoisted to the top of the module body.

use crate::error::EmitError;
use crate::scope::{Binding, Scope};
use chrono_ast::ast::{
    AssignOp, Block, Clock, Decl, Direction, Expr, Ident, ModuleDecl, Operator, SignalDecl,
    Stmt,
};
use chrono_ast::span::Position;
use log::debug;
use std::collections::HashSet;
use std::io::Write;

const INDENT: &str = "\t";

/// Render `modules` as Verilog source.
pub fn emit(modules: &[ModuleDecl]) -> Result<String, EmitError> {
    let mut e = Emitter::default();
    for (i, module) in modules.iter().enumerate() {
        if i > 0 {
            e.out.push('\n');
        }
        e.emit_module(module)?;
    }
    Ok(e.out)
}

/// Render `modules` into `writer`. Nothing is written if emission fails.
pub fn emit_to<W: Write>(modules: &[ModuleDecl], mut writer: W) -> Result<(), EmitError> {
    let text = emit(modules)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Module level: `assign` and `always` blocks.
    Continuous,
    /// Inside `always @(*)`.
    Combinational,
    /// Inside `always @(posedge clk)`.
    Clocked,
}

#[derive(Default)]
struct Emitter {
    out: String,
    scope: Scope,
    /// Verilog names already used in the current module.
    names: HashSet<String>,
    /// Declarations from procedural blocks, written after the port list.
    hoisted: Vec<String>,
}

fn unsupported(node: &'static str, pos: Position) -> EmitError {
    EmitError::UnsupportedNode { node, pos }
}

fn direction_keyword(dir: Direction) -> &'static str {
    match dir {
        Direction::In => "input",
        Direction::Out => "output",
        Direction::InOut => "inout",
    }
}

/// `[W-1:0]` for buses, nothing for single bits.
fn bus_range(width: u32) -> Option<String> {
    (width > 1).then(|| format!("[{}:0]", width - 1))
}

fn operator_symbol(op: Operator) -> Option<&'static str> {
    let sym = match op {
        Operator::Add => "+",
        Operator::Sub => "-",
        Operator::Mul => "*",
        Operator::Div => "/",
        Operator::LeftShift => "<<",
        Operator::RightShift => ">>",
        Operator::Equals => "==",
        Operator::GreaterEq => ">=",
        Operator::LessEq => "<=",
        Operator::Greater => ">",
        Operator::Less => "<",
        Operator::Assign | Operator::AssignRegistered | Operator::Bracket => return None,
    };
    Some(sym)
}

fn signal_decl_line(signal: &SignalDecl, name: &str) -> String {
    let mut line = String::from(if signal.is_register() { "reg" } else { "wire" });
    if let Some(range) = bus_range(signal.width) {
        line.push(' ');
        line.push_str(&range);
    }
    line.push(' ');
    line.push_str(name);
    line.push(';');
    line
}

impl Emitter {
    fn line(&mut self, indent: usize, text: impl AsRef<str>) {
        for _ in 0..indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn lookup(&self, id: &Ident) -> Result<&Binding, EmitError> {
        self.scope
            .lookup(&id.name)
            .ok_or_else(|| EmitError::UndeclaredSignal {
                name: id.name.clone(),
                pos: id.pos,
            })
    }

    /// Reserve a module-unique Verilog name for a new declaration of `name`.
    fn claim_name(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut n = 1;
        while self.names.contains(&candidate) {
            candidate = format!("{}_{}", name, n);
            n += 1;
        }
        self.names.insert(candidate.clone());
        candidate
    }

    // ======= modules and blocks =======

    fn emit_module(&mut self, module: &ModuleDecl) -> Result<(), EmitError> {
        debug!(
            "emitting module `{}` ({} ports)",
            module.name.name,
            module.params.len()
        );
        self.scope.enter();
        self.names.clear();
        self.hoisted.clear();
        self.line(0, format!("module {} (", module.name.name));

        let last = module.params.len().saturating_sub(1);
        for (i, param) in module.params.iter().enumerate() {
            let signal = &param.signal;
            let emitted = self.claim_name(&signal.name.name);
            let mut port = String::from(direction_keyword(param.direction));
            if signal.is_register() {
                port.push_str(" reg");
            }
            if let Some(range) = bus_range(signal.width) {
                port.push(' ');
                port.push_str(&range);
            }
            port.push(' ');
            port.push_str(&emitted);
            if i < last {
                port.push(',');
            }
            self.line(1, port);
            self.scope.declare_as(signal.clone(), emitted)?;
        }
        self.line(0, ");");

        let decls_at = self.out.len();
        self.emit_block(&module.body, 1, Context::Continuous)?;
        if !self.hoisted.is_empty() {
            let decls: String = self
                .hoisted
                .drain(..)
                .map(|line| format!("{}{}\n", INDENT, line))
                .collect();
            self.out.insert_str(decls_at, &decls);
        }
        self.line(0, "endmodule");
        self.scope.exit();
        Ok(())
    }

    /// Emit the statements of `block` in a fresh scope, without delimiters.
    fn emit_block(&mut self, block: &Block, indent: usize, ctx: Context) -> Result<(), EmitError> {
        self.scope.enter();
        for stmt in &block.stmts {
            self.emit_stmt(stmt, indent, ctx)?;
        }
        self.scope.exit();
        Ok(())
    }

    /// Emit the body of an `always`, `if` or `else` that the caller has
    /// already wrapped in `begin`/`end`.
    fn emit_body(&mut self, stmt: &Stmt, indent: usize, ctx: Context) -> Result<(), EmitError> {
        match stmt {
            Stmt::Block(block) => self.emit_block(block, indent, ctx),
            other => {
                self.scope.enter();
                self.emit_stmt(other, indent, ctx)?;
                self.scope.exit();
                Ok(())
            }
        }
    }

    // ======= statements =======

    fn emit_stmt(&mut self, stmt: &Stmt, indent: usize, ctx: Context) -> Result<(), EmitError> {
        match stmt {
            Stmt::Decl { decl, pos } => self.emit_decl(decl, *pos, indent, ctx),
            Stmt::Assign { op, lhs, rhs, .. } => self.emit_assign(*op, lhs, rhs, indent, ctx),
            Stmt::Sequence { clock, inner, pos } => {
                if ctx != Context::Continuous {
                    return Err(unsupported("nested clocked sequence", *pos));
                }
                let edge = self.sensitivity(clock)?;
                self.line(indent, format!("always @({}) begin", edge));
                self.emit_body(inner, indent + 1, Context::Clocked)?;
                self.line(indent, "end");
                Ok(())
            }
            Stmt::If {
                cond, body, else_, ..
            } => {
                if ctx == Context::Continuous {
                    self.line(indent, "always @(*) begin");
                    self.emit_if(cond, body, else_.as_deref(), indent + 1, Context::Combinational)?;
                    self.line(indent, "end");
                    Ok(())
                } else {
                    self.emit_if(cond, body, else_.as_deref(), indent, ctx)
                }
            }
            Stmt::Block(block) => {
                if ctx == Context::Continuous {
                    self.emit_block(block, indent, ctx)
                } else {
                    self.line(indent, "begin");
                    self.emit_block(block, indent + 1, ctx)?;
                    self.line(indent, "end");
                    Ok(())
                }
            }
            // never produced by the parser
            Stmt::Bad { pos } => Err(unsupported("malformed statement", *pos)),
            Stmt::Expr { pos, .. } => Err(unsupported("expression statement", *pos)),
            Stmt::Return { pos, .. } => Err(unsupported("return statement", *pos)),
            Stmt::Loop { pos, .. } => Err(unsupported("loop statement", *pos)),
        }
    }

    fn emit_decl(
        &mut self,
        decl: &Decl,
        pos: Position,
        indent: usize,
        ctx: Context,
    ) -> Result<(), EmitError> {
        match decl {
            Decl::Signal(signal) => {
                let emitted = self.claim_name(&signal.name.name);
                if emitted != signal.name.name {
                    debug!(
                        "'{}' at {} emitted as '{}'",
                        signal.name.name, signal.name.pos, emitted
                    );
                }
                let line = signal_decl_line(signal, &emitted);
                self.scope.declare_as(signal.clone(), emitted)?;
                // Verilog has no declarations inside `always`.
                if ctx == Context::Continuous {
                    self.line(indent, line);
                } else {
                    self.hoisted.push(line);
                }
                Ok(())
            }
            Decl::Value(_) => Err(unsupported("value declaration", pos)),
            Decl::Param(_) => Err(unsupported(
                "parameter declaration outside a module header",
                pos,
            )),
            Decl::Module(_) => Err(unsupported("nested module", pos)),
        }
    }

    fn emit_assign(
        &mut self,
        op: AssignOp,
        lhs: &Ident,
        rhs: &Expr,
        indent: usize,
        ctx: Context,
    ) -> Result<(), EmitError> {
        let target = self.lookup(lhs)?;
        let is_reg = target.signal.is_register();
        let clock = target.signal.clock.clone();
        let name = target.emitted.clone();
        let value = self.render_expr(rhs)?;

        // `assign` drives wires, `always` blocks drive regs.
        let needs_reg = !(op == AssignOp::Plain && ctx == Context::Continuous);
        if is_reg != needs_reg {
            return Err(EmitError::StorageMismatch {
                name: lhs.name.clone(),
                pos: lhs.pos,
                needs_reg,
            });
        }

        match (op, ctx) {
            (AssignOp::Plain, Context::Continuous) => {
                self.line(indent, format!("assign {} = {};", name, value));
            }
            (AssignOp::Plain, _) => {
                self.line(indent, format!("{} = {};", name, value));
            }
            (AssignOp::Registered, Context::Continuous) => {
                let Some(clock) = clock else {
                    return Err(EmitError::MissingClock {
                        name: lhs.name.clone(),
                        pos: lhs.pos,
                    });
                };
                let edge = self.sensitivity(&clock)?;
                self.line(indent, format!("always @({})", edge));
                self.line(indent + 1, format!("{} <= {};", name, value));
            }
            (AssignOp::Registered, Context::Clocked) => {
                self.line(indent, format!("{} <= {};", name, value));
            }
            (AssignOp::Registered, Context::Combinational) => {
                return Err(EmitError::RegisteredInCombinational {
                    name: lhs.name.clone(),
                    pos: lhs.pos,
                });
            }
        }
        Ok(())
    }

    /// Emit an `if`/`else if`/`else` chain inside a procedural block.
    fn emit_if<'s>(
        &mut self,
        cond: &'s Expr,
        body: &'s Stmt,
        mut else_: Option<&'s Stmt>,
        indent: usize,
        ctx: Context,
    ) -> Result<(), EmitError> {
        let cond = self.render_expr(cond)?;
        self.line(indent, format!("if ({}) begin", cond));
        self.emit_body(body, indent + 1, ctx)?;

        while let Some(stmt) = else_ {
            match stmt {
                Stmt::If {
                    cond,
                    body,
                    else_: next,
                    ..
                } => {
                    let cond = self.render_expr(cond)?;
                    self.line(indent, format!("end else if ({}) begin", cond));
                    self.emit_body(body, indent + 1, ctx)?;
                    else_ = next.as_deref();
                }
                other => {
                    self.line(indent, "end else begin");
                    self.emit_body(other, indent + 1, ctx)?;
                    else_ = None;
                }
            }
        }
        self.line(indent, "end");
        Ok(())
    }

    fn sensitivity(&self, clock: &Clock) -> Result<String, EmitError> {
        let clk = self.lookup(&clock.name)?;
        let edge = if clock.negated { "negedge" } else { "posedge" };
        Ok(format!("{} {}", edge, clk.emitted))
    }

    // ======= expressions =======

    fn render_expr(&self, expr: &Expr) -> Result<String, EmitError> {
        match expr {
            Expr::Ident(id) => Ok(self.lookup(id)?.emitted.clone()),
            Expr::Literal(lit) => Ok(lit.value.clone()),
            Expr::Paren { inner, .. } => Ok(format!("({})", self.render_expr(inner)?)),
            Expr::Call { func, args, .. } => {
                let args = args
                    .iter()
                    .map(|a| self.render_expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{}({})", func.name, args.join(", ")))
            }
            Expr::Math { lhs, rhs, op, pos } => {
                let sym =
                    operator_symbol(*op).ok_or(unsupported("non-arithmetic operator", *pos))?;
                let lhs = self.render_operand(lhs, *op, false)?;
                let rhs = self.render_operand(rhs, *op, true)?;
                Ok(format!("{} {} {}", lhs, sym, rhs))
            }
            Expr::Bad { pos } => Err(unsupported("malformed expression", *pos)),
        }
    }

    /// Render an operand of `parent`, parenthesized when the tree shape would
    /// otherwise be lost.
    fn render_operand(
        &self,
        operand: &Expr,
        parent: Operator,
        right: bool,
    ) -> Result<String, EmitError> {
        let text = self.render_expr(operand)?;
        if let Expr::Math { op, .. } = operand {
            let (inner, outer) = (op.precedence(), parent.precedence());
            if inner < outer || (right && inner == outer) {
                return Ok(format!("({})", text));
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_ranges() {
        assert_eq!(bus_range(0), None);
        assert_eq!(bus_range(1), None);
        assert_eq!(bus_range(2).as_deref(), Some("[1:0]"));
        assert_eq!(bus_range(32).as_deref(), Some("[31:0]"));
    }

    #[test]
    fn only_expression_operators_have_symbols() {
        assert_eq!(operator_symbol(Operator::RightShift), Some(">>"));
        assert_eq!(operator_symbol(Operator::Bracket), None);
        assert_eq!(operator_symbol(Operator::Assign), None);
        assert_eq!(operator_symbol(Operator::AssignRegistered), None);
    }
}
