//! Lexical scopes of signal declarations used during emission.

use crate::error::EmitError;
use chrono_ast::ast::SignalDecl;
use log::trace;

/// A declaration together with the name it is emitted under.
#[derive(Debug, Clone)]
pub struct Binding {
    pub signal: SignalDecl,
    /// Name in the generated Verilog. Differs from the source name when
    /// another declaration in the same module already took it.
    pub emitted: String,
}

/// A stack of declaration frames, one per open module or block.
///
/// The outermost frame is never popped, so there is always a frame to
/// declare into.
#[derive(Debug)]
pub struct Scope {
    frames: Vec<Vec<Binding>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    /// Number of frames opened with [`Scope::enter`] and not yet exited.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn enter(&mut self) {
        self.frames.push(Vec::new());
        trace!("enter scope (depth {})", self.depth());
    }

    /// Drop the innermost frame and everything declared in it.
    pub fn exit(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        trace!("exit scope (depth {})", self.depth());
    }

    /// Declare `signal` in the innermost frame under its own name.
    pub fn declare(&mut self, signal: SignalDecl) -> Result<(), EmitError> {
        let emitted = signal.name.name.clone();
        self.declare_as(signal, emitted)
    }

    /// Declare `signal` in the innermost frame, emitted as `emitted`.
    pub fn declare_as(&mut self, signal: SignalDecl, emitted: String) -> Result<(), EmitError> {
        let innermost = self.frames.len() - 1;
        let frame = &mut self.frames[innermost];
        if let Some(prev) = frame.iter().find(|b| b.signal.name.name == signal.name.name) {
            return Err(EmitError::DuplicateSignal {
                name: signal.name.name.clone(),
                first: prev.signal.name.pos,
                pos: signal.name.pos,
            });
        }
        trace!(
            "declare '{}' as '{}' (width {})",
            signal.name.name,
            emitted,
            signal.width
        );
        frame.push(Binding { signal, emitted });
        Ok(())
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|b| b.signal.name.name == name)
    }

    /// Find the innermost declaration of `name`.
    pub fn resolve(&self, name: &str) -> Option<&SignalDecl> {
        self.lookup(name).map(|b| &b.signal)
    }
}
