//! Scope stack (symbol table)
//!
//! Bindings live in a flat arena owned by the stack; each scope frame maps
//! names to arena ids. Ids are never reused within one resolution, so a
//! binding stays addressable for borrow rollback even after its frame pops.

use std::collections::HashMap;

use crate::ownership::{BorrowKind, OwnershipState};
use crate::types::Type;

/// Identity of a binding within one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) usize);

/// One declared name's compile-time record.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    /// None between declaration and type inference.
    pub declared_type: Option<Type>,
    pub mutable: bool,
    pub ownership: OwnershipState,
    pub immutable_borrow_count: u32,
    pub has_mutable_borrow: bool,
    /// False between declaration and initializer resolution; guards
    /// reads of a binding inside its own initializer.
    pub defined: bool,
}

struct ScopeFrame {
    names: HashMap<String, BindingId>,
    /// Borrow events created inside this scope, undone on exit.
    borrow_events: Vec<(BindingId, BorrowKind)>,
}

impl ScopeFrame {
    fn new() -> Self {
        Self {
            names: HashMap::new(),
            borrow_events: Vec::new(),
        }
    }
}

/// The ordered stack of scopes for one resolution.
pub struct ScopeStack {
    bindings: Vec<Binding>,
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            frames: vec![ScopeFrame::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(ScopeFrame::new());
    }

    /// Pops the top scope and rolls back the borrows it created. The global
    /// scope is never popped.
    pub fn exit_scope(&mut self) {
        debug_assert!(self.frames.len() > 1, "exit_scope on global scope");
        if self.frames.len() <= 1 {
            return;
        }
        let frame = self.frames.pop().unwrap();
        for (id, kind) in frame.borrow_events {
            let binding = &mut self.bindings[id.0];
            match kind {
                BorrowKind::Immutable => {
                    binding.immutable_borrow_count =
                        binding.immutable_borrow_count.saturating_sub(1);
                }
                BorrowKind::Mutable => binding.has_mutable_borrow = false,
            }
        }
    }

    /// Declares a name in the top scope. On redeclaration within the same
    /// scope, returns `Err` with the existing binding so the caller can
    /// report and keep resolving against it.
    pub fn declare(&mut self, name: &str, mutable: bool) -> Result<BindingId, BindingId> {
        let top = self.frames.last_mut().unwrap();
        if let Some(&existing) = top.names.get(name) {
            return Err(existing);
        }
        let id = BindingId(self.bindings.len());
        self.bindings.push(Binding {
            name: name.to_string(),
            declared_type: None,
            mutable,
            ownership: OwnershipState::Owned,
            immutable_borrow_count: 0,
            has_mutable_borrow: false,
            defined: false,
        });
        top.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Nearest-enclosing lookup, innermost scope first. A miss is not an
    /// error here; callers decide whether it is `UndefinedVariable`.
    pub fn lookup(&self, name: &str) -> Option<BindingId> {
        for frame in self.frames.iter().rev() {
            if let Some(&id) = frame.names.get(name) {
                return Some(id);
            }
        }
        None
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0]
    }

    pub(crate) fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0]
    }

    pub(crate) fn log_borrow(&mut self, id: BindingId, kind: BorrowKind) {
        self.frames.last_mut().unwrap().borrow_events.push((id, kind));
    }

    /// Number of scopes currently on the stack (1 = global only).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
