//! Ownership and borrow tracking
//!
//! Every read, write, and borrow-creating expression goes through these
//! rules. Borrows are lexically scoped: the scope stack records which scope
//! created each borrow and undoes it on exit, so no dataflow analysis is
//! needed beyond the stack itself.

use crate::error::DiagnosticKind;
use crate::scope::{BindingId, ScopeStack};
use crate::types::Type;

/// Ownership state of a binding's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipState {
    Owned,
    /// Consumed by a by-value use; terminal until the binding is
    /// reassigned.
    Moved,
}

/// The two borrow flavors, as recorded in per-scope event logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowKind {
    Immutable,
    Mutable,
}

impl ScopeStack {
    /// Marks the binding initialized. Called only after its initializer has
    /// fully resolved, so the initializer cannot observe the binding.
    pub fn mark_defined(&mut self, id: BindingId) {
        self.binding_mut(id).defined = true;
    }

    pub fn set_type(&mut self, id: BindingId, ty: Type) {
        self.binding_mut(id).declared_type = Some(ty);
    }

    /// Checks a read of the binding's value.
    pub fn record_read(&self, id: BindingId) -> Result<(), DiagnosticKind> {
        let binding = self.binding(id);
        if !binding.defined {
            return Err(DiagnosticKind::SelfReferentialInitializer);
        }
        if binding.ownership == OwnershipState::Moved {
            return Err(DiagnosticKind::UseOfMovedValue);
        }
        Ok(())
    }

    /// Consumes the binding's value by a non-borrowing use.
    pub fn record_move(&mut self, id: BindingId) {
        self.binding_mut(id).ownership = OwnershipState::Moved;
    }

    pub fn record_immutable_borrow(&mut self, id: BindingId) -> Result<(), DiagnosticKind> {
        if self.binding(id).has_mutable_borrow {
            return Err(DiagnosticKind::CannotBorrowImmutably);
        }
        self.binding_mut(id).immutable_borrow_count += 1;
        self.log_borrow(id, BorrowKind::Immutable);
        Ok(())
    }

    pub fn record_mutable_borrow(&mut self, id: BindingId) -> Result<(), DiagnosticKind> {
        let binding = self.binding(id);
        if binding.immutable_borrow_count > 0 || binding.has_mutable_borrow {
            return Err(DiagnosticKind::CannotBorrowMutably);
        }
        if !binding.mutable {
            return Err(DiagnosticKind::CannotBorrowMutablyFromImmutable);
        }
        self.binding_mut(id).has_mutable_borrow = true;
        self.log_borrow(id, BorrowKind::Mutable);
        Ok(())
    }

    /// Checks a whole-binding assignment. Reassignment makes a moved
    /// binding usable again.
    pub fn record_write(&mut self, id: BindingId) -> Result<(), DiagnosticKind> {
        if !self.binding(id).mutable {
            return Err(DiagnosticKind::AssignToImmutable);
        }
        self.binding_mut(id).ownership = OwnershipState::Owned;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_binding(stack: &mut ScopeStack, name: &str, mutable: bool) -> BindingId {
        let id = stack.declare(name, mutable).unwrap();
        stack.set_type(id, Type::Str);
        stack.mark_defined(id);
        id
    }

    #[test]
    fn test_move_then_read() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "s", false);

        assert!(stack.record_read(id).is_ok());
        stack.record_move(id);
        assert_eq!(
            stack.record_read(id),
            Err(DiagnosticKind::UseOfMovedValue)
        );
    }

    #[test]
    fn test_reassignment_resets_move() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "s", true);

        stack.record_move(id);
        assert!(stack.record_write(id).is_ok());
        assert!(stack.record_read(id).is_ok());
    }

    #[test]
    fn test_read_before_defined() {
        let mut stack = ScopeStack::new();
        let id = stack.declare("a", false).unwrap();
        assert_eq!(
            stack.record_read(id),
            Err(DiagnosticKind::SelfReferentialInitializer)
        );
        stack.mark_defined(id);
        assert!(stack.record_read(id).is_ok());
    }

    #[test]
    fn test_borrow_exclusivity() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "s", true);

        assert!(stack.record_immutable_borrow(id).is_ok());
        assert_eq!(
            stack.record_mutable_borrow(id),
            Err(DiagnosticKind::CannotBorrowMutably)
        );
    }

    #[test]
    fn test_immutable_after_mutable_borrow() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "s", true);

        assert!(stack.record_mutable_borrow(id).is_ok());
        assert_eq!(
            stack.record_immutable_borrow(id),
            Err(DiagnosticKind::CannotBorrowImmutably)
        );
    }

    #[test]
    fn test_mutable_borrow_of_immutable_binding() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "s", false);

        assert_eq!(
            stack.record_mutable_borrow(id),
            Err(DiagnosticKind::CannotBorrowMutablyFromImmutable)
        );
    }

    #[test]
    fn test_borrows_released_on_scope_exit() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "s", true);

        stack.enter_scope();
        assert!(stack.record_immutable_borrow(id).is_ok());
        assert!(stack.record_immutable_borrow(id).is_ok());
        assert_eq!(stack.binding(id).immutable_borrow_count, 2);
        stack.exit_scope();

        assert_eq!(stack.binding(id).immutable_borrow_count, 0);
        assert!(stack.record_mutable_borrow(id).is_ok());
    }

    #[test]
    fn test_shadowing_creates_new_binding() {
        let mut stack = ScopeStack::new();
        let outer = owned_binding(&mut stack, "a", false);

        stack.enter_scope();
        let inner = stack.declare("a", true).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(stack.lookup("a"), Some(inner));
        stack.exit_scope();

        assert_eq!(stack.lookup("a"), Some(outer));
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut stack = ScopeStack::new();
        let first = stack.declare("a", false).unwrap();
        assert_eq!(stack.declare("a", false), Err(first));
    }

    #[test]
    fn test_assign_to_immutable() {
        let mut stack = ScopeStack::new();
        let id = owned_binding(&mut stack, "a", false);
        assert_eq!(
            stack.record_write(id),
            Err(DiagnosticKind::AssignToImmutable)
        );
    }
}
