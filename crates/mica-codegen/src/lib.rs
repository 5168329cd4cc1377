//! # Mica Code Generator
//!
//! Rewrites a resolved program as C++17 source text. Takes the resolver's
//! verdict at face value: it refuses to run while any diagnostic is
//! outstanding, and otherwise performs a purely structural rewrite.

mod error;
mod runtime;
mod stdlib;
mod emitter;

pub use error::CodegenError;

use mica_ast::Program;
use mica_resolve::Resolution;

use crate::emitter::Emitter;

// =============================================================================
// Public API
// =============================================================================

/// Generates C++ source for a resolved program.
pub fn generate(program: &Program, resolution: &Resolution) -> Result<String, CodegenError> {
    if !resolution.is_clean() {
        return Err(CodegenError::new(format!(
            "Refusing to generate code with {} outstanding diagnostic(s)",
            resolution.diagnostics.len()
        )));
    }
    Emitter::new(resolution).emit_program(program)
}

// =============================================================================
// Tests
// =============================================================================
