//! Declaration collection pre-pass
//!
//! Registers top-level `struct`/`trait`/`enum`/`func` names before any body
//! is walked, so bodies can reference declarations that appear later in
//! source order. The registry is immutable once body resolution starts.

use std::collections::HashMap;

use mica_ast::*;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::types::Type;

/// A function or method signature in resolved form.
#[derive(Debug, Clone, PartialEq)]
pub struct FnSig {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl FnSig {
    pub fn as_type(&self) -> Type {
        Type::Function {
            params: self.params.clone(),
            ret: Box::new(self.ret.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    pub sig: FnSig,
    /// Which trait the defining impl implements, None for inherent impls.
    pub trait_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StructInfo {
    pub fields: Vec<(String, Type, Visibility)>,
}

impl StructInfo {
    pub fn field(&self, name: &str) -> Option<&(String, Type, Visibility)> {
        self.fields.iter().find(|(n, _, _)| n == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TraitInfo {
    pub methods: Vec<(String, FnSig)>,
}

#[derive(Debug, Clone, Default)]
pub struct EnumInfo {
    pub members: Vec<String>,
}

/// Global name-to-declaration lookup table, populated once before body
/// resolution.
#[derive(Debug, Default)]
pub struct Registry {
    structs: HashMap<String, StructInfo>,
    enums: HashMap<String, EnumInfo>,
    traits: HashMap<String, TraitInfo>,
    functions: HashMap<String, FnSig>,
    /// Impl methods keyed by struct name.
    methods: HashMap<String, Vec<MethodInfo>>,
}

impl Registry {
    pub fn is_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn struct_info(&self, name: &str) -> Option<&StructInfo> {
        self.structs.get(name)
    }

    pub fn enum_info(&self, name: &str) -> Option<&EnumInfo> {
        self.enums.get(name)
    }

    pub fn trait_info(&self, name: &str) -> Option<&TraitInfo> {
        self.traits.get(name)
    }

    pub fn function_sig(&self, name: &str) -> Option<&FnSig> {
        self.functions.get(name)
    }

    pub fn methods_of(&self, struct_name: &str) -> &[MethodInfo] {
        self.methods
            .get(struct_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn method(&self, struct_name: &str, method_name: &str) -> Option<&MethodInfo> {
        self.methods_of(struct_name)
            .iter()
            .find(|m| m.name == method_name)
    }

    /// Converts a syntactic type annotation to a semantic type. Names in
    /// `generics` are in-scope type parameters and erase to `Unknown`.
    /// Returns the offending name when a named type is not declared.
    pub fn lower_type(
        &self,
        node: &Node<TypeExpr>,
        generics: &[String],
    ) -> Result<Type, String> {
        match &node.value {
            TypeExpr::Named(ident) => self.lower_named(&ident.name, generics),
            TypeExpr::Generic { base, args } => {
                // Type arguments are validated for existence, then erased;
                // generic structs resolve to their base struct type.
                for arg in args {
                    self.lower_type(arg, generics)?;
                }
                self.lower_named(&base.value.name, generics)
            }
            TypeExpr::Array { elem, size } => Ok(Type::Array {
                elem: Box::new(self.lower_type(elem, generics)?),
                size: *size,
            }),
            TypeExpr::Function {
                params,
                return_type,
            } => {
                let mut lowered = Vec::with_capacity(params.len());
                for p in params {
                    lowered.push(self.lower_type(p, generics)?);
                }
                Ok(Type::Function {
                    params: lowered,
                    ret: Box::new(self.lower_type(return_type, generics)?),
                })
            }
            TypeExpr::Option(inner) => {
                Ok(Type::Option(Box::new(self.lower_type(inner, generics)?)))
            }
            TypeExpr::Result { ok, err } => Ok(Type::Result {
                ok: Box::new(self.lower_type(ok, generics)?),
                err: Box::new(self.lower_type(err, generics)?),
            }),
            TypeExpr::Borrow { inner, mutable } => Ok(Type::Borrow {
                inner: Box::new(self.lower_type(inner, generics)?),
                mutable: *mutable,
            }),
        }
    }

    fn lower_named(&self, name: &str, generics: &[String]) -> Result<Type, String> {
        match name {
            "int" => Ok(Type::Int),
            "float" => Ok(Type::Float),
            "str" => Ok(Type::Str),
            "bool" => Ok(Type::Bool),
            "char" => Ok(Type::Char),
            "void" => Ok(Type::Void),
            _ if generics.iter().any(|g| g == name) => Ok(Type::Unknown),
            _ if self.structs.contains_key(name) => Ok(Type::Struct(name.to_string())),
            _ if self.enums.contains_key(name) => Ok(Type::Enum(name.to_string())),
            _ => Err(name.to_string()),
        }
    }
}

/// Result of the collection pre-pass.
pub struct CollectOutcome {
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when a cyclic type definition was found; the caller must abort
    /// the pass instead of walking bodies.
    pub fatal: bool,
}

/// Runs the pre-pass over a program's top-level statements.
pub fn collect(program: &Program) -> CollectOutcome {
    let mut collector = Collector {
        registry: Registry::default(),
        diagnostics: Vec::new(),
        struct_spans: HashMap::new(),
    };

    collector.register_names(program);
    collector.fill_details(program);
    let fatal = collector.check_struct_cycles();

    CollectOutcome {
        registry: collector.registry,
        diagnostics: collector.diagnostics,
        fatal,
    }
}

struct Collector {
    registry: Registry,
    diagnostics: Vec<Diagnostic>,
    struct_spans: HashMap<String, Span>,
}

impl Collector {
    fn diag(&mut self, span: Span, kind: DiagnosticKind, message: String) {
        self.diagnostics.push(Diagnostic::new(span, kind, message));
    }

    /// Pass 1: register every top-level declaration name so bodies can use
    /// forward references. Names share one namespace.
    fn register_names(&mut self, program: &Program) {
        for stmt in &program.stmts {
            let (name_node, kind) = match &stmt.value {
                Stmt::Struct(decl) => (&decl.name, "struct"),
                Stmt::Trait(decl) => (&decl.name, "trait"),
                Stmt::Enum(decl) => (&decl.name, "enum"),
                Stmt::Function(decl) => (&decl.name, "func"),
                _ => continue,
            };
            let name = name_node.value.name.clone();
            if self.is_registered(&name) {
                self.diag(
                    name_node.span,
                    DiagnosticKind::DuplicateDeclaration,
                    format!("The name '{}' is already declared", name),
                );
                continue;
            }
            match kind {
                "struct" => {
                    self.registry.structs.insert(name.clone(), StructInfo::default());
                    self.struct_spans.insert(name, name_node.span);
                }
                "trait" => {
                    self.registry.traits.insert(name, TraitInfo::default());
                }
                "enum" => {
                    self.registry.enums.insert(name, EnumInfo::default());
                }
                _ => {
                    self.registry.functions.insert(
                        name,
                        FnSig {
                            params: Vec::new(),
                            ret: Type::Void,
                        },
                    );
                }
            }
        }
    }

    fn is_registered(&self, name: &str) -> bool {
        self.registry.structs.contains_key(name)
            || self.registry.traits.contains_key(name)
            || self.registry.enums.contains_key(name)
            || self.registry.functions.contains_key(name)
    }

    /// Pass 2: now that every name is known, lower field types, method
    /// signatures, and function signatures.
    fn fill_details(&mut self, program: &Program) {
        for stmt in &program.stmts {
            match &stmt.value {
                Stmt::Struct(decl) => self.fill_struct(decl),
                Stmt::Trait(decl) => self.fill_trait(decl),
                Stmt::Enum(decl) => self.fill_enum(decl),
                Stmt::Function(decl) => self.fill_function(decl),
                Stmt::Impl(decl) => self.fill_impl(decl),
                _ => {}
            }
        }
    }

    fn lower_or_unknown(&mut self, node: &Node<TypeExpr>, generics: &[String]) -> Type {
        match self.registry.lower_type(node, generics) {
            Ok(ty) => ty,
            Err(name) => {
                self.diag(
                    node.span,
                    DiagnosticKind::UnknownType,
                    format!("Unknown type '{}'", name),
                );
                Type::Unknown
            }
        }
    }

    fn generic_names(generics: &[Node<Ident>]) -> Vec<String> {
        generics.iter().map(|g| g.value.name.clone()).collect()
    }

    fn lower_sig(
        &mut self,
        params: &[Param],
        return_type: Option<&Node<TypeExpr>>,
        generics: &[String],
    ) -> FnSig {
        let params = params
            .iter()
            .map(|p| self.lower_or_unknown(&p.ty, generics))
            .collect();
        let ret = return_type
            .map(|ty| self.lower_or_unknown(ty, generics))
            .unwrap_or(Type::Void);
        FnSig { params, ret }
    }

    fn fill_struct(&mut self, decl: &StructDecl) {
        let generics = Self::generic_names(&decl.generics);
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let ty = self.lower_or_unknown(&field.ty, &generics);
            if fields
                .iter()
                .any(|(n, _, _): &(String, Type, Visibility)| n == &field.name.value.name)
            {
                self.diag(
                    field.name.span,
                    DiagnosticKind::DuplicateDeclaration,
                    format!(
                        "Field '{}' is declared twice in struct '{}'",
                        field.name.value.name, decl.name.value.name
                    ),
                );
                continue;
            }
            fields.push((field.name.value.name.clone(), ty, field.visibility));
        }
        if let Some(info) = self.registry.structs.get_mut(&decl.name.value.name) {
            info.fields = fields;
        }
    }

    fn fill_trait(&mut self, decl: &TraitDecl) {
        let generics = Self::generic_names(&decl.generics);
        let mut methods = Vec::with_capacity(decl.methods.len());
        for method in &decl.methods {
            let sig = self.lower_sig(&method.params, method.return_type.as_ref(), &generics);
            methods.push((method.name.value.name.clone(), sig));
        }
        if let Some(info) = self.registry.traits.get_mut(&decl.name.value.name) {
            info.methods = methods;
        }
    }

    fn fill_enum(&mut self, decl: &EnumDecl) {
        let members = decl.members.iter().map(|m| m.value.name.clone()).collect();
        if let Some(info) = self.registry.enums.get_mut(&decl.name.value.name) {
            info.members = members;
        }
    }

    fn fill_function(&mut self, decl: &FunctionDecl) {
        let generics = Self::generic_names(&decl.generics);
        let sig = self.lower_sig(&decl.params, decl.return_type.as_ref(), &generics);
        if let Some(existing) = self.registry.functions.get_mut(&decl.name.value.name) {
            *existing = sig;
        }
    }

    fn fill_impl(&mut self, decl: &ImplDecl) {
        let struct_name = &decl.struct_name.value.name;
        if !self.registry.structs.contains_key(struct_name) {
            self.diag(
                decl.struct_name.span,
                DiagnosticKind::UnknownType,
                format!("Cannot impl unknown struct '{}'", struct_name),
            );
            return;
        }

        let trait_name = decl.trait_name.as_ref().map(|t| t.value.name.clone());
        let generics = Self::generic_names(&decl.generics);

        for method in &decl.methods {
            let method_name = method.name.value.name.clone();
            if self.registry.method(struct_name, &method_name).is_some() {
                self.diag(
                    method.name.span,
                    DiagnosticKind::DuplicateDeclaration,
                    format!(
                        "Method '{}' is declared twice for struct '{}'",
                        method_name, struct_name
                    ),
                );
                continue;
            }
            let sig = self.lower_sig(&method.params, method.return_type.as_ref(), &generics);
            self.registry
                .methods
                .entry(struct_name.clone())
                .or_default()
                .push(MethodInfo {
                    name: method_name,
                    sig,
                    trait_name: trait_name.clone(),
                });
        }
    }

    /// Pass 3: reject structs that embed themselves by value, which would
    /// make layout (and this analysis) non-terminating. The only fatal
    /// structural error.
    fn check_struct_cycles(&mut self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn embedded_structs(ty: &Type, out: &mut Vec<String>) {
            match ty {
                Type::Struct(name) => out.push(name.clone()),
                Type::Array { elem, .. } => embedded_structs(elem, out),
                Type::Option(inner) => embedded_structs(inner, out),
                Type::Result { ok, err } => {
                    embedded_structs(ok, out);
                    embedded_structs(err, out);
                }
                // Borrows and function values do not embed their targets.
                _ => {}
            }
        }

        fn visit(
            name: &str,
            registry: &Registry,
            marks: &mut HashMap<String, Mark>,
        ) -> Option<String> {
            match marks.get(name) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => return Some(name.to_string()),
                None => {}
            }
            marks.insert(name.to_string(), Mark::Visiting);
            if let Some(info) = registry.struct_info(name) {
                for (_, ty, _) in &info.fields {
                    let mut embedded = Vec::new();
                    embedded_structs(ty, &mut embedded);
                    for field_struct in embedded {
                        if let Some(cycle) = visit(&field_struct, registry, marks) {
                            return Some(cycle);
                        }
                    }
                }
            }
            marks.insert(name.to_string(), Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        let names: Vec<String> = self.registry.structs.keys().cloned().collect();
        for name in names {
            if let Some(cycle_name) = visit(&name, &self.registry, &mut marks) {
                let span = self
                    .struct_spans
                    .get(&cycle_name)
                    .copied()
                    .unwrap_or_else(|| Span::new(0, 0, 1));
                self.diag(
                    span,
                    DiagnosticKind::CyclicTypeDefinition,
                    format!("Struct '{}' embeds itself by value", cycle_name),
                );
                return true;
            }
        }
        false
    }
}
