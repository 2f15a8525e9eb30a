//! Declaration and type subsystem for the m6809 C cross-compiler front
//! end: turns a parsed declarator tree into interned `TypeDesc`s and
//! resolved `Declaration`/`FormalParameter` values, with the constant
//! folding (`eval`) and diagnostics (`diagnostics`) that both depend on.
//!
//! This crate owns no lexer or grammar; it consumes the AST types from
//! `m6809_ast` and is driven by whatever parser produces them.

pub mod comma;
pub mod declaration;
pub mod declarator;
pub mod diagnostics;
pub mod dsl;
pub mod eval;
pub mod finisher;
pub mod params;
pub mod types;

pub use comma::{classify_comma_children, ChildEmission};
pub use declaration::Declaration;
pub use declarator::{BitFieldWidth, Declarator, DeclaratorKind};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use dsl::{DeclarationSpecifierList, Enumerator};
pub use eval::{
    fold_binary, fold_unary, ConstEnv, ConstantEvaluator, EmptyConstEnv, EmptyTypeEnv,
    ExpressionTypeSetter, Scalar, TypeEnv, Width,
};
pub use finisher::DeclarationFinisher;
pub use params::{FormalParamList, FormalParameter};
pub use types::{Qualifier, ScalarKind, TypeDesc, TypeManager};
