//! Expression-tree and declarator AST shared by the m6809c front end.
//!
//! This crate deliberately knows nothing about `TypeDesc` interning or
//! constant folding: it carries only a `TypeId` handle (see [`span::TypeId`])
//! so that `m6809c`, which owns the type manager, can decorate nodes
//! without this crate depending back on it.

pub mod ast;
pub mod span;

pub use ast::*;
pub use span::{Node, Pos, TypeId};
