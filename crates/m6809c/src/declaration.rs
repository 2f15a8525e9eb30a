//! `Declaration` (C7): a fully resolved variable or function declaration,
//! produced by `Declarator::declare_variable`.
//!
//! Array dimensions are not always resolvable at the point of
//! declaration: a subscript that names an enum constant declared later
//! in the same `enum` can only be folded once
//! [`crate::finisher::DeclarationFinisher`] has the complete enumerator
//! table. Such a `Declaration` carries its raw `array_size_exprs`
//! until `DeclarationFinisher::finish_declaration` resolves them into
//! `dimensions`.

use m6809_ast::{Expression, Node, Pos, TypeId};

#[derive(Debug)]
pub struct Declaration {
    pub name: String,
    pub ty: TypeId,
    pub init_expr: Option<Node<Expression>>,
    /// Resolved array dimensions, empty iff this is not an array
    /// declaration or its dimensions are still pending a finisher pass
    /// (see `array_size_exprs`).
    pub dimensions: Vec<u16>,
    /// Unresolved subscript expressions, inherited from the originating
    /// `Declarator`. Non-empty only while this declaration is still
    /// waiting on `DeclarationFinisher`; cleared once `dimensions` is
    /// filled in.
    pub array_size_exprs: Vec<Option<Node<Expression>>>,
    pub is_static: bool,
    pub is_extern: bool,
    pub pos: Pos,
    line_no: Option<u32>,
}

impl Declaration {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        ty: TypeId,
        init_expr: Option<Node<Expression>>,
        is_static: bool,
        is_extern: bool,
        pos: Pos,
        dimensions: Vec<u16>,
        array_size_exprs: Vec<Option<Node<Expression>>>,
    ) -> Self {
        Declaration {
            name,
            ty,
            init_expr,
            dimensions,
            array_size_exprs,
            is_static,
            is_extern,
            pos,
            line_no: None,
        }
    }

    /// Overrides the line the declaration is reported at; used when a
    /// multi-declarator statement (`int a, b;`) wants each `Declaration`
    /// to carry the line of its own declarator rather than the
    /// statement's first token.
    pub fn set_line_no(&mut self, line_no: u32) {
        self.line_no = Some(line_no);
    }

    pub fn line_no(&self) -> u32 {
        self.line_no.unwrap_or(self.pos.line)
    }

    pub fn has_initializer(&self) -> bool {
        self.init_expr.is_some()
    }

    /// True while this declaration's array dimensions are still waiting
    /// on a `DeclarationFinisher` pass.
    pub fn needs_finishing(&self) -> bool {
        !self.array_size_exprs.is_empty()
    }
}
