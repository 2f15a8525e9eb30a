//! `DeclarationFinisher` (C8): a second constant-folding pass that runs
//! once every enumerator in a translation unit has a resolved value,
//! re-evaluating any declaration whose dimensions referenced an enum
//! constant before it was defined (`enum { A = N, N = 4 };` style
//! forward references, or an array dimension spelled as an enumerator
//! declared later in the same `enum`).
//!
//! It operates on `Declaration`, not `Declarator`: by the time a
//! declaration exists, `Declarator::declare_variable` has already moved
//! the subscript trees out of the declarator, so only the `Declaration`
//! still has them to re-fold.

use crate::declaration::Declaration;
use crate::declarator::fold_array_dimensions;
use crate::eval::{ConstEnv, Scalar, TypeEnv};
use crate::types::TypeManager;
use crate::Diagnostics;
use std::collections::HashMap;

/// Backs `ConstEnv` with the fully resolved enumerator table; everything
/// else about constant folding (`ConstantEvaluator`) is unchanged between
/// the first and second passes.
#[derive(Debug, Default)]
pub struct DeclarationFinisher {
    enum_constants: HashMap<String, Scalar>,
}

impl DeclarationFinisher {
    pub fn new() -> Self {
        DeclarationFinisher::default()
    }

    pub fn add_enum_constant(&mut self, name: impl Into<String>, value: Scalar) {
        self.enum_constants.insert(name.into(), value);
    }

    /// Re-runs the subscript fold for a `Declaration` still waiting on
    /// it (`Declaration::needs_finishing`). A no-op returning `true` for
    /// a declaration that has nothing pending. On success, fills in
    /// `declaration.dimensions` and clears `array_size_exprs`; on
    /// failure, leaves both untouched (the diagnostic has already been
    /// pushed) and returns `false`.
    pub fn finish_declaration(
        &self,
        declaration: &mut Declaration,
        diags: &mut Diagnostics,
        types: &mut TypeManager,
        type_env: &dyn TypeEnv,
    ) -> bool {
        if !declaration.needs_finishing() {
            return true;
        }
        let init_expr = declaration.init_expr.clone();
        let dims = fold_array_dimensions(
            &declaration.name,
            &declaration.pos,
            &mut declaration.array_size_exprs,
            diags,
            types,
            self,
            type_env,
            false,
            init_expr.as_ref(),
        );
        match dims {
            Some(dims) => {
                declaration.dimensions = dims.into_iter().map(|d| d.unwrap_or(0)).collect();
                declaration.array_size_exprs.clear();
                true
            }
            None => false,
        }
    }

    /// Finalizes the array `TypeDesc` at `array` in place once every
    /// dimension has a concrete value, by writing them through
    /// `TypeManager::set_dimension`. Arrays are deliberately never
    /// interned, so "finalizing" one only means filling in its
    /// previously-unresolved slots; no new `TypeId` is produced.
    pub fn finalize_array_type(&self, types: &mut TypeManager, array: m6809_ast::TypeId, dims: &[u16]) {
        for (i, &w) in dims.iter().enumerate() {
            types.set_dimension(array, i, w);
        }
    }
}

impl ConstEnv for DeclarationFinisher {
    fn lookup_constant(&self, name: &str) -> Option<Scalar> {
        self.enum_constants.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarator::Declarator;
    use crate::eval::{EmptyTypeEnv, Width};
    use m6809_ast::{Expression, Identifier, Node, Pos};
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_forward_referenced_enum_constant() {
        let mut declarator = Declarator::new("buf", Pos::none());
        declarator.add_array_size_expr(Some(Node::new(
            Expression::Identifier(Box::new(Identifier { name: "SIZE".into() })),
            Pos::none(),
        )));

        let mut types = TypeManager::new();
        let ty = types.byte_type(false);
        let mut diags = Diagnostics::new();
        let mut declaration = declarator
            .declare_variable(ty, false, false, None, &mut diags)
            .unwrap();
        assert!(!diags.has_errors());
        assert!(declaration.needs_finishing());
        assert!(declaration.dimensions.is_empty());

        let mut finisher = DeclarationFinisher::new();
        finisher.add_enum_constant("SIZE", Scalar::new(8, Width::Word, true));
        let ok = finisher.finish_declaration(&mut declaration, &mut diags, &mut types, &EmptyTypeEnv);
        assert!(ok);
        assert!(!diags.has_errors());
        assert_eq!(declaration.dimensions, vec![8]);
        assert!(!declaration.needs_finishing());
    }

    #[test]
    fn unknown_identifier_still_fails() {
        let mut declarator = Declarator::new("buf", Pos::none());
        declarator.add_array_size_expr(Some(Node::new(
            Expression::Identifier(Box::new(Identifier { name: "MISSING".into() })),
            Pos::none(),
        )));

        let mut types = TypeManager::new();
        let ty = types.byte_type(false);
        let mut diags = Diagnostics::new();
        let mut declaration = declarator
            .declare_variable(ty, false, false, None, &mut diags)
            .unwrap();
        assert!(declaration.needs_finishing());

        let finisher = DeclarationFinisher::new();
        let ok = finisher.finish_declaration(&mut declaration, &mut diags, &mut types, &EmptyTypeEnv);
        assert!(!ok);
        assert!(diags.has_errors());
        assert!(declaration.needs_finishing());
    }
}
