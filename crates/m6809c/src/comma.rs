//! Comma-expression child emission rule (C4, Design Notes "operation
//! table" realization): classifies each child of a comma expression's
//! `TreeSequence` into `{Skip, RValue, LValue}` for a downstream emitter
//! to consult. This crate stops at the classification; it does not emit
//! code.

use crate::eval::ConstantEvaluator;
use crate::types::TypeManager;
use m6809_ast::{Expression, Node, TreeSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEmission {
    /// A cast of an identifier, or any other constant-foldable
    /// subexpression: its evaluation has no side effect worth emitting.
    Skip,
    RValue,
    LValue,
}

/// `is_comma` distinguishes a real `Comma` expression from a
/// `TreeSequence` used to hold some other N-ary construct (e.g. a
/// function-pointer array's subscript list) where the last-child
/// l-value rule does not apply. `caller_wants_lvalue` mirrors the
/// enclosing context's request, matching the original emitter's
/// "wantLValue" parameter.
pub fn classify_comma_children(
    seq: &TreeSequence,
    is_comma: bool,
    caller_wants_lvalue: bool,
    types: &TypeManager,
    evaluator: &ConstantEvaluator,
) -> Vec<ChildEmission> {
    let last_index = seq.size().checked_sub(1);
    seq.iter()
        .enumerate()
        .map(|(i, child)| {
            if is_suppressed(child, evaluator) {
                return ChildEmission::Skip;
            }
            if child.ty.map_or(false, |t| types.is_aggregate(t)) {
                return ChildEmission::LValue;
            }
            if is_comma && caller_wants_lvalue && Some(i) == last_index {
                return ChildEmission::LValue;
            }
            ChildEmission::RValue
        })
        .collect()
}

/// A cast of a plain identifier is dropped (the cast changes nothing
/// observable); so is any other child whose value is a compile-time
/// constant, since folding it leaves nothing to emit.
fn is_suppressed(child: &Node<Expression>, evaluator: &ConstantEvaluator) -> bool {
    match &child.node {
        Expression::Cast(c) => {
            if matches!(c.expression.node, Expression::Identifier(_)) {
                return true;
            }
            evaluator.evaluate_constant_expr(&c.expression).is_some()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EmptyConstEnv;
    use m6809_ast::{CastExpression, Constant, Identifier, Integer, IntegerBase, IntegerSize, IntegerSuffix, Pos};
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Node<Expression> {
        Node::new(
            Expression::Identifier(Box::new(Identifier { name: name.into() })),
            Pos::none(),
        )
    }

    fn int_const(n: &str) -> Node<Expression> {
        Node::new(
            Expression::Constant(Box::new(Constant::Integer(Integer {
                base: IntegerBase::Decimal,
                number: Box::from(n),
                suffix: IntegerSuffix {
                    size: IntegerSize::Int,
                    unsigned: false,
                },
            }))),
            Pos::none(),
        )
    }

    #[test]
    fn cast_of_identifier_is_skipped() {
        let mut types = TypeManager::new();
        let cast = Node::new(
            Expression::Cast(Box::new(CastExpression {
                target: types.word_type(true),
                expression: Box::new(ident("x")),
            })),
            Pos::none(),
        );
        let mut seq = TreeSequence::new();
        seq.add_child(cast);
        seq.add_child(ident("y"));

        let evaluator = ConstantEvaluator::new(&types, &EmptyConstEnv);
        let result = classify_comma_children(&seq, true, false, &types, &evaluator);
        assert_eq!(result, vec![ChildEmission::Skip, ChildEmission::RValue]);
    }

    #[test]
    fn constant_foldable_child_is_skipped() {
        let mut types = TypeManager::new();
        let cast = Node::new(
            Expression::Cast(Box::new(CastExpression {
                target: types.word_type(true),
                expression: Box::new(int_const("5")),
            })),
            Pos::none(),
        );
        let mut seq = TreeSequence::new();
        seq.add_child(cast);

        let evaluator = ConstantEvaluator::new(&types, &EmptyConstEnv);
        let result = classify_comma_children(&seq, true, false, &types, &evaluator);
        assert_eq!(result, vec![ChildEmission::Skip]);
    }

    #[test]
    fn last_child_is_lvalue_only_when_caller_wants_it_and_is_comma() {
        let types = TypeManager::new();
        let mut seq = TreeSequence::new();
        seq.add_child(ident("a"));
        seq.add_child(ident("b"));

        let evaluator = ConstantEvaluator::new(&types, &EmptyConstEnv);

        let wants_lvalue = classify_comma_children(&seq, true, true, &types, &evaluator);
        assert_eq!(wants_lvalue, vec![ChildEmission::RValue, ChildEmission::LValue]);

        let wants_rvalue = classify_comma_children(&seq, true, false, &types, &evaluator);
        assert_eq!(wants_rvalue, vec![ChildEmission::RValue, ChildEmission::RValue]);

        let not_comma = classify_comma_children(&seq, false, true, &types, &evaluator);
        assert_eq!(not_comma, vec![ChildEmission::RValue, ChildEmission::RValue]);
    }

    #[test]
    fn aggregate_typed_child_is_always_lvalue() {
        let mut types = TypeManager::new();
        let class_ty = types.class_type();
        let mut node = ident("agg");
        node.ty = Some(class_ty);
        let mut seq = TreeSequence::new();
        seq.add_child(node);

        let evaluator = ConstantEvaluator::new(&types, &EmptyConstEnv);
        let result = classify_comma_children(&seq, true, false, &types, &evaluator);
        assert_eq!(result, vec![ChildEmission::LValue]);
    }
}
