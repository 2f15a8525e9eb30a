//! `Declarator` (C5): an identifier plus stacked pointer/array/function
//! modifiers and a bit-field width.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::eval::{ConstEnv, ConstantEvaluator, ExpressionTypeSetter, TypeEnv};
use crate::params::FormalParamList;
use crate::types::Qualifier;
use crate::types::TypeManager;
use m6809_ast::{Expression, Node, Pos, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaratorKind {
    Singleton,
    Array,
    FuncPtr,
}

/// Replaces the original's sentinel integers (`NOT_BIT_FIELD = -1`,
/// `INVALID_WIDTH_EXPR = -2`, `NEGATIVE_WIDTH_EXPR = -3`) with a sum
/// type, per the Design Notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitFieldWidth {
    NotBitField,
    InvalidWidthExpr,
    NegativeWidthExpr,
    Width(u8),
}

#[derive(Debug)]
pub struct Declarator {
    pub id: String,
    pub pos: Pos,
    pub init_expr: Option<Node<Expression>>,
    /// A `None` entry denotes an unspecified `[]`; only the first entry
    /// may be `None`.
    pub array_size_exprs: Vec<Option<Node<Expression>>>,
    pub formal_param_list: Option<FormalParamList>,
    pub kind: DeclaratorKind,
    /// One qualifier set per `*`, deepest (closest to the base type)
    /// first. Empty means "not a pointer".
    pub pointer_qualifiers: Vec<Qualifier>,
    pub bit_field_width: BitFieldWidth,
}

enum DimensionError {
    PointerOrArray,
    NotConstant,
}

fn fold_dimension(
    expr: &mut Node<Expression>,
    types: &mut TypeManager,
    const_env: &dyn ConstEnv,
    type_env: &dyn TypeEnv,
) -> Result<u16, DimensionError> {
    ExpressionTypeSetter::new(types, type_env).assign(expr);
    if let Some(ty) = expr.ty {
        if types.is_pointer_or_array(ty) {
            return Err(DimensionError::PointerOrArray);
        }
    }
    ConstantEvaluator::new(types, const_env)
        .evaluate_constant_expr(expr)
        .ok_or(DimensionError::NotConstant)
}

fn derive_first_dimension_from_initializer(
    id: &str,
    pos: &Pos,
    diags: &mut Diagnostics,
    allow_unknown_first: bool,
    init_expr: Option<&Node<Expression>>,
) -> Option<u16> {
    let derived = init_expr.and_then(|init| match &init.node {
        Expression::Comma(seq) => Some(seq.size() as u32),
        Expression::StringLiteral(parts) => {
            Some(parts.iter().map(|p| p.len()).sum::<usize>() as u32 + 1)
        }
        _ => None,
    });

    match derived {
        Some(n) if n > 0xFFFF => {
            diags.error(pos.clone(), DiagnosticKind::ArrayInitializerTooLong);
            Some(0xFFFF)
        }
        Some(n) => Some(n as u16),
        None if allow_unknown_first => None,
        None => {
            diags.warning(pos.clone(), DiagnosticKind::AssumeSingleElement(id.to_string()));
            Some(1)
        }
    }
}

/// Folds a declarator's (or a deferred `Declaration`'s) subscript list
/// to concrete dimensions. Shared by `Declarator::compute_array_dimensions`
/// (first pass) and `DeclarationFinisher::finish_declaration` (second
/// pass, once every enum constant in the translation unit is resolved),
/// so both passes agree on every diagnostic and on the
/// only-the-first-entry-may-be-null rule.
#[allow(clippy::too_many_arguments)]
pub(crate) fn fold_array_dimensions(
    id: &str,
    pos: &Pos,
    array_size_exprs: &mut [Option<Node<Expression>>],
    diags: &mut Diagnostics,
    types: &mut TypeManager,
    const_env: &dyn ConstEnv,
    type_env: &dyn TypeEnv,
    allow_unknown_first: bool,
    init_expr: Option<&Node<Expression>>,
) -> Option<Vec<Option<u16>>> {
    if array_size_exprs.is_empty() {
        diags.error(pos.clone(), DiagnosticKind::NoArrayDimensions(id.to_string()));
        return None;
    }
    for e in &array_size_exprs[1..] {
        if e.is_none() {
            diags.error(pos.clone(), DiagnosticKind::NonFirstDimensionUnspecified);
            return None;
        }
    }

    let n = array_size_exprs.len();
    let mut dims: Vec<Option<u16>> = vec![None; n];
    let first_was_null = array_size_exprs[0].is_none();
    if first_was_null {
        dims[0] = derive_first_dimension_from_initializer(id, pos, diags, allow_unknown_first, init_expr);
    }

    for (i, slot) in array_size_exprs.iter_mut().enumerate() {
        if i == 0 && first_was_null {
            continue;
        }
        let expr = slot.as_mut().expect("non-first dimensions rejected above");
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            fold_dimension(expr, &mut *types, const_env, type_env)
        }));
        match outcome {
            Ok(Ok(width)) => dims[i] = Some(width),
            Ok(Err(DimensionError::PointerOrArray)) => {
                diags.error(pos.clone(), DiagnosticKind::PointerUsedAsArraySize);
                return None;
            }
            Ok(Err(DimensionError::NotConstant)) => {
                diags.error(
                    pos.clone(),
                    DiagnosticKind::InvalidArraySizeExpression(i as u32, id.to_string()),
                );
                return None;
            }
            Err(_) => {
                diags.error(pos.clone(), DiagnosticKind::UnexpectedException(id.to_string()));
                return None;
            }
        }
    }

    Some(dims)
}

impl Declarator {
    pub fn new(id: impl Into<String>, pos: Pos) -> Self {
        Declarator {
            id: id.into(),
            pos,
            init_expr: None,
            array_size_exprs: Vec::new(),
            formal_param_list: None,
            kind: DeclaratorKind::Singleton,
            pointer_qualifiers: Vec::new(),
            bit_field_width: BitFieldWidth::NotBitField,
        }
    }

    /// One-shot: the original asserts the initializer has not already
    /// been set. Any violation is a parser bug, not a user error.
    pub fn set_init_expr(&mut self, expr: Node<Expression>) {
        assert!(self.init_expr.is_none(), "init_expr already set");
        self.init_expr = Some(expr);
    }

    pub fn add_array_size_expr(&mut self, expr: Option<Node<Expression>>) {
        self.array_size_exprs.push(expr);
        self.kind = DeclaratorKind::Array;
    }

    pub fn set_formal_param_list(&mut self, params: FormalParamList) {
        assert!(matches!(
            self.kind,
            DeclaratorKind::Singleton | DeclaratorKind::FuncPtr
        ));
        assert!(self.formal_param_list.is_none() || self.kind == DeclaratorKind::FuncPtr);
        self.formal_param_list = Some(params);
    }

    pub fn set_as_function_pointer(&mut self, params: FormalParamList) {
        self.kind = DeclaratorKind::FuncPtr;
        self.set_formal_param_list(params);
    }

    /// Transfers each subscript out of `subscripts` (a temporary
    /// container built by the parser) into `self`, then leaves
    /// `subscripts` empty so its own destructor does not double-free the
    /// moved children.
    pub fn set_as_array_of_function_pointers(
        &mut self,
        params: FormalParamList,
        subscripts: &mut m6809_ast::TreeSequence,
    ) {
        self.kind = DeclaratorKind::FuncPtr;
        self.set_formal_param_list(params);
        for child in subscripts.drain() {
            self.array_size_exprs.push(Some(child));
        }
    }

    /// A caller whose grammar distinguishes "function returning array"
    /// from "array of function pointers" syntactically invokes this at
    /// the point its own grammar detects the former; a subscript
    /// attached to an already-`FuncPtr` declarator through the normal
    /// mutators never reaches this path (see `set_as_array_of_function_pointers`).
    pub fn check_function_returning_array(&self, diags: &mut Diagnostics) -> bool {
        if self.kind == DeclaratorKind::FuncPtr {
            diags.error(self.pos.clone(), DiagnosticKind::FunctionReturningArray);
            return false;
        }
        true
    }

    pub fn get_num_dimensions(&self) -> usize {
        self.array_size_exprs.len()
    }

    /// Folds every subscript to a concrete dimension. Returns `None` on
    /// error, having already pushed a diagnostic. Delegates to
    /// `fold_array_dimensions`, which also backs
    /// `DeclarationFinisher::finish_declaration` so both passes share
    /// one folding implementation.
    pub fn compute_array_dimensions(
        &mut self,
        diags: &mut Diagnostics,
        types: &mut TypeManager,
        const_env: &dyn ConstEnv,
        type_env: &dyn TypeEnv,
        allow_unknown_first: bool,
        init_expr: Option<&Node<Expression>>,
    ) -> Option<Vec<Option<u16>>> {
        fold_array_dimensions(
            &self.id,
            &self.pos,
            &mut self.array_size_exprs,
            diags,
            types,
            const_env,
            type_env,
            allow_unknown_first,
            init_expr,
        )
    }

    pub fn get_num_array_elements(dims: &[u16]) -> u32 {
        dims.iter().map(|&d| d as u32).product()
    }

    pub fn set_bit_field_width(
        &mut self,
        expr: &mut Node<Expression>,
        types: &mut TypeManager,
        const_env: &dyn ConstEnv,
        type_env: &dyn TypeEnv,
    ) {
        ExpressionTypeSetter::new(types, type_env).assign(expr);
        match ConstantEvaluator::new(types, const_env).evaluate_constant_expr_full(expr) {
            None => self.bit_field_width = BitFieldWidth::InvalidWidthExpr,
            Some(v) => {
                let value = v.as_i64();
                if value < 0 {
                    self.bit_field_width = BitFieldWidth::NegativeWidthExpr;
                } else {
                    self.bit_field_width = BitFieldWidth::Width(value.min(255) as u8);
                }
            }
        }
    }

    pub fn check_bit_field(&self, td: TypeId, types: &TypeManager, diags: &mut Diagnostics) {
        use crate::types::{ScalarKind, TypeDesc};
        match self.bit_field_width {
            BitFieldWidth::NotBitField => {}
            BitFieldWidth::InvalidWidthExpr => diags.error(
                self.pos.clone(),
                DiagnosticKind::BitFieldInvalidWidthExpr(self.id.clone()),
            ),
            BitFieldWidth::NegativeWidthExpr => diags.error(
                self.pos.clone(),
                DiagnosticKind::BitFieldNegativeWidth(self.id.clone()),
            ),
            BitFieldWidth::Width(w) => {
                if w == 0 {
                    diags.error(
                        self.pos.clone(),
                        DiagnosticKind::BitFieldZeroWidth(self.id.clone()),
                    );
                    return;
                }
                if !types.is_integral(td) {
                    diags.error(
                        self.pos.clone(),
                        DiagnosticKind::BitFieldNonIntegral(
                            self.id.clone(),
                            types.get(td).kind_name().to_string(),
                        ),
                    );
                    return;
                }
                let max_bits = match types.get(td) {
                    TypeDesc::Scalar {
                        kind: ScalarKind::Byte,
                        ..
                    } => 8,
                    TypeDesc::Scalar {
                        kind: ScalarKind::Word,
                        ..
                    } => 16,
                    TypeDesc::Scalar {
                        kind: ScalarKind::Long,
                        ..
                    } => 32,
                    _ => 0,
                };
                if (w as u32) > max_bits {
                    diags.error(
                        self.pos.clone(),
                        DiagnosticKind::BitFieldWidthExceedsType(
                            self.id.clone(),
                            types.get(td).kind_name().to_string(),
                        ),
                    );
                }
            }
        }
    }

    /// Applies this declarator's stacked pointer qualifiers to `base`,
    /// deepest first.
    pub fn apply_pointer_qualifiers(&self, base: TypeId, types: &mut TypeManager) -> TypeId {
        let mut ty = base;
        for q in &self.pointer_qualifiers {
            ty = types.get_pointer_to(ty, vec![*q]);
        }
        ty
    }

    /// Composes the final type for a plain variable declarator: applies
    /// pointer qualifiers, then wraps in ARRAY or FUNCTION_POINTER as
    /// `self.kind` dictates. `resolved_dims` must already be fully
    /// folded (no `None` entries) — a driver calls
    /// `compute_array_dimensions` first.
    pub fn resolve_variable_type(
        &self,
        base: TypeId,
        types: &mut TypeManager,
        resolved_dims: &[u16],
        interrupt: bool,
        first_param_in_register: bool,
    ) -> TypeId {
        let pointed = self.apply_pointer_qualifiers(base, types);
        match self.kind {
            DeclaratorKind::Singleton => pointed,
            DeclaratorKind::Array => {
                let arr = types.get_array_of(pointed, resolved_dims.len());
                for (i, &d) in resolved_dims.iter().enumerate() {
                    types.set_dimension(arr, i, d);
                }
                arr
            }
            DeclaratorKind::FuncPtr => {
                let params = self
                    .formal_param_list
                    .as_ref()
                    .map(|p| p.params().iter().map(|fp| fp.ty).collect())
                    .unwrap_or_default();
                let ellipsis = self
                    .formal_param_list
                    .as_ref()
                    .map_or(false, |p| p.ends_with_ellipsis());
                let fp = types.get_function_pointer_type(
                    pointed,
                    params,
                    ellipsis,
                    interrupt,
                    first_param_in_register,
                );
                // `set_as_array_of_function_pointers` leaves `kind ==
                // FuncPtr` while still populating `array_size_exprs`
                // (`int (*fp[3])(char)`); wrap the function-pointer type
                // in the declared array, same as the `Array` arm above.
                if resolved_dims.is_empty() {
                    fp
                } else {
                    let arr = types.get_array_of(fp, resolved_dims.len());
                    for (i, &d) in resolved_dims.iter().enumerate() {
                        types.set_dimension(arr, i, d);
                    }
                    arr
                }
            }
        }
    }

    /// Rejects an empty identifier; otherwise transfers ownership of the
    /// initializer and array-size trees into a `Declaration`, taking
    /// both fields in place so `Declarator`'s own drop does not
    /// double-free them.
    ///
    /// `resolved_dims` is the caller's already-folded
    /// `compute_array_dimensions` result, if it succeeded — pass `None`
    /// when folding failed because a subscript named a not-yet-resolved
    /// enum constant; the returned `Declaration` then keeps the raw
    /// `array_size_exprs` for `DeclarationFinisher::finish_declaration`
    /// to retry once the full enumerator table is known.
    pub fn declare_variable(
        &mut self,
        ty: TypeId,
        is_static: bool,
        is_extern: bool,
        resolved_dims: Option<Vec<u16>>,
        diags: &mut Diagnostics,
    ) -> Option<crate::declaration::Declaration> {
        if self.id.is_empty() {
            diags.error(self.pos.clone(), DiagnosticKind::EmptyDeclarator);
            return None;
        }
        let init_expr = self.init_expr.take();
        let array_size_exprs = std::mem::take(&mut self.array_size_exprs);
        let dimensions = resolved_dims.unwrap_or_default();
        let pending_exprs = if dimensions.is_empty() {
            array_size_exprs
        } else {
            Vec::new()
        };
        Some(crate::declaration::Declaration::new(
            self.id.clone(),
            ty,
            init_expr,
            is_static,
            is_extern,
            self.pos.clone(),
            dimensions,
            pending_exprs,
        ))
    }

    /// Produces a `FormalParameter` from this declarator and the
    /// enclosing `DeclarationSpecifierList`. Enumerator lists attached
    /// to the DSL are parsed but dropped with a diagnostic; array
    /// declarators decay to pointer-to-element per C's parameter-passing
    /// rule.
    pub fn create_formal_parameter(
        &mut self,
        dsl: &mut crate::dsl::DeclarationSpecifierList,
        types: &mut TypeManager,
        const_env: &dyn ConstEnv,
        type_env: &dyn TypeEnv,
        diags: &mut Diagnostics,
    ) -> Option<crate::params::FormalParameter> {
        if dsl.has_enumerator_list() {
            diags.warning(self.pos.clone(), DiagnosticKind::EnumeratorInFormalParam);
            dsl.detach_enumerator_list();
        }

        let base = dsl.get_type_desc()?;
        let mut ty = self.apply_pointer_qualifiers(base, types);

        match self.kind {
            DeclaratorKind::FuncPtr => {
                let params = self.formal_param_list.take().unwrap_or_default();
                let param_types: Vec<TypeId> = params.params().iter().map(|p| p.ty).collect();
                ty = types.get_function_pointer_type(
                    ty,
                    param_types,
                    params.ends_with_ellipsis(),
                    dsl.is_interrupt_service_function(),
                    dsl.is_function_receiving_first_param_in_reg(),
                );
                if !self.array_size_exprs.is_empty() {
                    let init_expr_clone = self.init_expr.clone();
                    let dims = self.compute_array_dimensions(
                        diags,
                        types,
                        const_env,
                        type_env,
                        true,
                        init_expr_clone.as_ref(),
                    )?;
                    ty = decay_array_parameter(types, ty, &dims);
                }
            }
            DeclaratorKind::Array => {
                let init_expr_clone = self.init_expr.clone();
                let dims = self.compute_array_dimensions(
                    diags,
                    types,
                    const_env,
                    type_env,
                    true,
                    init_expr_clone.as_ref(),
                )?;
                ty = decay_array_parameter(types, ty, &dims);
            }
            DeclaratorKind::Singleton => {}
        }

        Some(crate::params::FormalParameter {
            ty,
            name: if self.id.is_empty() {
                None
            } else {
                Some(self.id.clone())
            },
            array_dimensions: None,
            enum_tag: dsl.get_enum_type_name().map(|s| s.to_string()),
        })
    }
}

/// C's array-parameter decay: `T a[M][N]` in a parameter position is
/// `T (*)[N]`, i.e. a pointer to an array of the inner dimensions.
fn decay_array_parameter(types: &mut TypeManager, element_ty: TypeId, dims: &[Option<u16>]) -> TypeId {
    if dims.len() > 1 {
        let inner = types.get_array_of(element_ty, dims.len() - 1);
        for (i, d) in dims.iter().skip(1).enumerate() {
            if let Some(w) = d {
                types.set_dimension(inner, i, *w);
            }
        }
        types.get_pointer_to(inner, Vec::new())
    } else {
        types.get_pointer_to(element_ty, Vec::new())
    }
}

impl std::fmt::Display for Declarator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_name = match self.kind {
            DeclaratorKind::Singleton => "SINGLETON",
            DeclaratorKind::Array => "ARRAY",
            DeclaratorKind::FuncPtr => "FUNCPTR",
        };
        write!(f, "{} `{}` ({})", kind_name, self.id, self.pointer_qualifiers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{EmptyConstEnv, EmptyTypeEnv};
    use m6809_ast::{BinaryOperator, BinaryOperatorExpression, Constant, Integer, IntegerBase, IntegerSize, IntegerSuffix};
    use pretty_assertions::assert_eq;

    fn int_lit(n: &str) -> Node<Expression> {
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
    fn starts_singleton_and_add_array_size_expr_switches_kind() {
        let mut d = Declarator::new("x", Pos::none());
        assert_eq!(d.kind, DeclaratorKind::Singleton);
        d.add_array_size_expr(Some(int_lit("3")));
        assert_eq!(d.kind, DeclaratorKind::Array);
    }

    #[test]
    fn compute_array_dimensions_fails_with_no_subscripts() {
        let mut d = Declarator::new("arr", Pos::none());
        let mut diags = Diagnostics::new();
        let mut types = TypeManager::new();
        let result = d.compute_array_dimensions(
            &mut diags,
            &mut types,
            &EmptyConstEnv,
            &EmptyTypeEnv,
            false,
            None,
        );
        assert!(result.is_none());
        assert!(diags.has_errors());
    }

    #[test]
    fn scenario_4_array_dimension_from_string_initializer() {
        let mut d = Declarator::new("s", Pos::none());
        d.add_array_size_expr(None);
        let mut diags = Diagnostics::new();
        let mut types = TypeManager::new();
        let init = Node::new(
            Expression::StringLiteral(Box::new(vec!["abc".to_string()])),
            Pos::none(),
        );
        let dims = d
            .compute_array_dimensions(&mut diags, &mut types, &EmptyConstEnv, &EmptyTypeEnv, false, Some(&init))
            .unwrap();
        assert_eq!(dims, vec![Some(4)]);
        assert!(!diags.has_errors());
    }

    #[test]
    fn compute_array_dimensions_folds_constant_subscripts() {
        let mut d = Declarator::new("buf", Pos::none());
        let sum = Node::new(
            Expression::BinaryOperator(Box::new(BinaryOperatorExpression {
                operator: BinaryOperator::Plus,
                lhs: Box::new(int_lit("2")),
                rhs: Box::new(int_lit("3")),
            })),
            Pos::none(),
        );
        d.add_array_size_expr(Some(sum));
        let mut diags = Diagnostics::new();
        let mut types = TypeManager::new();
        let dims = d
            .compute_array_dimensions(&mut diags, &mut types, &EmptyConstEnv, &EmptyTypeEnv, false, None)
            .unwrap();
        assert_eq!(dims, vec![Some(5)]);
    }

    #[test]
    fn scenario_6_bit_field_overflow_diagnostic() {
        let mut d = Declarator::new("b", Pos::none());
        let mut types = TypeManager::new();
        let byte_ty = types.byte_type(false);
        let mut width_expr = int_lit("9");
        d.set_bit_field_width(&mut width_expr, &mut types, &EmptyConstEnv, &EmptyTypeEnv);
        assert_eq!(d.bit_field_width, BitFieldWidth::Width(9));
        let mut diags = Diagnostics::new();
        d.check_bit_field(byte_ty, &types, &mut diags);
        assert!(diags
            .messages()
            .iter()
            .any(|m| matches!(m.kind, DiagnosticKind::BitFieldWidthExceedsType(..))));
    }

    #[test]
    fn declare_variable_rejects_empty_identifier() {
        let mut d = Declarator::new("", Pos::none());
        let mut types = TypeManager::new();
        let ty = types.word_type(true);
        let mut diags = Diagnostics::new();
        assert!(d.declare_variable(ty, false, false, None, &mut diags).is_none());
        assert!(diags.has_errors());
    }

    #[test]
    fn declare_variable_clears_owned_fields_on_success() {
        let mut d = Declarator::new("x", Pos::none());
        d.set_init_expr(int_lit("1"));
        let mut types = TypeManager::new();
        let ty = types.word_type(true);
        let mut diags = Diagnostics::new();
        let decl = d.declare_variable(ty, false, false, None, &mut diags).unwrap();
        assert!(d.init_expr.is_none());
        assert!(d.array_size_exprs.is_empty());
        assert_eq!(decl.name, "x");
        assert!(decl.dimensions.is_empty());
        assert!(!decl.needs_finishing());
    }

    #[test]
    fn declare_variable_carries_resolved_dimensions_into_declaration() {
        let mut d = Declarator::new("buf", Pos::none());
        d.add_array_size_expr(Some(int_lit("4")));
        let mut types = TypeManager::new();
        let mut diags = Diagnostics::new();
        let dims = d
            .compute_array_dimensions(&mut diags, &mut types, &EmptyConstEnv, &EmptyTypeEnv, false, None)
            .unwrap();
        let resolved: Vec<u16> = dims.into_iter().map(|w| w.expect("fully folded")).collect();
        let ty = types.byte_type(false);
        let decl = d
            .declare_variable(ty, false, false, Some(resolved), &mut diags)
            .unwrap();
        assert_eq!(decl.dimensions, vec![4]);
        assert!(!decl.needs_finishing());
    }

    #[test]
    fn declare_variable_defers_unresolved_dimensions_for_the_finisher() {
        let mut d = Declarator::new("buf", Pos::none());
        d.add_array_size_expr(Some(Node::new(
            Expression::Identifier(Box::new(m6809_ast::Identifier {
                name: "SIZE".to_string(),
            })),
            Pos::none(),
        )));
        let mut types = TypeManager::new();
        let mut diags = Diagnostics::new();
        let ty = types.byte_type(false);
        let decl = d
            .declare_variable(ty, false, false, None, &mut diags)
            .unwrap();
        assert!(decl.dimensions.is_empty());
        assert!(decl.needs_finishing());
        assert_eq!(decl.array_size_exprs.len(), 1);
    }

    /// Scenario 5: `int (*fp[3])(char)` resolves to
    /// `ARRAY[3] of POINTER to FUNCTION(char)->int`.
    #[test]
    fn array_of_function_pointers_keeps_its_dimension() {
        let mut d = Declarator::new("fp", Pos::none());
        let mut types = TypeManager::new();
        let char_ty = types.byte_type(true);
        let int_ty = types.word_type(true);
        let mut params = FormalParamList::new();
        params.push(crate::params::FormalParameter {
            ty: char_ty,
            name: None,
            array_dimensions: None,
            enum_tag: None,
        });
        let mut subscripts = m6809_ast::TreeSequence::new();
        subscripts.add_child(int_lit("3"));
        d.set_as_array_of_function_pointers(params, &mut subscripts);
        assert_eq!(d.kind, DeclaratorKind::FuncPtr);

        let mut diags = Diagnostics::new();
        let dims = d
            .compute_array_dimensions(&mut diags, &mut types, &EmptyConstEnv, &EmptyTypeEnv, false, None)
            .unwrap();
        let resolved: Vec<u16> = dims.into_iter().map(|w| w.expect("fully folded")).collect();
        assert_eq!(resolved, vec![3]);

        let resolved_ty = d.resolve_variable_type(int_ty, &mut types, &resolved, false, false);
        assert_eq!(types.num_array_elements(resolved_ty), Some(3));
        match types.get(resolved_ty) {
            crate::types::TypeDesc::Array { element, .. } => {
                assert!(matches!(
                    types.get(*element),
                    crate::types::TypeDesc::FunctionPointer { .. }
                ));
            }
            other => panic!("expected an array type, got {:?}", other),
        }
    }
}
