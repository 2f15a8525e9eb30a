//! `ConstantEvaluator` (C3) and `ExpressionTypeSetter` (part of C8's
//! driver glue): folds a tree to a 16- or 32-bit integer with the exact
//! wraparound, sign-extension, division-by-zero and shift semantics the
//! target-CPU code generator must reproduce at run time.

use crate::types::{ScalarKind, TypeDesc, TypeManager};
use m6809_ast::{
    BinaryOperator, Constant, Expression, Integer, IntegerSize, Node, TypeId, UnaryOperator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Word,
    Long,
}

impl Width {
    pub fn bits(self) -> u32 {
        match self {
            Width::Word => 16,
            Width::Long => 32,
        }
    }

    pub fn mask(self) -> u32 {
        match self {
            Width::Word => 0xFFFF,
            Width::Long => 0xFFFF_FFFF,
        }
    }
}

/// A folded integer constant: a raw bit pattern, the arithmetic width it
/// was computed at (byte-typed operands always promote to `Word` before
/// any operation touches them, matching C's integer promotion), and
/// whether it should be read as signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar {
    pub bits: u32,
    pub width: Width,
    pub signed: bool,
}

impl Scalar {
    pub fn new(bits: u32, width: Width, signed: bool) -> Self {
        Scalar {
            bits: bits & width.mask(),
            width,
            signed,
        }
    }

    pub fn from_bool(b: bool) -> Self {
        Scalar::new(b as u32, Width::Word, true)
    }

    /// The byte pattern interpreted per `signed`, as an `i64` wide enough
    /// to hold any 32-bit value without loss.
    pub fn as_i64(&self) -> i64 {
        if self.signed && (self.bits & (1 << (self.width.bits() - 1))) != 0 {
            let fill = !0u64 << self.width.bits();
            (self.bits as u64 | fill) as i64
        } else {
            self.bits as i64
        }
    }

    pub fn is_true(&self) -> bool {
        self.bits != 0
    }

    /// Widens to `to_width`, sign- or zero-extending per `self.signed`.
    /// A no-op if already at `to_width` (narrowing is not this method's
    /// job — see `cast_to` in `ConstantEvaluator` for truncating casts).
    pub fn widen_to(&self, to_width: Width) -> Scalar {
        if to_width == self.width {
            return *self;
        }
        let bits = sign_extend(self.bits, self.width.bits(), to_width.bits(), self.signed);
        Scalar::new(bits, to_width, self.signed)
    }
}

fn sign_extend(bits: u32, from_bits: u32, to_bits: u32, signed: bool) -> u32 {
    if to_bits <= from_bits {
        return bits & mask_of(to_bits);
    }
    if signed && (bits & (1 << (from_bits - 1))) != 0 {
        let fill = !0u32 << from_bits;
        (bits | fill) & mask_of(to_bits)
    } else {
        bits & mask_of(to_bits)
    }
}

fn mask_of(bits: u32) -> u32 {
    if bits >= 32 {
        0xFFFF_FFFF
    } else {
        (1u32 << bits) - 1
    }
}

fn common_width(l: Scalar, r: Scalar) -> Width {
    if l.width == Width::Long || r.width == Width::Long {
        Width::Long
    } else {
        Width::Word
    }
}

/// Folds a constant-foldable binary operator. Returns `None` for
/// operators that touch storage (assignment family, indexing) — those
/// are never constant regardless of their operands.
pub fn fold_binary(op: BinaryOperator, l: Scalar, r: Scalar) -> Option<Scalar> {
    if !op.is_constant_foldable() {
        return None;
    }
    use BinaryOperator::*;
    match op {
        LogicalAnd => return Some(Scalar::from_bool(l.is_true() && r.is_true())),
        LogicalOr => return Some(Scalar::from_bool(l.is_true() || r.is_true())),
        ShiftLeft | ShiftRight => return Some(fold_shift(op, l, r)),
        _ => {}
    }

    let width = common_width(l, r);
    // Unsigned long (or word) if either operand is unsigned, else signed.
    let signed = l.signed && r.signed;
    let lw = l.widen_to(width);
    let rw = r.widen_to(width);

    // Division/modulo by zero never traps: `a/0` yields all-ones at the
    // promoted width (read as -1 if signed), `a%0` yields `a` unchanged.
    if matches!(op, Divide | Modulo) && rw.bits == 0 {
        let bits = if op == Divide { width.mask() } else { lw.bits };
        return Some(Scalar::new(bits, width, signed));
    }

    if signed {
        let ls = lw.as_i64();
        let rs = rw.as_i64();
        let v: i64 = match op {
            Multiply => ls.wrapping_mul(rs),
            Plus => ls.wrapping_add(rs),
            Minus => ls.wrapping_sub(rs),
            Divide => ls / rs,
            Modulo => ls % rs, // Rust's `%` already takes the dividend's sign.
            BitwiseAnd => ls & rs,
            BitwiseOr => ls | rs,
            BitwiseXor => ls ^ rs,
            Less => return Some(Scalar::from_bool(ls < rs)),
            Greater => return Some(Scalar::from_bool(ls > rs)),
            LessOrEqual => return Some(Scalar::from_bool(ls <= rs)),
            GreaterOrEqual => return Some(Scalar::from_bool(ls >= rs)),
            Equals => return Some(Scalar::from_bool(ls == rs)),
            NotEquals => return Some(Scalar::from_bool(ls != rs)),
            _ => unreachable!("shift/logical handled above, non-foldable rejected earlier"),
        };
        Some(Scalar::new(v as u64 as u32, width, signed))
    } else {
        let lu = lw.bits as u64;
        let ru = rw.bits as u64;
        let v: u64 = match op {
            Multiply => lu.wrapping_mul(ru),
            Plus => lu.wrapping_add(ru),
            Minus => lu.wrapping_sub(ru),
            Divide => lu / ru,
            Modulo => lu % ru,
            BitwiseAnd => lu & ru,
            BitwiseOr => lu | ru,
            BitwiseXor => lu ^ ru,
            Less => return Some(Scalar::from_bool(lu < ru)),
            Greater => return Some(Scalar::from_bool(lu > ru)),
            LessOrEqual => return Some(Scalar::from_bool(lu <= ru)),
            GreaterOrEqual => return Some(Scalar::from_bool(lu >= ru)),
            Equals => return Some(Scalar::from_bool(lu == ru)),
            NotEquals => return Some(Scalar::from_bool(lu != ru)),
            _ => unreachable!(),
        };
        Some(Scalar::new(v as u32, width, signed))
    }
}

fn fold_shift(op: BinaryOperator, l: Scalar, r: Scalar) -> Scalar {
    let width = l.width;
    let signed = l.signed;
    let w = width.bits();
    let count = r.bits;

    match op {
        BinaryOperator::ShiftLeft => {
            if count >= w {
                Scalar::new(0, width, signed)
            } else {
                Scalar::new(((l.bits as u64) << count) as u32, width, signed)
            }
        }
        BinaryOperator::ShiftRight => {
            if signed {
                let negative = (l.bits & (1 << (w - 1))) != 0;
                if count >= w {
                    let bits = if negative { width.mask() } else { 0 };
                    Scalar::new(bits, width, signed)
                } else {
                    let v = l.as_i64() >> count; // arithmetic (sign-extending) shift
                    Scalar::new(v as u64 as u32, width, signed)
                }
            } else if count >= w {
                Scalar::new(0, width, signed)
            } else {
                Scalar::new(l.bits >> count, width, signed)
            }
        }
        _ => unreachable!(),
    }
}

/// Folds a constant-foldable unary operator.
pub fn fold_unary(op: UnaryOperator, v: Scalar) -> Option<Scalar> {
    match op {
        UnaryOperator::Plus => Some(v),
        UnaryOperator::Minus => {
            let bits = 0u64.wrapping_sub(v.bits as u64) & v.width.mask() as u64;
            Some(Scalar::new(bits as u32, v.width, v.signed))
        }
        UnaryOperator::Complement => Some(Scalar::new(!v.bits & v.width.mask(), v.width, v.signed)),
        // True iff every bit is zero, long included.
        UnaryOperator::Negate => Some(Scalar::from_bool(!v.is_true())),
        _ => None,
    }
}

fn int_literal_scalar(i: &Integer) -> Scalar {
    let radix = match i.base {
        m6809_ast::IntegerBase::Decimal => 10,
        m6809_ast::IntegerBase::Octal => 8,
        m6809_ast::IntegerBase::Hexadecimal => 16,
    };
    let raw = u64::from_str_radix(&i.number, radix).unwrap_or(0);
    let signed = !i.suffix.unsigned;
    let width = match i.suffix.size {
        IntegerSize::Long => Width::Long,
        IntegerSize::Byte | IntegerSize::Int => Width::Word,
    };
    Scalar::new(raw as u32, width, signed)
}

/// Supplies the value of a reference to a named constant (an `enum`
/// member, or a `const`-qualified object whose initializer itself
/// already folded). Returning `None` means "not a constant" — the
/// evaluator then reports the whole tree as non-constant, per §4.3.
pub trait ConstEnv {
    fn lookup_constant(&self, name: &str) -> Option<Scalar>;
}

pub struct EmptyConstEnv;
impl ConstEnv for EmptyConstEnv {
    fn lookup_constant(&self, _name: &str) -> Option<Scalar> {
        None
    }
}

/// Reduces a tree to an integer constant, or reports it is not one. The
/// precondition from §4.3 — types must already be assigned — is the
/// caller's responsibility (run `ExpressionTypeSetter` first); this
/// evaluator only consults `node.ty` for `sizeof` and casts.
pub struct ConstantEvaluator<'a> {
    types: &'a TypeManager,
    env: &'a dyn ConstEnv,
}

impl<'a> ConstantEvaluator<'a> {
    pub fn new(types: &'a TypeManager, env: &'a dyn ConstEnv) -> Self {
        ConstantEvaluator { types, env }
    }

    /// The narrow public API (`evaluate_constant_expr(out: u16) -> bool`
    /// in the original): returns only the low 16 bits.
    pub fn evaluate_constant_expr(&self, expr: &Node<Expression>) -> Option<u16> {
        self.fold(expr).map(|s| (s.bits & 0xFFFF) as u16)
    }

    /// The extended 32-bit path, invoked internally by the
    /// declaration-finisher when the contextual type is `LONG`.
    pub fn evaluate_constant_expr_full(&self, expr: &Node<Expression>) -> Option<Scalar> {
        self.fold(expr)
    }

    fn fold(&self, expr: &Node<Expression>) -> Option<Scalar> {
        match &expr.node {
            Expression::Constant(c) => self.fold_constant(c),
            Expression::Identifier(id) => {
                log::trace!("fold: identifier `{}`", id.name);
                self.env.lookup_constant(&id.name)
            }
            Expression::UnaryOperator(u) => {
                if u.operator == UnaryOperator::SizeOf {
                    let ty = u.operand.ty?;
                    return Some(Scalar::new(self.types.width_bytes(ty) as u32, Width::Word, false));
                }
                let v = self.fold(&u.operand)?;
                fold_unary(u.operator, v)
            }
            Expression::BinaryOperator(b) => {
                let l = self.fold(&b.lhs)?;
                let r = self.fold(&b.rhs)?;
                let result = fold_binary(b.operator, l, r);
                log::trace!("fold: {:?}({:?}, {:?}) = {:?}", b.operator, l, r, result);
                result
            }
            Expression::Cast(c) => {
                let v = self.fold(&c.expression)?;
                self.cast_to(v, c.target)
            }
            Expression::Conditional(c) => {
                let cond = self.fold(&c.condition)?;
                if cond.is_true() {
                    self.fold(&c.then_expression)
                } else {
                    self.fold(&c.else_expression)
                }
            }
            Expression::Comma(seq) => self.fold(seq.last()?),
            Expression::SizeOfType(type_id) => {
                Some(Scalar::new(self.types.width_bytes(**type_id) as u32, Width::Word, false))
            }
            Expression::StringLiteral(_) | Expression::Call(_) => None,
        }
    }

    fn fold_constant(&self, c: &Constant) -> Option<Scalar> {
        match c {
            Constant::Integer(i) => Some(int_literal_scalar(i)),
            Constant::Character(s) => {
                let b = s.as_bytes().first().copied().unwrap_or(0);
                Some(Scalar::new(
                    sign_extend(b as u32, 8, 16, true),
                    Width::Word,
                    true,
                ))
            }
        }
    }

    /// Truncating cast: narrows `v` to the target scalar's declared
    /// width (8/16/32 bits) before re-extending into the `Word`/`Long`
    /// arithmetic container per the target's own signedness.
    fn cast_to(&self, v: Scalar, target: TypeId) -> Option<Scalar> {
        let (kind, signed) = match self.types.get(target) {
            TypeDesc::Scalar { kind, signed } => (*kind, *signed),
            _ => return None,
        };
        let bits_n = kind.width_bytes() as u32 * 8;
        if bits_n == 0 || !kind.is_integral() {
            return None;
        }
        let truncated = v.bits & mask_of(bits_n);
        let target_width = if bits_n > 16 { Width::Long } else { Width::Word };
        let bits = sign_extend(truncated, bits_n, target_width.bits(), signed);
        Some(Scalar::new(bits, target_width, signed))
    }
}

/// Assigns a resolved `TypeId` to every node in a tree, bottom-up, from
/// literal suffixes and identifier lookups. The companion half of C8's
/// driver glue: `ConstantEvaluator::fold` relies on `node.ty` already
/// being populated for `sizeof` and cast targets.
pub trait TypeEnv {
    fn lookup_identifier_type(&self, name: &str) -> Option<TypeId>;
}

pub struct EmptyTypeEnv;
impl TypeEnv for EmptyTypeEnv {
    fn lookup_identifier_type(&self, _name: &str) -> Option<TypeId> {
        None
    }
}

pub struct ExpressionTypeSetter<'a> {
    types: &'a mut TypeManager,
    env: &'a dyn TypeEnv,
}

impl<'a> ExpressionTypeSetter<'a> {
    pub fn new(types: &'a mut TypeManager, env: &'a dyn TypeEnv) -> Self {
        ExpressionTypeSetter { types, env }
    }

    pub fn assign(&mut self, expr: &mut Node<Expression>) -> Option<TypeId> {
        let ty = match &mut expr.node {
            Expression::Identifier(id) => self.env.lookup_identifier_type(&id.name),
            Expression::Constant(c) => Some(self.literal_type(c)),
            Expression::StringLiteral(_) => None,
            Expression::UnaryOperator(u) => {
                let sub_ty = self.assign(&mut u.operand);
                match u.operator {
                    UnaryOperator::SizeOf => Some(self.types.word_type(false)),
                    _ => sub_ty.map(|t| self.promote_unary(t)),
                }
            }
            Expression::BinaryOperator(b) => {
                let lt = self.assign(&mut b.lhs);
                let rt = self.assign(&mut b.rhs);
                match (lt, rt) {
                    (Some(lt), Some(rt)) => Some(self.result_type(b.operator, lt, rt)),
                    _ => None,
                }
            }
            Expression::Cast(c) => {
                self.assign(&mut c.expression);
                Some(c.target)
            }
            Expression::Conditional(c) => {
                self.assign(&mut c.condition);
                let tt = self.assign(&mut c.then_expression);
                let et = self.assign(&mut c.else_expression);
                match (tt, et) {
                    (Some(tt), Some(et)) => Some(self.common_type(tt, et)),
                    _ => None,
                }
            }
            Expression::Comma(seq) => {
                let mut last = None;
                for child in seq.iter_mut() {
                    last = self.assign(child);
                }
                last
            }
            Expression::SizeOfType(_) => Some(self.types.word_type(false)),
            Expression::Call(call) => {
                self.assign(&mut call.callee);
                for a in call.arguments.iter_mut() {
                    self.assign(a);
                }
                None
            }
        };
        expr.ty = ty;
        ty
    }

    fn literal_type(&mut self, c: &Constant) -> TypeId {
        match c {
            Constant::Integer(i) => match i.suffix.size {
                IntegerSize::Long => self.types.long_type(!i.suffix.unsigned),
                IntegerSize::Byte | IntegerSize::Int => self.types.word_type(!i.suffix.unsigned),
            },
            Constant::Character(_) => self.types.byte_type(true),
        }
    }

    fn promote_unary(&mut self, t: TypeId) -> TypeId {
        match self.types.get(t) {
            TypeDesc::Scalar {
                kind: ScalarKind::Byte,
                signed,
            } => {
                let signed = *signed;
                self.types.word_type(signed)
            }
            _ => t,
        }
    }

    fn result_type(&mut self, op: BinaryOperator, l: TypeId, r: TypeId) -> TypeId {
        use BinaryOperator::*;
        if matches!(
            op,
            Less | Greater
                | LessOrEqual
                | GreaterOrEqual
                | Equals
                | NotEquals
                | LogicalAnd
                | LogicalOr
        ) {
            return self.types.word_type(true);
        }
        self.common_type(l, r)
    }

    fn common_type(&mut self, l: TypeId, r: TypeId) -> TypeId {
        let width = if self.numeric_width(l) == Width::Long || self.numeric_width(r) == Width::Long
        {
            Width::Long
        } else {
            Width::Word
        };
        let signed = self.types.is_signed(l) && self.types.is_signed(r);
        match width {
            Width::Word => self.types.word_type(signed),
            Width::Long => self.types.long_type(signed),
        }
    }

    fn numeric_width(&self, t: TypeId) -> Width {
        match self.types.get(t) {
            TypeDesc::Scalar {
                kind: ScalarKind::Long,
                ..
            } => Width::Long,
            _ => Width::Word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use m6809_ast::{IntegerBase, IntegerSuffix, Pos};
    use pretty_assertions::assert_eq;

    fn lit(number: &str, base: IntegerBase, size: IntegerSize, unsigned: bool) -> Node<Expression> {
        Node::new(
            Expression::Constant(Box::new(Constant::Integer(Integer {
                base,
                number: Box::from(number),
                suffix: IntegerSuffix { size, unsigned },
            }))),
            Pos::none(),
        )
    }

    fn binop(op: BinaryOperator, l: Node<Expression>, r: Node<Expression>) -> Node<Expression> {
        Node::new(
            Expression::BinaryOperator(Box::new(m6809_ast::BinaryOperatorExpression {
                operator: op,
                lhs: Box::new(l),
                rhs: Box::new(r),
            })),
            Pos::none(),
        )
    }

    fn unop(op: UnaryOperator, v: Node<Expression>) -> Node<Expression> {
        Node::new(
            Expression::UnaryOperator(Box::new(m6809_ast::UnaryOperatorExpression {
                operator: op,
                operand: Box::new(v),
            })),
            Pos::none(),
        )
    }

    fn eval_full(expr: &Node<Expression>) -> Scalar {
        let types = TypeManager::new();
        let env = EmptyConstEnv;
        ConstantEvaluator::new(&types, &env)
            .evaluate_constant_expr_full(expr)
            .expect("expected a constant")
    }

    /// Lets `RUST_LOG=trace cargo test` surface the `log::trace!`/`debug!`
    /// calls in `fold`/`fold_binary`; `is_test(true)` routes output
    /// through the test harness instead of stdout directly.
    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn folding_emits_trace_logs_without_panicking() {
        init_logger();
        let l = lit("2", IntegerBase::Decimal, IntegerSize::Int, false);
        let r = lit("3", IntegerBase::Decimal, IntegerSize::Int, false);
        let expr = binop(BinaryOperator::Plus, l, r);
        assert_eq!(eval_full(&expr).as_i64(), 5);
    }

    #[test]
    fn scenario_1_unsigned_long_wrap() {
        let l = lit("0xFFFFFFFF", IntegerBase::Hexadecimal, IntegerSize::Long, true);
        let r = lit("0xFFFFFFFF", IntegerBase::Hexadecimal, IntegerSize::Long, true);
        let expr = binop(BinaryOperator::Multiply, l, r);
        let result = eval_full(&expr);
        assert_eq!(result.bits, 1);
        let types = TypeManager::new();
        let env = EmptyConstEnv;
        let narrow = ConstantEvaluator::new(&types, &env)
            .evaluate_constant_expr(&expr)
            .unwrap();
        assert_eq!(narrow, 0x0001);
    }

    #[test]
    fn scenario_2_signed_modulo_sign_follows_dividend() {
        let l = lit("4000000", IntegerBase::Decimal, IntegerSize::Long, false);
        let r = lit("70000", IntegerBase::Decimal, IntegerSize::Long, false);
        let neg_l = unop(UnaryOperator::Minus, l);
        let expr = binop(BinaryOperator::Modulo, neg_l, r);
        let result = eval_full(&expr);
        assert_eq!(result.as_i64(), -10000);
        assert_eq!(result.bits, 0xFFFFD8F0);
    }

    #[test]
    fn scenario_3_division_and_modulo_by_zero_never_trap() {
        let ul = lit("12345", IntegerBase::Decimal, IntegerSize::Long, true);
        let zero = lit("0", IntegerBase::Decimal, IntegerSize::Long, true);
        let div = binop(BinaryOperator::Divide, ul.clone(), zero.clone());
        let modulo = binop(BinaryOperator::Modulo, ul, zero);
        assert_eq!(eval_full(&div).bits, 0xFFFFFFFF);
        assert_eq!(eval_full(&modulo).bits, 12345);
    }

    #[test]
    fn scenario_9_signed_division_and_modulo_sign_matrix() {
        let mk = |n: i64| {
            let abs = lit(
                &n.abs().to_string(),
                IntegerBase::Decimal,
                IntegerSize::Long,
                false,
            );
            if n < 0 {
                unop(UnaryOperator::Minus, abs)
            } else {
                abs
            }
        };
        let cases: &[(i64, i64, i64, i64)] = &[
            (-4000000, -70000, 57, -10000),
            (-4000000, 70000, -57, -10000),
            (4000000, -70000, -57, 10000),
            (4000000, 70000, 57, 10000),
        ];
        for &(a, b, expected_div, expected_mod) in cases {
            let div = binop(BinaryOperator::Divide, mk(a), mk(b));
            let modulo = binop(BinaryOperator::Modulo, mk(a), mk(b));
            assert_eq!(eval_full(&div).as_i64(), expected_div, "{} / {}", a, b);
            assert_eq!(eval_full(&modulo).as_i64(), expected_mod, "{} % {}", a, b);
        }
    }

    #[test]
    fn scenario_10_signed_long_wrap_matches_unsigned_bit_pattern() {
        let l = lit("0xFFFFFFFF", IntegerBase::Hexadecimal, IntegerSize::Long, false);
        let r = lit("0xFFFFFFFF", IntegerBase::Hexadecimal, IntegerSize::Long, false);
        let expr = binop(BinaryOperator::Multiply, l, r);
        assert_eq!(eval_full(&expr).as_i64(), 1);
    }

    #[test]
    fn shift_by_width_or_more_saturates() {
        let value = Scalar::new(0x8000_0000, Width::Long, true);
        let zero = Scalar::new(40, Width::Long, false);
        let shifted_right = fold_shift(BinaryOperator::ShiftRight, value, zero);
        assert_eq!(shifted_right.bits, 0xFFFF_FFFF, "negative arithmetic shift saturates to all-ones");

        let pos = Scalar::new(5, Width::Long, true);
        let shifted = fold_shift(BinaryOperator::ShiftLeft, pos, zero);
        assert_eq!(shifted.bits, 0, "left shift past width yields 0");
    }

    #[test]
    fn non_constant_subtrees_are_rejected() {
        let id = Node::new(
            Expression::Identifier(Box::new(m6809_ast::Identifier {
                name: "not_const".into(),
            })),
            Pos::none(),
        );
        let types = TypeManager::new();
        let env = EmptyConstEnv;
        assert_eq!(
            ConstantEvaluator::new(&types, &env).evaluate_constant_expr(&id),
            None
        );
    }
}
