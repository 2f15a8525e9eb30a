use crate::span::Node;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerBase {
    Decimal,
    Octal,
    Hexadecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerSize {
    Byte,
    Int,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerSuffix {
    pub size: IntegerSize,
    pub unsigned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer {
    pub base: IntegerBase,
    pub number: Box<str>,
    pub suffix: IntegerSuffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Integer(Integer),
    Character(String),
}

/// Unary operators that are constant-foldable. `Address` and `Indirection`
/// are kept for a complete AST but are never constant (the evaluator
/// always returns `None` for them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Complement,
    Negate,
    Address,
    Indirection,
    SizeOf,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOperator {
    /// Whether this operator, applied to a constant operand, can itself be
    /// constant. `Address`/`Indirection`/the increment family touch
    /// storage and can never fold.
    pub fn is_constant_foldable(self) -> bool {
        matches!(
            self,
            UnaryOperator::Plus
                | UnaryOperator::Minus
                | UnaryOperator::Complement
                | UnaryOperator::Negate
                | UnaryOperator::SizeOf
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Index,
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equals,
    NotEquals,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    Assign,
    AssignMultiply,
    AssignDivide,
    AssignModulo,
    AssignPlus,
    AssignMinus,
    AssignShiftLeft,
    AssignShiftRight,
    AssignBitwiseAnd,
    AssignBitwiseXor,
    AssignBitwiseOr,
}

impl BinaryOperator {
    /// Only the "pure" arithmetic/relational/logical operators are
    /// constant-foldable; every compound-assignment form and indexing
    /// touch storage and are never constant.
    pub fn is_constant_foldable(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Multiply
                | Divide
                | Modulo
                | Plus
                | Minus
                | ShiftLeft
                | ShiftRight
                | Less
                | Greater
                | LessOrEqual
                | GreaterOrEqual
                | Equals
                | NotEquals
                | BitwiseAnd
                | BitwiseXor
                | BitwiseOr
                | LogicalAnd
                | LogicalOr
        )
    }
}

/// The expression tree. `Comma` is modeled directly as the N-ary
/// `TreeSequence` container rather than a binary cons-list, matching the
/// original `CommaExpr` being a `TreeSequence` that starts with two
/// children and may grow by folding.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Box<Identifier>),
    Constant(Box<Constant>),
    StringLiteral(Box<Vec<String>>),
    UnaryOperator(Box<UnaryOperatorExpression>),
    BinaryOperator(Box<BinaryOperatorExpression>),
    Cast(Box<CastExpression>),
    Conditional(Box<ConditionalExpression>),
    Comma(Box<TreeSequence>),
    SizeOfType(Box<crate::span::TypeId>),
    Call(Box<CallExpression>),
}

impl Expression {
    /// Purely syntactic l-value classification, independent of static
    /// typing: used by `CommaExpr::is_lvalue` and by the comma emission
    /// rule, neither of which need full type information to decide this.
    pub fn is_lvalue_shape(&self) -> bool {
        match self {
            Expression::Identifier(_) => true,
            Expression::UnaryOperator(u) => matches!(u.operator, UnaryOperator::Indirection),
            Expression::Comma(seq) => seq.last().map_or(false, |n| n.node.is_lvalue_shape()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperatorExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Node<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorExpression {
    pub operator: BinaryOperator,
    pub lhs: Box<Node<Expression>>,
    pub rhs: Box<Node<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub target: crate::span::TypeId,
    pub expression: Box<Node<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub condition: Box<Node<Expression>>,
    pub then_expression: Box<Node<Expression>>,
    pub else_expression: Box<Node<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Node<Expression>>,
    pub arguments: Vec<Node<Expression>>,
}

/// The generic N-ary expression-tree container every multi-child
/// expression node is built from. Ownership of children is exclusive:
/// dropping a `TreeSequence` drops every child recursively, for free,
/// via `Vec`'s own `Drop`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeSequence {
    children: Vec<Node<Expression>>,
}

impl TreeSequence {
    pub fn new() -> Self {
        TreeSequence {
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, tree: Node<Expression>) {
        self.children.push(tree);
    }

    pub fn size(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<Expression>> {
        self.children.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node<Expression>> {
        self.children.iter_mut()
    }

    pub fn last(&self) -> Option<&Node<Expression>> {
        self.children.last()
    }

    /// Releases ownership of every child without dropping them, returning
    /// them to the caller. Mirrors the original `TreeSequence::clear`,
    /// which the parser relies on when transferring subscript trees out
    /// of a temporary sequence (`Declarator::set_as_array_of_function_pointers`).
    pub fn drain(&mut self) -> Vec<Node<Expression>> {
        std::mem::take(&mut self.children)
    }

    /// Destroys `old` and replaces it with `new`, used by semantic
    /// rewriters. Panics if `old` is not present by identity of its
    /// position (the original asserts `"child not found"`): rewriters
    /// operate on trees they themselves built, so a miss is a rewriter
    /// bug, not a user error.
    pub fn replace_child(&mut self, index: usize, new: Node<Expression>) {
        assert!(index < self.children.len(), "child not found");
        self.children[index] = new;
    }
}

/// A comma expression: a `TreeSequence` carrying at least two children
/// from construction, tagged so the emission rule and l-value rule can
/// special-case it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommaExpr(pub TreeSequence);

impl CommaExpr {
    /// The original asserts both sub-expressions are non-null at
    /// construction; in this AST that is simply two owned nodes.
    pub fn new(first: Node<Expression>, second: Node<Expression>) -> Self {
        let mut seq = TreeSequence::new();
        seq.add_child(first);
        seq.add_child(second);
        CommaExpr(seq)
    }

    /// `false` if empty, else the last child's l-value-ness.
    pub fn is_lvalue(&self) -> bool {
        self.0
            .last()
            .map_or(false, |n| n.node.is_lvalue_shape())
    }

    pub fn into_expression(self, pos: crate::span::Pos) -> Node<Expression> {
        Node::new(Expression::Comma(Box::new(self.0)), pos)
    }
}

/// The cooperative visitor protocol: `open` runs before children are
/// visited, `close` after; either returning `false` aborts the whole
/// traversal, propagating up through every enclosing `iterate` call.
pub trait Functor {
    fn open(&mut self, node: &Node<Expression>) -> bool;
    fn close(&mut self, node: &Node<Expression>) -> bool;
}

/// Walks `expr` depth-first, honoring the `open`/children/`close`
/// protocol described by `Functor`. `expr` itself is not passed to
/// `open`/`close` of its own traversal root by this free function; call
/// `f.open(expr)` first if the root itself needs visiting as its own
/// node (mirrors `TreeSequence::iterate`, which visits itself as `this`
/// and recurses into children found via pattern matching rather than a
/// homogenous child list).
pub fn iterate(expr: &Node<Expression>, f: &mut dyn Functor) -> bool {
    if !f.open(expr) {
        return false;
    }
    let ok = match &expr.node {
        Expression::UnaryOperator(u) => iterate(&u.operand, f),
        Expression::BinaryOperator(b) => iterate(&b.lhs, f) && iterate(&b.rhs, f),
        Expression::Cast(c) => iterate(&c.expression, f),
        Expression::Conditional(c) => {
            iterate(&c.condition, f)
                && iterate(&c.then_expression, f)
                && iterate(&c.else_expression, f)
        }
        Expression::Comma(seq) => seq.iter().all(|child| iterate(child, f)),
        Expression::Call(call) => {
            iterate(&call.callee, f) && call.arguments.iter().all(|a| iterate(a, f))
        }
        Expression::Identifier(_)
        | Expression::Constant(_)
        | Expression::StringLiteral(_)
        | Expression::SizeOfType(_) => true,
    };
    if !ok {
        return false;
    }
    f.close(expr)
}

impl std::fmt::Display for TreeSequence {
    /// A comma-joined list of each child's expression shape, mirroring
    /// `TreeSequence::toString`'s comma-joined list of child `TypeDesc`s.
    /// This crate renders the syntactic shape since `TypeDesc` lives in
    /// `m6809c`; the type subsystem provides its own `Display` for the
    /// fully-typed case (see `m6809c::comma`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", child.node)?;
        }
        Ok(())
    }
}
