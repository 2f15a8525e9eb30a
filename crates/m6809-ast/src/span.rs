use std::fmt;
use std::rc::Rc;

/// A source position, carried by every [`Node`] instead of a byte offset:
/// the declaration subsystem reports diagnostics as `filename:line`, never
/// as a byte range.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Pos {
    pub file: Rc<str>,
    pub line: u32,
}

impl Pos {
    pub fn new(file: impl Into<Rc<str>>, line: u32) -> Self {
        Pos {
            file: file.into(),
            line,
        }
    }

    /// Used for synthetic nodes built by tests or by the finisher pass,
    /// which have no direct source text of their own.
    pub fn none() -> Self {
        Pos {
            file: Rc::from(""),
            line: 0,
        }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A handle into the type manager's intern table. Kept in this crate,
/// rather than in `m6809c` where `TypeDesc` itself lives, so that `Node`
/// can carry a resolved type without the AST crate depending on the type
/// subsystem crate (which in turn depends on this crate for `Expression`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Every expression node is a `Tree` with a resolved `TypeDesc` and a
/// `(filename, line)`, per the declaration subsystem's data model. `ty`
/// starts `None` and is filled in bottom-up by `ExpressionTypeSetter`.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub node: T,
    pub pos: Pos,
    pub ty: Option<TypeId>,
}

impl<T> Node<T> {
    pub fn new(node: T, pos: Pos) -> Self {
        Node {
            node,
            pos,
            ty: None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Node<U> {
        Node {
            node: f(self.node),
            pos: self.pos,
            ty: self.ty,
        }
    }
}

impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}
