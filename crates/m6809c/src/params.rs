//! `FormalParameter` and `FormalParamList` (C2 in the Design Notes'
//! numbering): a function's parameter list as seen from its prototype or
//! definition header.

use crate::types::{ScalarKind, TypeDesc, TypeManager};
use m6809_ast::TypeId;

#[derive(Debug, Clone)]
pub struct FormalParameter {
    pub ty: TypeId,
    pub name: Option<String>,
    /// Filled in only when a caller wants to report the parameter's
    /// pre-decay array shape (e.g. for diagnostics); the `ty` itself
    /// already reflects the decayed pointer type.
    pub array_dimensions: Option<Vec<Option<u16>>>,
    pub enum_tag: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FormalParamList {
    params: Vec<FormalParameter>,
    ellipsis: bool,
}

impl FormalParamList {
    pub fn new() -> Self {
        FormalParamList::default()
    }

    pub fn push(&mut self, p: FormalParameter) {
        self.params.push(p);
    }

    pub fn size(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[FormalParameter] {
        &self.params
    }

    pub fn end_with_ellipsis(&mut self) {
        self.ellipsis = true;
    }

    pub fn ends_with_ellipsis(&self) -> bool {
        self.ellipsis
    }

    /// `f(void)`: a single parameter of type `void` and no name, which
    /// means "takes no arguments" rather than "takes one void-typed
    /// argument" (impossible in C).
    pub fn has_single_void_param(&self, types: &TypeManager) -> bool {
        self.params.len() == 1
            && self.params[0].name.is_none()
            && matches!(
                types.get(self.params[0].ty),
                TypeDesc::Scalar {
                    kind: ScalarKind::Void,
                    ..
                }
            )
    }

    pub fn is_acceptable_number_of_arguments(&self, n: usize) -> bool {
        if self.ellipsis {
            n >= self.params.len()
        } else {
            n == self.params.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsis_accepts_at_least_declared_count() {
        let mut list = FormalParamList::new();
        list.push(FormalParameter {
            ty: TypeId(0),
            name: Some("fmt".into()),
            array_dimensions: None,
            enum_tag: None,
        });
        list.end_with_ellipsis();
        assert!(!list.is_acceptable_number_of_arguments(0));
        assert!(list.is_acceptable_number_of_arguments(1));
        assert!(list.is_acceptable_number_of_arguments(5));
    }

    #[test]
    fn fixed_arity_requires_exact_count() {
        let mut list = FormalParamList::new();
        list.push(FormalParameter {
            ty: TypeId(0),
            name: Some("a".into()),
            array_dimensions: None,
            enum_tag: None,
        });
        list.push(FormalParameter {
            ty: TypeId(0),
            name: Some("b".into()),
            array_dimensions: None,
            enum_tag: None,
        });
        assert!(!list.is_acceptable_number_of_arguments(1));
        assert!(list.is_acceptable_number_of_arguments(2));
        assert!(!list.is_acceptable_number_of_arguments(3));
    }

    #[test]
    fn single_void_param_is_detected() {
        let mut types = TypeManager::new();
        let void_ty = types.void_type();
        let mut list = FormalParamList::new();
        list.push(FormalParameter {
            ty: void_ty,
            name: None,
            array_dimensions: None,
            enum_tag: None,
        });
        assert!(list.has_single_void_param(&types));
    }
}
