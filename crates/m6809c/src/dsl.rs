//! `DeclarationSpecifierList` (C6): the storage-class, base-type and
//! enum/struct metadata shared by every declarator in a single
//! declaration (`static int a, *b, c[3];`).

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use m6809_ast::{Expression, Node, Pos, TypeId};

#[derive(Debug, Clone)]
pub struct Enumerator {
    pub name: String,
    pub value_expr: Option<Node<Expression>>,
}

#[derive(Debug, Default)]
pub struct DeclarationSpecifierList {
    base: Option<TypeId>,
    is_static: bool,
    is_extern: bool,
    is_interrupt: bool,
    is_first_param_in_register: bool,
    enum_tag: Option<String>,
    enumerator_list: Option<Vec<Enumerator>>,
}

impl DeclarationSpecifierList {
    pub fn new() -> Self {
        DeclarationSpecifierList::default()
    }

    /// Setting the same base type twice (e.g. `unsigned int` parsed as
    /// two specifier tokens resolving to one already-combined `TypeId`)
    /// is a no-op; setting it to a second, different type is an error.
    pub fn set_base_type(&mut self, pos: Pos, diags: &mut Diagnostics, ty: TypeId) {
        match self.base {
            None => self.base = Some(ty),
            Some(existing) if existing == ty => {}
            Some(_) => diags.error(pos, DiagnosticKind::DuplicateBaseType),
        }
    }

    pub fn set_static(&mut self, v: bool) {
        self.is_static = v;
    }

    pub fn set_extern(&mut self, v: bool) {
        self.is_extern = v;
    }

    pub fn set_interrupt(&mut self, v: bool) {
        self.is_interrupt = v;
    }

    pub fn set_first_param_in_register(&mut self, v: bool) {
        self.is_first_param_in_register = v;
    }

    pub fn set_enum_tag(&mut self, name: impl Into<String>) {
        self.enum_tag = Some(name.into());
    }

    pub fn set_enumerator_list(&mut self, list: Vec<Enumerator>) {
        self.enumerator_list = Some(list);
    }

    pub fn has_enumerator_list(&self) -> bool {
        self.enumerator_list.is_some()
    }

    /// Takes the enumerator list, leaving `None` behind. Used both by
    /// the driver (to resolve enumerator constants) and by
    /// `Declarator::create_formal_parameter` (to drop and warn on one
    /// found in a formal parameter's specifiers).
    pub fn detach_enumerator_list(&mut self) -> Option<Vec<Enumerator>> {
        self.enumerator_list.take()
    }

    pub fn is_interrupt_service_function(&self) -> bool {
        self.is_interrupt
    }

    pub fn is_function_receiving_first_param_in_reg(&self) -> bool {
        self.is_first_param_in_register
    }

    pub fn get_type_desc(&self) -> Option<TypeId> {
        self.base
    }

    pub fn get_enum_type_name(&self) -> Option<&str> {
        self.enum_tag.as_deref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_extern(&self) -> bool {
        self.is_extern
    }
}
