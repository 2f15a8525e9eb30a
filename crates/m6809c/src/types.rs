//! `TypeDesc` and `TypeManager` (C1): canonical, interned type
//! descriptors, realized as integer handles into an arena rather than
//! pointer-compared heap objects, per the Design Notes' explicit
//! re-architecture guidance.

use bitflags::bitflags;
use m6809_ast::TypeId;
use std::collections::HashMap;

bitflags! {
    /// One bitmask per `*` in `T * const * volatile`.
    pub struct Qualifier: u8 {
        const CONST = 0b01;
        const VOLATILE = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Void,
    Byte,
    Word,
    Long,
    Real,
    /// Opaque struct/union/class placeholder; the layout of its members
    /// is not this crate's concern, only that it is an aggregate passed
    /// by address (see the comma emission rule in `comma.rs`).
    Class,
}

impl ScalarKind {
    pub fn width_bytes(self) -> u8 {
        match self {
            ScalarKind::Void => 0,
            ScalarKind::Byte => 1,
            ScalarKind::Word => 2,
            ScalarKind::Long | ScalarKind::Real => 4,
            ScalarKind::Class => 0,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, ScalarKind::Byte | ScalarKind::Word | ScalarKind::Long)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Scalar {
        kind: ScalarKind,
        signed: bool,
    },
    Pointer {
        pointee: TypeId,
        /// One qualifier set per `*`, deepest first.
        qualifiers: Vec<Qualifier>,
    },
    /// Never interned: callers mutate `dimensions` in place after
    /// construction (e.g. while folding `compute_array_dimensions`),
    /// which upfront structural-hash interning cannot accommodate.
    /// `dimensions[0] == None` means "unknown first dimension", only
    /// legal for formal parameters.
    Array {
        element: TypeId,
        dimensions: Vec<Option<u16>>,
    },
    FunctionPointer {
        returns: TypeId,
        params: Vec<TypeId>,
        ellipsis: bool,
        interrupt: bool,
        first_param_in_register: bool,
    },
}

impl TypeDesc {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDesc::Scalar { kind, .. } => match kind {
                ScalarKind::Void => "VOID",
                ScalarKind::Byte => "BYTE",
                ScalarKind::Word => "WORD",
                ScalarKind::Long => "LONG",
                ScalarKind::Real => "REAL",
                ScalarKind::Class => "CLASS",
            },
            TypeDesc::Pointer { .. } => "POINTER",
            TypeDesc::Array { .. } => "ARRAY",
            TypeDesc::FunctionPointer { .. } => "FUNCTION_POINTER",
        }
    }
}

/// Holds every interned and uninterned `TypeDesc` for a translation unit.
/// Has translation-unit lifetime; removal is not supported (matching the
/// original's "the manager holds all descriptors").
#[derive(Debug, Default)]
pub struct TypeManager {
    descs: Vec<TypeDesc>,
    intern: HashMap<TypeDesc, TypeId>,
}

impl TypeManager {
    pub fn new() -> Self {
        TypeManager::default()
    }

    fn push_fresh(&mut self, td: TypeDesc) -> TypeId {
        let id = TypeId(self.descs.len() as u32);
        self.descs.push(td);
        id
    }

    /// Structural-equality interning: returns the existing handle if an
    /// identical descriptor was already registered, otherwise registers
    /// a new one. Only used for the kinds the data model calls out as
    /// interned (Scalar, Pointer, FunctionPointer); `Array` never goes
    /// through this path.
    fn intern(&mut self, td: TypeDesc) -> TypeId {
        if let Some(&id) = self.intern.get(&td) {
            return id;
        }
        let id = self.push_fresh(td.clone());
        self.intern.insert(td, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeDesc {
        &self.descs[id.0 as usize]
    }

    pub fn void_type(&mut self) -> TypeId {
        self.intern(TypeDesc::Scalar {
            kind: ScalarKind::Void,
            signed: false,
        })
    }

    pub fn byte_type(&mut self, signed: bool) -> TypeId {
        self.intern(TypeDesc::Scalar {
            kind: ScalarKind::Byte,
            signed,
        })
    }

    pub fn word_type(&mut self, signed: bool) -> TypeId {
        self.intern(TypeDesc::Scalar {
            kind: ScalarKind::Word,
            signed,
        })
    }

    pub fn long_type(&mut self, signed: bool) -> TypeId {
        self.intern(TypeDesc::Scalar {
            kind: ScalarKind::Long,
            signed,
        })
    }

    pub fn class_type(&mut self) -> TypeId {
        self.intern(TypeDesc::Scalar {
            kind: ScalarKind::Class,
            signed: false,
        })
    }

    /// Returns the interned pointer with identical pointed type and
    /// qualifier stack (element-wise).
    pub fn get_pointer_to(&mut self, pointee: TypeId, qualifiers: Vec<Qualifier>) -> TypeId {
        log::trace!(
            "get_pointer_to(pointee={:?}, qualifiers={:?})",
            pointee,
            qualifiers
        );
        self.intern(TypeDesc::Pointer {
            pointee,
            qualifiers,
        })
    }

    /// Returns a fresh (never interned) ARRAY whose element is `element`,
    /// with `n_dimensions` dimension slots all initially unset.
    pub fn get_array_of(&mut self, element: TypeId, n_dimensions: usize) -> TypeId {
        log::trace!(
            "get_array_of(element={:?}, n_dimensions={})",
            element,
            n_dimensions
        );
        self.push_fresh(TypeDesc::Array {
            element,
            dimensions: vec![None; n_dimensions.max(1)],
        })
    }

    /// Pushes additional dimensions onto an existing array descriptor,
    /// used when a formal parameter's declared type is itself an array
    /// typedef and the parameter declarator adds further subscripts.
    pub fn append_dimensions(&mut self, array: TypeId, extra: Vec<Option<u16>>) {
        match &mut self.descs[array.0 as usize] {
            TypeDesc::Array { dimensions, .. } => dimensions.extend(extra),
            other => panic!("append_dimensions called on non-array {:?}", other),
        }
    }

    pub fn set_dimension(&mut self, array: TypeId, index: usize, value: u16) {
        match &mut self.descs[array.0 as usize] {
            TypeDesc::Array { dimensions, .. } => dimensions[index] = Some(value),
            other => panic!("set_dimension called on non-array {:?}", other),
        }
    }

    /// Parameters are compared structurally (same length, same
    /// per-parameter TypeDesc via `TypeId` equality, same ellipsis flag)
    /// for free by deriving `Eq`/`Hash` on `Vec<TypeId>`.
    pub fn get_function_pointer_type(
        &mut self,
        returns: TypeId,
        params: Vec<TypeId>,
        ellipsis: bool,
        interrupt: bool,
        first_param_in_register: bool,
    ) -> TypeId {
        self.intern(TypeDesc::FunctionPointer {
            returns,
            params,
            ellipsis,
            interrupt,
            first_param_in_register,
        })
    }

    pub fn is_aggregate(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            TypeDesc::Scalar {
                kind: ScalarKind::Class | ScalarKind::Long | ScalarKind::Real,
                ..
            }
        )
    }

    pub fn is_integral(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Scalar { kind, .. } if kind.is_integral())
    }

    pub fn is_signed(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Scalar { signed: true, .. })
    }

    pub fn is_pointer_or_array(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Pointer { .. } | TypeDesc::Array { .. })
    }

    pub fn width_bytes(&self, id: TypeId) -> u8 {
        match self.get(id) {
            TypeDesc::Scalar { kind, .. } => kind.width_bytes(),
            TypeDesc::Pointer { .. } => 2,
            TypeDesc::FunctionPointer { .. } => 2,
            TypeDesc::Array { .. } => 0,
        }
    }

    pub fn num_array_elements(&self, id: TypeId) -> Option<u32> {
        match self.get(id) {
            TypeDesc::Array { dimensions, .. } => {
                let mut total: u32 = 1;
                for d in dimensions {
                    total = total.checked_mul((*d)? as u32)?;
                }
                Some(total)
            }
            _ => None,
        }
    }
}
