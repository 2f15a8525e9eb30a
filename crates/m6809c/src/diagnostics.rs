//! Diagnostic context object, replacing the original's process-wide sink
//! and error counter (see Design Notes). `Diagnostics` is owned by the
//! driver and threaded by `&mut` reference through every phase.

use m6809_ast::Pos;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error("declarator has no identifier")]
    EmptyDeclarator,
    #[error("array `{0}`: no dimensions")]
    NoArrayDimensions(String),
    #[error("dimension other than first one is unspecified")]
    NonFirstDimensionUnspecified,
    #[error("pointer or array expression used for size of array")]
    PointerUsedAsArraySize,
    #[error("invalid size expression for dimension {0} of array `{1}`")]
    InvalidArraySizeExpression(u32, String),
    #[error("array initializer too long")]
    ArrayInitializerTooLong,
    #[error("function returning an array is not allowed")]
    FunctionReturningArray,
    #[error("bit-field `{0}` has zero width")]
    BitFieldZeroWidth(String),
    #[error("width of `{0}` exceeds its type (`{1}`)")]
    BitFieldWidthExceedsType(String, String),
    #[error("bit-field `{0}` has invalid type (`{1}`)")]
    BitFieldNonIntegral(String, String),
    #[error("invalid width expression for bit-field `{0}`")]
    BitFieldInvalidWidthExpr(String),
    #[error("negative width for bit-field `{0}`")]
    BitFieldNegativeWidth(String),
    #[error("enumerator list is not allowed in a formal parameter; dropped")]
    EnumeratorInFormalParam,
    #[error("array `{0}` assumed to have one element")]
    AssumeSingleElement(String),
    #[error("base type of declaration specifier list set more than once")]
    DuplicateBaseType,
    #[error("unexpected exception caught in Declarator::computeArrayDimensions() for `{0}`")]
    UnexpectedException(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub pos: Pos,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl std::fmt::Display for Diagnostic {
    /// `filename:line: error|warning: message`, per the external
    /// interface's diagnostic format.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sev = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", self.pos, sev, self.kind)
    }
}

/// The process-wide diagnostic sink and error counter, reified as an
/// ordinary owned object instead of a global. `error_count` gates whether
/// the (external) emitter stage may run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    sink: Vec<Diagnostic>,
    error_count: u32,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn error(&mut self, pos: Pos, kind: DiagnosticKind) {
        log::debug!("diagnostic (error) at {}: {:?}", pos, kind);
        self.error_count += 1;
        self.sink.push(Diagnostic {
            pos,
            severity: Severity::Error,
            kind,
        });
    }

    pub fn warning(&mut self, pos: Pos, kind: DiagnosticKind) {
        log::debug!("diagnostic (warning) at {}: {:?}", pos, kind);
        self.sink.push(Diagnostic {
            pos,
            severity: Severity::Warning,
            kind,
        });
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.sink
    }
}
