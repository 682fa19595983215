#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub request: String,
    pub kind: SpecKind,
}

/// Syntactic shape a specifier was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    /// `import ... from '...'`, including a bare `import '...'`
    Static,
    /// Dynamic `import('...')`
    Dynamic,
    /// `require('...')`
    Require,
    /// `export ... from '...'`
    Reexport,
}
