use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{SpecKind, Specifier};

// Single-pass lexical matching. Specifiers assembled by string concatenation
// are missed, and matches inside comments or string literals are kept.
static STATIC_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:[^'"]*?from\s+)?['"]([^'"]+)['"]"#).expect("static import pattern")
});
static DYNAMIC_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s*\(\s*['"]([^'"]+)['"]"#).expect("dynamic import pattern"));
static REQUIRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]"#).expect("require pattern"));
static EXPORT_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"export\s+[^'"]*?from\s+['"]([^'"]+)['"]"#).expect("export-from pattern")
});

// Simplified matching, performance first.
static FAST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:import|require|export)\s*[^'"]*['"]([^'"]+)['"]"#).expect("fast pattern")
});

/// Extraction strategy for [`extract_specifiers`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractMode {
    /// One pattern per syntactic shape.
    #[default]
    Precise,
    /// A single simplified pattern; faster, coarser.
    Fast,
}

/// Returns every raw import/require/export specifier found in `src`.
///
/// Patterns run in a fixed order, each in document order, so extraction
/// order is deterministic for a given input. No filesystem access.
pub fn extract_specifiers(src: &str, mode: ExtractMode) -> Vec<Specifier> {
    let mut specs = Vec::new();

    match mode {
        ExtractMode::Precise => {
            let patterns: [(&Regex, SpecKind); 4] = [
                (&*STATIC_IMPORT_RE, SpecKind::Static),
                (&*DYNAMIC_IMPORT_RE, SpecKind::Dynamic),
                (&*REQUIRE_RE, SpecKind::Require),
                (&*EXPORT_FROM_RE, SpecKind::Reexport),
            ];
            for (re, kind) in patterns {
                for cap in re.captures_iter(src) {
                    let request = cap[1].to_string();
                    trace!("Matched {:?} specifier: '{}'", kind, request);
                    specs.push(Specifier { request, kind });
                }
            }
        }
        ExtractMode::Fast => {
            // The shape is not recoverable from the simplified pattern.
            for cap in FAST_RE.captures_iter(src) {
                let request = cap[1].to_string();
                trace!("Matched specifier (fast): '{}'", request);
                specs.push(Specifier { request, kind: SpecKind::Static });
            }
        }
    }

    debug!("Found {} specifiers", specs.len());
    specs
}
