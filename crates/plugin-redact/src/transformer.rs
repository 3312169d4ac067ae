//! Byte-pattern replacement over unit representations.

use bytegate_core::traits::transformer::{TransformError, Transformer};
use bytegate_core::types::context::LoadContext;
use bytegate_core::types::unit::UnitName;

use crate::rules::RedactRule;

/// Applies one unit's redaction rules to its representation.
///
/// Rules run in configuration order, each over the output of the previous
/// one. Declines with `Ok(None)` when no rule matched, so untouched units
/// keep their original representation.
#[derive(Debug)]
pub struct RedactTransformer {
    /// Rules for the hooked unit, in configuration order.
    rules: Vec<RedactRule>,
}

impl RedactTransformer {
    /// Create a transformer over one unit's rules.
    pub fn new(rules: Vec<RedactRule>) -> Self {
        Self { rules }
    }

    /// Rules this transformer applies.
    pub fn rules(&self) -> &[RedactRule] {
        &self.rules
    }
}

impl Transformer for RedactTransformer {
    fn transform(
        &self,
        _unit: &UnitName,
        bytes: &[u8],
        _ctx: &LoadContext,
    ) -> Result<Option<Vec<u8>>, TransformError> {
        let mut current: Option<Vec<u8>> = None;
        for rule in &self.rules {
            let input = current.as_deref().unwrap_or(bytes);
            if let Some(next) = replace_all(input, &rule.find, &rule.replace) {
                current = Some(next);
            }
        }
        Ok(current)
    }
}

/// Replace every non-overlapping occurrence of `find`, left to right.
/// Returns `None` when nothing matched.
fn replace_all(haystack: &[u8], find: &[u8], replace: &[u8]) -> Option<Vec<u8>> {
    if find.is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    let mut replaced = false;
    while i < haystack.len() {
        if haystack.len() - i >= find.len() && &haystack[i..i + find.len()] == find {
            out.extend_from_slice(replace);
            i += find.len();
            replaced = true;
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }

    replaced.then_some(out)
}
