//! Closure-based transformer adapter.

use std::fmt;

use bytegate_core::traits::transformer::{TransformError, Transformer};
use bytegate_core::types::context::LoadContext;
use bytegate_core::types::unit::UnitName;

/// Wraps a closure as a [`Transformer`].
///
/// Saves extensions a struct-plus-impl for simple rewrites. The name is
/// only used in diagnostics.
pub struct FnTransformer<F> {
    /// Name shown in logs when the transformer fails.
    name: String,
    /// The rewrite closure.
    f: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&UnitName, &[u8], &LoadContext) -> Result<Option<Vec<u8>>, TransformError>
        + Send
        + Sync,
{
    /// Wrap `f` under a diagnostic name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Diagnostic name of this transformer.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&UnitName, &[u8], &LoadContext) -> Result<Option<Vec<u8>>, TransformError>
        + Send
        + Sync,
{
    fn transform(
        &self,
        unit: &UnitName,
        bytes: &[u8],
        ctx: &LoadContext,
    ) -> Result<Option<Vec<u8>>, TransformError> {
        (self.f)(unit, bytes, ctx)
    }
}

impl<F> fmt::Debug for FnTransformer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformer")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_runs_with_unit_and_bytes() {
        let t = FnTransformer::new("upper", |_unit, bytes: &[u8], _ctx| {
            Ok(Some(bytes.to_ascii_uppercase()))
        });
        let out = t
            .transform(&UnitName::from("a.B"), b"abc", &LoadContext::initial())
            .expect("transform");
        assert_eq!(out.as_deref(), Some(&b"ABC"[..]));
    }

    #[test]
    fn test_debug_shows_the_name_only() {
        let t = FnTransformer::new("noop", |_: &UnitName, _: &[u8], _: &LoadContext| Ok(None));
        assert_eq!(format!("{t:?}"), "FnTransformer { name: \"noop\" }");
    }
}
