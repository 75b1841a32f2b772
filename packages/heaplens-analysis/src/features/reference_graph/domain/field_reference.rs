//! Referrer chain steps
//!
//! A [`FieldReference`] is one `(type, field)` step; a [`ReferrerChain`] is
//! an ordered path of steps from an ancestor object down toward a target.
//! Rendering is pure string formatting and performs no heap access.

use serde::Serialize;
use std::fmt;

/// One `(type, field)` step of a referrer chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldReference {
    pub referrer_type: String,
    pub field_offset: u64,
    /// Declared field name from runtime metadata, when resolved
    pub field_name: Option<String>,
}

impl FieldReference {
    pub fn new(referrer_type: impl Into<String>, field_offset: u64) -> Self {
        Self {
            referrer_type: referrer_type.into(),
            field_offset,
            field_name: None,
        }
    }

    pub fn named(
        referrer_type: impl Into<String>,
        field_offset: u64,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            referrer_type: referrer_type.into(),
            field_offset,
            field_name: Some(field_name.into()),
        }
    }

    /// Field label: declared name, or the offset when the name is unknown
    pub fn field_label(&self) -> String {
        match &self.field_name {
            Some(name) => name.clone(),
            None => format!("+{:#x}", self.field_offset),
        }
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.referrer_type, self.field_label())
    }
}

/// Ordered path of `(type, field)` steps, ancestor first; length >= 1
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReferrerChain {
    steps: Vec<FieldReference>,
}

impl ReferrerChain {
    /// Single-step chain: a direct referrer of the target
    pub fn single(step: FieldReference) -> Self {
        Self { steps: vec![step] }
    }

    /// Prepend an ancestor step, describing one more hop upward
    pub fn extended(&self, ancestor: FieldReference) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.push(ancestor);
        steps.extend(self.steps.iter().cloned());
        Self { steps }
    }

    pub fn steps(&self) -> &[FieldReference] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn describe(&self) -> String {
        describe_field_references(&self.steps)
    }
}

/// Render an ordered field-reference path, e.g. `"TypeA.fieldX → TypeB.fieldY"`
pub fn describe_field_references(steps: &[FieldReference]) -> String {
    steps
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_named_field_renders_name() {
        let step = FieldReference::named("MyApp.Session", 0x8, "_userName");
        assert_eq!(step.to_string(), "MyApp.Session._userName");
    }

    #[test]
    fn test_unnamed_field_renders_offset() {
        let step = FieldReference::new("System.String[]", 0x18);
        assert_eq!(step.to_string(), "System.String[].+0x18");
    }

    #[test]
    fn test_describe_joins_steps() {
        let chain = ReferrerChain::single(FieldReference::named("TypeB", 0x10, "fieldY"))
            .extended(FieldReference::named("TypeA", 0x8, "fieldX"));

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.describe(), "TypeA.fieldX → TypeB.fieldY");
    }

    #[test]
    fn test_extended_does_not_mutate_original() {
        let base = ReferrerChain::single(FieldReference::new("TypeB", 0x10));
        let _longer = base.extended(FieldReference::new("TypeA", 0x8));
        assert_eq!(base.len(), 1);
    }
}
