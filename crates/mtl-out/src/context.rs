//! Everything one template evaluation can see.
use mtl_core::{Bindings, Reader, SourceError, UnresolvedPolicy};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::functions::FunctionRegistry;
use crate::renderer::{ReaderMap, TemplateRenderer};

/// Readers, runtime functions, the static override map and the unresolved
/// reference policy. The current row is not part of it; it is overlaid per
/// evaluation through [`Bindings::snapshot_with_row`].
#[derive(Clone)]
pub struct TemplateContext {
    readers: ReaderMap,
    functions: FunctionRegistry,
    statics: BTreeMap<String, String>,
    policy: UnresolvedPolicy,
}

impl TemplateContext {
    pub fn new(functions: FunctionRegistry) -> Self {
        Self {
            readers: ReaderMap::new(),
            functions,
            statics: BTreeMap::new(),
            policy: UnresolvedPolicy::default(),
        }
    }

    pub fn with_reader(mut self, name: impl Into<String>, reader: Arc<dyn Reader>) -> Self {
        self.readers.insert(name.into(), reader);
        self
    }

    pub fn with_readers(mut self, readers: ReaderMap) -> Self {
        self.readers.extend(readers);
        self
    }

    /// Merge `statics` over the current static map
    pub fn with_statics(mut self, statics: BTreeMap<String, String>) -> Self {
        self.statics.extend(statics);
        self
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn statics(&self) -> &BTreeMap<String, String> {
        &self.statics
    }

    pub fn reader(&self, name: &str) -> Result<&Arc<dyn Reader>, SourceError> {
        self.readers
            .get(name)
            .ok_or_else(|| SourceError::UnknownReader(name.to_string()))
    }

    pub fn readers(&self) -> impl Iterator<Item = (&str, &Arc<dyn Reader>)> {
        self.readers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Static bindings shared by every evaluation against this context
    pub fn bindings(&self) -> Bindings {
        Bindings::new(self.statics.clone(), self.readers.keys().cloned().collect())
    }

    /// Renderer wired to this context's functions, readers and policy
    pub fn renderer(&self) -> TemplateRenderer<'static> {
        TemplateRenderer::new(&self.functions, self.readers.clone(), self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statics_later_wins() {
        let mut first = BTreeMap::new();
        first.insert("k".to_string(), "1".to_string());
        let mut second = BTreeMap::new();
        second.insert("k".to_string(), "2".to_string());

        let context = TemplateContext::new(FunctionRegistry::standard())
            .with_statics(first)
            .with_statics(second);
        assert_eq!(context.statics()["k"], "2");
        assert_eq!(context.bindings().snapshot()["map"]["k"], "2");
    }

    #[test]
    fn test_unknown_reader() {
        let context = TemplateContext::new(FunctionRegistry::new());
        assert!(matches!(
            context.reader("nope"),
            Err(SourceError::UnknownReader(_))
        ));
        assert_eq!(context.policy(), UnresolvedPolicy::Fail);
    }
}
