//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Variables substituted into a template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Static text with typed placeholders.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}
