use std::ops::Deref;

use markup5ever::{LocalName, Namespace, QualName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The name of the attribute (e.g. the `class` in `<div class="test">`)
    pub name: QualName,
    /// The value of the attribute (e.g. the `"test"` in `<div class="test">`)
    pub value: String,
}

impl Attribute {
    /// An attribute in the null namespace, which is where every attribute of an HTML element lives.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    inner: Vec<Attribute>,
}

impl Attributes {
    pub fn new(inner: Vec<Attribute>) -> Self {
        Self { inner }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set `name` to `value`, returning the previous value if the attribute existed.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        match self.inner.iter_mut().find(|attr| &*attr.name.local == name) {
            Some(attr) => Some(std::mem::replace(&mut attr.value, value.to_string())),
            None => {
                self.inner.push(Attribute::new(name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let idx = self.inner.iter().position(|attr| &*attr.name.local == name)?;
        Some(self.inner.remove(idx))
    }

    pub fn push(&mut self, attr: Attribute) {
        self.inner.push(attr);
    }
}

impl Deref for Attributes {
    type Target = [Attribute];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
