// src/storage/memory.rs
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory stand-in for the hosting page: a set of elements addressed by id.
#[derive(Default)]
pub struct Document {
    elements: DashMap<String, Arc<Element>>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: DashMap::new(),
        }
    }

    /// Returns the element with this id, creating an empty one if needed.
    pub fn create_element(&self, id: &str) -> Arc<Element> {
        self.elements
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Element::new(id)))
            .value()
            .clone()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Arc<Element>> {
        self.elements.get(id).map(|r| r.value().clone())
    }
}

pub struct Element {
    id: String,
    inner_html: RwLock<String>,
}

impl Element {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            inner_html: RwLock::new(String::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inner_html(&self) -> String {
        self.inner_html.read().clone()
    }

    /// Replaces the element's contents wholesale.
    pub fn set_inner_html(&self, html: impl Into<String>) {
        *self.inner_html.write() = html.into();
    }
}
