use std::collections::BTreeMap;

/// Named per-point scalar fields, one of which may be marked active.
///
/// The active field is the one consumers color by when they are not told a
/// name explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointData {
    fields: BTreeMap<String, Vec<f32>>,
    active: Option<String>,
}

impl PointData {
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&[f32]> {
        self.active.as_deref().and_then(|name| self.get(name))
    }

    pub(crate) fn insert(&mut self, name: String, values: Vec<f32>) {
        self.fields.insert(name, values);
    }

    pub(crate) fn set_active(&mut self, name: Option<String>) {
        self.active = name;
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Vec<f32>> {
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        self.fields.remove(name)
    }
}
