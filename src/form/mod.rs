//! Form records: ordered string fields with optional labels and validators.
//!
//! A field's label and validator pattern are metadata stored next to its
//! value; they never show up as keys of their own. A field that only carries
//! metadata (a label set before any value) is not a visible key until a value
//! is read or written.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::tree::{ObservableList, TreeValue};

mod table;

pub use table::{FormColumn, FormTable};

/// One entry of a [`FormRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    pub value: Option<String>,
    pub label: Option<String>,
    pub validator: Option<String>,
}

impl FormField {
    /// Number of populated parts.
    fn stored_parts(&self) -> usize {
        usize::from(self.value.is_some()) + usize::from(self.label.is_some()) + usize::from(self.validator.is_some())
    }
}

/// Access to the fields of a form-like object.
pub trait FormProperty {
    /// Current value of `key`; an absent key is created empty.
    fn value(&self, key: &str) -> String;

    /// A read/write handle on `key`; the key is created empty if absent.
    fn binding(&self, key: &str) -> FieldBinding;

    fn set_value(&self, key: &str, value: &str);

    fn validator_regex(&self, key: &str) -> Option<String>;

    fn set_validator_regex(&self, key: &str, regex: &str);

    fn label(&self, key: &str) -> Option<String>;

    fn set_label(&self, key: &str, label: &str);

    /// Visible keys in insertion order.
    fn keys(&self) -> Vec<String>;

    /// Stored entries, metadata included.
    fn properties_count(&self) -> usize;
}

/// A shared, mutable form record. Clones refer to the same record.
#[derive(Clone, Default)]
pub struct FormRecord {
    fields: Arc<Mutex<IndexMap<String, FormField>>>,
    children: ObservableList<FormRecord>,
}

impl FormRecord {
    /// Build from a flat `key, value, key, value, ...` list. A trailing key
    /// without a value is ignored.
    pub fn new(pairs: &[&str]) -> Self {
        let fields = pairs
            .chunks_exact(2)
            .map(|pair| {
                let field = FormField {
                    value: Some(pair[1].to_owned()),
                    ..FormField::default()
                };
                (pair[0].to_owned(), field)
            })
            .collect();
        Self {
            fields: Arc::new(Mutex::new(fields)),
            children: ObservableList::new(),
        }
    }

    /// Value of `key` if it has one, without creating it.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.fields.lock().get(key).and_then(|f| f.value.clone())
    }

    /// Copy of the whole field entry.
    pub fn field(&self, key: &str) -> Option<FormField> {
        self.fields.lock().get(key).cloned()
    }

    /// Nested records, shown as children in a [`FormTable`].
    pub fn children(&self) -> ObservableList<FormRecord> {
        self.children.clone()
    }

    fn with_field<R>(&self, key: &str, f: impl FnOnce(&mut FormField) -> R) -> R {
        let mut fields = self.fields.lock();
        f(fields.entry(key.to_owned()).or_default())
    }
}

impl FormProperty for FormRecord {
    fn value(&self, key: &str) -> String {
        self.with_field(key, |f| f.value.get_or_insert_with(String::new).clone())
    }

    fn binding(&self, key: &str) -> FieldBinding {
        self.with_field(key, |f| {
            f.value.get_or_insert_with(String::new);
        });
        FieldBinding {
            record: self.clone(),
            key: key.to_owned(),
        }
    }

    fn set_value(&self, key: &str, value: &str) {
        self.with_field(key, |f| f.value = Some(value.to_owned()));
    }

    fn validator_regex(&self, key: &str) -> Option<String> {
        self.fields.lock().get(key).and_then(|f| f.validator.clone())
    }

    fn set_validator_regex(&self, key: &str, regex: &str) {
        self.with_field(key, |f| f.validator = Some(regex.to_owned()));
    }

    fn label(&self, key: &str) -> Option<String> {
        self.fields.lock().get(key).and_then(|f| f.label.clone())
    }

    fn set_label(&self, key: &str, label: &str) {
        self.with_field(key, |f| f.label = Some(label.to_owned()));
    }

    fn keys(&self) -> Vec<String> {
        self.fields
            .lock()
            .iter()
            .filter(|(_, f)| f.value.is_some())
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn properties_count(&self) -> usize {
        self.fields.lock().values().map(FormField::stored_parts).sum()
    }
}

impl PartialEq for FormRecord {
    /// Identity: two handles on the same record.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }
}

impl TreeValue for FormRecord {
    fn is_group(&self) -> bool {
        self.keys().is_empty()
    }
}

impl fmt::Debug for FormRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.lock();
        f.debug_map()
            .entries(fields.iter().filter_map(|(k, v)| Some((k, v.value.as_ref()?))))
            .finish()
    }
}

/// Read/write handle on one field of a [`FormRecord`].
#[derive(Debug, Clone)]
pub struct FieldBinding {
    record: FormRecord,
    key: String,
}

impl FieldBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> String {
        self.record.value(&self.key)
    }

    pub fn set(&self, value: &str) {
        self.record.set_value(&self.key, value);
    }
}
