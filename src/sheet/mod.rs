//! Property sheets: keyed, grouped, editable values.
//!
//! Each [`SheetItem`] holds a [`PropertyValue`] and the [`EditorKind`]
//! resolved when the value was assigned. Hosts pick the matching editor
//! through [`select_editor`] and listen for changes with
//! [`PropertySheet::subscribe`].

use std::fmt;
use std::str::FromStr;

use strum::VariantNames;

use crate::form::FormProperty;
use crate::log::{debug, trace};
use crate::types::Color;

mod editor;

pub use editor::{
    EditorRegistry, SelectedEditor, TextValidator, VALIDATION_DELAY, ValidationState, select_editor,
};

// ============================================================================
// Values
// ============================================================================

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    #[default]
    Empty,
    Number(f64),
    Integer(i64),
    Bool(bool),
    Color(Color),
    /// One of a closed set of options, typically the variants of an enum.
    Choice {
        selected: String,
        options: Vec<String>,
    },
    Text(String),
}

impl PropertyValue {
    /// Choice over the variants of `E`, selecting `value`.
    pub fn choice<E: VariantNames + AsRef<str>>(value: E) -> Self {
        PropertyValue::Choice {
            selected: value.as_ref().to_owned(),
            options: E::VARIANTS.iter().map(|v| (*v).to_owned()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PropertyValue::Empty)
    }

    /// The editor this value calls for. Empty values get a text editor.
    pub fn editor_kind(&self) -> EditorKind {
        match self {
            PropertyValue::Number(_) | PropertyValue::Integer(_) => EditorKind::Numeric,
            PropertyValue::Bool(_) => EditorKind::Check,
            PropertyValue::Color(_) => EditorKind::Color,
            PropertyValue::Choice { options, .. } => EditorKind::Choice(options.clone()),
            PropertyValue::Empty | PropertyValue::Text(_) => EditorKind::Text,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Empty => Ok(()),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Integer(n) => write!(f, "{n}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Color(c) => write!(f, "{c}"),
            PropertyValue::Choice { selected, .. } => f.write_str(selected),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! property_conversions {
    ($($ty:ty => $variant:ident as $repr:ty),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::$variant(<$repr>::from(value))
                }
            }
        )*
    };
}

property_conversions! {
    f64 => Number as f64,
    f32 => Number as f64,
    i64 => Integer as i64,
    i32 => Integer as i64,
    i16 => Integer as i64,
    u32 => Integer as i64,
    bool => Bool as bool,
    Color => Color as Color,
    String => Text as String,
    &str => Text as String,
}

/// Types that can be read back out of a [`PropertyValue`].
pub trait FromProperty: Sized {
    fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl FromProperty for f64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromProperty for i64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromProperty for i32 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        i64::from_property(value).and_then(|n| i32::try_from(n).ok())
    }
}

impl FromProperty for bool {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromProperty for Color {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromProperty for String {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Which editor an item is shown with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKind {
    Numeric,
    Check,
    Color,
    Choice(Vec<String>),
    Text,
}

// ============================================================================
// Items
// ============================================================================

/// One row of a [`PropertySheet`].
#[derive(Debug, Clone, PartialEq)]
pub struct SheetItem {
    name: String,
    group: String,
    description: String,
    regex: Option<String>,
    value: PropertyValue,
    kind: EditorKind,
}

impl SheetItem {
    pub fn new(name: &str, group: &str, regex: Option<&str>, value: PropertyValue) -> Self {
        Self {
            name: name.to_owned(),
            group: group.to_owned(),
            description: String::new(),
            regex: regex.map(str::to_owned),
            kind: value.editor_kind(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn regex(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    pub fn set_regex(&mut self, regex: Option<&str>) {
        self.regex = regex.map(str::to_owned);
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn kind(&self) -> &EditorKind {
        &self.kind
    }

    /// Assign a value. The editor kind follows the value, except that an
    /// empty value keeps the current kind.
    pub fn set_value(&mut self, value: PropertyValue) {
        if !value.is_empty() {
            self.kind = value.editor_kind();
        }
        self.value = value;
    }

    /// The value as `T`, or `None` when it holds something else.
    pub fn typed<T: FromProperty>(&self) -> Option<T> {
        T::from_property(&self.value)
    }

    /// The selected option parsed as `E`.
    pub fn typed_choice<E: FromStr>(&self) -> Option<E> {
        match &self.value {
            PropertyValue::Choice { selected, .. } => selected.parse().ok(),
            _ => None,
        }
    }
}

// ============================================================================
// Sheet
// ============================================================================

/// Change notification from a [`PropertySheet`]; carries the item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetEvent {
    Added(String),
    Updated(String),
    Removed(String),
}

/// Handle returned by [`PropertySheet::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetSubscription(u64);

type SheetObserver = Box<dyn FnMut(&SheetEvent) + Send>;

/// An ordered list of editable items, unique by name.
#[derive(Default)]
pub struct PropertySheet {
    items: Vec<SheetItem>,
    observers: Vec<(SheetSubscription, SheetObserver)>,
    next_subscription: u64,
}

impl fmt::Debug for PropertySheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySheet")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PropertySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, or update the existing item with the same name in place.
    ///
    /// An update replaces value, description and group; the item keeps its
    /// position and validation pattern.
    pub fn add_item(
        &mut self,
        name: &str,
        group: &str,
        description: &str,
        regex: Option<&str>,
        value: impl Into<PropertyValue>,
    ) {
        let value = value.into();
        if let Some(item) = self.items.iter_mut().find(|i| i.name == name) {
            item.set_value(value);
            item.description = description.to_owned();
            item.group = group.to_owned();
            trace!(name, "sheet item updated");
            self.notify(SheetEvent::Updated(name.to_owned()));
            return;
        }
        let mut item = SheetItem::new(name, group, regex, value);
        item.description = description.to_owned();
        self.items.push(item);
        trace!(name, "sheet item added");
        self.notify(SheetEvent::Added(name.to_owned()));
    }

    /// Remove the first item named `name`.
    pub fn remove_item(&mut self, name: &str) -> Option<SheetItem> {
        let index = self.items.iter().position(|i| i.name == name)?;
        let item = self.items.remove(index);
        self.notify(SheetEvent::Removed(item.name.clone()));
        Some(item)
    }

    pub fn item(&self, name: &str) -> Option<&SheetItem> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Assign a new value to an existing item. Unknown names are ignored.
    pub fn set_item(&mut self, name: &str, value: impl Into<PropertyValue>) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.name == name) else {
            return false;
        };
        item.set_value(value.into());
        self.notify(SheetEvent::Updated(name.to_owned()));
        true
    }

    pub fn set_item_group(&mut self, name: &str, group: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.name == name) else {
            return false;
        };
        item.group = group.to_owned();
        self.notify(SheetEvent::Updated(name.to_owned()));
        true
    }

    pub fn items(&self) -> &[SheetItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items belonging to `group`, in sheet order.
    pub fn group_items<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a SheetItem> + 'a {
        self.items.iter().filter(move |i| i.group == group)
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SheetEvent) + Send + 'static) -> SheetSubscription {
        let id = SheetSubscription(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SheetSubscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: SheetEvent) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    // ------------------------------------------------------------------------
    // Form records
    // ------------------------------------------------------------------------

    /// Add a text item per visible field of `record`, labelled by the field
    /// label and validated by the field's pattern.
    pub fn bind_record(&mut self, record: &impl FormProperty, group: &str) {
        let keys = record.keys();
        for key in &keys {
            let description = record.label(key).unwrap_or_else(|| key.clone());
            let regex = record.validator_regex(key);
            self.add_item(key, group, &description, regex.as_deref(), record.value(key));
        }
        debug!(group, fields = keys.len(), "record bound to sheet");
    }

    /// Write the values of items named after fields of `record` back to it.
    pub fn commit_to(&self, record: &impl FormProperty) -> usize {
        let mut written = 0;
        for key in record.keys() {
            if let Some(item) = self.item(&key) {
                record.set_value(&key, &item.value.to_string());
                written += 1;
            }
        }
        debug!(written, "sheet committed to record");
        written
    }
}
