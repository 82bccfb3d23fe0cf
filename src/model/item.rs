//! Items — named, typed children of a model.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::constants::OBJECT_DELIMITER;
use crate::qualifier::Qualifier;

/// Type tag of an item.
///
/// Names are unique per type within a model, not globally.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemType {
    Process,
    Activity,
    Actor,
    /// Complex data type; may carry an implementation class name.
    Type,
    Queue,
    Skin,
    Visual,
    /// Any tag not known to the repository.
    Other(SmolStr),
}

impl ItemType {
    /// The known item types, in storage order.
    pub fn known() -> [ItemType; 7] {
        [
            ItemType::Process,
            ItemType::Activity,
            ItemType::Actor,
            ItemType::Type,
            ItemType::Queue,
            ItemType::Skin,
            ItemType::Visual,
        ]
    }

    /// Parse a type tag (case-insensitive for known types).
    pub fn parse(tag: &str) -> Self {
        Self::known()
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag))
            .unwrap_or_else(|| ItemType::Other(SmolStr::new(tag)))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Process => "Process",
            ItemType::Activity => "Activity",
            ItemType::Actor => "Actor",
            ItemType::Type => "Type",
            ItemType::Queue => "Queue",
            ItemType::Skin => "Skin",
            ItemType::Visual => "Visual",
            ItemType::Other(tag) => tag,
        }
    }

    /// Name of the per-type sub-directory in a model directory.
    pub fn dir_name(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ItemType {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

/// An outgoing reference from an item to another item.
///
/// `target` is the reference text as persisted: a bare name, a typed name or
/// an absolute qualifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemReference {
    pub item_type: ItemType,
    pub target: String,
}

impl ItemReference {
    pub fn new(item_type: ItemType, target: impl Into<String>) -> Self {
        Self {
            item_type,
            target: target.into(),
        }
    }
}

/// A child object inside an item (node, parameter, member...), addressed by
/// the object path of a qualifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelObject {
    pub name: SmolStr,
    pub kind: SmolStr,
    pub properties: IndexMap<SmolStr, String>,
    pub children: Vec<ModelObject>,
}

impl ModelObject {
    pub fn new(name: impl Into<SmolStr>, kind: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            properties: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ModelObject) -> Self {
        self.children.push(child);
        self
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&ModelObject> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A named, typed child of exactly one model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    name: SmolStr,
    item_type: ItemType,
    /// Back-reference to the owning model; cleared when the item is removed.
    model: Option<SmolStr>,
    pub description: Option<String>,
    /// Implementation class a `Type` item maps to.
    pub class_name: Option<String>,
    pub properties: IndexMap<SmolStr, String>,
    pub references: Vec<ItemReference>,
    pub objects: Vec<ModelObject>,
}

impl Item {
    pub fn new(name: impl Into<SmolStr>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
            model: None,
            description: None,
            class_name: None,
            properties: IndexMap::new(),
            references: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_reference(mut self, item_type: ItemType, target: impl Into<String>) -> Self {
        self.references.push(ItemReference::new(item_type, target));
        self
    }

    pub fn with_object(mut self, object: ModelObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    /// Name of the owning model, `None` while the item is detached.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub(crate) fn set_model(&mut self, model: Option<SmolStr>) {
        self.model = model;
    }

    pub(crate) fn rename(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    /// Returns true if both items denote the same (model, type, name) slot.
    pub fn same_identity(&self, other: &Item) -> bool {
        self.model == other.model && self.item_type == other.item_type && self.name == other.name
    }

    /// Absolute, typed qualifier of this item. Detached items yield a
    /// relative qualifier.
    pub fn qualifier(&self) -> Qualifier {
        let q = Qualifier::for_name(self.name.clone()).with_item_type(self.item_type.as_str());
        match &self.model {
            Some(model) => q.with_model(model.clone()),
            None => q,
        }
    }

    /// Direct child object by name.
    pub fn child(&self, name: &str) -> Option<&ModelObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Walk a `.`-separated object path through nested children.
    ///
    /// On failure returns the first segment that could not be found.
    pub fn object_at<'a, 'p>(&'a self, path: &'p str) -> Result<&'a ModelObject, &'p str> {
        let mut segments = path.split(OBJECT_DELIMITER);
        let first = segments.next().unwrap_or(path);
        let mut current = self.child(first).ok_or(first)?;
        for segment in segments {
            current = current.child(segment).ok_or(segment)?;
        }
        Ok(current)
    }

    /// Copy-in-place: take every content field from `source` while keeping
    /// this item's identity and model back-reference.
    pub fn overwrite_from(&mut self, source: Item) {
        self.description = source.description;
        self.class_name = source.class_name;
        self.properties = source.properties;
        self.references = source.references;
        self.objects = source.objects;
    }
}
