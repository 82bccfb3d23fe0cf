//! XML codec for model descriptors and item files.
//!
//! ```xml
//! <model name="Sales">
//!   <description>Order handling</description>
//!   <import model="Shared"/>
//!   <property name="owner" value="ops"/>
//! </model>
//!
//! <item name="CheckOrder" type="Process" class="sales.CheckOrder">
//!   <description>...</description>
//!   <property name="timeout" value="30"/>
//!   <reference type="Type" target="Order"/>
//!   <object name="Entry" kind="Node">
//!     <object name="amount" kind="Parameter"/>
//!   </object>
//! </item>
//! ```

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use smol_str::SmolStr;

use crate::base::{RepositoryError, Result};
use crate::model::{Item, ItemReference, ItemType, Model, ModelObject};

const MODEL_TAG: &str = "model";
const ITEM_TAG: &str = "item";
const DESCRIPTION_TAG: &str = "description";
const IMPORT_TAG: &str = "import";
const PROPERTY_TAG: &str = "property";
const REFERENCE_TAG: &str = "reference";
const OBJECT_TAG: &str = "object";

// ============================================================================
// Reading
// ============================================================================

/// Attributes of one element, in document order.
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(e: &BytesStart<'_>, path: &Path) -> Result<Self> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| RepositoryError::descriptor(path, format!("attribute error: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| RepositoryError::descriptor(path, format!("attribute key error: {e}")))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| RepositoryError::descriptor(path, format!("attribute value error: {e}")))?
                .to_string();
            attrs.push((key, value));
        }
        Ok(Self(attrs))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn require(&self, key: &str, tag: &str, path: &Path) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            RepositoryError::descriptor(path, format!("<{tag}> is missing the '{key}' attribute"))
        })
    }
}

fn tag_name(e: &BytesStart<'_>, path: &Path) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|e| RepositoryError::descriptor(path, format!("invalid tag name: {e}")))
}

/// Pull events until EOF, handing start, empty, end and text events to
/// `on_event`.
fn walk<F>(input: &[u8], path: &Path, mut on_event: F) -> Result<()>
where
    F: FnMut(XmlEvent) -> Result<()>,
{
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                on_event(XmlEvent::Start(tag_name(e, path)?, Attributes::read(e, path)?))?;
            }
            Ok(Event::Empty(ref e)) => {
                let tag = tag_name(e, path)?;
                on_event(XmlEvent::Start(tag.clone(), Attributes::read(e, path)?))?;
                on_event(XmlEvent::End(tag))?;
            }
            Ok(Event::End(ref e)) => {
                let tag = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| RepositoryError::descriptor(path, format!("invalid tag name: {e}")))?
                    .to_string();
                on_event(XmlEvent::End(tag))?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| RepositoryError::descriptor(path, format!("text error: {e}")))?;
                on_event(XmlEvent::Text(text.into_owned()))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(RepositoryError::descriptor(
                    path,
                    format!("XML parse error at position {}: {e}", reader.error_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

enum XmlEvent {
    Start(String, Attributes),
    End(String),
    Text(String),
}

/// Parse a `model.xml` descriptor. Items are stored separately.
pub fn read_model(input: &[u8], path: &Path) -> Result<Model> {
    let mut model: Option<Model> = None;
    let mut in_description = false;

    walk(input, path, |event| {
        match event {
            XmlEvent::Start(tag, attrs) => {
                if model.is_none() {
                    if tag != MODEL_TAG {
                        return Err(RepositoryError::descriptor(
                            path,
                            format!("expected <model> root, found <{tag}>"),
                        ));
                    }
                    model = Some(Model::new(attrs.require("name", MODEL_TAG, path)?));
                    return Ok(());
                }
                let Some(m) = model.as_mut() else {
                    return Ok(());
                };
                match tag.as_str() {
                    MODEL_TAG => {
                        return Err(RepositoryError::descriptor(path, "nested <model> element"));
                    }
                    DESCRIPTION_TAG => in_description = true,
                    IMPORT_TAG => m.add_import(attrs.require("model", IMPORT_TAG, path)?),
                    PROPERTY_TAG => {
                        let name = attrs.require("name", PROPERTY_TAG, path)?;
                        let value = attrs.get("value").unwrap_or_default();
                        m.properties.insert(SmolStr::new(name), value.to_string());
                    }
                    _ => {}
                }
            }
            XmlEvent::End(tag) => {
                if tag == DESCRIPTION_TAG {
                    in_description = false;
                }
            }
            XmlEvent::Text(text) => {
                if in_description && let Some(m) = model.as_mut() {
                    m.description = Some(text);
                }
            }
        }
        Ok(())
    })?;

    model.ok_or_else(|| RepositoryError::descriptor(path, "no <model> element"))
}

/// Parse an item file.
pub fn read_item(input: &[u8], path: &Path) -> Result<Item> {
    let mut item: Option<Item> = None;
    let mut objects: Vec<ModelObject> = Vec::new();
    let mut in_description = false;

    walk(input, path, |event| {
        match event {
            XmlEvent::Start(tag, attrs) => {
                if item.is_none() {
                    if tag != ITEM_TAG {
                        return Err(RepositoryError::descriptor(
                            path,
                            format!("expected <item> root, found <{tag}>"),
                        ));
                    }
                    let name = attrs.require("name", ITEM_TAG, path)?;
                    let item_type = ItemType::parse(attrs.require("type", ITEM_TAG, path)?);
                    let mut parsed = Item::new(name, item_type);
                    parsed.class_name = attrs.get("class").map(str::to_string);
                    item = Some(parsed);
                    return Ok(());
                }
                let Some(i) = item.as_mut() else {
                    return Ok(());
                };
                match tag.as_str() {
                    ITEM_TAG => {
                        return Err(RepositoryError::descriptor(path, "nested <item> element"));
                    }
                    DESCRIPTION_TAG => in_description = objects.is_empty(),
                    PROPERTY_TAG => {
                        let name = SmolStr::new(attrs.require("name", PROPERTY_TAG, path)?);
                        let value = attrs.get("value").unwrap_or_default().to_string();
                        match objects.last_mut() {
                            Some(object) => object.properties.insert(name, value),
                            None => i.properties.insert(name, value),
                        };
                    }
                    REFERENCE_TAG => {
                        let item_type = ItemType::parse(attrs.require("type", REFERENCE_TAG, path)?);
                        let target = attrs.require("target", REFERENCE_TAG, path)?;
                        i.references.push(ItemReference::new(item_type, target));
                    }
                    OBJECT_TAG => {
                        let name = attrs.require("name", OBJECT_TAG, path)?;
                        let kind = attrs.get("kind").unwrap_or_default();
                        objects.push(ModelObject::new(name, kind));
                    }
                    _ => {}
                }
            }
            XmlEvent::End(tag) => match tag.as_str() {
                DESCRIPTION_TAG => in_description = false,
                OBJECT_TAG => {
                    if let Some(done) = objects.pop() {
                        match (objects.last_mut(), item.as_mut()) {
                            (Some(parent), _) => parent.children.push(done),
                            (None, Some(i)) => i.objects.push(done),
                            (None, None) => {}
                        }
                    }
                }
                _ => {}
            },
            XmlEvent::Text(text) => {
                if in_description && let Some(i) = item.as_mut() {
                    i.description = Some(text);
                }
            }
        }
        Ok(())
    })?;

    item.ok_or_else(|| RepositoryError::descriptor(path, "no <item> element"))
}

// ============================================================================
// Writing
// ============================================================================

struct XmlOut<'p> {
    writer: Writer<Vec<u8>>,
    path: &'p Path,
}

impl<'p> XmlOut<'p> {
    fn new(path: &'p Path) -> Result<Self> {
        let mut out = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            path,
        };
        out.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(out)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| RepositoryError::descriptor(self.path, format!("write error: {e}")))
    }

    fn text_element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new(tag)))?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.emit(Event::End(BytesEnd::new(tag)))
    }

    fn property(&mut self, name: &str, value: &str) -> Result<()> {
        let mut e = BytesStart::new(PROPERTY_TAG);
        e.push_attribute(("name", name));
        e.push_attribute(("value", value));
        self.emit(Event::Empty(e))
    }

    fn object(&mut self, object: &ModelObject) -> Result<()> {
        let mut e = BytesStart::new(OBJECT_TAG);
        e.push_attribute(("name", object.name.as_str()));
        e.push_attribute(("kind", object.kind.as_str()));
        if object.properties.is_empty() && object.children.is_empty() {
            return self.emit(Event::Empty(e));
        }
        self.emit(Event::Start(e))?;
        for (name, value) in &object.properties {
            self.property(name, value)?;
        }
        for child in &object.children {
            self.object(child)?;
        }
        self.emit(Event::End(BytesEnd::new(OBJECT_TAG)))
    }

    fn finish(self) -> Vec<u8> {
        let mut output = self.writer.into_inner();
        output.push(b'\n');
        output
    }
}

/// Serialize the descriptor of `model`; `path` is used in error messages.
pub fn write_model(model: &Model, path: &Path) -> Result<Vec<u8>> {
    let mut out = XmlOut::new(path)?;
    let mut root = BytesStart::new(MODEL_TAG);
    root.push_attribute(("name", model.name()));
    out.emit(Event::Start(root))?;

    if let Some(description) = &model.description {
        out.text_element(DESCRIPTION_TAG, description)?;
    }
    for import in model.imports() {
        let mut e = BytesStart::new(IMPORT_TAG);
        e.push_attribute(("model", import.as_str()));
        out.emit(Event::Empty(e))?;
    }
    for (name, value) in &model.properties {
        out.property(name, value)?;
    }

    out.emit(Event::End(BytesEnd::new(MODEL_TAG)))?;
    Ok(out.finish())
}

/// Serialize one item file; `path` is used in error messages.
pub fn write_item(item: &Item, path: &Path) -> Result<Vec<u8>> {
    let mut out = XmlOut::new(path)?;
    let mut root = BytesStart::new(ITEM_TAG);
    root.push_attribute(("name", item.name()));
    root.push_attribute(("type", item.item_type().as_str()));
    if let Some(class_name) = &item.class_name {
        root.push_attribute(("class", class_name.as_str()));
    }
    out.emit(Event::Start(root))?;

    if let Some(description) = &item.description {
        out.text_element(DESCRIPTION_TAG, description)?;
    }
    for (name, value) in &item.properties {
        out.property(name, value)?;
    }
    for reference in &item.references {
        let mut e = BytesStart::new(REFERENCE_TAG);
        e.push_attribute(("type", reference.item_type.as_str()));
        e.push_attribute(("target", reference.target.as_str()));
        out.emit(Event::Empty(e))?;
    }
    for object in &item.objects {
        out.object(object)?;
    }

    out.emit(Event::End(BytesEnd::new(ITEM_TAG)))?;
    Ok(out.finish())
}
