//! # Qualifier
//!
//! A parsed, structured identifier addressing a model, an item within it, the
//! item's type tag and an optional sub-path into the item's internals.
//!
//! ```text
//! /Sales/Process:CheckOrder.Entry.amount
//!  ^^^^^ ^^^^^^^ ^^^^^^^^^^ ^^^^^^^^^^^^
//!  model itemType   item     objectPath
//! ```
//!
//! A qualifier is *absolute* iff its text begins with `/`, in which case the
//! model is populated. Parsing is purely textual; `format` produces a canonical
//! text that parses back to an equal qualifier.

mod lexer;
mod parser;

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::base::constants::{
    LIST_DELIMITER, OBJECT_DELIMITER, PATH_DELIMITER, TYPE_DELIMITER,
};
use crate::base::Result;

bitflags! {
    /// Selects which fields must agree in [`Qualifier::matches_fields`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct QualifierFields: u8 {
        const ITEM = 0b0001;
        const MODEL = 0b0010;
        const TYPE = 0b0100;
        const OBJECT_PATH = 0b1000;
        const ALL = Self::ITEM.bits() | Self::MODEL.bits() | Self::TYPE.bits() | Self::OBJECT_PATH.bits();
    }
}

/// Structured identifier of a model, item or model object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Qualifier {
    pub(crate) model: Option<SmolStr>,
    pub(crate) item_type: Option<SmolStr>,
    pub(crate) item: Option<SmolStr>,
    pub(crate) object_path: Option<SmolStr>,
}

impl Qualifier {
    /// Parse qualifier text.
    ///
    /// The empty string yields an all-empty qualifier. Fails with
    /// `RepositoryError::Parse` on misplaced or repeated delimiters.
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse(text)
    }

    /// Qualifier addressing a whole model (`/Model/`).
    pub fn for_model(model: impl Into<SmolStr>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Qualifier addressing a typed item in a model (`/Model/Type:item`).
    pub fn for_item(
        model: impl Into<SmolStr>,
        item_type: impl Into<SmolStr>,
        item: impl Into<SmolStr>,
    ) -> Self {
        Self {
            model: Some(model.into()),
            item_type: Some(item_type.into()),
            item: Some(item.into()),
            object_path: None,
        }
    }

    /// Qualifier holding only a bare item name.
    pub fn for_name(item: impl Into<SmolStr>) -> Self {
        Self {
            item: Some(item.into()),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<SmolStr>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<SmolStr>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn with_item(mut self, item: impl Into<SmolStr>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_object_path(mut self, object_path: impl Into<SmolStr>) -> Self {
        self.object_path = Some(object_path.into());
        self
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn item_type(&self) -> Option<&str> {
        self.item_type.as_deref()
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub fn object_path(&self) -> Option<&str> {
        self.object_path.as_deref()
    }

    /// Returns true if the qualifier names a model (its text starts with `/`).
    pub fn is_absolute(&self) -> bool {
        self.model.is_some()
    }

    /// Returns true if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.item_type.is_none()
            && self.item.is_none()
            && self.object_path.is_none()
    }

    /// The qualifier of the item this qualifier points into (object path dropped).
    pub fn item_qualifier(&self) -> Self {
        Self {
            object_path: None,
            ..self.clone()
        }
    }

    /// Format the qualifier; `typed` controls whether the item type prefix is
    /// included.
    pub fn format(&self, typed: bool) -> String {
        let mut text = String::new();
        if let Some(model) = &self.model {
            text.push(PATH_DELIMITER);
            text.push_str(model);
            text.push(PATH_DELIMITER);
        }
        if typed && let Some(item_type) = &self.item_type {
            text.push_str(item_type);
            text.push(TYPE_DELIMITER);
        }
        if let Some(item) = &self.item {
            text.push_str(item);
        }
        if let Some(object_path) = &self.object_path {
            text.push(OBJECT_DELIMITER);
            text.push_str(object_path);
        }
        text
    }

    /// Weak equality: item, model and object path must be equal, the item type
    /// is compared only when both sides carry one.
    pub fn matches(&self, other: &Qualifier) -> bool {
        self.matches_fields(other, QualifierFields::ALL)
    }

    /// Like [`matches`](Self::matches), restricted to the selected fields.
    pub fn matches_fields(&self, other: &Qualifier, fields: QualifierFields) -> bool {
        if fields.contains(QualifierFields::ITEM) && self.item != other.item {
            return false;
        }
        if fields.contains(QualifierFields::MODEL) && self.model != other.model {
            return false;
        }
        if fields.contains(QualifierFields::OBJECT_PATH) && self.object_path != other.object_path
        {
            return false;
        }
        if fields.contains(QualifierFields::TYPE)
            && let (Some(a), Some(b)) = (&self.item_type, &other.item_type)
        {
            return a == b;
        }
        true
    }
}

/// Returns true if `name` is non-empty and free of qualifier delimiters.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.contains([
            PATH_DELIMITER,
            TYPE_DELIMITER,
            OBJECT_DELIMITER,
            LIST_DELIMITER,
        ])
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(true))
    }
}

impl FromStr for Qualifier {
    type Err = crate::base::RepositoryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}
