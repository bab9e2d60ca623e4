//! Attribute schemas.
//!
//! A schema is an ordered, name-indexed list of typed attributes. Schemas
//! are immutable once built and shared by reference between a container and
//! all of its blocks; changing the attribute set means building a new schema
//! and migrating (see `BlockContainer::update_attributes`).

use error::*;
use std::fmt::{Display, Formatter, Error as FmtError};
use std::slice;
use std::sync::Arc;

use shrike_common::collections::HashMap;
use ty::AttrType;


#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    ty: Arc<AttrType>,
}

impl Attribute {
    pub fn new<S: Into<String>>(name: S, ty: AttrType) -> Attribute {
        Attribute {
            name: name.into(),
            ty: Arc::new(ty),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &Arc<AttrType> {
        &self.ty
    }
}

impl Display for Attribute {
    fn fmt(&self, fmt: &mut Formatter) -> ::std::result::Result<(), FmtError> {
        write!(fmt, "{}: {}", self.name, self.ty)
    }
}

#[derive(Debug)]
pub struct Schema {
    attrs: Vec<Attribute>,
    index: HashMap<String, usize>,
}

impl Schema {
    fn new(attrs: Vec<Attribute>) -> Result<Schema> {
        let mut index = HashMap::with_capacity(attrs.len());

        for (idx, attr) in attrs.iter().enumerate() {
            if index.insert(attr.name().to_owned(), idx).is_some() {
                bail!("duplicate attribute name {:?}", attr.name());
            }
        }

        Ok(Schema { attrs, index })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<Attribute> {
        self.attrs.iter()
    }

    /// Attribute at `idx`; indices are stable for the lifetime of the schema.
    pub fn attr(&self, idx: usize) -> &Attribute {
        &self.attrs[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn type_of(&self, name: &str) -> Option<&Arc<AttrType>> {
        self.index_of(name).map(|idx| self.attrs[idx].ty())
    }

    /// Seeds a builder with this schema's attributes, for incremental
    /// schema updates.
    pub fn to_builder(&self) -> SchemaBuilder {
        SchemaBuilder {
            attrs: self.attrs.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    attrs: Vec<Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> SchemaBuilder {
        Default::default()
    }

    pub fn add<S: Into<String>>(self, name: S, ty: AttrType) -> SchemaBuilder {
        self.add_attr(Attribute::new(name, ty))
    }

    pub fn add_attr(mut self, attr: Attribute) -> SchemaBuilder {
        self.attrs.push(attr);
        self
    }

    pub fn build(self) -> Result<Schema> {
        Schema::new(self.attrs)
    }
}
