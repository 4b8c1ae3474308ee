//! Discriminated resources.
//!
//! Some resource kinds are tagged unions: the value of one attribute
//! selects which other attributes are legal. Each union is declared as a
//! Rust enum implementing [`Variant`]; [`Discriminator`] is the type-erased
//! form the request builder, projector and plan pipeline consult.

use std::collections::BTreeSet;

use crate::error::ProviderError;
use crate::record::Record;
use crate::value::Attr;

/// One arm of a tagged union.
pub trait Variant: Sized + Copy + 'static {
    /// The attribute holding the discriminator value.
    const ATTRIBUTE: &'static str;

    /// Every variant, in declaration order.
    fn all() -> &'static [Self];

    /// The wire value selecting this variant.
    fn name(&self) -> &'static str;

    /// Attributes legal only under this variant (and possibly others).
    fn fields(&self) -> &'static [&'static str];

    /// Parse a wire value.
    fn parse(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.name() == value)
    }
}

/// The selection a record makes among a discriminator's variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// A known, valid variant.
    Variant(&'a str),
    /// The discriminator is null or not yet known.
    Unresolved,
}

/// A type-erased tagged-union description.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    attribute: &'static str,
    variants: Vec<(&'static str, &'static [&'static str])>,
}

impl Discriminator {
    /// Build the description of a [`Variant`] enum.
    pub fn of<V: Variant>() -> Self {
        Self {
            attribute: V::ATTRIBUTE,
            variants: V::all().iter().map(|v| (v.name(), v.fields())).collect(),
        }
    }

    /// The discriminator attribute name.
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    /// The accepted discriminator values.
    pub fn values(&self) -> Vec<&'static str> {
        self.variants.iter().map(|(name, _)| *name).collect()
    }

    /// Every attribute that belongs to at least one variant.
    pub fn scoped_fields(&self) -> BTreeSet<&'static str> {
        self.variants
            .iter()
            .flat_map(|(_, fields)| fields.iter().copied())
            .collect()
    }

    /// Whether `field` is legal under `variant`.
    ///
    /// Attributes outside every variant are common to all of them.
    pub fn allows(&self, variant: &str, field: &str) -> bool {
        if !self.scoped_fields().contains(field) {
            return true;
        }
        self.variants
            .iter()
            .any(|(name, fields)| *name == variant && fields.contains(&field))
    }

    /// Read the variant a record selects.
    ///
    /// A known value outside the accepted set is a configuration error.
    pub fn select<'r>(&self, record: &'r Record) -> Result<Selection<'r>, ProviderError> {
        match record.get(self.attribute) {
            Attr::Known(value) => {
                let value = value.as_str().ok_or_else(|| {
                    ProviderError::Configuration(format!("{} must be a string", self.attribute))
                })?;
                if self.variants.iter().any(|(name, _)| *name == value) {
                    Ok(Selection::Variant(value))
                } else {
                    Err(ProviderError::Configuration(format!(
                        "invalid {} '{}': expected one of {}",
                        self.attribute,
                        value,
                        self.values().join(", ")
                    )))
                }
            },
            Attr::Null | Attr::Unknown => Ok(Selection::Unresolved),
        }
    }

    /// Read the variant a record selects, failing if it is unresolved.
    pub fn require<'r>(&self, record: &'r Record) -> Result<&'r str, ProviderError> {
        match self.select(record)? {
            Selection::Variant(v) => Ok(v),
            Selection::Unresolved => Err(ProviderError::Configuration(format!(
                "{} must be set to one of {}",
                self.attribute,
                self.values().join(", ")
            ))),
        }
    }

    /// Attributes of `record` that the selected variant forbids.
    pub fn foreign_fields(&self, variant: &str) -> Vec<&'static str> {
        self.scoped_fields()
            .into_iter()
            .filter(|field| !self.allows(variant, field))
            .collect()
    }

    /// Force every attribute outside the selected variant to `Null`.
    ///
    /// Records whose discriminator is unresolved are left untouched.
    pub fn null_foreign_fields(&self, record: &mut Record) {
        let variant = match record.get_str(self.attribute) {
            Some(v) if self.values().contains(&v) => v.to_string(),
            _ => return,
        };
        for field in self.foreign_fields(&variant) {
            record.set_null(field);
        }
    }
}
