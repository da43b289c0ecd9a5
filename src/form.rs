use crate::error::MaskError;
use crate::mask::MaskEngine;
use crate::options::{DEFAULT_MASK_CHAR, MaskOptions};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// One input of a form declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldDeclaration {
    pub name: String,
    pub mask: Option<String>,
    /// Missing or empty keeps the default fill character.
    pub mask_char: Option<String>,
    pub always_show_mask: bool,
    pub value: Option<String>,
}

impl FieldDeclaration {
    fn options(&self) -> Option<MaskOptions> {
        let mask = self.mask.as_deref().filter(|mask| !mask.is_empty())?;
        let mask_char = self
            .mask_char
            .as_deref()
            .and_then(|raw| raw.chars().next())
            .unwrap_or(DEFAULT_MASK_CHAR);
        let mut options = MaskOptions::new(mask)
            .with_mask_char(Some(mask_char))
            .with_always_show_mask(self.always_show_mask);
        options.value = self.value.clone();
        Some(options)
    }
}

/// Masked inputs of a form, keyed by field name in declaration order.
#[derive(Debug, Default)]
pub struct FormMasks {
    fields: IndexMap<String, MaskEngine>,
}

impl FormMasks {
    /// Attaches an engine to every declared field that carries a mask.
    pub fn attach(declarations: &[FieldDeclaration]) -> Result<Self, MaskError> {
        let mut fields = IndexMap::new();
        for declaration in declarations {
            let Some(options) = declaration.options() else {
                log::debug!("Field '{}' has no mask, skipping", declaration.name);
                continue;
            };
            fields.insert(declaration.name.clone(), MaskEngine::new(options)?);
        }
        Ok(Self { fields })
    }

    pub fn from_yaml(source: &str) -> Result<Self, MaskError> {
        let declarations: Vec<FieldDeclaration> = serde_yaml::from_str(source)?;
        Self::attach(&declarations)
    }

    pub fn from_json(source: &str) -> Result<Self, MaskError> {
        let declarations: Vec<FieldDeclaration> = serde_json::from_str(source)?;
        Self::attach(&declarations)
    }

    pub fn load(path: &Path) -> Result<Self, MaskError> {
        let source = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&source)
        } else {
            Self::from_yaml(&source)
        }
    }

    pub fn get(&self, name: &str) -> Option<&MaskEngine> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MaskEngine> {
        self.fields.get_mut(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_engines(self) -> IndexMap<String, MaskEngine> {
        self.fields
    }
}
