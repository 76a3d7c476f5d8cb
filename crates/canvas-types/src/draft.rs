//! The NFT under construction.

use crate::types::{Attribute, NftMetadata};

/// In-progress NFT fields for the creation wizard.
///
/// Single-owner mutable context: the wizard that mounts it is the only
/// writer, and it is dropped when the wizard completes or is abandoned.
/// Setters mutate exactly one field; `full_details()` is an immutable
/// snapshot taken before any network operation.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    name: String,
    description: String,
    image: String,
    fallback_image: String,
    attributes: Vec<Attribute>,
    external_link: Option<String>,
    token_id: Option<u64>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_image(&mut self, uri: impl Into<String>) {
        self.image = uri.into();
    }

    pub fn set_fallback_image(&mut self, uri: impl Into<String>) {
        self.fallback_image = uri.into();
    }

    pub fn set_attributes(&mut self, attributes: Vec<Attribute>) {
        self.attributes = attributes;
    }

    pub fn set_external_link(&mut self, link: impl Into<String>) {
        self.external_link = Some(link.into());
    }

    /// Set once the mint receipt has been parsed.
    pub fn set_token_id(&mut self, id: u64) {
        self.token_id = Some(id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn token_id(&self) -> Option<u64> {
        self.token_id
    }

    /// Immutable snapshot of the metadata fields at call time.
    pub fn full_details(&self) -> NftMetadata {
        NftMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            fallback_image: self.fallback_image.clone(),
            attributes: self.attributes.clone(),
            external_link: self.external_link.clone(),
        }
    }

    /// Required fields that are still empty, in display order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        if self.image.is_empty() {
            missing.push("image");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_reports_empty_fields() {
        let mut draft = Draft::new();
        assert_eq!(draft.missing_required(), vec!["name", "description", "image"]);

        draft.set_name("Dusk");
        draft.set_image("ipfs://QmImg");
        assert_eq!(draft.missing_required(), vec!["description"]);

        draft.set_description("Generative dusk study");
        assert!(draft.missing_required().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let mut draft = Draft::new();
        draft.set_name("Dusk");
        draft.set_description("v1");
        draft.set_image("ipfs://QmImg");

        let snapshot = draft.full_details();
        draft.set_description("v2");

        assert_eq!(snapshot.description, "v1");
        assert_eq!(draft.full_details().description, "v2");
    }

    #[test]
    fn setters_touch_exactly_one_field() {
        let mut draft = Draft::new();
        draft.set_name("Dusk");
        draft.set_external_link("https://example.com");

        let details = draft.full_details();
        assert_eq!(details.name, "Dusk");
        assert_eq!(details.description, "");
        assert_eq!(details.external_link.as_deref(), Some("https://example.com"));
        assert_eq!(draft.token_id(), None);
    }
}
