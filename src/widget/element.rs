use std::collections::HashMap;

use thiserror::Error;

use crate::models::Feedback;

use super::render::{escape_html, is_safe_attribute, render_widget};
use super::{WidgetProps, STYLESHEET, WIDGET_TAG};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("\"{0}\" is not a valid custom element name")]
    InvalidName(String),

    #[error("no custom element named \"{0}\" has been defined")]
    Undefined(String),
}

/// What a registered custom element renders with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDefinition {
    pub tag: String,
    /// Injected inline into every shadow root so host pages need not load it.
    pub stylesheet: &'static str,
}

impl ElementDefinition {
    /// The feedback widget, `<my-widget>`.
    pub fn widget() -> Self {
        Self {
            tag: WIDGET_TAG.to_string(),
            stylesheet: STYLESHEET,
        }
    }
}

/// Custom element names must start with a lowercase ASCII letter, contain a
/// hyphen, and may not contain uppercase letters.
///
/// Only the ASCII subset of the rule is accepted: names with non-ASCII
/// characters (`my-wïdget`) are valid in browsers but rejected here.
pub fn is_valid_element_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.contains('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'))
}

/// Tag name → definition, one definition per tag for the lifetime of the
/// registry.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    definitions: HashMap<String, ElementDefinition>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition` under its tag.
    ///
    /// Returns `Ok(false)` without touching the registry when the tag is
    /// already defined.
    pub fn define(&mut self, definition: ElementDefinition) -> Result<bool, RegistryError> {
        if !is_valid_element_name(&definition.tag) {
            return Err(RegistryError::InvalidName(definition.tag));
        }
        if self.definitions.contains_key(&definition.tag) {
            tracing::debug!(tag = %definition.tag, "custom element already defined, skipping");
            return Ok(false);
        }

        tracing::debug!(tag = %definition.tag, "defined custom element");
        self.definitions.insert(definition.tag.clone(), definition);
        Ok(true)
    }

    pub fn get(&self, tag: &str) -> Option<&ElementDefinition> {
        self.definitions.get(tag)
    }

    /// Mount a new instance of a registered element.
    pub fn mount<I, K, V>(&self, tag: &str, attributes: I) -> Result<MountHandle, RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let definition = self
            .get(tag)
            .ok_or_else(|| RegistryError::Undefined(tag.to_string()))?;
        Ok(mount(definition, attributes))
    }
}

/// Attach a widget to a fresh host element carrying `attributes`.
pub fn mount<I, K, V>(definition: &ElementDefinition, attributes: I) -> MountHandle
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let attributes: Vec<(String, String)> = attributes
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, v)| is_safe_attribute(k, v))
        .collect();
    let props = WidgetProps::from_attributes(attributes.iter().map(|(k, v)| (k, v.clone())));

    MountHandle {
        tag: definition.tag.clone(),
        stylesheet: definition.stylesheet,
        attributes,
        props,
        shadow: Some(String::new()),
    }
}

/// A mounted widget instance.
///
/// Owns its shadow root contents until [`MountHandle::unmount`] is called;
/// after that only the bare host element is rendered.
#[derive(Debug, Clone)]
pub struct MountHandle {
    tag: String,
    stylesheet: &'static str,
    attributes: Vec<(String, String)>,
    props: WidgetProps,
    shadow: Option<String>,
}

impl MountHandle {
    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn is_mounted(&self) -> bool {
        self.shadow.is_some()
    }

    /// Re-render the shadow root with the given feedback.
    pub fn render(&mut self, feedbacks: &[Feedback]) {
        if let Some(shadow) = self.shadow.as_mut() {
            *shadow = format!(
                "<style>{}</style>{}",
                self.stylesheet,
                render_widget(&self.props, feedbacks)
            );
        }
    }

    pub fn unmount(&mut self) {
        if self.shadow.take().is_some() {
            tracing::debug!(tag = %self.tag, "unmounted custom element");
        }
    }

    /// Serialize the host element, with its shadow root as a declarative
    /// `<template shadowrootmode="open">`.
    pub fn to_html(&self) -> String {
        let mut html = format!("<{}", self.tag);
        for (name, value) in &self.attributes {
            html.push_str(&format!(r#" {}="{}""#, name, escape_html(value)));
        }
        html.push('>');

        if let Some(shadow) = &self.shadow {
            html.push_str(r#"<template shadowrootmode="open">"#);
            html.push_str(shadow);
            html.push_str("</template>");
        }

        html.push_str(&format!("</{}>", self.tag));
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::DEFAULT_API_BASE;

    #[test]
    fn ascii_names_only() {
        assert!(is_valid_element_name("my-widget"));
        assert!(!is_valid_element_name("my-wïdget"));
    }

    #[test]
    fn rejects_invalid_names() {
        let mut registry = ElementRegistry::new();
        for tag in ["widget", "My-widget", "1-widget", "my-Widget", ""] {
            let definition = ElementDefinition {
                tag: tag.to_string(),
                stylesheet: "",
            };
            assert_eq!(
                registry.define(definition),
                Err(RegistryError::InvalidName(tag.to_string()))
            );
        }
    }

    #[test]
    fn redefinition_keeps_original() {
        let mut registry = ElementRegistry::new();
        assert_eq!(registry.define(ElementDefinition::widget()), Ok(true));

        let impostor = ElementDefinition {
            tag: WIDGET_TAG.to_string(),
            stylesheet: "body { display: none }",
        };
        assert_eq!(registry.define(impostor), Ok(false));
        assert_eq!(registry.get(WIDGET_TAG), Some(&ElementDefinition::widget()));
    }

    #[test]
    fn mounting_undefined_tag_fails() {
        let registry = ElementRegistry::new();
        let err = registry
            .mount(WIDGET_TAG, Vec::<(String, String)>::new())
            .unwrap_err();
        assert_eq!(err, RegistryError::Undefined(WIDGET_TAG.to_string()));
    }

    #[test]
    fn stylesheet_lives_inside_shadow_root() {
        let mut handle = mount(&ElementDefinition::widget(), [("api-base", "/x")]);
        handle.render(&[]);

        let html = handle.to_html();
        let template = html.find(r#"<template shadowrootmode="open">"#).unwrap();
        let style = html.find("<style>").unwrap();
        assert!(html.starts_with(r#"<my-widget api-base="/x">"#));
        assert!(template < style);
        assert!(html.contains(STYLESHEET));
        assert!(html.ends_with("</template></my-widget>"));
    }

    #[test]
    fn unmount_clears_shadow_root() {
        let mut handle = mount(&ElementDefinition::widget(), Vec::<(String, String)>::new());
        handle.render(&[]);
        assert!(handle.is_mounted());

        handle.unmount();
        assert!(!handle.is_mounted());
        assert_eq!(handle.to_html(), "<my-widget></my-widget>");

        handle.render(&[]);
        assert_eq!(handle.to_html(), "<my-widget></my-widget>");
    }

    #[test]
    fn event_handlers_and_script_urls_are_dropped() {
        let handle = mount(
            &ElementDefinition::widget(),
            [
                ("onmouseover", "alert(document.cookie)"),
                ("api-base", "javascript:alert(1)"),
                ("style", "display:none"),
                ("title", "Hi"),
            ],
        );
        let html = handle.to_html();

        assert!(html.starts_with(r#"<my-widget title="Hi">"#));
        assert!(!html.contains("onmouseover"));
        assert!(!html.contains("javascript:"));
        assert_eq!(handle.props().api_base(), DEFAULT_API_BASE);
    }

    #[test]
    fn unsafe_attribute_names_are_dropped() {
        let handle = mount(
            &ElementDefinition::widget(),
            [("onload=\"x\"", "1"), ("theme", "\"dark\"")],
        );
        assert_eq!(
            handle.to_html().split('>').next(),
            Some(r#"<my-widget theme="&quot;dark&quot;""#)
        );
    }
}
