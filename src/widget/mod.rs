//! The embeddable feedback widget.
//!
//! The widget is exposed as the custom element `<my-widget>`. Its
//! configuration comes from the element's attributes, normalized from
//! `kebab-case` to `camelCase` (`api-base` → `apiBase`), and it renders into
//! an open shadow root with its stylesheet inlined so host pages need not
//! load anything else.

mod element;
mod props;
mod render;

pub use element::{
    is_valid_element_name, mount, ElementDefinition, ElementRegistry, MountHandle, RegistryError,
};
pub use props::{normalize_attribute, WidgetProps, DEFAULT_TITLE};
pub use render::{escape_html, render_host_page};

/// Tag name the widget registers under.
pub const WIDGET_TAG: &str = "my-widget";

/// API base used when the host element doesn't set `api-base`.
pub const DEFAULT_API_BASE: &str = crate::config::API_BASE;

/// Widget styles, inlined into every shadow root.
pub const STYLESHEET: &str = include_str!("../../assets/widget.css");
