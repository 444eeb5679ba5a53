// Widget domain model
use super::layout::{Geometry, LayoutEngine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Server-assigned identifier of a widget, unique within its dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Information about a widget as supplied by the page or the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetData {
    /// Absent until the server confirms creation
    #[serde(default)]
    pub id: Option<WidgetId>,
    pub type_id: String,
    pub title: String,
    /// Externally hosted content location; internal widgets leave this empty
    #[serde(default)]
    pub url: Option<String>,
}

impl WidgetData {
    pub fn new(type_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            type_id: type_id.into(),
            title: title.into(),
            url: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<WidgetId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Initial coordinates of a widget on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coords {
    #[serde(default)]
    pub col: Option<u32>,
    #[serde(default)]
    pub row: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Coords {
    #[cfg(test)]
    pub fn at(col: u32, row: u32) -> Self {
        Self {
            col: Some(col),
            row: Some(row),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn sized(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Rendered panel of a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetNode {
    pub data_id: String,
    pub data_type_id: String,
    pub frame_name: String,
    pub frame_src: String,
    /// Source recorded at construction, restored by a refresh without url
    pub recorded_src: String,
    pub title_text: String,
    pub lock_visible: bool,
    pub highlighted: bool,
}

impl WidgetNode {
    fn new(id: &WidgetId, type_id: &str, title: &str, url: &str, external: bool) -> Self {
        Self {
            data_id: id.to_string(),
            data_type_id: type_id.to_string(),
            frame_name: id.to_string(),
            frame_src: url.to_string(),
            recorded_src: url.to_string(),
            title_text: title.to_string(),
            lock_visible: !external,
            highlighted: false,
        }
    }

    /// Render the node into markup using a template with `${id}`, `${type_id}`,
    /// `${title}`, `${src}` and `${lock}` placeholders.
    pub fn render(&self, template: &str) -> String {
        let lock = if self.lock_visible {
            String::new()
        } else {
            " hidden".to_string()
        };
        let vars = HashMap::from([
            ("id", escape_html(&self.data_id)),
            ("type_id", escape_html(&self.data_type_id)),
            ("title", escape_html(&self.title_text)),
            ("src", escape_html(&self.frame_src)),
            ("lock", lock),
        ]);

        let mut markup = template.trim().to_string();
        for (key, value) in vars {
            markup = markup.replace(&format!("${{{}}}", key), &value);
        }
        markup
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Client-side representation of one grid panel.
///
/// Geometry is not stored here: the accessors read the layout engine live.
#[derive(Clone)]
pub struct Widget {
    id: WidgetId,
    type_id: String,
    url: String,
    node: WidgetNode,
    layout: Arc<dyn LayoutEngine>,
}

impl Widget {
    /// `external` hides the lock indicator for content hosted outside the server
    pub fn new(
        id: WidgetId,
        type_id: String,
        title: String,
        url: String,
        external: bool,
        layout: Arc<dyn LayoutEngine>,
    ) -> Self {
        let node = WidgetNode::new(&id, &type_id, &title, &url, external);
        Self {
            id,
            type_id,
            url,
            node,
            layout,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.node.title_text
    }

    pub fn node(&self) -> &WidgetNode {
        &self.node
    }

    pub fn is_external(&self) -> bool {
        !self.node.lock_visible
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.layout.geometry(&self.id)
    }

    /// Number of columns the widget spans
    pub fn width(&self) -> Option<u32> {
        self.geometry().map(|g| g.width)
    }

    /// Number of rows the widget spans
    pub fn height(&self) -> Option<u32> {
        self.geometry().map(|g| g.height)
    }

    pub fn row(&self) -> Option<u32> {
        self.geometry().map(|g| g.row)
    }

    pub fn column(&self) -> Option<u32> {
        self.geometry().map(|g| g.col)
    }

    /// Reload the content from `url`, or from the recorded source if none is given
    pub fn refresh(&mut self, url: Option<&str>) {
        self.node.frame_src = match url {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.node.recorded_src.clone(),
        };
    }

    pub fn set_title(&mut self, value: &str) {
        self.node.title_text = value.to_string();
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.node.highlighted = highlighted;
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("type_id", &self.type_id)
            .field("url", &self.url)
            .field("node", &self.node)
            .finish()
    }
}
