// Widget factory - builds widgets bound to a dashboard's layout
use crate::domain::dashboard::DashboardId;
use crate::domain::layout::LayoutEngine;
use crate::domain::widget::{Widget, WidgetData, WidgetId};
use crate::infrastructure::config::fill_template;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct WidgetFactory {
    dashboard_id: DashboardId,
    content_url: String,
    configure_url: String,
    layout: Arc<dyn LayoutEngine>,
}

impl WidgetFactory {
    /// `content_url` and `configure_url` are templates over `${dashboard}` and `${widget}`
    pub fn new(
        dashboard_id: DashboardId,
        content_url: String,
        configure_url: String,
        layout: Arc<dyn LayoutEngine>,
    ) -> Self {
        Self {
            dashboard_id,
            content_url,
            configure_url,
            layout,
        }
    }

    pub fn build(&self, id: WidgetId, data: WidgetData) -> Widget {
        let (url, external) = match data.url {
            Some(url) if !url.is_empty() => (url, true),
            _ => (self.content_url(&id), false),
        };
        Widget::new(id, data.type_id, data.title, url, external, self.layout.clone())
    }

    /// Internally rendered content location of a widget
    pub fn content_url(&self, widget: &WidgetId) -> String {
        fill_template(&self.content_url, &self.vars(widget))
    }

    /// Location of the configuration dialog of a widget
    pub fn configure_url(&self, widget: &WidgetId) -> String {
        fill_template(&self.configure_url, &self.vars(widget))
    }

    fn vars(&self, widget: &WidgetId) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert(
            "dashboard".to_string(),
            urlencoding::encode(self.dashboard_id.as_str()).into_owned(),
        );
        vars.insert(
            "widget".to_string(),
            urlencoding::encode(widget.as_str()).into_owned(),
        );
        vars
    }
}
