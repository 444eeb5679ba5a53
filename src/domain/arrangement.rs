// Arrangement domain model - the persisted grid positions of a dashboard
use super::layout::LayoutItem;
use super::widget::WidgetId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangementEntry {
    #[serde(rename = "widgetId")]
    pub widget_id: WidgetId,
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

impl From<LayoutItem> for ArrangementEntry {
    fn from(item: LayoutItem) -> Self {
        Self {
            widget_id: item.id,
            col: item.geometry.col,
            row: item.geometry.row,
            width: item.geometry.width,
            height: item.geometry.height,
        }
    }
}

/// Full set of widget positions; saving it overwrites the stored arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arrangement(Vec<ArrangementEntry>);

impl Arrangement {
    pub fn entries(&self) -> &[ArrangementEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

impl FromIterator<LayoutItem> for Arrangement {
    fn from_iter<I: IntoIterator<Item = LayoutItem>>(iter: I) -> Self {
        Self(iter.into_iter().map(ArrangementEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::Geometry;

    #[test]
    fn test_json_field_names() {
        let arrangement: Arrangement = vec![
            LayoutItem {
                id: WidgetId::new("w1"),
                geometry: Geometry::new(0, 0, 2, 2),
            },
            LayoutItem {
                id: WidgetId::new("w2"),
                geometry: Geometry::new(2, 0, 1, 1),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(
            arrangement.to_json().unwrap(),
            r#"[{"widgetId":"w1","col":0,"row":0,"width":2,"height":2},{"widgetId":"w2","col":2,"row":0,"width":1,"height":1}]"#
        );
    }
}
