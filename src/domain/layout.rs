// Layout engine port - owns widget geometry
use super::widget::WidgetId;

/// Position and size of a widget on the grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(col: u32, row: u32, width: u32, height: u32) -> Self {
        Self {
            col,
            row,
            width,
            height,
        }
    }

    /// First column right of the widget
    pub fn right(&self) -> u32 {
        self.col.saturating_add(self.width)
    }

    /// First row below the widget
    pub fn bottom(&self) -> u32 {
        self.row.saturating_add(self.height)
    }

    pub fn overlaps(&self, other: &Geometry) -> bool {
        self.col < other.right()
            && other.col < self.right()
            && self.row < other.bottom()
            && other.row < self.bottom()
    }
}

/// Requested placement; a missing column or row lets the engine pick a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub col: Option<u32>,
    pub row: Option<u32>,
    pub width: u32,
    pub height: u32,
}

/// One entry of the engine's serialized layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub id: WidgetId,
    pub geometry: Geometry,
}

/// Pixel size of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseDimensions {
    pub width: u32,
    pub height: u32,
}

/// Drag/resize/grid-placement engine bound to a dashboard's root container.
///
/// The engine is the single source of truth for widget geometry; widgets
/// query it by id instead of caching positions.
pub trait LayoutEngine: Send + Sync {
    /// Register a widget node at the requested placement and return where it landed
    fn add_widget(&self, id: &WidgetId, placement: Placement) -> Geometry;

    /// Animate out and detach a widget node. Returns false if the id was not laid out.
    fn remove_widget(&self, id: &WidgetId) -> bool;

    fn geometry(&self, id: &WidgetId) -> Option<Geometry>;

    /// Current arrangement in layout order
    fn serialize(&self) -> Vec<LayoutItem>;

    /// Drag gesture
    fn move_widget(&self, id: &WidgetId, col: u32, row: u32) -> Option<Geometry>;

    /// Resize gesture
    fn resize_widget(&self, id: &WidgetId, width: u32, height: u32) -> Option<Geometry>;

    fn resize_widget_dimensions(&self, base: BaseDimensions);

    /// Cell size last set through `resize_widget_dimensions`
    fn base_dimensions(&self) -> Option<BaseDimensions>;

    /// Fix the rendered grid width, used when no widget is laid out
    fn set_grid_width(&self);
}
