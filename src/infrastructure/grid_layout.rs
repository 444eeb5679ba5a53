// In-memory grid layout engine
use crate::domain::layout::{BaseDimensions, Geometry, LayoutEngine, LayoutItem, Placement};
use crate::domain::widget::WidgetId;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Largest row number and height a widget may have.
pub const MAX_ROW: u32 = 1_000;

/// Fixed-column grid.
///
/// Free slots are searched from column 1, row 1. Explicit positions are kept
/// as given, so arrangements persisted with column or row 0 load unchanged,
/// but the column keeps the widget inside the grid and rows are capped at [`MAX_ROW`].
/// A missing column or row is filled with the first free slot, scanning rows
/// top-down, then columns left-right.
pub struct GridLayout {
    columns: u32,
    state: Mutex<GridState>,
}

#[derive(Default)]
struct GridState {
    items: Vec<LayoutItem>,
    base: Option<BaseDimensions>,
    grid_width_fixes: usize,
}

impl GridLayout {
    pub fn new(columns: u32) -> Self {
        Self {
            columns: columns.max(1),
            state: Mutex::new(GridState::default()),
        }
    }

    /// How often the grid width was fixed for an empty dashboard
    #[cfg(test)]
    pub fn grid_width_fixes(&self) -> usize {
        self.state().grid_width_fixes
    }

    fn state(&self) -> MutexGuard<'_, GridState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clamp_width(&self, width: u32) -> u32 {
        width.clamp(1, self.columns)
    }

    /// Keep a widget of the given width inside the grid's columns
    fn clamp_col(&self, col: u32, width: u32) -> u32 {
        col.min(self.columns - width + 1)
    }

    fn bounded(&self, geometry: Geometry) -> Geometry {
        let width = self.clamp_width(geometry.width);
        let bounded = Geometry::new(
            self.clamp_col(geometry.col, width),
            geometry.row.min(MAX_ROW),
            width,
            geometry.height.clamp(1, MAX_ROW),
        );
        if bounded != geometry {
            tracing::debug!("Clamped {:?} to {:?}", geometry, bounded);
        }
        bounded
    }

    fn find_slot(items: &[LayoutItem], columns: u32, placement: Placement) -> Geometry {
        // A first free slot starts the grid or sits right below another widget
        let mut rows: Vec<u32> = match placement.row {
            Some(row) => vec![row],
            None => std::iter::once(1)
                .chain(items.iter().map(|item| item.geometry.bottom()))
                .filter(|row| *row <= MAX_ROW)
                .collect(),
        };
        rows.sort_unstable();
        rows.dedup();
        let cols = match placement.col {
            Some(col) => col..=col,
            None => 1..=columns - placement.width + 1,
        };

        for row in rows {
            for col in cols.clone() {
                let candidate = Geometry::new(col, row, placement.width, placement.height);
                if !items.iter().any(|item| item.geometry.overlaps(&candidate)) {
                    return candidate;
                }
            }
        }

        let bottom = items
            .iter()
            .map(|item| item.geometry.bottom())
            .max()
            .unwrap_or(1);
        Geometry::new(
            placement.col.unwrap_or(1),
            placement.row.unwrap_or(bottom).min(MAX_ROW),
            placement.width,
            placement.height,
        )
    }
}

impl LayoutEngine for GridLayout {
    fn add_widget(&self, id: &WidgetId, placement: Placement) -> Geometry {
        let width = self.clamp_width(placement.width);
        let placement = Placement {
            col: placement.col.map(|col| self.clamp_col(col, width)),
            row: placement.row.map(|row| row.min(MAX_ROW)),
            width,
            height: placement.height.clamp(1, MAX_ROW),
        };

        let mut state = self.state();
        state.items.retain(|item| &item.id != id);
        let geometry = match (placement.col, placement.row) {
            (Some(col), Some(row)) => Geometry::new(col, row, placement.width, placement.height),
            _ => Self::find_slot(&state.items, self.columns, placement),
        };
        state.items.push(LayoutItem {
            id: id.clone(),
            geometry,
        });
        geometry
    }

    fn remove_widget(&self, id: &WidgetId) -> bool {
        let mut state = self.state();
        let before = state.items.len();
        state.items.retain(|item| &item.id != id);
        state.items.len() != before
    }

    fn geometry(&self, id: &WidgetId) -> Option<Geometry> {
        self.state()
            .items
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.geometry)
    }

    fn serialize(&self) -> Vec<LayoutItem> {
        self.state().items.clone()
    }

    fn move_widget(&self, id: &WidgetId, col: u32, row: u32) -> Option<Geometry> {
        let mut state = self.state();
        let item = state.items.iter_mut().find(|item| &item.id == id)?;
        item.geometry = self.bounded(Geometry { col, row, ..item.geometry });
        Some(item.geometry)
    }

    fn resize_widget(&self, id: &WidgetId, width: u32, height: u32) -> Option<Geometry> {
        let mut state = self.state();
        let item = state.items.iter_mut().find(|item| &item.id == id)?;
        item.geometry = self.bounded(Geometry {
            width,
            height,
            ..item.geometry
        });
        Some(item.geometry)
    }

    fn resize_widget_dimensions(&self, base: BaseDimensions) {
        tracing::debug!("Grid cells resized to {}x{}", base.width, base.height);
        self.state().base = Some(base);
    }

    fn base_dimensions(&self) -> Option<BaseDimensions> {
        self.state().base
    }

    fn set_grid_width(&self) {
        let mut state = self.state();
        state.grid_width_fixes += 1;
        tracing::debug!("Grid width fixed for an empty grid ({} times)", state.grid_width_fixes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(col: Option<u32>, row: Option<u32>, width: u32, height: u32) -> Placement {
        Placement {
            col,
            row,
            width,
            height,
        }
    }

    #[test]
    fn test_explicit_placement_is_kept() {
        let grid = GridLayout::new(4);
        let id = WidgetId::new("w1");
        let geometry = grid.add_widget(&id, place(Some(2), Some(3), 2, 1));
        assert_eq!(geometry, Geometry::new(2, 3, 2, 1));
        assert_eq!(grid.geometry(&id), Some(geometry));
    }

    #[test]
    fn test_missing_position_takes_first_free_slot() {
        let grid = GridLayout::new(4);
        grid.add_widget(&WidgetId::new("a"), place(Some(1), Some(1), 2, 2));
        grid.add_widget(&WidgetId::new("b"), place(Some(3), Some(1), 1, 1));

        let next = grid.add_widget(&WidgetId::new("c"), place(None, None, 1, 1));
        assert_eq!(next, Geometry::new(4, 1, 1, 1));

        let wide = grid.add_widget(&WidgetId::new("d"), place(None, None, 4, 1));
        assert_eq!(wide, Geometry::new(1, 3, 4, 1));
    }

    #[test]
    fn test_width_is_clamped_to_columns() {
        let grid = GridLayout::new(4);
        let geometry = grid.add_widget(&WidgetId::new("a"), place(Some(1), Some(1), 9, 2));
        assert_eq!(geometry.width, 4);
        assert_eq!(
            grid.resize_widget(&WidgetId::new("a"), 6, 3),
            Some(Geometry::new(1, 1, 4, 3))
        );
    }

    #[test]
    fn test_widgets_far_down_do_not_overflow_the_scan() {
        let grid = GridLayout::new(4);
        let a = WidgetId::new("a");
        grid.add_widget(&a, place(Some(1), Some(1), 4, 1));
        assert_eq!(
            grid.move_widget(&a, 1, u32::MAX - 1),
            Some(Geometry::new(1, MAX_ROW, 4, 1))
        );

        let next = grid.add_widget(&WidgetId::new("b"), place(None, None, 4, 4));
        assert_eq!(next, Geometry::new(1, 1, 4, 4));
        let below = grid.add_widget(&WidgetId::new("c"), place(None, None, 4, 1));
        assert_eq!(below, Geometry::new(1, 5, 4, 1));
    }

    #[test]
    fn test_explicit_positions_are_kept_inside_the_grid() {
        let grid = GridLayout::new(4);
        let origin = grid.add_widget(&WidgetId::new("w1"), place(Some(0), Some(0), 2, 2));
        assert_eq!(origin, Geometry::new(0, 0, 2, 2));

        let id = WidgetId::new("w2");
        let clamped = grid.add_widget(&id, place(Some(9), Some(u32::MAX), 2, u32::MAX));
        assert_eq!(clamped, Geometry::new(3, MAX_ROW, 2, MAX_ROW));
        assert_eq!(
            grid.move_widget(&id, 4, 2),
            Some(Geometry::new(3, 2, 2, MAX_ROW))
        );
        assert_eq!(grid.resize_widget(&id, 1, 1), Some(Geometry::new(3, 2, 1, 1)));
    }

    #[test]
    fn test_full_grid_falls_back_below_the_lowest_widget() {
        let grid = GridLayout::new(1);
        grid.add_widget(&WidgetId::new("a"), place(Some(1), Some(1), 1, MAX_ROW));
        let next = grid.add_widget(&WidgetId::new("b"), place(None, None, 1, 1));
        assert_eq!(next, Geometry::new(1, MAX_ROW, 1, 1));
    }

    #[test]
    fn test_serialize_keeps_insertion_order() {
        let grid = GridLayout::new(4);
        grid.add_widget(&WidgetId::new("w2"), place(Some(2), Some(1), 1, 1));
        grid.add_widget(&WidgetId::new("w1"), place(Some(1), Some(1), 1, 1));
        let ids: Vec<String> = grid.serialize().into_iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["w2", "w1"]);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let grid = GridLayout::new(4);
        let id = WidgetId::new("ghost");
        assert!(!grid.remove_widget(&id));
        assert_eq!(grid.move_widget(&id, 1, 1), None);
        assert_eq!(grid.resize_widget(&id, 1, 1), None);
    }

    #[test]
    fn test_remove_detaches() {
        let grid = GridLayout::new(4);
        let id = WidgetId::new("a");
        grid.add_widget(&id, place(Some(1), Some(1), 1, 1));
        assert!(grid.remove_widget(&id));
        assert!(grid.serialize().is_empty());
    }

    #[test]
    fn test_dimensions_are_recorded() {
        let grid = GridLayout::new(4);
        assert_eq!(grid.base_dimensions(), None);
        grid.resize_widget_dimensions(BaseDimensions {
            width: 300,
            height: 230,
        });
        grid.set_grid_width();
        assert_eq!(
            grid.base_dimensions(),
            Some(BaseDimensions {
                width: 300,
                height: 230,
            })
        );
        assert_eq!(grid.grid_width_fixes(), 1);
    }
}
