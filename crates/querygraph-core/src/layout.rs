//! Layout configuration and the columnar layout strategy.
//!
//! Each record owns one column. The query node sits on a shared horizontal
//! center line, source tables stack upward from it and target tables stack
//! downward, nearest slot first.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Dimensions, LineageRecord, Position};

/// Named layout constants.
///
/// Missing keys fall back to the defaults when deserialized, so a partial JSON
/// object overrides only what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Distance between adjacent query columns
    pub horizontal_spacing: f64,
    /// Distance between stacked table nodes in one column
    pub vertical_spacing: f64,
    /// Vertical center line shared by all query nodes
    pub base_y: f64,
    /// Lower bound for the bounding box width
    pub min_width: f64,
    /// Lower bound for the bounding box height
    pub min_height: f64,
    /// Extra height reserved per table slot
    pub margin: f64,
    /// Rendered node box width
    pub node_width: f64,
    /// Rendered node box height
    pub node_height: f64,
}

impl LayoutConfig {
    pub const DEFAULT_HORIZONTAL_SPACING: f64 = 400.0;
    pub const DEFAULT_VERTICAL_SPACING: f64 = 100.0;
    pub const DEFAULT_BASE_Y: f64 = 300.0;
    pub const DEFAULT_MIN_WIDTH: f64 = 800.0;
    pub const DEFAULT_MIN_HEIGHT: f64 = 600.0;
    pub const DEFAULT_NODE_WIDTH: f64 = 192.0;
    pub const DEFAULT_NODE_HEIGHT: f64 = 56.0;

    /// Checks that every value is usable by the columnar layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("horizontalSpacing", self.horizontal_spacing),
            ("verticalSpacing", self.vertical_spacing),
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
        ];
        let non_negative = [
            ("minWidth", self.min_width),
            ("minHeight", self.min_height),
            ("margin", self.margin),
        ];

        if !self.base_y.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "baseY",
                value: self.base_y,
            });
        }

        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        Ok(())
    }

    /// Smallest area the view starts with before any batch is loaded.
    pub fn minimum_dimensions(&self) -> Dimensions {
        Dimensions::new(self.min_width, self.min_height)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: Self::DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: Self::DEFAULT_VERTICAL_SPACING,
            base_y: Self::DEFAULT_BASE_Y,
            min_width: Self::DEFAULT_MIN_WIDTH,
            min_height: Self::DEFAULT_MIN_HEIGHT,
            margin: 0.0,
            node_width: Self::DEFAULT_NODE_WIDTH,
            node_height: Self::DEFAULT_NODE_HEIGHT,
        }
    }
}

/// Places nodes for the graph builder.
///
/// `column` is the 1-indexed position of the record in its batch; `slot` is the
/// 0-indexed position of a table within the record's source or target list.
pub trait LayoutStrategy {
    fn query_position(&self, column: usize) -> Position;

    fn source_position(&self, column: usize, slot: usize) -> Position;

    fn target_position(&self, column: usize, slot: usize) -> Position;

    /// Bounding box needed for `records`.
    fn bounds(&self, records: &[LineageRecord]) -> Dimensions;
}

/// Fixed columns, one per record, tables stacked above and below the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnarLayout {
    config: LayoutConfig,
}

impl ColumnarLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    fn column_x(&self, column: usize) -> f64 {
        column as f64 * self.config.horizontal_spacing
    }

    fn slot_offset(&self, slot: usize) -> f64 {
        (slot + 1) as f64 * self.config.vertical_spacing
    }
}

impl LayoutStrategy for ColumnarLayout {
    fn query_position(&self, column: usize) -> Position {
        Position::new(self.column_x(column), self.config.base_y)
    }

    fn source_position(&self, column: usize, slot: usize) -> Position {
        Position::new(
            self.column_x(column),
            self.config.base_y - self.slot_offset(slot),
        )
    }

    fn target_position(&self, column: usize, slot: usize) -> Position {
        Position::new(
            self.column_x(column),
            self.config.base_y + self.slot_offset(slot),
        )
    }

    fn bounds(&self, records: &[LineageRecord]) -> Dimensions {
        let max_tables = records
            .iter()
            .map(LineageRecord::column_depth)
            .max()
            .unwrap_or(0);

        let width = (records.len() as f64 * self.config.horizontal_spacing).max(self.config.min_width);
        let height = (max_tables as f64 * (self.config.vertical_spacing + self.config.margin))
            .max(self.config.min_height);

        Dimensions::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.horizontal_spacing, 400.0);
        assert_eq!(config.vertical_spacing, 100.0);
        assert_eq!(config.base_y, 300.0);
        assert_eq!(config.minimum_dimensions(), Dimensions::new(800.0, 600.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"horizontalSpacing": 250, "margin": 20}"#).unwrap();
        assert_eq!(config.horizontal_spacing, 250.0);
        assert_eq!(config.margin, 20.0);
        assert_eq!(config.vertical_spacing, 100.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_spacing = LayoutConfig {
            horizontal_spacing: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            zero_spacing.validate(),
            Err(ConfigError::NotPositive {
                field: "horizontalSpacing",
                ..
            })
        ));

        let negative_margin = LayoutConfig {
            margin: -1.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            negative_margin.validate(),
            Err(ConfigError::Negative { field: "margin", .. })
        ));

        let nan_base = LayoutConfig {
            base_y: f64::NAN,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            nan_base.validate(),
            Err(ConfigError::NotFinite { field: "baseY", .. })
        ));
    }

    #[test]
    fn test_columnar_positions() {
        let layout = ColumnarLayout::default();
        assert_eq!(layout.query_position(1), Position::new(400.0, 300.0));
        assert_eq!(layout.source_position(2, 0), Position::new(800.0, 200.0));
        assert_eq!(layout.source_position(2, 1), Position::new(800.0, 100.0));
        assert_eq!(layout.target_position(1, 2), Position::new(400.0, 600.0));
    }

    #[test]
    fn test_bounds_respect_minimums() {
        let layout = ColumnarLayout::default();
        assert_eq!(layout.bounds(&[]), Dimensions::new(800.0, 600.0));

        let records: Vec<_> = (0..3)
            .map(|i| LineageRecord::new(i, "SELECT 1"))
            .collect();
        assert_eq!(layout.bounds(&records), Dimensions::new(1200.0, 600.0));
    }

    #[test]
    fn test_bounds_height_uses_tallest_half() {
        let layout = ColumnarLayout::new(LayoutConfig {
            margin: 10.0,
            ..LayoutConfig::default()
        });
        let records = vec![
            LineageRecord::new(1, "q").with_sources((0..8).map(|i| format!("s{i}"))),
            LineageRecord::new(2, "q").with_targets((0..3).map(|i| format!("t{i}"))),
        ];
        assert_eq!(layout.bounds(&records), Dimensions::new(800.0, 880.0));
    }
}
