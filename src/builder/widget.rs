//! Builder for constructing search widgets.

use crate::builder::error::BuildError;
use crate::config::WidgetConfig;
use crate::geometry::Dimensions;
use crate::widget::SearchWidget;
use std::time::Duration;

/// Largest page the GitHub search API returns.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Builder for constructing search widgets with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct WidgetBuilder {
    config: WidgetConfig,
}

impl WidgetBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(Self {
            config: WidgetConfig::from_json(json)?,
        })
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn debounce(mut self, quiet: Duration) -> Self {
        self.config.timings.debounce_ms = quiet.as_millis() as u64;
        self
    }

    pub fn dialog_duration(mut self, duration: Duration) -> Self {
        self.config.timings.dialog_ms = duration.as_millis() as u64;
        self
    }

    pub fn grace(mut self, grace: Duration) -> Self {
        self.config.timings.grace_ms = grace.as_millis() as u64;
        self
    }

    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.search.page_size = page_size;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.search.endpoint = endpoint.into();
        self
    }

    /// Validate the configuration without building.
    pub fn validate(&self) -> Result<(), BuildError> {
        let dims = &self.config.dimensions;
        if dims.input_height.is_nan() || dims.input_height <= 0.0 {
            return Err(BuildError::InvalidInputHeight(dims.input_height));
        }
        if !(dims.row_height >= 0.0 && dims.row_border >= 0.0) {
            return Err(BuildError::InvalidRowGeometry);
        }
        if dims.max_visible_rows == 0 {
            return Err(BuildError::NoVisibleRows);
        }
        if self.config.timings.dialog_ms == 0 {
            return Err(BuildError::ZeroDialogDuration);
        }

        let search = &self.config.search;
        if search.page_size == 0 || search.page_size > MAX_PAGE_SIZE {
            return Err(BuildError::InvalidPageSize {
                found: search.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        if search.endpoint.trim().is_empty() {
            return Err(BuildError::MissingEndpoint);
        }
        Ok(())
    }

    /// Build the widget.
    /// Returns an error if the configuration is inconsistent.
    pub fn build(self) -> Result<SearchWidget, BuildError> {
        self.validate()?;
        Ok(SearchWidget::new(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let widget = WidgetBuilder::new().build().unwrap();
        assert_eq!(widget.config(), &WidgetConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let widget = WidgetBuilder::new()
            .debounce(Duration::from_millis(150))
            .grace(Duration::from_millis(50))
            .page_size(5)
            .build()
            .unwrap();

        assert_eq!(widget.config().timings.debounce_ms, 150);
        assert_eq!(widget.config().timings.grace_ms, 50);
        assert_eq!(widget.config().search.page_size, 5);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let flat = WidgetBuilder::new().dimensions(Dimensions {
            input_height: 0.0,
            ..Dimensions::default()
        });
        assert!(matches!(flat.build(), Err(BuildError::InvalidInputHeight(_))));

        let rowless = WidgetBuilder::new().dimensions(Dimensions {
            max_visible_rows: 0,
            ..Dimensions::default()
        });
        assert!(matches!(rowless.build(), Err(BuildError::NoVisibleRows)));

        let negative = WidgetBuilder::new().dimensions(Dimensions {
            row_border: -1.0,
            ..Dimensions::default()
        });
        assert!(matches!(negative.build(), Err(BuildError::InvalidRowGeometry)));
    }

    #[test]
    fn rejects_bad_search_settings() {
        assert!(matches!(
            WidgetBuilder::new().page_size(0).build(),
            Err(BuildError::InvalidPageSize { found: 0, .. })
        ));
        assert!(matches!(
            WidgetBuilder::new().page_size(101).build(),
            Err(BuildError::InvalidPageSize { found: 101, .. })
        ));
        assert!(matches!(
            WidgetBuilder::new().endpoint("  ").build(),
            Err(BuildError::MissingEndpoint)
        ));
        assert!(matches!(
            WidgetBuilder::new().dialog_duration(Duration::ZERO).build(),
            Err(BuildError::ZeroDialogDuration)
        ));
    }

    #[test]
    fn parses_json_config() {
        let builder = WidgetBuilder::from_json(r#"{"timings": {"graceMs": 10}}"#).unwrap();
        assert_eq!(builder.build().unwrap().config().timings.grace_ms, 10);

        assert!(matches!(
            WidgetBuilder::from_json("not json"),
            Err(BuildError::InvalidConfig(_))
        ));
    }
}
