//! Dropdown configuration - every non-callback option, loadable from TOML

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Default assumed popover height in rows
///
/// 240 pixels at an assumed 20 pixel row.
pub const DEFAULT_POPOVER_HEIGHT: u16 = 12;

/// Default number of chips shown on a multi-select trigger before "+N"
pub const DEFAULT_MAX_CHIPS: usize = 3;

/// Errors raised while loading or validating a `DropdownConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// TOML was malformed or had wrongly typed fields
    #[error("Invalid dropdown config: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    /// A field held a value the control cannot work with
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Visual skin of the control
///
/// Only `Simple` supports the search field and multi-select; the filter
/// skins are single-select header filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Simple,
    FilterWithIcon,
    Filter,
}

impl Variant {
    /// Whether this skin draws its label inline before the trigger
    pub fn is_filter(&self) -> bool {
        matches!(self, Variant::Filter | Variant::FilterWithIcon)
    }
}

/// Recognized dropdown options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DropdownConfig {
    pub label: Option<String>,
    pub placeholder: String,
    pub variant: Variant,
    pub multi_select: bool,
    pub searchable: bool,
    pub disabled: bool,
    pub show_icon: bool,
    pub show_counts: bool,
    /// Assumed popover height used by placement, in rows
    pub popover_height: u16,
    pub max_chips: usize,
    pub no_results_text: String,
    pub search_placeholder: String,
    pub done_label: String,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        DropdownConfig {
            label: None,
            placeholder: "Select an option".to_string(),
            variant: Variant::Simple,
            multi_select: false,
            searchable: false,
            disabled: false,
            show_icon: true,
            show_counts: false,
            popover_height: DEFAULT_POPOVER_HEIGHT,
            max_chips: DEFAULT_MAX_CHIPS,
            no_results_text: "No results found".to_string(),
            search_placeholder: "Search...".to_string(),
            done_label: "Done".to_string(),
        }
    }
}

impl DropdownConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: DropdownConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.popover_height == 0 {
            return Err(ConfigError::Invalid {
                field: "popover_height",
                reason: "must be at least one row".to_string(),
            });
        }
        if self.max_chips == 0 {
            return Err(ConfigError::Invalid {
                field: "max_chips",
                reason: "must show at least one chip".to_string(),
            });
        }
        Ok(())
    }

    /// Multi-select is only honoured by the simple skin
    pub fn is_multi(&self) -> bool {
        self.multi_select && self.variant == Variant::Simple
    }

    /// Filtering is only honoured by the simple skin
    pub fn filters(&self) -> bool {
        self.searchable && self.variant == Variant::Simple
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_multi_select(mut self, multi: bool) -> Self {
        self.multi_select = multi;
        self
    }

    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_show_icon(mut self, show: bool) -> Self {
        self.show_icon = show;
        self
    }

    pub fn with_show_counts(mut self, show: bool) -> Self {
        self.show_counts = show;
        self
    }

    pub fn with_popover_height(mut self, rows: u16) -> Self {
        self.popover_height = rows;
        self
    }

    pub fn with_max_chips(mut self, chips: usize) -> Self {
        self.max_chips = chips;
        self
    }
}
