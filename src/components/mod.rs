//! Built-in UI components

pub mod dropdown;
pub mod search_field;

pub use dropdown::{
    Dropdown, NoResultsCause, Placement, Projection, Resolved, RowTarget, Selection,
    SelectionMode, VisibleOptions,
};
pub use search_field::{FieldEdit, SearchField};
