//! Application state modules.

mod forms;
mod operation;
mod ui;

pub use forms::{BodyForm, ConfForm};
pub use operation::{OperationKind, OperationState};
pub use ui::{ConfTab, Tab, UiState};
