//! UI rendering modules.
//!
//! - `top_bar`: branding, tab selection and connection indicator
//! - `body_tab`: Sun and Moon tabs with the operation forms
//! - `conf_tab`: connection, SPICE, log and adjustment settings
//! - `results_window`: plots of the last capture analysis
//! - `status_bar`: status line, sweep progress and event log

mod body_tab;
mod conf_tab;
mod results_window;
mod status_bar;
pub mod theme;
mod top_bar;
