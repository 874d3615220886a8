//! UI state for navigation and window visibility.

use solys2tracker_core::Body;

/// Top-level tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Sun,
    Moon,
    Conf,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Sun, Tab::Moon, Tab::Conf];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Sun => "SUN",
            Tab::Moon => "MOON",
            Tab::Conf => "CONF",
        }
    }

    pub fn body(self) -> Option<Body> {
        match self {
            Tab::Sun => Some(Body::Sun),
            Tab::Moon => Some(Body::Moon),
            Tab::Conf => None,
        }
    }
}

/// Sub-tabs of the configuration tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfTab {
    #[default]
    Connection,
    Ephemeris,
    Log,
    Adjust,
}

impl ConfTab {
    pub const ALL: [ConfTab; 4] = [
        ConfTab::Connection,
        ConfTab::Ephemeris,
        ConfTab::Log,
        ConfTab::Adjust,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConfTab::Connection => "Connection",
            ConfTab::Ephemeris => "SPICE",
            ConfTab::Log => "Log",
            ConfTab::Adjust => "Adjust",
        }
    }
}

/// UI panel visibility and toggle state.
#[derive(Default)]
pub struct UiState {
    pub tab: Tab,
    pub conf_tab: ConfTab,
    /// Whether the analysis results window is visible.
    pub show_results: bool,
    /// Whether cross profiles are normalised jointly.
    pub normalize: bool,
    /// Detector shown in the results window.
    pub detector: usize,
}
