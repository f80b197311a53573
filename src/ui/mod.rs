pub mod chart;
pub mod layout;
pub mod search;
pub mod statusbar;

pub use chart::ChartView;
pub use layout::LayoutManager;
pub use search::SearchBar;
pub use statusbar::StatusBar;
