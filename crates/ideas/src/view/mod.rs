pub mod controller;
pub mod dashboard;
pub mod pipeline;
pub mod state;

pub use controller::ViewController;
pub use dashboard::{summarize, DashboardSummary};
pub use pipeline::{derive, ListPage, ListQuery, PAGE_SIZE};
pub use state::{Screen, ViewEvent, ViewState};
