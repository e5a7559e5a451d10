pub mod evaluation;
pub mod poller;
pub mod store;

pub use evaluation::{evaluate, Evaluation, EvaluationContext, EvaluationInput};
pub use poller::Dashboard;
pub use store::{DashboardEvent, DashboardStore};
