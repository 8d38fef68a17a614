//! Campaign planning: input handling, the scenario generator, run state,
//! and the session that ties them together.

pub mod customers;
pub mod generator;
pub mod session;
pub mod state_machine;
pub mod visibility;

pub use customers::CustomerDirectory;
pub use generator::ScenarioGenerator;
pub use session::{plan_once, PlannerSession};
pub use state_machine::{reduce, PlannerEvent, PlannerState, RunTicket};
pub use visibility::{ChartVisibility, SeriesKind};
