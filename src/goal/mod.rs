pub mod expected_path;
pub mod savings_goal;

pub use expected_path::{ExpectedPath, ProgressReport};
pub use savings_goal::{default_target_date, GoalPlan, GoalScenario, SavingsGoal};
