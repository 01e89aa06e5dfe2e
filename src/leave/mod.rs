pub mod balance;
pub mod workflow;

pub use workflow::LeaveWorkflow;
