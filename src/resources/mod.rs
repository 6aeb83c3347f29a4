// Watcher REST resources, one module per collection

mod action_plans;
mod actions;
mod audit_templates;
mod audits;
mod data_model;
mod goals;
mod strategies;

pub use action_plans::{ACTION_PLAN_STATE_CANCELLED, ACTION_PLAN_STATE_TRIGGERED};
pub use audits::AUDIT_STATE_ONGOING;
