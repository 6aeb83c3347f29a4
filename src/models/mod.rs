// Watcher API resource types

pub mod action;
pub mod audit;
pub mod common;
pub mod goal;

pub use action::{Action, ActionPlan, ActionPlanList, ActionList};
pub use audit::{Audit, AuditList, AuditTemplate, AuditTemplateList};
pub use common::{DataModel, Link, ListOptions, PatchOperation};
pub use goal::{EfficacyIndicatorSpec, Goal, GoalList, Strategy, StrategyList};
