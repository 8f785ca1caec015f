mod planner;
mod resolve;
mod scope;

pub use planner::{PlanOptions, order_fields, plan_layouts};
pub use resolve::TypeResolver;
pub use scope::qualify_types;
