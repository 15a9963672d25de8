//! Gateway module - services, route table, and health checking

pub mod health_check;
pub mod router;
pub mod routes;
pub mod services;

pub use health_check::{HealthCheckManager, HealthState, ServiceHealth};
pub use router::{ResolvedRoute, RouteRule, RouteTable, RouteTableStats, RuleKind};
pub use services::{BackendService, ServiceKind, ServiceRegistry};
