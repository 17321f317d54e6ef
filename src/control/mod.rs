//! Health aggregation, mode transitions and service restarts

pub mod health;
pub mod mode;
pub mod services;
pub mod transition;

pub use health::{
    compute_health, compute_status, HealthReport, HealthScore, HealthStatus, ServiceStatus,
};
pub use mode::{CurrentMode, Mode, ModeError, ModeStore, ParseModeError};
pub use services::{ParseServiceTargetError, ServiceController, ServiceTarget};
pub use transition::{switch_mode, ModeSwitch};

#[cfg(test)]
#[path = "mode_test.rs"]
mod mode_tests;

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "services_test.rs"]
mod services_tests;
