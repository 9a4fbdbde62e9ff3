pub mod session;
pub use session::SessionStore;
pub mod profile;
pub use profile::ProfileResolver;
pub mod guard;
pub use guard::AccessGuard;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod validation_service;
pub use validation_service::ValidationService;
pub mod admin_service;
pub use admin_service::AdminService;
pub mod export;
