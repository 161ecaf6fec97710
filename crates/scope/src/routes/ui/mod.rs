mod dashboard;

pub use dashboard::dashboard_handler;
