mod layouts;
mod pages;

pub use layouts::base;
pub use pages::{dashboard_page, DashboardData};
