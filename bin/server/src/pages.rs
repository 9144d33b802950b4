//! Page components for the application.

pub mod dashboard;
pub mod home;
pub mod login;
pub mod unauthorized;

pub use dashboard::{DashboardPage, SECTIONS, Section, SectionPage};
pub use home::HomePage;
pub use login::LoginPage;
pub use unauthorized::UnauthorizedPage;
