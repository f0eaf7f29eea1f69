//! Client core for the school scheduling portal: the weekly grid builder,
//! per-view controllers, and the HTTP gateway to the portal API.

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod grid;
pub mod http;
pub mod session;

pub use config::{load_settings, ClientSettings, StaleResponsePolicy};
pub use controller::{
    ControllerError, CourseView, EnrollmentController, FilterChange, FilterField, MasterView,
    Notice, NoticeKind, ScheduleViewController, StudentView, TeacherView, ViewPhase,
    ViewSnapshot,
};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{DataGateway, ScheduleKind, ScheduleListing, ScheduleTarget};
pub use grid::{GridCell, TimeSlot, Weekday, WeeklyGrid};
pub use http::HttpGateway;
pub use session::{SessionError, SessionStore, SessionUser};
