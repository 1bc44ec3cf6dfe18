//! Session-gated coaching applications: domain types, the view controller
//! and the async page driver that talks to the session and data boundaries.

pub mod api;
pub mod application;
pub mod error;
pub mod form;
pub mod list;
pub mod memory;
pub mod page;
pub mod session;
pub mod view;

pub use api::{ApplicationFeed, ApplicationsApi, SessionProvider};
pub use application::{Application, ApplicationId, ApplicationStatus, NewApplication};
pub use error::{FormError, RemoteError};
pub use page::{CoachingPage, RefreshPolicy, ViewHost};
pub use session::{Provider, Session, SessionGate};
pub use view::{CoachingView, Screen};
