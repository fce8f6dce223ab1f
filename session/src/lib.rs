pub mod click;
pub mod events;
pub mod selection;
pub mod session;
pub mod state;
pub mod worker;

pub use click::{resolve_click, CellClick};
pub use events::{ChannelEventQueue, EventQueue, SessionEvent};
pub use selection::Selection;
pub use session::{MatrixView, MetadataPanel, Session, SessionSnapshot};
pub use state::{LoadState, Readiness, ViewError, ViewStatus};
pub use worker::SessionWorker;
