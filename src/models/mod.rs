//! Data types exchanged with the Taskboard API.

mod board;
mod profile;
mod session;
mod task;

pub use board::{Board, NewBoard, Phase};
pub use profile::{AccessLevel, UserProfile};
pub use session::Session;
pub use task::{NewTask, TaskItem, TaskPatch, TaskStatus};
