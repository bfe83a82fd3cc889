//! Process attachment

pub mod attacher;

pub use attacher::{AttachOptions, AttachedProcess, ProcessAttacher};
