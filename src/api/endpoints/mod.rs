//! API endpoint handlers.
//!
//! Intake handlers return the full `SessionView` after every action so
//! the browser re-renders from one snapshot.

pub mod catalog;
pub mod health;
pub mod intake;
pub mod medicine;
pub mod theme;
pub mod voice;
