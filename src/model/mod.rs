//! Input data model.
//!
//! This module contains:
//! - Content trees and their data payload
//! - Block nodes, components, and loop directives
//! - Responsive breakpoints

mod block;
mod content;

pub use block::{BlockNode, Breakpoint, Component, Repeat};
pub use content::{ContentData, ContentTree};
