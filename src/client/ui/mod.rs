//! Terminal UI for the participant client.

mod question;
mod render;
mod result;

pub use render::render;
