//! Replays a shell session log (`$ cd`, `$ ls` and listing lines) into a
//! [`ResourceTree`](crate::filesystem::ResourceTree).

mod diagnostic;
mod event;
#[allow(clippy::module_inception)]
mod interpreter;

pub use diagnostic::Diagnostic;
pub use event::Event;
pub use interpreter::{Interpretation, Interpreter, build, interpret};
