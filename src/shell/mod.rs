mod editor;
mod entry;
mod ops;
mod resolver;
mod session;
mod transfer;

pub use editor::{EditMode, END_OF_INPUT, collect_lines};
pub use entry::{EntryKind, EntryMetadata};
pub use ops::WriteMode;
pub use resolver::{DestinationBase, resolve, resolve_destination, resolve_source};
pub use session::Session;
