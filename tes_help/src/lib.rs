//! Console `help` search over game data and the plugin files behind it.

pub mod cells;
pub mod cli;
pub mod console;
pub mod dispatch;
pub mod form_type;
pub mod load_order;
pub mod matchers;
pub mod model;
pub mod resolver;
pub mod sink;
pub mod snapshot;
pub mod text;

pub use cells::{CellIndex, CellIndexBuilder, CellIndexCache};
pub use console::{ConsoleError, ConsoleSession, Flow, SessionConfig};
pub use dispatch::{Filter, HelpQuery, QueryDispatcher};
pub use form_type::FormType;
pub use load_order::{ContainerFile, LoadOrder};
pub use model::GameData;
pub use sink::{ConsoleSink, MemorySink, ResultSink};
