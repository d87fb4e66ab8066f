pub mod assistant;
pub mod dnd;
pub mod doc;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod insert;
pub mod save;
pub mod selection;
pub mod session;

pub use assistant::AssistantCli;
pub use dnd::{DropDecision, RectIndex};
pub use doc::CanvasDoc;
pub use geometry::{CanvasTransform, Rect};
pub use gesture::{DragState, ResizeHandle, ResizeState};
pub use history::HistoryStack;
pub use insert::{instantiate_component, instantiate_markup};
pub use save::{MergeBackend, SaveController, SaveError, SaveOutcome, SaveReport, SaveRequest};
pub use selection::SelectionPolicy;
pub use session::EditorSession;
