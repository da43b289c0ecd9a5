pub mod effect;
pub mod error;
pub mod event;
pub mod field;
pub mod filters;
pub mod form;
pub mod mask;
pub mod options;

pub use effect::{Effect, HostNotification, Outcome};
pub use error::MaskError;
pub use event::{FieldEvent, KeyCode, KeyInput, KeyModifiers, Selection};
pub use field::{MaskedField, MemoryField, NativeEditing, TextField, attach};
pub use filters::CharFilter;
pub use form::FormMasks;
pub use mask::{EngineState, MaskEngine, MaskSpec};
pub use options::{DEFAULT_MASK_CHAR, MaskOptions, PasteStrategy};
