//! fundry-editor-core: rich text editor logic without framework dependencies.
//!
//! This crate provides:
//! - `Surface` - an owned arena tree standing in for the editable DOM
//! - `Editor<C>` - the editor instance, generic over the sanitize/format capability
//! - Interaction controllers as `impl` blocks: resize, mode switch, insertion,
//!   upload/embed, command dispatch
//! - The content pipeline: sanitize, clean, debounce, deliver

pub mod commands;
pub mod debounce;
pub mod dom;
pub mod editor;
pub mod insert;
pub mod mode;
mod pipeline;
pub mod resize;
pub mod selection;
pub mod source;
pub mod types;
pub mod upload;

pub use commands::{Alignment, EditorCommand};
pub use debounce::Debounced;
pub use dom::{NodeId, Surface};
pub use editor::Editor;
pub use insert::{ButtonSpec, LinkPrefill, LinkSpec, video_embed_src};
pub use resize::{HANDLE_SET_SIZE, HandleKind, MIN_IMAGE_SIZE};
pub use selection::{DomRange, Position, caret_after, range_text};
pub use smol_str::SmolStr;
pub use source::SourceBuffer;
pub use types::{CONTENT_DEBOUNCE, EDITING_FLAG_TTL, EditorConfig, Mode};
pub use upload::{
    ALLOWED_SUBTYPES, FileUpload, MAX_UPLOAD_BYTES, MediaSettings, UPLOAD_CATEGORY, UploadError,
    UploadResponse, Uploader,
};
