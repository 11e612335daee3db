pub mod note;

pub use note::{
    CreateNoteRequest, Note, NoteOrder, NoteResponse, RenderedNoteResponse, UpdateNoteRequest,
};
