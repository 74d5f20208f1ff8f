// Audio pipeline for spoken answers: chunk buffering, the live volume
// signal, speech-to-text, and the optional voice confidence model.

pub mod buffer;
pub mod features;
pub mod transcribe;
pub mod voice;
pub mod volume;
