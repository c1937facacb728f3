/// Animation inspection command.
pub mod anim;
/// Chunk listing command.
pub mod chunks;
/// OBJ export command.
pub mod export;
/// File-level information command.
pub mod info;
/// Surface listing command.
pub mod surfaces;
