//! Prompt domain
//!
//! Personas that seed a session's system directive.

mod persona;

pub use persona::Persona;
