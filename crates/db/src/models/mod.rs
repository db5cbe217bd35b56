//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - The entity struct handed to the rest of the system
//! - A `Deserialize` create DTO for inserts

pub mod job;
