// Renderer-facing DTOs and the JSON command loop.

pub mod commands;
pub mod dto;
