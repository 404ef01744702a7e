// Domain layer: core models and ports (interfaces). No external dependencies
// beyond std/serde and the id/time helpers.

pub mod model;
pub mod ports;
