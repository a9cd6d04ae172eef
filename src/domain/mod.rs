// Domain layer: row model and ports. Only serde/serde_json beyond std.

pub mod model;
pub mod ports;
