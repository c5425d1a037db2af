// Domain layer: grid/venue model, scanner and analysis settings, ports.

pub mod model;
pub mod ports;
pub mod settings;
