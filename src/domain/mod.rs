// Domain layer: the architecture IR, diagnostics and the ports the pipeline is built from.

pub mod model;
pub mod ports;
pub mod report;
pub mod types;
