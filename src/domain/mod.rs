// Domain layer: typed records for each pipeline stage and the ports the stages talk through.

pub mod model;
pub mod ports;
