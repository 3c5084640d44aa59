// Domain layer: models and ports (capabilities the controller consumes). No rendering concerns here.

pub mod model;
pub mod ports;
