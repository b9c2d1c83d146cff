// Domain layer: input tables, the joined master table, report types and ports (interfaces).

pub mod model;
pub mod ports;
pub mod report;
pub mod tables;
