// Application layer: concrete pipelines and report rendering.

pub mod pipelines;
pub mod report;
