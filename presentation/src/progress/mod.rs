//! Progress indicators for model fan-outs

pub mod reporter;
