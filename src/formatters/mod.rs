pub mod json_graph;

pub use json_graph::JsonGraphFormatter;
