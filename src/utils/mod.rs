pub mod anchor;
pub mod line_ending;
