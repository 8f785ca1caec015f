mod json;
mod table;

pub use json::JsonFormatter;
pub use table::TableFormatter;
