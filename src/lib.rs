pub mod arguments;
pub mod backup;
pub mod diagnostics;
pub mod parsers;
pub mod version;
