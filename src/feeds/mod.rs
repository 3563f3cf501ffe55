pub mod console;
pub mod script;
