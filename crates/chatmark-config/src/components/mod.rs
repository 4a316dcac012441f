//! Configuration sections

mod interpreter;
mod parser;
mod sections;

pub use interpreter::InterpreterConfig;
pub use parser::ParserConfig;
pub use sections::SectionConfig;
