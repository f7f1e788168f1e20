pub mod lexer;
pub mod serialize;
pub mod token;
pub mod value;
