//! Lexer and parser for the SVG path data that describes region outlines.
//!
//! The processing service delivers each region outline as a path string
//! (`"M80,80 Q130,60 180,80 ... Z"`). This crate turns those strings into a
//! list of absolute [`PathCmd`]s and writes them back out.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `PathData`, `PathCmd` |
//! | [`error`] | `ParseError` |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`parser`] | `parse_str` entry point |
//!
//! Supported commands: `M L H V Q T Z` and their relative forms. Cubic and
//! arc commands are rejected.
//!
//! # Quick start
//!
//! ```rust
//! use pbn_path::{parse_str, PathCmd};
//!
//! let path = parse_str("m10,10 h20 v20 h-20 z").unwrap();
//! assert_eq!(path.commands[2], PathCmd::LineTo { x: 30.0, y: 30.0 });
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{PathCmd, PathData};
pub use error::ParseError;
pub use parser::parse_str;
