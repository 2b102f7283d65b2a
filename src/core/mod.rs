pub mod token;
pub mod identifier;
pub mod dialect;
pub mod errors;


pub use token::{Token, TokenKind, TokenGroup, Node, Tree};
pub use identifier::{Identifier, JoinKind};
pub use dialect::{Dialect, OutputShape, CountStyle, LikeStyle};
pub use errors::{Result, BuildError};
