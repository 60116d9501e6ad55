mod token;

pub use token::TokenGuard;
