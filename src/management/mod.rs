mod token;

pub use token::ACCESS_TOKEN_KEY;
pub use token::FileTokenStore;
pub use token::MemoryTokenStore;
pub use token::REFRESH_TOKEN_KEY;
pub use token::TokenStore;
