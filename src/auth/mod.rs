//! Spotify login.
//!
//! `login` persists a fresh PKCE verifier and prints the authorize URL;
//! `callback` exchanges the returned code for an access token using that
//! verifier. Tokens are not refreshed.

pub mod pkce;
pub mod store;

pub use pkce::{
    authorize_url, code_challenge, exchange_code, generate_code_verifier, VERIFIER_LEN,
};
pub use store::TokenStore;
