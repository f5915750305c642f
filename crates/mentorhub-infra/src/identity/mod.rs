//! External identity providers.

mod firebase;

pub use firebase::{FirebaseConfig, FirebaseVerifier, GOOGLE_JWKS_URL};
