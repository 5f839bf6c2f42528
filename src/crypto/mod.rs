//! Credential store for the expense tracker
//!
//! Provides salted Argon2id password hashing and a zeroizing string type
//! for passwords held in memory. The credential store owns no state.

pub mod password;
pub mod secure_memory;

pub use password::{hash_password, verify_password};
pub use secure_memory::SecureString;
