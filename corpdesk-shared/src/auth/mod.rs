/// Credential handling
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
///
/// Request authentication is out of scope for this service; only the storage
/// side of user credentials lives here.

pub mod password;
