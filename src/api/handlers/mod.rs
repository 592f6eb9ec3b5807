pub mod health;
pub mod inspect;
pub mod verifications;
