/*
 * Responsibility
 * - Public interface of the middleware layers
 */
pub mod claims;
pub mod http;
