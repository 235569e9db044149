/// Router Module Index
///
/// Splits the API into two access tiers, each wired up in `create_router`:
/// anonymous reads and the login gateway on one side, mutations behind the
/// authentication layer on the other.

/// Routes accessible to all clients (anonymous, read-only, plus login).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated bearer token (or the local dev bypass).
pub mod authenticated;
