// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (bearer token checked by middleware::require_auth)

pub mod protected;
pub mod public;
