// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate: hashing, token handling, permission decisions,
// input validation and the audited mutation primitives.

pub mod clock_provider;
pub mod crypto_provider;
pub mod input_validator;
pub mod mutation_provider;
pub mod permission_policy;
pub mod token_provider;

pub use clock_provider::{Clock, ManualClock, SystemClock};
pub use crypto_provider::CryptoProvider;
pub use mutation_provider::{EntityLockGuard, EntityLocks, MutationProvider};
pub use permission_policy::Operation;
pub use token_provider::TokenProvider;
