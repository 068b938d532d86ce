//! Text generation gateway.
//!
//! This module is the abstraction boundary around the external
//! text-completion provider:
//!
//! - `provider`: the `TextGenerator` trait and its request/error types
//! - `meter`: character-count accounting and the linear cost estimate
//! - `retry`: the `Gateway` wrapper owning retry/backoff and timeouts
//!
//! Everything above this module talks to the provider through `Gateway`;
//! tests inject a fake `TextGenerator` and never touch the network.

mod meter;
mod provider;
mod retry;

pub use meter::{INPUT_CHAR_PRICE_USD, OUTPUT_CHAR_PRICE_USD, UsageMeter, UsageSnapshot};
pub use provider::{
    GatewayError, GenerationRequest, ModelId, PromptRole, PromptTurn, ProviderResult, TextGenerator,
};
pub use retry::{Gateway, RetryPolicy};
