//! Built-in authentication handlers.
//!
//! | Kind | Behavior |
//! |---|---|
//! | `noop` | always grants an empty subject (pass-through) |
//! | `anonymous` | grants the configured subject unless credentials are present |
//! | `bearer_token` | introspects `Authorization: Bearer` credentials |
//! | `unauthorized` | always fails hard |

mod anonymous;
mod bearer;
mod noop;
mod unauthorized;

pub use anonymous::AnonymousAuthenticator;
pub use bearer::{BearerTokenAuthenticator, StaticTokenStore, TokenIntrospector};
pub use noop::NoopAuthenticator;
pub use unauthorized::UnauthorizedAuthenticator;
