//! Configuration section definitions.
//!
//! Each module corresponds to a section in `live.toml`:
//!
//! | Module    | TOML Section                    | Purpose                         |
//! |-----------|---------------------------------|---------------------------------|
//! | `channel` | `[channel]`, `[channel.backoff]`| Endpoint route, reconnect policy|
//! | `events`  | `[events]`                      | Captured interaction categories |
//! | `views`   | `[views]`                       | Anchor attribute, rediscovery   |

mod channel;
mod events;
mod views;

pub use channel::{BackoffConfig, ChannelConfig};
pub use events::EventsConfig;
pub use views::ViewsConfig;
