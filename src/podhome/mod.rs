//! Podhome integration API client.
//!
//! # Endpoints
//!
//! | Operation        | Method | Path                            |
//! |------------------|--------|---------------------------------|
//! | create_episode   | POST   | `/api/createepisode`            |
//! | list_episodes    | GET    | `/api/episodes`                 |
//! | get_episode      | GET    | `/api/episode/{episode_id}`     |
//! | schedule_episode | POST   | `/api/schedule_episode`         |
//! | modify_episode   | POST   | `/api/modify_episode`           |
//! | delete_episode   | DELETE | `/api/deleteepisode/{episode_id}` |
//! | create_clip      | POST   | `/api/createclip`               |
//! | list_webhooks    | GET    | `/api/hook`                     |
//! | register_webhook | POST   | `/api/hook`                     |
//! | delete_webhook   | DELETE | `/api/hook`                     |
//! | test_webhook     | POST   | `/api/hooktest`                 |
//!
//! Every request carries the show's key in the `X-API-KEY` header.

pub mod client;
pub mod payload;

pub use client::{PodhomeClient, API_KEY_HEADER, REQUEST_TIMEOUT};
pub use payload::{EpisodeQuery, Payload};
