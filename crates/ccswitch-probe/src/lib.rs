//! ccswitch probe - live validation of profiles
//!
//! Sends one small request to a profile's messages endpoint and classifies
//! the outcome. Network work runs on tokio tasks; results travel back to
//! the thread that owns the [`ProfileStore`](ccswitch_core::ProfileStore)
//! over a channel and are recorded there.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

mod client;
mod error;
mod run;
mod session;

pub use client::{
    messages_url, HttpProbeClient, ProbeClient, ANTHROPIC_VERSION, CLIENT_USER_AGENT,
    DEFAULT_QUESTION, DEFAULT_TIMEOUT, MAX_TOKENS,
};
pub use error::ProbeError;
pub use run::{batch_probe, probe, BatchOptions, BatchSummary};
pub use session::{ProbeEvent, ProbeSession};

pub use tokio_util::sync::CancellationToken;
