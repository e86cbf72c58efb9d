//! Client for a data availability disperser.
//!
//! A dispersal is two phases: an authenticated stream where the blob is submitted and
//! the disperser's challenge is signed ([`handshake`]), followed by polling the status
//! endpoint until the blob is confirmed or failed ([`status`]). [`DisperserClient`] runs
//! both behind a single call.
//!
//! ```rust,no_run
//! # async fn run<T: disperser_client::DisperserTransport>(transport: T) -> disperser_client::Result<()> {
//! use disperser_client::{DispersalSettings, DisperserClient};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = DisperserClient::new(transport, DispersalSettings::default());
//! let handle = client
//!     .disperse(b"hello world", "<hex private key>", &CancellationToken::new())
//!     .await?;
//! println!("{} {}", const_hex::encode(&handle.batch_header_hash), handle.blob_index);
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod client;
pub mod codec;
pub mod credential;
pub mod error;
pub mod handshake;
#[cfg(any(test, feature = "testutils"))]
pub mod mock;
pub mod proto;
pub mod settings;
pub mod status;
pub mod transport;

pub use blob::{RequestId, RetrieveHandle};
pub use client::DisperserClient;
pub use credential::{Account, AuthSigner, Credential};
pub use error::{DynError, Error, Result};
pub use settings::DispersalSettings;
pub use status::{StatusPoller, StatusSnapshot};
pub use transport::{AuthenticatedStream, DisperserTransport};
