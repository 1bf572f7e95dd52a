//! A Rust client for the [LINE Pay](https://pay.line.me) v3 online payment API.
//!
//! Requests are signed with the channel's credentials: every call carries the channel id,
//! a fresh nonce and an HMAC-SHA256 signature over the request.
//!
//! # Getting Started
//!
//! The primary entry point is the [`LinePayClient`] trait and its default
//! implementation, [`DefaultLinePayClient`].
//!
//! ## Example: Requesting a Payment
//!
//! ```no_run
//! use linepay_client::{
//!     CallContext, ClientConfig, DefaultLinePayClient, LinePayClient,
//!     models::{ConfirmUrlType, Currency, PaymentsPackage, PaymentsProduct, PaymentsRequest, RedirectUrls},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DefaultLinePayClient::new(ClientConfig::from_env()?)?;
//!
//!     let request = PaymentsRequest {
//!         amount: 100,
//!         currency: Currency::Twd,
//!         order_id: "order-1".into(),
//!         packages: vec![PaymentsPackage {
//!             id: "pkg-1".into(),
//!             amount: 100,
//!             name: Some("Shop".into()),
//!             user_fee: None,
//!             products: vec![PaymentsProduct {
//!                 id: None,
//!                 name: "Coffee".into(),
//!                 image_url: None,
//!                 quantity: 1,
//!                 price: 100,
//!                 original_price: None,
//!             }],
//!         }],
//!         redirect_urls: RedirectUrls {
//!             app_package_name: None,
//!             confirm_url: "https://example.com/confirm".into(),
//!             confirm_url_type: Some(ConfirmUrlType::Client),
//!             cancel_url: "https://example.com/cancel".into(),
//!         },
//!         options: None,
//!     };
//!
//!     let response = client.payments_request(&CallContext::background(), &request).await?;
//!     let info = response.into_result()?.ok_or("missing payment info")?;
//!     println!("Approve the payment at {}", info.payment_url.web);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod signer;
pub mod transport;

pub use client::{DefaultLinePayClient, LinePayClient};
pub use config::{ClientConfig, PRODUCTION_HOST, SANDBOX_HOST};
pub use context::CallContext;
pub use error::{BusinessError, CallError, ConfigError, TransportError};
pub use models::{ApiResponse, ReturnCode, TransactionId};
pub use signer::{AuthHeaders, Signer};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use tokio_util::sync::CancellationToken;
