//! # odhts - Open Data Hub time series client
//!
//! A blocking Rust client for the Open Data Hub mobility/time series API.
//!
//! ## Features
//!
//! - OAuth2 client credentials with an expiry-aware token cache
//! - Filter expression builder for the `where` parameter
//! - Typed responses: the `data` field decodes into any serde type
//! - Pluggable transport for tests and custom HTTP stacks
//!
//! ## Basic Usage
//!
//! ```no_run
//! use odhts::{filter, Client, LatestDto, Request};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new_default("my-application")?;
//!
//!     let mut req = Request::default();
//!     req.add_station_type("ParkingStation");
//!     req.add_data_type("free");
//!     req.set_filter(&filter::and([
//!         filter::eq("sactive", "true"),
//!         filter::ire("sname", &filter::escape("bozen")),
//!     ]));
//!
//!     let res = client.latest::<Vec<LatestDto>>(&req)?;
//!     for m in res.data {
//!         println!("{}: {}", m.scode, m.mvalue);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! ```no_run
//! use odhts::{Client, Config};
//!
//! let mut client = Client::new(Config::default().with_referer("my-application"))?;
//! client.use_auth("client-id", "client-secret");
//! # Ok::<(), odhts::OdhError>(())
//! ```

pub mod client;
pub mod error;
pub mod filter;
pub mod request;
pub mod response;
pub mod rest;
pub mod time;
pub mod token;

// Re-export main types for convenience
pub use client::{Config, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use error::{OdhError, Result};
pub use filter::Expr;
pub use request::{Repr, Request};
pub use response::{Coordinate, LatestDto, Response, StationDto};
pub use rest::{Client, PreparedRequest};
pub use time::{format_request_time, TsTime};
pub use token::{Credentials, Token, TokenCache};
