//! Print the number of free parking spaces per station in Bolzano.
//!
//! Set `ODH_CLIENT_ID` and `ODH_CLIENT_SECRET` to query with credentials,
//! and `RUST_LOG=odhts=debug` to see the requests.

use anyhow::Context;
use odhts::{filter, Client, Config, Credentials, LatestDto, Request};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = Config::from_env();
    if config.referer.is_empty() {
        config.referer = "odhts-latest-parking".to_string();
    }
    let mut client = Client::new(config).context("failed to create client")?;
    if let Some(credentials) = Credentials::from_env() {
        client = client.with_credentials(credentials);
    }

    let mut req = Request::default();
    req.limit = -1;
    req.add_station_type("ParkingStation");
    req.add_data_type("free");
    req.set_filter(&filter::and([
        filter::eq("sactive", "true"),
        filter::bbi("scoordinate", 11.28, 46.46, 11.40, 46.52, Some(filter::SRID_4326)),
    ]));

    let res = client
        .latest::<Vec<LatestDto>>(&req)
        .context("failed to query latest measurements")?;

    for m in &res.data {
        println!("{:<12} {:>6} ({})", m.scode, m.mvalue, m.mvalidtime.format());
    }
    println!("{} stations", res.data.len());
    Ok(())
}
