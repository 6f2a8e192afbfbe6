// src/fetch/mod.rs
//! Blocking page fetch with a small retry loop.
//!
//! The sources are a handful of static pages, so the whole pipeline runs
//! synchronously and just sleeps between attempts. pollofpolls serves
//! ISO-8859-1 without always declaring it, hence the fallback charset.

use crate::error::ScrapeResult;
use reqwest::blocking::Client;
use std::{thread, time::Duration};
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("pollscraper/", env!("CARGO_PKG_VERSION"));
const FALLBACK_CHARSET: &str = "ISO-8859-1";
const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

pub fn client() -> ScrapeResult<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// GET a page and return its decoded body. Transport errors and non-2xx
/// statuses are retried a few times, then propagated; any failure here is
/// fatal for the source.
pub fn fetch_html(client: &Client, url: &str) -> ScrapeResult<String> {
    let url = Url::parse(url)?;

    let mut attempt = 1;
    loop {
        let response = client
            .get(url.clone())
            .send()
            .and_then(|resp| resp.error_for_status());

        match response {
            Ok(resp) => match resp.text_with_charset(FALLBACK_CHARSET) {
                Ok(text) => return Ok(text),
                Err(_) if attempt < MAX_RETRIES => {}
                Err(err) => return Err(err.into()),
            },
            Err(_) if attempt < MAX_RETRIES => {}
            Err(err) => return Err(err.into()),
        }

        debug!(url = %url, attempt, "fetch failed, retrying");
        attempt += 1;
        thread::sleep(RETRY_DELAY);
    }
}
