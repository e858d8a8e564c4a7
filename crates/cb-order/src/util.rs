/// Build the HTTP client used when the caller does not supply one.
///
/// No timeout is configured; the transport default applies.
pub fn default_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().gzip(true).brotli(true).build()
}
