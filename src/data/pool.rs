use url::Url;

const DEFAULT_SCHEME: &str = "stratum+tcp";

/// One stratum pool as configured on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratumPool {
    /// The pool host, usually without a scheme (e.g. `public-pool.io`)
    pub url: String,
    /// The pool port
    pub port: u16,
    /// The worker name, often `<address>.<worker>`
    pub user: String,
}

impl StratumPool {
    /// Whether the pool slot has a host configured.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// The pool endpoint as a URL.
    ///
    /// Hosts without a scheme get `stratum+tcp://`. A port already present in
    /// the configured URL is replaced by `port` when `port` is non-zero.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        let trimmed = self.url.trim();
        if trimmed.is_empty() {
            return Err(url::ParseError::EmptyHost);
        }

        let mut url = if trimmed.contains("://") {
            Url::parse(trimmed)?
        } else {
            Url::parse(&format!("{DEFAULT_SCHEME}://{trimmed}"))?
        };

        if self.port != 0 && url.set_port(Some(self.port)).is_err() {
            return Err(url::ParseError::InvalidPort);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(url: &str, port: u16) -> StratumPool {
        StratumPool {
            url: url.to_string(),
            port,
            user: "bc1qexample.bitaxe".to_string(),
        }
    }

    #[test]
    fn bare_host_gets_stratum_scheme() {
        let endpoint = pool("public-pool.io", 21496).endpoint().unwrap();
        assert_eq!(endpoint.as_str(), "stratum+tcp://public-pool.io:21496");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let endpoint = pool("stratum+ssl://solo.ckpool.org:443", 3333).endpoint().unwrap();
        assert_eq!(endpoint.scheme(), "stratum+ssl");
        assert_eq!(endpoint.port(), Some(3333));
        assert_eq!(endpoint.host_str(), Some("solo.ckpool.org"));
    }

    #[test]
    fn empty_slot() {
        assert!(!pool("  ", 0).is_configured());
        assert!(pool("", 0).endpoint().is_err());
    }
}
