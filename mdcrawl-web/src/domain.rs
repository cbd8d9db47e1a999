use url::Url;

/// How a host is compared against an allowed domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainMatch {
    /// The host must equal the allowed domain.
    #[default]
    Exact,
    /// The host may also be any subdomain of the allowed domain.
    IncludeSubdomains,
}

impl DomainMatch {
    pub fn matches(&self, host: &str, domain: &str) -> bool {
        match self {
            DomainMatch::Exact => host == domain,
            DomainMatch::IncludeSubdomains => {
                host == domain
                    || host
                        .strip_suffix(domain)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        }
    }
}

/// Configured allow-list plus the domains added for the current session.
///
/// An empty union means every host is allowed.
#[derive(Debug, Clone, Default)]
pub struct AllowedDomains {
    base: Vec<String>,
    session: Vec<String>,
    mode: DomainMatch,
}

impl AllowedDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            base: domains.into_iter().filter_map(|d| normalize(d.as_ref())).collect(),
            session: Vec::new(),
            mode: DomainMatch::Exact,
        }
    }

    pub fn with_mode(mut self, mode: DomainMatch) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> DomainMatch {
        self.mode
    }

    pub fn base(&self) -> &[String] {
        &self.base
    }

    pub fn session(&self) -> &[String] {
        &self.session
    }

    /// Replaces the session domains.
    pub fn reset_session<I, S>(&mut self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.session = domains.into_iter().filter_map(|d| normalize(d.as_ref())).collect();
    }

    pub fn is_unrestricted(&self) -> bool {
        self.base.is_empty() && self.session.is_empty()
    }

    pub fn allows_host(&self, host: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        let host = host.to_ascii_lowercase();
        self.base
            .iter()
            .chain(self.session.iter())
            .any(|domain| self.mode.matches(&host, domain))
    }

    pub fn allows(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => self.allows_host(host),
            None => self.is_unrestricted(),
        }
    }
}

fn normalize(domain: &str) -> Option<String> {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    (!domain.is_empty()).then_some(domain)
}
