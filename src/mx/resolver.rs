use trust_dns_resolver::{Resolver, error::ResolveError};

use super::MxRecord;

/// Lookup MX records for `domain` using the system resolver.
///
/// The domain is normalized via IDNA before querying DNS. Records come back
/// sorted by ascending preference and deduplicated. Every failure mode
/// (IDNA rejection, resolver construction, NXDOMAIN, timeout, empty answer)
/// yields an empty list; the cause is only logged.
pub fn resolve_mx(domain: &str) -> Vec<MxRecord> {
    let ascii = match normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => {
            tracing::debug!(domain, error = %err, "domain normalization failed");
            return Vec::new();
        }
    };
    let resolver = match Resolver::from_system_conf() {
        Ok(resolver) => resolver,
        Err(err) => {
            tracing::debug!(error = %err, "system resolver unavailable");
            return Vec::new();
        }
    };
    resolve_with(&resolver, &ascii)
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Vec<MxRecord>
where
    R: LookupMx,
{
    match resolver.lookup_mx(ascii_domain) {
        Ok(mut records) => {
            records.sort();
            records.dedup();
            records
        }
        Err(err) => {
            tracing::debug!(domain = ascii_domain, error = %err, "MX lookup failed");
            Vec::new()
        }
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, idna::Errors> {
    idna::domain_to_ascii(domain.trim())
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (self.on_lookup)(domain)
    }
}
