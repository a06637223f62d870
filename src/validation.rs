#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("zone name is empty")]
    EmptyZone,
    #[error("record name '{fqdn}' is not inside zone '{zone}'")]
    OutsideZone { fqdn: String, zone: String },
}

/// Splits a challenge record name into the zone's domain and the relative label.
///
/// `("example.com.", "_acme-challenge.example.com.")` becomes
/// `("example.com", "_acme-challenge")`. A record at the apex yields an empty label.
pub fn split_challenge_name(zone: &str, fqdn: &str) -> Result<(String, String), ValidationError> {
    let domain = zone.trim_end_matches('.');
    if domain.is_empty() {
        return Err(ValidationError::EmptyZone);
    }

    let name = fqdn.trim_end_matches('.');
    let subdomain = match name.strip_suffix(domain) {
        Some("") => "",
        // label boundary: "fooexample.com" is not inside "example.com"
        Some(prefix) if prefix.ends_with('.') => prefix.trim_end_matches('.'),
        _ => {
            return Err(ValidationError::OutsideZone {
                fqdn: fqdn.to_string(),
                zone: zone.to_string(),
            });
        }
    };

    Ok((domain.to_string(), subdomain.to_string()))
}
