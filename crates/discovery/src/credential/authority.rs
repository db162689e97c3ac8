//! Authority host resolution
//!
//! Maps an authority host identifier from the configuration to the concrete
//! base endpoint of the identity provider. Known sovereign-cloud aliases are
//! resolved from a fixed table; verbatim `https://` URLs pass through.

use url::Url;

use crate::core::CredentialError;

/// Platform default authority host
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";

const ALIASES: &[(&str, &str)] = &[
    ("public", DEFAULT_AUTHORITY),
    ("azure-public", DEFAULT_AUTHORITY),
    ("government", "https://login.microsoftonline.us/"),
    ("us-government", "https://login.microsoftonline.us/"),
    ("china", "https://login.chinacloudapi.cn/"),
];

/// The platform default authority
pub fn default() -> Url {
    // The constant is a valid URL; parsing cannot fail.
    Url::parse(DEFAULT_AUTHORITY).unwrap_or_else(|_| unreachable!())
}

/// Resolve an authority host identifier to a concrete authority URI
///
/// Accepts a known alias (case-insensitive) or a verbatim `https://` URL.
/// Anything else is a configuration error.
pub fn resolve(identifier: &str) -> Result<Url, CredentialError> {
    let normalized = identifier.trim();

    if let Some((_, host)) = ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(normalized))
    {
        // Table entries are valid URLs by construction.
        return Ok(Url::parse(host).unwrap_or_else(|_| unreachable!()));
    }

    if normalized.starts_with("https://") {
        return Url::parse(normalized).map_err(|e| {
            CredentialError::invalid_input("authority", format!("not a valid URL: {e}"))
        });
    }

    Err(CredentialError::invalid_input(
        "authority",
        format!("unknown authority host identifier '{normalized}'"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("public", DEFAULT_AUTHORITY)]
    #[case("PUBLIC", DEFAULT_AUTHORITY)]
    #[case("azure-public", DEFAULT_AUTHORITY)]
    #[case("government", "https://login.microsoftonline.us/")]
    #[case("us-government", "https://login.microsoftonline.us/")]
    #[case("China", "https://login.chinacloudapi.cn/")]
    fn known_aliases_resolve(#[case] identifier: &str, #[case] expected: &str) {
        assert_eq!(resolve(identifier).unwrap().as_str(), expected);
    }

    #[test]
    fn verbatim_https_url_passes_through() {
        let url = resolve("https://login.sovereign.example/").unwrap();
        assert_eq!(url.as_str(), "https://login.sovereign.example/");
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let err = resolve("not-a-cloud").unwrap_err();
        assert!(err.to_string().contains("not-a-cloud"));
    }

    #[test]
    fn plain_http_is_rejected() {
        assert!(resolve("http://login.example.com/").is_err());
    }

    #[test]
    fn default_matches_public_alias() {
        assert_eq!(default(), resolve("public").unwrap());
    }
}
