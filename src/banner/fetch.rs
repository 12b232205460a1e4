use super::BannerDocument;
use crate::error::{Error, Result};
use tracing::{debug, info};
use url::Url;

pub const BANNER_PAGE_PREFIX: &str = "https://bannergress.com/banner/";
pub const API_PREFIX: &str = "https://api.bannergress.com/bnrs/";

/// Maps a banner page URL onto the API document URL.
///
/// A bare banner id is read as the page `BANNER_PAGE_PREFIX<id>`. Only the
/// first occurrence of the page prefix is replaced.
pub fn api_url(page: &str, api_prefix: &str) -> Result<Url> {
    let page = match Url::parse(page) {
        Ok(_) => page.to_owned(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            format!("{}{}", BANNER_PAGE_PREFIX, page.trim_matches('/'))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Url::parse(&page.replacen(BANNER_PAGE_PREFIX, api_prefix, 1))?)
}

pub fn parse(body: &str) -> Result<BannerDocument> {
    Ok(serde_json::from_str(body)?)
}

/// One GET, no retry.
pub fn fetch(url: &Url) -> Result<BannerDocument> {
    info!(%url, "Fetching banner");
    let response = reqwest::blocking::get(url.clone())?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch {
            status: status.as_u16(),
        });
    }

    let body = response.text()?;
    debug!(bytes = body.len(), "Banner document received");
    parse(&body)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const BODY: &str = r#"{
        "title": "Test Banner",
        "numberOfMissions": 1,
        "missions": {
            "0": {
                "title": "Test 1/1",
                "steps": {
                    "0": {"poi": {"type": "portal", "latitude": 1.5, "longitude": 2.5, "title": "A"}},
                    "1": {"poi": {"type": "unavailable"}}
                }
            }
        }
    }"#;

    #[test]
    fn page_prefix_is_swapped_for_api_prefix() {
        let url = api_url("https://bannergress.com/banner/some-banner-1a2b", API_PREFIX).unwrap();
        assert_eq!(url.as_str(), "https://api.bannergress.com/bnrs/some-banner-1a2b");
    }

    #[test]
    fn bare_id_is_expanded() {
        let url = api_url("some-banner-1a2b", API_PREFIX).unwrap();
        assert_eq!(url.as_str(), "https://api.bannergress.com/bnrs/some-banner-1a2b");
    }

    #[test]
    fn foreign_urls_pass_through() {
        let url = api_url("http://localhost:8080/bnrs/x", API_PREFIX).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/bnrs/x");
    }

    #[test]
    fn broken_prefix_is_rejected() {
        assert!(matches!(
            api_url("x", "not a url/"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn fetch_decodes_document() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/bnrs/test-banner")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create();

        let prefix = format!("{}/bnrs/", server.url());
        let url = api_url("https://bannergress.com/banner/test-banner", &prefix).unwrap();
        let banner = fetch(&url).unwrap();

        mock.assert();
        assert_eq!(banner.title, "Test Banner");
        assert_eq!(banner.missions.len(), 1);
        assert_eq!(banner.missions.entries()[0].1.steps.len(), 2);
    }

    #[test]
    fn error_status_carries_code() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/bnrs/gone").with_status(404).create();

        let url = Url::parse(&format!("{}/bnrs/gone", server.url())).unwrap();
        let err = fetch(&url).unwrap_err();

        mock.assert();
        assert!(matches!(err, Error::Fetch { status: 404 }));
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }

    /// A local port that was just released, so nothing is listening on it.
    pub(crate) fn closed_port_url(path: &str) -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Url::parse(&format!("http://127.0.0.1:{}{}", port, path)).unwrap()
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let url = closed_port_url("/bnrs/x");
        assert!(matches!(fetch(&url), Err(Error::Http { .. })));
    }

    #[test]
    fn undecodable_body_is_a_parse_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/bnrs/odd")
            .with_status(200)
            .with_body(r#"{"title": "no missions"}"#)
            .create();

        let url = Url::parse(&format!("{}/bnrs/odd", server.url())).unwrap();
        assert!(matches!(fetch(&url), Err(Error::Parse { .. })));
    }
}
