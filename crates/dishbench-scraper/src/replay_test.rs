use super::*;

const CAPTURED: &str = "https://www.swiggy.com/dapi/restaurants/search/v3?lat=28.65&lng=77.23&str=Biryani&trackingId=abc&submitAction=ENTER&queryUniqueId=q-1";

fn overrides(search: &str) -> ReplayOverrides<'_> {
    ReplayOverrides {
        latitude: 12.9716,
        longitude: 77.5946,
        search,
    }
}

fn query_of(url: &Url) -> Vec<(String, String)> {
    url.query_pairs().into_owned().collect()
}

#[test]
fn replay_url_rewrites_only_the_three_overrides() {
    let url = replay_url(CAPTURED, &overrides("Masala Dosa")).unwrap();
    assert_eq!(
        query_of(&url),
        vec![
            ("lat".to_owned(), "12.9716".to_owned()),
            ("lng".to_owned(), "77.5946".to_owned()),
            ("str".to_owned(), "Masala Dosa".to_owned()),
            ("trackingId".to_owned(), "abc".to_owned()),
            ("submitAction".to_owned(), "ENTER".to_owned()),
            ("queryUniqueId".to_owned(), "q-1".to_owned()),
        ]
    );
    assert_eq!(url.path(), "/dapi/restaurants/search/v3");
    assert_eq!(url.host_str(), Some("www.swiggy.com"));
}

#[test]
fn replay_url_appends_missing_parameters() {
    let url = replay_url("https://api.example.com/search/v3?page=2", &overrides("Idli")).unwrap();
    assert_eq!(
        query_of(&url),
        vec![
            ("page".to_owned(), "2".to_owned()),
            ("lat".to_owned(), "12.9716".to_owned()),
            ("lng".to_owned(), "77.5946".to_owned()),
            ("str".to_owned(), "Idli".to_owned()),
        ]
    );
}

#[test]
fn replay_url_collapses_duplicate_override_keys() {
    let url = replay_url(
        "https://api.example.com/v3?str=a&lat=1&str=b&lng=2",
        &overrides("Vada"),
    )
    .unwrap();
    let pairs = query_of(&url);
    assert_eq!(pairs.iter().filter(|(k, _)| k == "str").count(), 1);
    assert_eq!(pairs[0], ("str".to_owned(), "Vada".to_owned()));
}

#[test]
fn replay_url_encodes_search_text() {
    let url = replay_url(CAPTURED, &overrides("Chicken & Rice")).unwrap();
    assert!(url.as_str().contains("str=Chicken+%26+Rice"), "got {url}");
}

#[test]
fn replay_url_rejects_unparseable_url() {
    let err = replay_url("not a url", &overrides("x")).unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidCapturedUrl { .. }),
        "expected InvalidCapturedUrl, got: {err:?}"
    );
}

#[test]
fn replay_headers_substitute_user_agent_and_keep_the_rest() {
    let client = ReplayClient::new(5, "DesktopChrome/123", 0, 0).unwrap();
    let captured = CapturedRequest::new(
        CAPTURED,
        "GET",
        [
            ("User-Agent", "HeadlessChrome/123"),
            ("Referer", "https://www.swiggy.com/search?query=Biryani"),
            ("Accept-Encoding", "gzip, deflate, br"),
            ("sec-ch-ua-mobile", "?0"),
        ],
    );
    let headers = client.replay_headers(&captured);
    assert_eq!(headers.get("user-agent").unwrap(), "DesktopChrome/123");
    assert_eq!(
        headers.get("referer").unwrap(),
        "https://www.swiggy.com/search?query=Biryani"
    );
    assert_eq!(headers.get("sec-ch-ua-mobile").unwrap(), "?0");
    assert!(headers.get("accept-encoding").is_none());
}

#[test]
fn replay_headers_skip_unrepresentable_headers() {
    let client = ReplayClient::new(5, "DesktopChrome/123", 0, 0).unwrap();
    let captured = CapturedRequest::new(
        CAPTURED,
        "GET",
        [(":authority", "www.swiggy.com"), ("bad header", "x"), ("x-ok", "1")],
    );
    let headers = client.replay_headers(&captured);
    assert_eq!(headers.len(), 2);
    assert_eq!(headers.get("x-ok").unwrap(), "1");
}
