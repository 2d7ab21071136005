//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use movie_search_core::{
    render_movie_list, ApiError, HttpMethod, HttpResponse, MovieClient, MovieItem,
    PaginatedResponse, SearchParams,
};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> MovieClient {
    MovieClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        other => panic!("unknown method: {other}"),
    }
}

#[test]
fn search_test_vectors() {
    let raw = include_str!("../../test-vectors/search.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let params = SearchParams::new(
            input["query"].as_str().unwrap(),
            input["page"].as_u64().unwrap() as u32,
            input["page_size"].as_u64().unwrap() as u32,
        )
        .unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_search_movies(&params);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_search_movies(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Parse" => assert!(matches!(err, ApiError::Parse(_)), "{name}: expected Parse, got {err:?}"),
                "NotFound" => assert!(matches!(err, ApiError::NotFound), "{name}: expected NotFound, got {err:?}"),
                "Http" => assert!(matches!(err, ApiError::Http { .. }), "{name}: expected Http, got {err:?}"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            continue;
        }

        let page = result.unwrap();
        let expected: PaginatedResponse<MovieItem> =
            serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(page, expected, "{name}: parsed result");

        // Verify rendering
        let labels: Vec<(String, String)> = render_movie_list(Some(page.results.as_slice()))
            .into_iter()
            .map(|entry| (entry.label, entry.href))
            .collect();
        let expected_labels: Vec<(String, String)> =
            serde_json::from_value(case["expected_labels"].clone()).unwrap();
        assert_eq!(labels, expected_labels, "{name}: rendered entries");
    }
}
