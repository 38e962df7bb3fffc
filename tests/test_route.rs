use restgate::routing::{RouteError, RoutePattern, Segment};

#[test]
fn test_compile_collection_and_item_routes() {
    let pattern = RoutePattern::compile("owner/{ownerId}/cat/{id}").unwrap();

    assert_eq!(
        pattern.segments(),
        &[
            Segment::Literal("owner".to_string()),
            Segment::Placeholder("ownerId".to_string()),
            Segment::Literal("cat".to_string()),
            Segment::Placeholder("id".to_string()),
        ]
    );
    assert_eq!(pattern.as_str(), "owner/{ownerId}/cat/{id}");
    assert_eq!(pattern.to_string(), "owner/{ownerId}/cat/{id}");
}

#[test]
fn test_compile_accepts_kebab_literals() {
    assert!(RoutePattern::compile("big-cat").is_ok());
    assert!(RoutePattern::compile("a").is_ok());
    assert!(RoutePattern::compile("zoo/big-cat/{catId}").is_ok());
}

#[test]
fn test_compile_rejects_invalid_routes() {
    let invalid = [
        "/cat",
        "cat/",
        "Cat",
        "cat-",
        "-cat",
        "cat2",
        "big_cat",
        "",
        "cat//dog",
        "cat/{Id}",
        "cat/{id",
        "cat/{my-id}",
        "cat/{}",
        "cat/{ownerId}/{id}",
    ];

    for route in invalid {
        assert!(
            matches!(RoutePattern::compile(route), Err(RouteError::InvalidRoute { .. })),
            "expected `{}` to be rejected",
            route
        );
    }
}

#[test]
fn test_invalid_route_error_names_route() {
    let err = RoutePattern::compile("cat/{ownerId}/{id}").unwrap_err();

    assert!(err.to_string().contains("cat/{ownerId}/{id}"));
}

#[test]
fn test_match_binds_placeholders_in_order() {
    let pattern = RoutePattern::compile("owner/{ownerId}/cat/{id}").unwrap();
    let identifiers = pattern.matches("/owner/12/cat/34").unwrap();

    assert_eq!(identifiers.get("ownerId"), Some("12"));
    assert_eq!(identifiers.get("id"), Some("34"));
    assert_eq!(identifiers.len(), 2);
}

#[test]
fn test_match_literals_ignore_case() {
    let pattern = RoutePattern::compile("big-cat/{id}").unwrap();

    assert!(pattern.matches("/BIG-Cat/1").is_some());
}

#[test]
fn test_match_keeps_placeholder_text_raw() {
    let pattern = RoutePattern::compile("cat/{id}").unwrap();
    let identifiers = pattern.matches("/cat/Tom%20Cat").unwrap();

    assert_eq!(identifiers.get("id"), Some("Tom%20Cat"));
}

#[test]
fn test_match_ignores_query_string() {
    let pattern = RoutePattern::compile("cat").unwrap();

    assert!(pattern.matches("/cat?name=tom").is_some());
}

#[test]
fn test_match_requires_same_segment_count() {
    let pattern = RoutePattern::compile("cat/{id}").unwrap();

    assert!(pattern.matches("/cat").is_none());
    assert!(pattern.matches("/cat/1/toys").is_none());
    assert!(pattern.matches("/dog/1").is_none());
}

#[test]
fn test_collection_routes_have_no_identifiers() {
    let pattern = RoutePattern::compile("cat").unwrap();
    let identifiers = pattern.matches("/cat").unwrap();

    assert!(identifiers.is_empty());
    assert!(pattern.is_collection());
}
