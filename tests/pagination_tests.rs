use gatekeeper::pagination::{Page, PageQuery, DEFAULT_LIMIT, MAX_LIMIT};

#[test]
fn absent_values_use_defaults() {
    assert_eq!(Page::new(None, None), Page { page: 1, limit: DEFAULT_LIMIT });
}

#[test]
fn non_positive_values_use_defaults() {
    let page = Page::new(Some(0), Some(-5));
    assert_eq!(page, Page { page: 1, limit: 10 });
    assert_eq!(page.offset(), 0);

    assert_eq!(Page::new(Some(-3), Some(0)), Page { page: 1, limit: 10 });
}

#[test]
fn offset_is_one_based() {
    assert_eq!(Page::new(Some(1), Some(10)).offset(), 0);
    assert_eq!(Page::new(Some(3), Some(25)).offset(), 50);
}

#[test]
fn limit_is_capped() {
    assert_eq!(Page::new(Some(1), Some(10_000)).limit, MAX_LIMIT);
}

#[test]
fn from_query() {
    let query = PageQuery { page: Some(2), limit: None };
    assert_eq!(Page::from(query), Page { page: 2, limit: 10 });
}
