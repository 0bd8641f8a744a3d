use super::*;

fn article(title: &str, summary: &str) -> Article {
    Article {
        id: "a1".to_string(),
        collection: "papers".to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        published: "2021-03-04T00:00:00".to_string(),
        pdf_link: String::new(),
    }
}

#[test]
fn article_text_joins_title_and_summary() {
    assert_eq!(
        article("Graphs", "a short survey").text(),
        "Graphs a short survey"
    );
    assert_eq!(article("", "").text(), " ");
}

#[test]
fn single_year_filter_covers_whole_year() {
    let range = PublishedFilter::year(2020)
        .range()
        .expect("year filter should resolve");

    assert_eq!(range.from.as_deref(), Some("2020-01-01T00:00:00"));
    assert_eq!(range.to.as_deref(), Some("2020-12-31T23:59:59"));
}

#[test]
fn year_takes_precedence_over_bounds() {
    let filter = PublishedFilter {
        year: Some(2019),
        start_year: Some(2000),
        end_year: Some(2030),
    };
    let range = filter.range().expect("filter should resolve");

    assert_eq!(range.from.as_deref(), Some("2019-01-01T00:00:00"));
    assert_eq!(range.to.as_deref(), Some("2019-12-31T23:59:59"));
}

#[test]
fn open_ended_bounds() {
    let start_only = PublishedFilter::between(Some(2018), None)
        .range()
        .expect("start bound should resolve");
    assert_eq!(start_only.from.as_deref(), Some("2018-01-01T00:00:00"));
    assert_eq!(start_only.to, None);

    let end_only = PublishedFilter::between(None, Some(2022))
        .range()
        .expect("end bound should resolve");
    assert_eq!(end_only.from, None);
    assert_eq!(end_only.to.as_deref(), Some("2022-12-31T23:59:59"));
}

#[test]
fn empty_filter_has_no_bounds() {
    let filter = PublishedFilter::default();
    assert!(filter.is_empty());
    assert_eq!(
        filter.range().expect("empty filter should resolve"),
        PublishedRange::default()
    );
}

#[test]
fn out_of_range_year_is_invalid() {
    let err = PublishedFilter::year(i32::MAX)
        .range()
        .expect_err("year should be out of range");
    assert!(err.to_string().contains("Invalid publication year"));
}

#[test]
fn new_article_defaults_missing_fields() {
    let parsed: NewArticle =
        serde_json::from_str(r#"{"title": "Only a title"}"#).expect("should parse article");

    assert_eq!(parsed.title, "Only a title");
    assert_eq!(parsed.summary, "");
    assert_eq!(parsed.id, None);
}
