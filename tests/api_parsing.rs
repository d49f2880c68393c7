use macrobank::api::parse_page;
use macrobank::models::{CountryEntry, Entry, Meta};

#[test]
fn parse_sample_page() {
    let sample = r#"
    [
      {"page":1,"pages":1,"per_page":"2","total":2},
      [
        {
          "indicator":{"id":"NY.GDP.MKTP.KD.ZG","value":"GDP growth (annual %)"},
          "country":{"id":"ID","value":"Indonesia"},
          "countryiso3code":"IDN",
          "date":"2022",
          "value":5.3,
          "unit":"",
          "obs_status":null,
          "decimal":1
        },
        {
          "indicator":{"id":"NY.GDP.MKTP.KD.ZG","value":"GDP growth (annual %)"},
          "country":{"id":"ID","value":"Indonesia"},
          "countryiso3code":"IDN",
          "date":"2021",
          "value":3.7,
          "unit":"",
          "obs_status":null,
          "decimal":1
        }
      ]
    ]
    "#;

    let v: serde_json::Value = serde_json::from_str(sample).unwrap();
    let (meta, records) = parse_page(&v).unwrap();
    assert_eq!(meta.page, 1);
    assert_eq!(meta.pages, 1);
    assert_eq!(meta.per_page, 2);
    assert_eq!(meta.total, 2);

    let obs: Vec<_> = records
        .into_iter()
        .map(|r| serde_json::from_value::<Entry>(r).unwrap())
        .filter_map(Entry::into_observation)
        .collect();
    assert_eq!(obs.len(), 2);
    assert_eq!(obs[0].iso3, "IDN");
    assert_eq!(obs[0].country_name.as_deref(), Some("Indonesia"));
    assert_eq!(obs[0].year, 2022);
    assert_eq!(obs[0].value, 5.3);
    assert_eq!(obs[1].year, 2021);
    assert_eq!(obs[1].value, 3.7);
}

#[test]
fn meta_per_page_accepts_string_or_number() {
    // per_page as string
    let m: Meta =
        serde_json::from_str(r#"{"page":1,"pages":2,"per_page":"1000","total":2000}"#).unwrap();
    assert_eq!(m.per_page, 1000);
    // per_page as number
    let m: Meta =
        serde_json::from_str(r#"{"page":1,"pages":2,"per_page":500,"total":2000}"#).unwrap();
    assert_eq!(m.per_page, 500);
}

#[test]
fn api_error_payload_is_surfaced() {
    let v: serde_json::Value = serde_json::from_str(
        r#"[{"message":[{"id":"120","key":"Invalid value","value":"The provided parameter value is not valid"}]}]"#,
    )
    .unwrap();
    assert!(parse_page(&v).is_err());
}

#[test]
fn null_value_yields_no_observation() {
    let e: Entry = serde_json::from_str(
        r#"{"country":{"id":"ID","value":"Indonesia"},"countryiso3code":"IDN","date":"2020","value":null}"#,
    )
    .unwrap();
    assert!(e.into_observation().is_none());
}

#[test]
fn unparseable_year_is_dropped_not_fatal() {
    let e: Entry = serde_json::from_str(
        r#"{"country":{"id":"ID","value":"Indonesia"},"countryiso3code":"IDN","date":"2020Q1","value":1.0}"#,
    )
    .unwrap();
    assert!(e.into_observation().is_none());
}

#[test]
fn iso3_falls_back_to_country_id() {
    // Empty countryiso3code but a usable country.id
    let e: Entry = serde_json::from_str(
        r#"{"country":{"id":"IDN","value":"Indonesia"},"countryiso3code":"","date":"2020","value":1.0}"#,
    )
    .unwrap();
    let obs = e.into_observation().unwrap();
    assert_eq!(obs.iso3, "IDN");

    // "NA" counts as unresolvable in both places
    let e: Entry = serde_json::from_str(
        r#"{"country":{"id":"NA","value":"?"},"countryiso3code":"NA","date":"2020","value":1.0}"#,
    )
    .unwrap();
    assert!(e.into_observation().is_none());
}

#[test]
fn country_entry_maps_nested_classification() {
    let c: CountryEntry = serde_json::from_str(
        r#"
    {
      "id":"IDN",
      "name":"Indonesia",
      "region":{"id":"EAS","value":"East Asia & Pacific"},
      "incomeLevel":{"id":"UMC","value":"Upper middle income"},
      "lendingType":{"id":"IBD","value":"IBRD"}
    }"#,
    )
    .unwrap();
    let meta = c.into_country_meta().unwrap();
    assert_eq!(meta.iso3, "IDN");
    assert_eq!(meta.country, "Indonesia");
    assert_eq!(meta.region.as_deref(), Some("East Asia & Pacific"));
    assert_eq!(meta.income.as_deref(), Some("Upper middle income"));
    assert_eq!(meta.lending.as_deref(), Some("IBRD"));
}

#[test]
fn country_entry_without_name_is_dropped() {
    let c: CountryEntry =
        serde_json::from_str(r#"{"id":"XXX","name":null,"region":null}"#).unwrap();
    assert!(c.into_country_meta().is_none());
}

#[test]
fn paginated_fixture_aggregates_across_pages() {
    // First page declares pages=2; a complete fetch consumes both.
    let page1: serde_json::Value = serde_json::from_str(
        r#"
    [
      {"page":1,"pages":2,"per_page":"1","total":2},
      [{"country":{"id":"ID","value":"Indonesia"},"countryiso3code":"IDN","date":"2022","value":5.3}]
    ]"#,
    )
    .unwrap();
    let page2: serde_json::Value = serde_json::from_str(
        r#"
    [
      {"page":2,"pages":2,"per_page":"1","total":2},
      [{"country":{"id":"ID","value":"Indonesia"},"countryiso3code":"IDN","date":"2021","value":3.7}]
    ]"#,
    )
    .unwrap();

    let (meta, mut records) = parse_page(&page1).unwrap();
    assert_eq!(meta.pages, 2);
    for page in 2..=meta.pages {
        assert_eq!(page, 2); // exactly one follow-up request
        let (_, more) = parse_page(&page2).unwrap();
        records.extend(more);
    }

    let obs: Vec<_> = records
        .into_iter()
        .map(|r| serde_json::from_value::<Entry>(r).unwrap())
        .filter_map(Entry::into_observation)
        .collect();
    assert_eq!(obs.len(), 2);
    assert_eq!((obs[0].year, obs[0].value), (2022, 5.3));
    assert_eq!((obs[1].year, obs[1].value), (2021, 3.7));
}
