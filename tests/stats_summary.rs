use tbviz::models::{Dataset, Entity, YearRange};
use tbviz::stats::entity_summary;

#[test]
fn summary_handles_missing_and_median_even_odd() {
    // A: [1, 2, 3, 4] -> median 2.5
    // B: [10, -, 30] -> one missing, median 20
    let mut ds = Dataset::new();
    for (y, v) in [(2018, 1.0), (2019, 2.0), (2020, 3.0), (2021, 4.0)] {
        ds.upsert(Entity::new("A"), y, Some(v));
    }
    ds.upsert(Entity::new("B"), 2018, Some(10.0));
    ds.upsert(Entity::new("B"), 2019, None);
    ds.upsert(Entity::new("B"), 2020, Some(30.0));

    let got = entity_summary(&ds, None);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(a.entity, "A");
    assert_eq!((a.count, a.missing), (4, 0));
    assert_eq!(a.median, Some(2.5));
    assert_eq!(a.mean, Some(2.5));

    let b = &got[1];
    assert_eq!((b.count, b.missing), (2, 1));
    assert_eq!((b.min, b.max), (Some(10.0), Some(30.0)));
    assert_eq!(b.median, Some(20.0));
}

#[test]
fn window_counts_absent_years_as_missing() {
    let mut ds = Dataset::new();
    ds.upsert(Entity::new("A"), 2010, Some(5.0));
    ds.upsert(Entity::new("A"), 2030, Some(500.0));
    let s = &entity_summary(&ds, Some(YearRange::new(2010, 2012)))[0];
    assert_eq!((s.count, s.missing), (1, 2));
    assert_eq!(s.max, Some(5.0));

    let empty = &entity_summary(&ds, Some(YearRange::new(2000, 2001)))[0];
    assert_eq!(empty.count, 0);
    assert_eq!(empty.mean, None);
    assert_eq!(empty.median, None);
}
