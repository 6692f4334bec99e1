use tbviz::YearRange;
use tbviz::loader::{JoinSide, merge, parse_long_csv, parse_wide_csv};

const LONG: &str = "\
Country,Year,Value,Flag
Chile,2010,12.5,x
Chile,2011,,x
Chile,2011,14.0,x
,2010,3.0,x
Peru,2010,n/a,x
Peru,2011,-4,x
Peru,2012,7,x
Peru,1999,1,x
";

#[test]
fn long_table_groups_by_country() {
    let (ds, report) = parse_long_csv(LONG, Some(YearRange::new(2010, 2012))).unwrap();
    assert_eq!(ds.names(), ["Chile", "Peru"]);
    assert_eq!(ds.years(), [2010, 2011, 2012]);

    let chile = ds.entity("Chile").unwrap();
    assert_eq!(chile.value(2010), Some(12.5));
    // the later row wins
    assert_eq!(chile.value(2011), Some(14.0));
    assert_eq!(chile.value(2012), None);

    let peru = ds.entity("Peru").unwrap();
    assert_eq!(peru.value(2010), None);
    assert_eq!(peru.value(2012), Some(7.0));

    assert_eq!(report.rows, 8);
    assert_eq!(report.dropped_empty_entity, 1);
    assert_eq!(report.duplicates, 1);
    let reasons: Vec<&str> = report.issues.iter().map(|i| i.reason.as_str()).collect();
    assert_eq!(reasons, ["not a number", "negative value"]);
    assert_eq!(report.issues[0].row, 5);
}

#[test]
fn long_table_without_window_keeps_every_year() {
    let (ds, _) = parse_long_csv(LONG, None).unwrap();
    assert_eq!(ds.years(), [1999, 2010, 2011, 2012]);
}

#[test]
fn missing_column_is_an_error() {
    let err = parse_long_csv("Country,Value\nChile,1\n", None).unwrap_err();
    assert!(err.to_string().contains("Year"), "{err}");
}

#[test]
fn wide_table_reads_year_columns() {
    let text = "\
COU,Country,Note,2000,2001,20021
CHL,Chile,a,15,16.5,9
PER,Peru,b,,120,9
,European Union,c,1,1,1
,,d,2,2,2
";
    let (ds, report) = parse_wide_csv(text, None).unwrap();
    assert_eq!(ds.names(), ["Chile", "Peru", "European Union"]);
    assert_eq!(ds.entity("European Union").unwrap().entity.code, None);
    assert_eq!(ds.years(), [2000, 2001]);
    let peru = ds.entity("Peru").unwrap();
    assert_eq!(peru.entity.code.as_deref(), Some("PER"));
    assert_eq!(peru.value(2000), None);
    assert_eq!(peru.value(2001), Some(120.0));
    assert_eq!(report.dropped_empty_entity, 1);
    assert!(report.issues.is_empty());
}

#[test]
fn long_table_keeps_named_rows_without_code() {
    let (ds, report) = parse_long_csv(
        "COU,Country,Year,Value\nCHL,Chile,2010,3\n,European Union,2010,40\n,,2010,1\n",
        None,
    )
    .unwrap();
    assert_eq!(ds.names(), ["Chile", "European Union"]);
    let eu = ds.entity("European Union").unwrap();
    assert_eq!(eu.entity.code, None);
    assert_eq!(eu.value(2010), Some(40.0));
    assert_eq!(ds.entity("Chile").unwrap().entity.code.as_deref(), Some("CHL"));
    assert_eq!(report.dropped_empty_entity, 1);
}

#[test]
fn wide_table_counts_repeated_rows() {
    let text = "COU,Country,2010,2011\nCHL,Chile,15,16\nPER,Peru,5,6\nCHL,Chile,17,18\n";
    let (ds, report) = parse_wide_csv(text, None).unwrap();
    assert_eq!(ds.names(), ["Chile", "Peru"]);
    let chile = ds.entity("Chile").unwrap();
    assert_eq!(chile.value(2010), Some(17.0));
    assert_eq!(chile.value(2011), Some(18.0));
    assert_eq!(report.duplicates, 2);
    assert_eq!(report.rows, 3);
}

#[test]
fn merge_keeps_the_intersection_in_sales_order() {
    let (incidence, _) = parse_wide_csv(
        "COU,Country,2010,2011\nCHL,Chile,15,16\nPER,Peru,120,110\nARG,Argentina,25,\n",
        None,
    )
    .unwrap();
    let (sales, _) = parse_long_csv(
        "Country,Year,Value\nPeru,2010,3\nSpain,2010,40\nChile,2011,5\n",
        None,
    )
    .unwrap();
    let (merged, misses) = merge(&incidence, &sales, &[2010, 2011]);

    let names: Vec<&str> = merged.iter().map(|r| r.name()).collect();
    assert_eq!(names, ["Peru", "Chile"]);
    let chile = &merged[1];
    assert_eq!(chile.incidence.len(), 2);
    assert_eq!(chile.sales[0].value, None);
    assert_eq!(chile.sales[1].value, Some(5.0));

    let mut missed: Vec<(&str, JoinSide)> = misses
        .iter()
        .map(|m| (m.entity.as_str(), m.missing_from))
        .collect();
    missed.sort_by_key(|(name, _)| *name);
    assert_eq!(
        missed,
        [("Argentina", JoinSide::Sales), ("Spain", JoinSide::Incidence)]
    );
}
