use housing_report::{
    loader, pipeline, AggregationType, AnalysisSettings, PeriodType, SortCriteria,
    TransactionRecord,
};
use std::io::Write;

fn rec(
    community: &str,
    district: &str,
    date: &str,
    price: f64,
    valuation: f64,
) -> TransactionRecord {
    TransactionRecord {
        date: date.to_string(),
        community: community.to_string(),
        price,
        valuation,
        city: "Riverton".to_string(),
        district: district.to_string(),
        lat: Some(24.95),
        lng: Some(121.22),
        address: String::new(),
    }
}

fn oak_gardens() -> Vec<TransactionRecord> {
    vec![
        rec("Oak Gardens", "North", "20230101", 1_000_000.0, 1_050_000.0),
        rec("Oak Gardens", "North", "20230201", 1_100_000.0, 1_080_000.0),
        rec("Oak Gardens", "North", "20230301", 1_200_000.0, 1_150_000.0),
    ]
}

#[test]
fn oak_gardens_end_to_end() {
    let records = oak_gardens();
    let results = pipeline::recompute(&records, &AnalysisSettings::default()).unwrap();

    let stat = &results.community_stats[0];
    assert_eq!(stat.name, "Oak Gardens");
    assert_eq!(stat.count, 3);
    assert_eq!(stat.avg_price, 1_100_000.0);
    assert_eq!(stat.min_price, 1_000_000.0);
    assert_eq!(stat.max_price, 1_200_000.0);
    let expected_mape =
        (50_000.0 / 1_050_000.0 + 20_000.0 / 1_080_000.0 + 50_000.0 / 1_150_000.0) / 3.0;
    let expected_mpe =
        (-50_000.0 / 1_050_000.0 + 20_000.0 / 1_080_000.0 + 50_000.0 / 1_150_000.0) / 3.0;
    assert!((stat.mape - expected_mape).abs() < 1e-9);
    assert!((stat.mpe - expected_mpe).abs() < 1e-9);

    // Three monthly points at ordinals [0, 1, 2]: an exact line.
    let line = results.trend_lines.get("Oak Gardens").unwrap();
    assert!((line.slope - 100_000.0).abs() < 1e-6);
    assert!((line.intercept - 1_000_000.0).abs() < 1e-6);
    assert!((line.r2 - 1.0).abs() < 1e-12);
    assert!(!line.is_log_transformed);

    // Fitted values land on every row in the observed span.
    assert_eq!(results.price_history.len(), 3);
    for (i, row) in results.price_history.iter().enumerate() {
        let fitted = *row.trend.get("Oak Gardens").unwrap();
        assert!((fitted - (1_000_000.0 + 100_000.0 * i as f64)).abs() < 1e-6);
    }

    // Map view mirrors the basic-stats grouping.
    assert_eq!(results.locations.len(), 1);
    assert_eq!(results.locations[0].count, 3);
    assert_eq!(results.locations[0].avg_price, 1_100_000.0);
}

#[test]
fn counts_partition_the_filtered_set() {
    let records = vec![
        rec("A", "North", "20230101", 100.0, 0.0),
        rec("A", "North", "20230201", 110.0, 0.0),
        rec("B", "South", "20230101", 200.0, 0.0),
        rec("C", "North", "20230301", 300.0, 0.0),
    ];
    let settings = AnalysisSettings {
        selected_districts: vec!["North".to_string()],
        ..AnalysisSettings::default()
    };
    let filtered = pipeline::filter_records(&records, &settings);
    let results = pipeline::recompute(&records, &settings).unwrap();
    let total: usize = results.community_stats.iter().map(|s| s.count).sum();
    assert_eq!(total, filtered.len());
    assert_eq!(total, 3);
}

#[test]
fn history_stays_sparse_through_the_pipeline() {
    let records = vec![
        rec("A", "North", "20230101", 100.0, 0.0),
        rec("A", "North", "20230301", 300.0, 0.0),
        rec("B", "North", "20230201", 900.0, 0.0),
        rec("B", "North", "20230301", 950.0, 0.0),
    ];
    let results = pipeline::recompute(&records, &AnalysisSettings::default()).unwrap();

    // A field exists only where the community actually traded.
    for row in &results.price_history {
        for name in row.prices.keys() {
            let matching = records
                .iter()
                .filter(|r| {
                    &r.community == name
                        && housing_report::util::format_period(&r.date, PeriodType::Month)
                            .as_deref()
                            == Some(row.period.as_str())
                })
                .count();
            assert!(matching >= 1, "{} has no trades in {}", name, row.period);
        }
    }
    assert!(!results.price_history[0].prices.contains_key("B"));
    assert!(!results.price_history[1].prices.contains_key("A"));
}

#[test]
fn recomputation_is_deterministic() {
    let mut records = oak_gardens();
    records.push(rec("Elm Court", "South", "20230215", 800_000.0, 790_000.0));
    records.push(rec("Elm Court", "South", "20230315", 820_000.0, 815_000.0));
    let settings = AnalysisSettings {
        aggregation_type: AggregationType::Median,
        use_log_transform: true,
        ..AnalysisSettings::default()
    };

    let a = pipeline::recompute(&records, &settings).unwrap();
    let b = pipeline::recompute(&records, &settings).unwrap();
    assert_eq!(a.community_stats, b.community_stats);
    assert_eq!(a.price_history, b.price_history);
    assert_eq!(a.trend_lines, b.trend_lines);
    assert_eq!(a.locations, b.locations);
    assert_eq!(a.selected_communities, b.selected_communities);
}

#[test]
fn log_transform_flags_every_fitted_line() {
    let records = oak_gardens();
    let settings = AnalysisSettings {
        use_log_transform: true,
        ..AnalysisSettings::default()
    };
    let results = pipeline::recompute(&records, &settings).unwrap();
    let line = results.trend_lines.get("Oak Gardens").unwrap();
    assert!(line.is_log_transformed);
    // Back-transformed fitted values sit in price units, near the data.
    let first = *results.price_history[0].trend.get("Oak Gardens").unwrap();
    assert!((first - 1_000_000.0).abs() / 1_000_000.0 < 0.02);
}

#[test]
fn quarter_mode_buckets_and_fits() {
    let records = vec![
        rec("A", "North", "20230110", 100.0, 0.0),
        rec("A", "North", "20230310", 200.0, 0.0),
        rec("A", "North", "20230410", 400.0, 0.0),
        rec("A", "North", "20230710", 700.0, 0.0),
    ];
    let settings = AnalysisSettings {
        period_type: PeriodType::Quarter,
        ..AnalysisSettings::default()
    };
    let results = pipeline::recompute(&records, &settings).unwrap();
    let periods: Vec<&str> = results
        .price_history
        .iter()
        .map(|r| r.period.as_str())
        .collect();
    assert_eq!(periods, vec!["2023-Q1", "2023-Q2", "2023-Q3"]);
    assert_eq!(results.price_history[0].prices.get("A"), Some(&150.0));
    assert!(results.trend_lines.contains_key("A"));
}

#[test]
fn sort_criteria_drive_community_selection() {
    // "Noisy" misses its valuations badly; "Steady" tracks them closely but
    // trades more often.
    let records = vec![
        rec("Noisy", "North", "20230101", 150.0, 100.0),
        rec("Noisy", "North", "20230201", 60.0, 100.0),
        rec("Steady", "North", "20230101", 101.0, 100.0),
        rec("Steady", "North", "20230201", 99.0, 100.0),
        rec("Steady", "North", "20230301", 100.0, 100.0),
    ];
    let settings = AnalysisSettings {
        top_n: 1,
        sort_criteria: SortCriteria::CountDesc,
        ..AnalysisSettings::default()
    };
    let results = pipeline::recompute(&records, &settings).unwrap();
    assert_eq!(results.available_communities, vec!["Steady".to_string()]);

    let settings = AnalysisSettings {
        top_n: 1,
        sort_criteria: SortCriteria::MapeDesc,
        ..settings
    };
    let results = pipeline::recompute(&records, &settings).unwrap();
    assert_eq!(results.available_communities, vec!["Noisy".to_string()]);
}

#[test]
fn csv_to_results_round_trip() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        "TransactionDate,Community,Price,Valuation,City,District,Latitude,Longitude,Address"
    )
    .unwrap();
    writeln!(
        f,
        "20230101,Oak Gardens,1000000,1050000,Riverton,North,24.95,121.22,1 Main St"
    )
    .unwrap();
    writeln!(
        f,
        "20230201,Oak Gardens,1100000,1080000,Riverton,North,24.95,121.22,1 Main St"
    )
    .unwrap();
    writeln!(f, "not-a-date,Oak Gardens,1,1,,,,,").unwrap();
    f.flush().unwrap();

    let (records, report) = loader::load_and_clean(f.path().to_str().unwrap()).unwrap();
    assert_eq!(report.valid_rows, 2);
    assert_eq!(report.skipped_rows, 1);

    let results = pipeline::recompute(&records, &AnalysisSettings::default()).unwrap();
    assert_eq!(results.community_stats[0].count, 2);
    let line = results.trend_lines.get("Oak Gardens").unwrap();
    assert_eq!(line.r2, 1.0);
    assert!((line.slope - 100_000.0).abs() < 1e-6);
}
