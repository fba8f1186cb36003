use material_readiness::analysis::{analyze, Analysis, AnalysisOptions};
use material_readiness::error::AnalysisError;
use material_readiness::loader::load_bytes;
use material_readiness::{logging, util};
use material_readiness::types::{ItemStatus, RawRecord, Readiness};
use material_readiness::warnings::WarningKind;
use std::collections::BTreeSet;

const STUDY: &str = "\
SEC order,SEC Number,product,item,description,req_qty,allocated_qty,balance,supply_type,source,locater,supplier,delay,availability_date,ROH delivery,SEC delivery,Asn Expected Date,Asn Creation Date
SO-100,SEC-1,PUMP-A,BOLT-12,Hex bolt,100,100,,inventory,free_stock,1-1-1-1,,0,,2024-05-01,2024-06-01,,
SO-100,SEC-1,PUMP-A,SEAL-3,Shaft seal,20,0,20,PO,,,Acme,5,2024-06-20,2024-05-01,2024-06-01,,
SO-100,SEC-1,PUMP-A,GASKET,Gasket,10,0,10,PR,,,,0,,2024-05-01,2024-06-01,,
SO-200,SEC-2,VALVE-B,SPRING,Spring,10,0,10,PO,,,Bolt,0,2024-07-15,2024-05-01,2024-06-01,,
SO-300,SEC-3,FAN-C,BLADE,Blade,8,0,8,PO,,,Core,0,2024-05-20,2024-05-01,2024-06-01,,
SO-300,SEC-3,FAN-C,MOTOR,Motor,1,0,1,PO,,,Acme,0,,2024-05-01,2024-06-01,2024-05-25,2024-05-02
SO-400,SEC-4,FAN-C,HUB,Hub,4,4,0,QC,,,Delta,2,,2024-05-01,2024-06-01,,
,SEC-5,PUMP-A,ORPHAN,No order,1,0,,PO,,,Acme,0,,,,,
SO-500,SEC-5,GEAR-D,SHAFT,Shaft,5,5,0,inventory,SO-100,,,bad,,,not a date,,
";

fn study() -> Vec<RawRecord> {
    load_bytes(STUDY.as_bytes()).unwrap().records
}

fn run(records: &[RawRecord]) -> Analysis {
    analyze(records, &AnalysisOptions::default()).unwrap()
}

fn status_of(a: &Analysis, item: &str) -> ItemStatus {
    let idx = a.items.iter().position(|it| it.item == item).unwrap();
    a.statuses[idx]
}

#[test]
fn classifies_every_scenario() {
    logging::init_test();
    let a = run(&study());
    assert_eq!(status_of(&a, "BOLT-12"), ItemStatus::Available);
    assert_eq!(status_of(&a, "SEAL-3"), ItemStatus::Delayed);
    assert_eq!(status_of(&a, "GASKET"), ItemStatus::ShortNoEta);
    assert_eq!(status_of(&a, "SPRING"), ItemStatus::AtRisk);
    assert_eq!(status_of(&a, "BLADE"), ItemStatus::ShortWithEta);
    assert_eq!(status_of(&a, "MOTOR"), ItemStatus::InTransit);
    assert_eq!(status_of(&a, "HUB"), ItemStatus::Available);
}

#[test]
fn project_readiness_and_blockers() {
    let a = run(&study());
    let pump = a.project("SO-100", "PUMP-A").unwrap();
    assert_eq!(pump.readiness, Readiness::Blocked);
    let blockers: Vec<&str> = a
        .blocking_items(pump)
        .map(|(it, _)| it.item.as_str())
        .collect();
    assert_eq!(blockers, vec!["SEAL-3", "GASKET"]);

    assert_eq!(a.project("SO-200", "VALVE-B").unwrap().readiness, Readiness::Blocked);
    assert_eq!(a.project("SO-300", "FAN-C").unwrap().readiness, Readiness::Ready);
    assert_eq!(a.project("SO-400", "FAN-C").unwrap().readiness, Readiness::Ready);
    assert_eq!(a.metrics.total_projects, 5);
    assert_eq!(a.metrics.blocked_projects, 2);
}

#[test]
fn bad_rows_degrade_gracefully() {
    let a = run(&study());
    assert_eq!(a.items.len(), 8);
    let kinds: BTreeSet<String> = a.warnings.iter().map(|w| w.kind.to_string()).collect();
    assert!(kinds.contains(&WarningKind::RowSkipped.to_string()));
    assert!(kinds.contains(&WarningKind::NumericCoerced.to_string()));
    assert!(kinds.contains(&WarningKind::DateUnparseable.to_string()));
    let skipped = a
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::RowSkipped)
        .unwrap();
    assert_eq!(skipped.row, 8);
    assert_eq!(skipped.field, "SEC order");
    assert_eq!(a.metrics.warning_count, a.warnings.len());
}

#[test]
fn supplier_ranking() {
    let a = run(&study());
    let names: Vec<&str> = a.suppliers.iter().map(|s| s.supplier.as_str()).collect();
    // Acme and Delta each have one late line; Acme's mean delay is 2.5, Delta's 2.
    assert_eq!(names, vec!["Acme", "Delta", "Bolt", "Core"]);
    assert_eq!(a.suppliers[0].item_count, 2);
    assert_eq!(a.suppliers[0].max_delay, 5.0);
}

#[test]
fn rerun_is_byte_identical() {
    let records = study();
    let first = serde_json::to_string(&run(&records)).unwrap();
    let second = serde_json::to_string(&run(&records)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn input_order_does_not_change_results() {
    let records = study();
    let mut reversed = records.clone();
    reversed.reverse();
    let mut rotated = records.clone();
    rotated.rotate_left(3);

    let baseline = run(&records);
    for shuffled in [reversed, rotated] {
        let other = run(&shuffled);
        assert_eq!(other.projects.len(), baseline.projects.len());
        for (p, q) in baseline.projects.iter().zip(&other.projects) {
            assert_eq!(p.key, q.key);
            assert_eq!(p.readiness, q.readiness);
            let lhs: Vec<&str> = baseline.blocking_items(p).map(|(it, _)| it.item.as_str()).collect();
            let rhs: Vec<&str> = other.blocking_items(q).map(|(it, _)| it.item.as_str()).collect();
            assert_eq!(lhs, rhs);
        }
        let names = |a: &Analysis| -> Vec<String> {
            a.suppliers.iter().map(|s| s.supplier.clone()).collect()
        };
        assert_eq!(names(&baseline), names(&other));
        assert_eq!(baseline.metrics, other.metrics);
    }
}

#[test]
fn equal_suppliers_rank_by_name() {
    let csv = "\
SEC order,product,item,req_qty,allocated_qty,supplier,delay
SO-1,P,A,10,0,Zulu,3
SO-1,P,B,10,0,Alpha,3
";
    let a = run(&load_bytes(csv.as_bytes()).unwrap().records);
    let names: Vec<&str> = a.suppliers.iter().map(|s| s.supplier.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zulu"]);
}

#[test]
fn no_usable_rows_is_fatal() {
    let header_only = "SEC order,product,item\n";
    let records = load_bytes(header_only.as_bytes()).unwrap().records;
    let err = analyze(&records, &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyDataset { .. }));

    let all_bad = "SEC order,product,item\n,P,A\nSO-1,,A\n";
    let records = load_bytes(all_bad.as_bytes()).unwrap().records;
    match analyze(&records, &AnalysisOptions::default()) {
        Err(AnalysisError::EmptyDataset {
            total_rows,
            skipped_rows,
        }) => {
            assert_eq!(total_rows, 2);
            assert_eq!(skipped_rows, 2);
        }
        other => panic!("expected EmptyDataset, got {:?}", other.map(|a| a.items.len())),
    }
}

#[test]
fn tied_blockers_keep_content_order() {
    let csv = "\
SEC order,SEC Number,product,item,req_qty,allocated_qty,delay,availability_date,SEC delivery
SO-1,SEC-1,PUMP,BOLT,10,0,0,2024-07-01,2024-06-01
SO-1,SEC-2,PUMP,BOLT,10,0,0,2024-08-01,2024-06-01
SO-1,SEC-3,PUMP,BOLT,10,0,0,,2024-06-01
";
    let records = load_bytes(csv.as_bytes()).unwrap().records;
    let blockers = |records: &[RawRecord]| -> Vec<String> {
        let a = run(records);
        let p = a.project("SO-1", "PUMP").unwrap();
        a.blocking_items(p)
            .map(|(it, status)| {
                let eta = util::format_date(it.eta());
                format!("{}/{}/{}", it.sec_number, status.label(), eta)
            })
            .collect()
    };
    let baseline = blockers(&records);
    assert_eq!(
        baseline,
        vec![
            "SEC-1/AT_RISK/2024-07-01",
            "SEC-2/AT_RISK/2024-08-01",
            "SEC-3/SHORT_NO_ETA/N/A",
        ]
    );

    let mut reversed = records.clone();
    reversed.reverse();
    let mut rotated = records.clone();
    rotated.rotate_left(1);
    for shuffled in [reversed, rotated] {
        assert_eq!(blockers(&shuffled), baseline);
    }
}
