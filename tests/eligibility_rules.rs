use grad_check::{
    config::Curriculum,
    eligibility::{
        deduplicate, evaluate, Deficiency, FAILURE_HEADER, SUCCESS_MARKER, WARNINGS_HEADER,
    },
    record::{CourseRecord, Grade},
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

fn rec(code: &str, ects: &str, grade: Grade) -> CourseRecord {
    CourseRecord::new(code, "Ders", dec("3.0"), dec(ects), grade)
}

/// Internship, one university elective, one faculty elective, ten
/// departmental electives and a required course: exactly 240 ECTS.
fn eligible_transcript() -> Vec<CourseRecord> {
    let mut recs = vec![
        rec("BM399", "5.0", Grade::YT),
        rec("US101", "5.0", Grade::BA),
        rec("MS101", "5.0", Grade::BA),
    ];
    for code in [
        "BM420", "BM421", "BM422", "BM423", "BM424", "BM425", "BM426", "BM427", "BM428", "BM429",
    ] {
        recs.push(rec(code, "6.0", Grade::BB));
    }
    recs.push(rec("BM101", "165.0", Grade::CC));
    recs
}

#[test]
fn eligible_transcript_passes() {
    let report = evaluate(&Curriculum::default(), &eligible_transcript());
    assert!(report.satisfied);
    assert!(report.deficiencies.is_empty());
    assert_eq!(report.render(), SUCCESS_MARKER);
}

#[test]
fn empty_transcript_reports_every_missing_requirement() {
    let report = evaluate(&Curriculum::default(), &[]);
    assert!(!report.satisfied);
    assert_eq!(
        report.deficiencies,
        vec![
            Deficiency::InsufficientEcts {
                total: Decimal::ZERO,
                required: Decimal::from(240)
            },
            Deficiency::MissingUniversityElective {
                found: 0,
                required: 1
            },
            Deficiency::MissingFacultyElective {
                found: 0,
                required: 1
            },
            Deficiency::MissingDepartmentalElectives {
                found: 0,
                required: 10
            },
            Deficiency::InternshipNotCompleted {
                codes: vec!["BM399".into(), "BM499".into()]
            },
        ]
    );
}

#[test]
fn fractional_ects_sum_exactly_to_the_threshold() {
    // Twenty 5.1 ECTS courses plus 138 make exactly 240; binary floats
    // land just below it.
    let mut recs = vec![
        rec("BM399", "5.1", Grade::YT),
        rec("US101", "5.1", Grade::BA),
        rec("MS101", "5.1", Grade::BA),
    ];
    for code in [
        "BM420", "BM421", "BM422", "BM423", "BM424", "BM425", "BM426", "BM427", "BM428", "BM429",
        "BM101", "BM102", "BM103", "BM104", "BM105", "BM106", "BM107",
    ] {
        recs.push(rec(code, "5.1", Grade::BB));
    }
    recs.push(rec("BM200", "138.0", Grade::CC));
    assert_eq!(recs.len(), 21);

    let report = evaluate(&Curriculum::default(), &recs);
    assert!(report.satisfied, "{:?}", report.deficiencies);
    assert!(report.deficiencies.is_empty());
    assert_eq!(report.render(), SUCCESS_MARKER);
}

#[test]
fn one_hundredth_short_of_the_threshold_fails() {
    let mut recs = eligible_transcript();
    recs.retain(|r| r.code != "BM101");
    recs.push(rec("BM101", "164.99", Grade::CC));
    let report = evaluate(&Curriculum::default(), &recs);
    assert_eq!(
        report.deficiencies,
        vec![Deficiency::InsufficientEcts {
            total: dec("239.99"),
            required: Decimal::from(240)
        }]
    );
    assert!(report.render().contains("Total ECTS is 239.99;"));
}

#[test]
fn deduplicate_keeps_last_occurrence() {
    let recs = vec![
        rec("BM101", "6.0", Grade::FF),
        rec("BM102", "6.0", Grade::AA),
        rec("BM101", "6.0", Grade::CC),
    ];
    let unique = deduplicate(&recs);
    assert_eq!(unique.len(), 2);
    assert_eq!(unique["BM101"].grade, Grade::CC);
}

#[test]
fn repeated_course_warns_without_blocking() {
    let mut recs = eligible_transcript();
    recs.insert(0, rec("BM101", "165.0", Grade::FF));
    let report = evaluate(&Curriculum::default(), &recs);

    assert_eq!(report.deficiencies, vec![Deficiency::RepeatedCourses]);
    assert!(report.satisfied);
    let rendered = report.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], SUCCESS_MARKER);
    assert_eq!(lines[1], WARNINGS_HEADER);
    assert!(lines[2].starts_with("- The same course was taken more than once"));
}

#[test]
fn later_failing_attempt_overrides_earlier_pass() {
    let mut recs = eligible_transcript();
    recs.push(rec("BM101", "165.0", Grade::FF));
    let report = evaluate(&Curriculum::default(), &recs);

    assert!(!report.satisfied);
    assert!(report.deficiencies.contains(&Deficiency::RepeatedCourses));
    assert!(report.deficiencies.contains(&Deficiency::FailedCourses {
        codes: vec!["BM101".into()]
    }));
}

#[test]
fn ects_uses_deduplicated_records() {
    let mut recs = eligible_transcript();
    recs.push(rec("BM429", "6.0", Grade::AA));
    let report = evaluate(&Curriculum::default(), &recs);
    assert!(!report
        .deficiencies
        .iter()
        .any(|d| matches!(d, Deficiency::InsufficientEcts { .. })));
}

#[test]
fn ects_shortfall_reports_total() {
    let recs: Vec<_> = eligible_transcript()
        .into_iter()
        .filter(|r| r.code != "BM101")
        .collect();
    let report = evaluate(&Curriculum::default(), &recs);
    assert_eq!(
        report.deficiencies,
        vec![Deficiency::InsufficientEcts {
            total: Decimal::from(75),
            required: Decimal::from(240)
        }]
    );
    assert!(report
        .render()
        .contains("Total ECTS is 75.0; at least 240 ECTS is required"));
}

#[test]
fn departmental_elective_count_is_reported() {
    let recs: Vec<_> = eligible_transcript()
        .into_iter()
        .filter(|r| r.code != "BM428" && r.code != "BM429")
        .map(|r| {
            if r.code == "BM101" {
                rec("BM101", "177.0", Grade::CC)
            } else {
                r
            }
        })
        .collect();
    let report = evaluate(&Curriculum::default(), &recs);
    assert_eq!(
        report.deficiencies,
        vec![Deficiency::MissingDepartmentalElectives {
            found: 8,
            required: 10
        }]
    );
    assert!(report.render().contains("Currently 8"));
}

#[test]
fn insufficient_internship_is_distinct_from_missing() {
    let recs: Vec<_> = eligible_transcript()
        .into_iter()
        .map(|r| {
            if r.code == "BM399" {
                rec("BM399", "5.0", Grade::YZ)
            } else {
                r
            }
        })
        .collect();
    let report = evaluate(&Curriculum::default(), &recs);

    assert!(!report.satisfied);
    assert_eq!(
        report.deficiencies,
        vec![Deficiency::InsufficientInternship {
            code: "BM399".into()
        }]
    );
}

#[test]
fn either_internship_code_can_fail() {
    let mut recs = eligible_transcript();
    recs.push(rec("BM499", "0.0", Grade::YZ));
    let report = evaluate(&Curriculum::default(), &recs);
    assert_eq!(
        report.deficiencies,
        vec![Deficiency::InsufficientInternship {
            code: "BM499".into()
        }]
    );
}

#[test]
fn failing_codes_are_listed_once_and_sorted() {
    let mut recs = eligible_transcript();
    recs.push(rec("FIZ101", "0.0", Grade::FF));
    recs.push(rec("AIB101", "0.0", Grade::YZ));
    recs.push(rec("MAT101", "0.0", Grade::FD));
    recs.push(rec("FIZ101", "0.0", Grade::FD));
    let report = evaluate(&Curriculum::default(), &recs);

    assert!(report.deficiencies.contains(&Deficiency::FailedCourses {
        codes: vec!["AIB101".into(), "FIZ101".into(), "MAT101".into()]
    }));
}

#[test]
fn failure_render_lists_each_deficiency() {
    let report = evaluate(&Curriculum::default(), &[rec("BM101", "6.0", Grade::FF)]);
    let rendered = report.render();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], FAILURE_HEADER);
    assert_eq!(lines.len(), report.deficiencies.len() + 1);
    assert!(lines[1..].iter().all(|l| l.starts_with("- ")));
    assert!(rendered.contains("Failed course(s): BM101"));
}

#[test]
fn curriculum_tables_are_injectable() {
    let curriculum = Curriculum {
        min_total_ects: Decimal::from(10),
        university_elective_prefixes: vec!["UNI".into()],
        min_university_electives: 1,
        faculty_elective_prefixes: vec![],
        min_faculty_electives: 0,
        departmental_electives: vec!["CS500".into()],
        min_departmental_electives: 1,
        internship_codes: vec!["CS399".into()],
    };
    let recs = vec![
        rec("UNI100", "4.0", Grade::AA),
        rec("CS500", "4.0", Grade::BA),
        rec("CS399", "2.0", Grade::YT),
    ];
    let report = evaluate(&curriculum, &recs);
    assert!(report.satisfied, "{:?}", report.deficiencies);
}
