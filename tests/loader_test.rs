use std::fs;
use std::io::Cursor;

use course_catalog::loader::{
    export_courses_to_file, load_courses_from_file, parse_line, read_courses, write_courses,
    LoadReport,
};
use course_catalog::{CatalogError, Course, CourseIndex};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
#[case("CS101,Intro", "CS101", "Intro", &[])]
#[case(" CS201 , Data Structures , CS101 ", "CS201", "Data Structures", &["CS101"])]
#[case("CS300,Algorithms,CS201,MATH201,CS201", "CS300", "Algorithms", &["CS201", "MATH201", "CS201"])]
#[case("CS400,Capstone,CS300,,", "CS400", "Capstone", &["CS300"])]
fn parse_line_accepts_valid_rows(
    #[case] line: &str,
    #[case] number: &str,
    #[case] title: &str,
    #[case] prerequisites: &[&str],
) {
    let course = parse_line(line).expect("row parses");
    assert_eq!(course.number, number);
    assert_eq!(course.title, title);
    assert_eq!(course.prerequisites, prerequisites);
}

#[rstest]
#[case("")]
#[case("CS101")]
#[case("CS101,")]
#[case(",Intro")]
#[case("   ,   ")]
fn parse_line_rejects_rows_without_number_and_title(#[case] line: &str) {
    assert!(parse_line(line).is_none());
}

#[test]
fn two_field_row_has_empty_prerequisites() {
    let course = parse_line("CS101,Intro").unwrap();
    assert!(course.prerequisites.is_empty());
}

#[test]
fn read_courses_reports_malformed_lines_and_ignores_blank_ones() {
    let input = "CS101,Intro\n\nbroken\nCS201,Data,CS101\n   \nalso-broken\n";
    let parsed = read_courses(Cursor::new(input)).unwrap();

    assert_eq!(parsed.courses.len(), 2);
    assert_eq!(parsed.skipped, vec![3, 6]);
}

#[test]
fn load_counts_duplicates_and_keeps_first_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("courses.csv");
    fs::write(
        &path,
        "CS201,Data Structures,CS101\nCS101,Intro\nCS101,Intro Again\nnope\n",
    )
    .unwrap();

    let mut index = CourseIndex::new();
    let report = load_courses_from_file(&path, &mut index).unwrap();

    assert_eq!(
        report,
        LoadReport {
            loaded: 2,
            duplicates: 1,
            skipped: vec![4],
        }
    );
    assert_eq!(index.find("CS101").unwrap().title, "Intro");
}

#[test]
fn missing_file_is_reported_and_index_is_untouched() {
    let dir = tempdir().unwrap();
    let mut index = CourseIndex::new();
    index.insert(Course::new("CS101", "Intro", Vec::new()));

    let err = load_courses_from_file(&dir.path().join("missing.csv"), &mut index).unwrap_err();

    assert!(matches!(err, CatalogError::Open { .. }));
    assert!(err.to_string().contains("missing.csv"));
    assert_eq!(index.len(), 1);
}

#[test]
fn write_courses_uses_loader_layout() {
    let courses = [
        Course::new("CS101", "Intro", Vec::new()),
        Course::new("CS201", "Data", vec!["CS101".into(), "MATH100".into()]),
    ];
    let mut out = Vec::new();
    let written = write_courses(&mut out, &courses).unwrap();

    assert_eq!(written, 2);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "CS101,Intro\nCS201,Data,CS101,MATH100\n"
    );
}

#[test]
fn exported_file_loads_back_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.csv");
    let index: CourseIndex = vec![
        Course::new("CS300", "Algorithms", vec!["CS201".into()]),
        Course::new("CS101", "Intro", Vec::new()),
        Course::new("CS201", "Data", vec!["CS101".into()]),
    ]
    .into_iter()
    .collect();

    assert_eq!(export_courses_to_file(&path, &index).unwrap(), 3);

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("CS101,Intro\n"));

    let mut reloaded = CourseIndex::new();
    load_courses_from_file(&path, &mut reloaded).unwrap();
    let original: Vec<&Course> = index.iter().collect();
    let copy: Vec<&Course> = reloaded.iter().collect();
    assert_eq!(original, copy);
}
