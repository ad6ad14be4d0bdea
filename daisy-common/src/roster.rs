//! Student roster loaded from the CSV export
//!
//! The roster is read once at startup and shared read-only afterwards.
//! A missing file yields an empty roster so the portal can still start;
//! individual malformed rows are skipped.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::models::Student;
use crate::{Error, Result};

const ADMISSION_NUMBER_COLUMN: &str = "Admission Number";
const NAME_COLUMN: &str = "Name";
const DEPARTMENT_COLUMN: &str = "Department";
const BIOGRAPHY_COLUMN: &str = "Small Biography";

/// Trim and uppercase an admission number
pub fn normalize_admission_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Immutable admission number → student mapping
#[derive(Debug, Default, Clone)]
pub struct RosterStore {
    students: HashMap<String, Student>,
}

impl RosterStore {
    /// Load the roster from `path`
    ///
    /// A missing file is logged and produces an empty roster.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Roster file not found: {} (starting with empty roster)", path.display());
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        let roster = Self::from_reader(file)?;
        info!("Loaded {} students from {}", roster.len(), path.display());
        Ok(roster)
    }

    /// Parse a roster from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::Roster(format!("Failed to read header row: {}", e)))?
            .clone();

        let mut students = HashMap::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(row = index + 2, "Skipping malformed roster row: {}", e);
                    continue;
                }
            };

            let row: BTreeMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();

            match student_from_row(row) {
                Some(student) => {
                    if students.contains_key(&student.admission_number) {
                        debug!(
                            admission_number = %student.admission_number,
                            "Duplicate roster row, later row wins"
                        );
                    }
                    students.insert(student.admission_number.clone(), student);
                }
                None => debug!(row = index + 2, "Dropping roster row without admission number"),
            }
        }

        Ok(Self { students })
    }

    /// Build a roster directly from students (tests, tooling)
    pub fn from_students<I: IntoIterator<Item = Student>>(students: I) -> Self {
        Self {
            students: students
                .into_iter()
                .map(|mut s| {
                    s.admission_number = normalize_admission_number(&s.admission_number);
                    (s.admission_number.clone(), s)
                })
                .collect(),
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, admission_number: &str) -> Option<&Student> {
        self.students.get(&normalize_admission_number(admission_number))
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    /// Students whose department matches case-insensitively, sorted by admission number
    pub fn by_department(&self, department: &str) -> Vec<&Student> {
        let wanted = department.trim().to_lowercase();
        let mut matches: Vec<&Student> = self
            .students
            .values()
            .filter(|s| s.department.trim().to_lowercase() == wanted)
            .collect();
        matches.sort_by(|a, b| a.admission_number.cmp(&b.admission_number));
        matches
    }
}

fn student_from_row(mut row: BTreeMap<String, String>) -> Option<Student> {
    let admission_number = normalize_admission_number(&row.remove(ADMISSION_NUMBER_COLUMN)?);
    if admission_number.is_empty() {
        return None;
    }

    let name = row.remove(NAME_COLUMN).unwrap_or_default().trim().to_string();
    let department = row.remove(DEPARTMENT_COLUMN).unwrap_or_default().trim().to_string();
    let default_biography = row.remove(BIOGRAPHY_COLUMN).unwrap_or_default().trim().to_string();

    Some(Student {
        admission_number,
        name,
        department,
        default_biography,
        fields: row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Admission Number,Name,Department,Small Biography,Age
 a100 ,Alice,Germans,Loves reading,12
B200,Bob,Italians,\"Plays football, sings\",13
,Nobody,Germans,,10
c300,Carol,germans ,,11
";

    #[test]
    fn test_lookup_is_case_insensitive_and_trimmed() {
        let roster = RosterStore::from_reader(SAMPLE.as_bytes()).unwrap();
        let alice = roster.get("A100").expect("A100 present");
        assert_eq!(alice.name, "Alice");
        assert!(roster.get(" a100").is_some());
        assert!(roster.get("b200").is_some());
    }

    #[test]
    fn test_rows_without_admission_number_dropped() {
        let roster = RosterStore::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(roster.len(), 3);
        assert!(roster.students().all(|s| s.name != "Nobody"));
    }

    #[test]
    fn test_quoted_fields_and_extra_columns() {
        let roster = RosterStore::from_reader(SAMPLE.as_bytes()).unwrap();
        let bob = roster.get("B200").unwrap();
        assert_eq!(bob.default_biography, "Plays football, sings");
        assert_eq!(bob.fields.get("Age").map(String::as_str), Some("13"));
        assert!(!bob.fields.contains_key("Name"));
    }

    #[test]
    fn test_by_department_matches_loosely() {
        let roster = RosterStore::from_reader(SAMPLE.as_bytes()).unwrap();
        let germans: Vec<_> = roster
            .by_department("GERMANS")
            .into_iter()
            .map(|s| s.admission_number.as_str())
            .collect();
        assert_eq!(germans, vec!["A100", "C300"]);
    }

    #[test]
    fn test_short_rows_are_kept_with_defaults() {
        let csv = "Admission Number,Name,Department\nD400,Dan\n";
        let roster = RosterStore::from_reader(csv.as_bytes()).unwrap();
        let dan = roster.get("d400").unwrap();
        assert_eq!(dan.department, "");
        assert_eq!(dan.default_biography, "");
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped_alone() {
        let mut csv = b"Admission Number,Name\nA1,Ann\nB2,".to_vec();
        csv.extend_from_slice(&[0xff, 0xfe]);
        csv.extend_from_slice(b"\nC3,Cat\n");

        let roster = RosterStore::from_reader(csv.as_slice()).unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.get("A1").is_some());
        assert!(roster.get("B2").is_none());
        assert_eq!(roster.get("C3").unwrap().name, "Cat");
    }

    #[test]
    fn test_from_students_normalizes_admission_number() {
        let roster = RosterStore::from_students(vec![Student {
            admission_number: " a100 ".to_string(),
            name: "Alice".to_string(),
            department: "Germans".to_string(),
            default_biography: String::new(),
            fields: BTreeMap::new(),
        }]);
        assert_eq!(roster.get("A100").unwrap().admission_number, "A100");
    }

    #[test]
    fn test_missing_file_yields_empty_roster() {
        let roster = RosterStore::load(Path::new("/nonexistent/daisy/students.csv")).unwrap();
        assert!(roster.is_empty());
        assert!(roster.get("A100").is_none());
    }
}
