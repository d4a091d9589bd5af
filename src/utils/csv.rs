use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::model::class::{SchoolClass, Section};
use crate::model::student::{NewGuardian, NewStudent};

/// Header aliases accepted by the importer, keyed by canonical column name.
static HEADER_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("first_name", &["first_name", "firstname"][..]),
        ("last_name", &["last_name", "lastname"][..]),
        ("admission_no", &["admission_no", "admission_number"][..]),
        ("dob", &["dob", "date_of_birth", "birthdate"][..]),
        ("phone", &["phone", "phone_number"][..]),
        ("class", &["class", "class_name"][..]),
        ("section", &["section", "section_name"][..]),
    ])
});

/// Split CSV text into header-keyed rows.
///
/// First non-blank line is the header: fields trimmed, lower-cased, all
/// double-quotes removed. Data lines are comma-split with one surrounding
/// quote pair stripped per field; a line whose field count differs from the
/// header count is dropped with no recovery.
pub fn parse_csv(text: &str) -> Vec<HashMap<String, String>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_lowercase().replace('"', ""))
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        let values: Vec<String> = line
            .split(',')
            .map(|v| strip_quotes(v.trim()).to_string())
            .collect();
        if values.len() != headers.len() {
            continue;
        }
        rows.push(headers.iter().cloned().zip(values).collect());
    }
    rows
}

fn strip_quotes(field: &str) -> &str {
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

/// Request-scoped class/section name lookups, built once per import run.
pub struct RefLookups {
    classes: HashMap<String, u64>,
    sections: HashMap<(u64, String), u64>,
}

impl RefLookups {
    pub fn new(classes: &[SchoolClass], sections: &[Section]) -> Self {
        Self {
            classes: classes
                .iter()
                .map(|c| (c.name.to_lowercase(), c.id))
                .collect(),
            sections: sections
                .iter()
                .map(|s| ((s.class_id, s.name.to_lowercase()), s.id))
                .collect(),
        }
    }

    pub fn class_id(&self, name: &str) -> Option<u64> {
        self.classes.get(&name.to_lowercase()).copied()
    }

    pub fn section_id(&self, class_id: u64, name: &str) -> Option<u64> {
        self.sections
            .get(&(class_id, name.to_lowercase()))
            .copied()
    }
}

fn pick<'a>(row: &'a HashMap<String, String>, field: &str) -> Option<&'a str> {
    let aliases = HEADER_ALIASES
        .get(field)
        .copied()
        .unwrap_or(std::slice::from_ref(&field));
    aliases
        .iter()
        .filter_map(|a| row.get(*a))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Project one parsed row into a student record. Returns None when no first
/// name can be derived; an unresolvable class or section name leaves the
/// reference unset rather than failing the row.
pub fn map_row(row: &HashMap<String, String>, lookups: &RefLookups) -> Option<NewStudent> {
    let name_tokens: Vec<&str> = row
        .get("name")
        .map(|n| n.split_whitespace().collect())
        .unwrap_or_default();

    let first_name = pick(row, "first_name")
        .map(str::to_string)
        .or_else(|| name_tokens.first().map(|t| t.to_string()))?;

    let last_name = non_empty(pick(row, "last_name")).or_else(|| {
        let rest = name_tokens.get(1..).unwrap_or_default().join(" ");
        non_empty(Some(&rest))
    });

    let class_id = pick(row, "class").and_then(|name| lookups.class_id(name));
    let section_id = class_id.and_then(|cid| {
        pick(row, "section").and_then(|name| lookups.section_id(cid, name))
    });

    let guardians = non_empty(pick(row, "guardian_name"))
        .map(|name| {
            vec![NewGuardian {
                name,
                relation: non_empty(pick(row, "guardian_relation"))
                    .map(|r| r.to_lowercase())
                    .unwrap_or_else(|| "guardian".to_string()),
                phone: non_empty(pick(row, "guardian_phone")),
                email: non_empty(pick(row, "guardian_email")),
                occupation: non_empty(pick(row, "guardian_occupation")),
                address: non_empty(pick(row, "guardian_address")),
                is_primary: true,
            }]
        })
        .unwrap_or_default();

    Some(NewStudent {
        admission_no: non_empty(pick(row, "admission_no")),
        first_name,
        last_name,
        gender: non_empty(pick(row, "gender")).map(|g| g.to_lowercase()),
        dob: pick(row, "dob").and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        class_id,
        section_id,
        address: non_empty(pick(row, "address")),
        phone: non_empty(pick(row, "phone")),
        email: non_empty(pick(row, "email")),
        guardians,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookups() -> RefLookups {
        let classes = vec![
            SchoolClass { id: 1, name: "Grade 5".into() },
            SchoolClass { id: 2, name: "Grade 6".into() },
        ];
        let sections = vec![
            Section { id: 10, class_id: 1, name: "A".into() },
            Section { id: 11, class_id: 1, name: "B".into() },
        ];
        RefLookups::new(&classes, &sections)
    }

    #[test]
    fn parses_header_and_rows() {
        let rows = parse_csv("first_name,last_name\nAyesha,Khan\nBilal,Ahmed\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["first_name"], "Ayesha");
        assert_eq!(rows[1]["last_name"], "Ahmed");
    }

    #[test]
    fn header_is_lowercased_and_unquoted() {
        let rows = parse_csv("\"First_Name\",\"Class\"\nAyesha,Grade 5\n");
        assert_eq!(rows[0]["first_name"], "Ayesha");
        assert_eq!(rows[0]["class"], "Grade 5");
    }

    #[test]
    fn drops_rows_with_wrong_field_count() {
        let text = "first_name,last_name\nAyesha,Khan\nBilal\nSara,Ali,extra\nNoor,Fatima\n";
        let rows = parse_csv(text);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn skips_blank_lines() {
        let rows = parse_csv("first_name\n\nAyesha\n   \nBilal\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn strips_surrounding_quotes_from_fields() {
        let rows = parse_csv("first_name,address\n\"Ayesha\",\"12 School Road\"\n");
        assert_eq!(rows[0]["first_name"], "Ayesha");
        assert_eq!(rows[0]["address"], "12 School Road");
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("first_name\n").is_empty());
    }

    #[test]
    fn first_name_falls_back_to_name_token() {
        let rows = parse_csv("name\nAyesha Khan Malik\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.first_name, "Ayesha");
        assert_eq!(student.last_name.as_deref(), Some("Khan Malik"));
    }

    #[test]
    fn maps_without_a_name_column() {
        let rows = parse_csv("first_name\nAyesha\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.first_name, "Ayesha");
        assert_eq!(student.last_name, None);
    }

    #[test]
    fn row_without_first_name_is_dropped() {
        let rows = parse_csv("first_name,last_name\n,Khan\n");
        assert!(map_row(&rows[0], &lookups()).is_none());
    }

    #[test]
    fn class_resolves_case_insensitively() {
        let rows = parse_csv("first_name,class,section\nAyesha,GRADE 5,a\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.class_id, Some(1));
        assert_eq!(student.section_id, Some(10));
    }

    #[test]
    fn unresolved_class_leaves_reference_unset() {
        let rows = parse_csv("first_name,class,section\nAyesha,Grade 12,A\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.class_id, None);
        // Section lookup needs a resolved class.
        assert_eq!(student.section_id, None);
    }

    #[test]
    fn guardian_attached_when_named() {
        let text = "first_name,guardian_name,guardian_relation,guardian_phone\n\
                    Ayesha,Imran Khan,Father,0171000000\n";
        let rows = parse_csv(text);
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.guardians.len(), 1);
        let g = &student.guardians[0];
        assert_eq!(g.name, "Imran Khan");
        assert_eq!(g.relation, "father");
        assert!(g.is_primary);
    }

    #[test]
    fn guardian_relation_defaults() {
        let rows = parse_csv("first_name,guardian_name\nAyesha,Imran Khan\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.guardians[0].relation, "guardian");
    }

    #[test]
    fn aliases_resolve_admission_and_dob() {
        let rows = parse_csv("firstname,admission_number,birthdate\nAyesha,ADM-7,2012-04-17\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.admission_no.as_deref(), Some("ADM-7"));
        assert_eq!(
            student.dob,
            Some(NaiveDate::from_ymd_opt(2012, 4, 17).unwrap())
        );
    }

    #[test]
    fn unparseable_dob_is_left_unset() {
        let rows = parse_csv("first_name,dob\nAyesha,17-04-2012\n");
        let student = map_row(&rows[0], &lookups()).unwrap();
        assert_eq!(student.dob, None);
    }
}
