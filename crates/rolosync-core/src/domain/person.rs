use serde::{Deserialize, Serialize};

// Spreadsheet column layout: row 1 is the header, data rows follow.
// Columns are 0-indexed within a row.
pub const NAME_COLUMN: usize = 1;
pub const EMAIL_COLUMN: usize = 3;
pub const PHONE_COLUMN: usize = 4;
pub const MIN_ROW_COLUMNS: usize = 5;

/// One row of source-of-truth contact data from the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

impl Person {
    /// Builds a record from a raw spreadsheet row. Rows with fewer than
    /// [`MIN_ROW_COLUMNS`] cells are rejected.
    pub fn from_row(row: &[String]) -> Option<Person> {
        if row.len() < MIN_ROW_COLUMNS {
            return None;
        }
        Some(Person {
            name: row[NAME_COLUMN].clone(),
            email: row[EMAIL_COLUMN].clone(),
            phone_number: row[PHONE_COLUMN].clone(),
        })
    }

    pub fn with_phone_number(self, phone_number: impl Into<String>) -> Person {
        Person {
            phone_number: phone_number.into(),
            ..self
        }
    }

    /// True when every field is empty after trimming. Blank records never
    /// produce a remote create.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.email.trim().is_empty()
            && self.phone_number.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Person;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn from_row_reads_fixed_columns() {
        let person = Person::from_row(&row(&[
            "1",
            "Ada Lovelace",
            "analyst",
            "ada@example.com",
            "302-555-0100",
        ]))
        .expect("person");
        assert_eq!(person.name, "Ada Lovelace");
        assert_eq!(person.email, "ada@example.com");
        assert_eq!(person.phone_number, "302-555-0100");
    }

    #[test]
    fn from_row_rejects_short_rows() {
        assert!(Person::from_row(&row(&["1", "Ada", "analyst", "ada@example.com"])).is_none());
        assert!(Person::from_row(&[]).is_none());
    }

    #[test]
    fn with_phone_number_replaces_only_phone() {
        let person = Person {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone_number: "302-555-0100".to_string(),
        };
        let replaced = person.clone().with_phone_number("(302) 555-0100");
        assert_eq!(replaced.name, person.name);
        assert_eq!(replaced.email, person.email);
        assert_eq!(replaced.phone_number, "(302) 555-0100");
    }

    #[test]
    fn is_blank_requires_all_fields_empty() {
        let blank = Person {
            name: "  ".to_string(),
            email: String::new(),
            phone_number: "\t".to_string(),
        };
        assert!(blank.is_blank());
        assert!(!blank.with_phone_number("302-555-0100").is_blank());
    }
}
