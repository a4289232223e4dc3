//! Text rendering and form checks for the terminal view.

use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use userdesk_core::{User, UserId, UserTable};

const HEADERS: [&str; 3] = ["ID", "Name", "Email"];
const COLUMN_GAP: &str = "  ";

/// Blank name or email on a submitted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingFields;

impl Display for MissingFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "name and email are required")
    }
}

impl std::error::Error for MissingFields {}

/// Trims a submitted name/email pair; both must be non-empty.
pub fn require_fields<'a>(
    name: &'a str,
    email: &'a str,
) -> Result<(&'a str, &'a str), MissingFields> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() {
        return Err(MissingFields);
    }
    Ok((name, email))
}

/// Renders users as an aligned table followed by the total line.
pub fn render_table(table: &UserTable) -> String {
    let rows: Vec<[String; 3]> = table.users.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    push_line(&mut out, &widths.map(|width| "-".repeat(width)), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&format!("Total users: {}\n", table.total));
    out
}

/// One-line description used by `show` and mutation notices.
pub fn describe_user(user: &User) -> String {
    format!("#{} {} <{}>", user.id, user.name, user.email)
}

/// JSON body for results that carry no user record, such as a deleted id
/// or a missing one.
pub fn outcome_json(status: &str, id: UserId) -> Value {
    json!({ "status": status, "id": id })
}

fn row_cells(user: &User) -> [String; 3] {
    [user.id.to_string(), user.name.clone(), user.email.clone()]
}

fn push_line(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    let last = cells.len() - 1;
    for (index, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if index == last {
            out.push_str(cell);
        } else {
            out.push_str(&format!("{cell:<width$}{COLUMN_GAP}"));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{describe_user, outcome_json, render_table, require_fields, MissingFields};
    use userdesk_core::{User, UserTable};

    fn user(id: i64, name: &str, email: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn require_fields_trims_and_rejects_blanks() {
        assert_eq!(require_fields(" Ana ", "ana@x.com "), Ok(("Ana", "ana@x.com")));
        assert_eq!(require_fields("", "ana@x.com"), Err(MissingFields));
        assert_eq!(require_fields("Ana", "   "), Err(MissingFields));
        assert_eq!(MissingFields.to_string(), "name and email are required");
    }

    #[test]
    fn empty_table_renders_header_and_zero_total() {
        let rendered = render_table(&UserTable {
            users: Vec::new(),
            total: 0,
        });
        assert_eq!(rendered, "ID  Name  Email\n--  ----  -----\nTotal users: 0\n");
    }

    #[test]
    fn columns_align_to_widest_cell() {
        let rendered = render_table(&UserTable {
            users: vec![user(1, "Ana", "ana@x.com"), user(12, "Nguyễn Văn", "n@x")],
            total: 2,
        });
        let expected = "\
ID  Name        Email
--  ----------  ---------
1   Ana         ana@x.com
12  Nguyễn Văn  n@x
Total users: 2
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn describe_user_includes_id_and_fields() {
        assert_eq!(describe_user(&user(4, "Ana", "ana@x.com")), "#4 Ana <ana@x.com>");
    }

    #[test]
    fn outcome_json_carries_status_and_id() {
        let value = outcome_json("not_found", 99);
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["id"], 99);
        assert_eq!(value.as_object().map(|fields| fields.len()), Some(2));
    }
}
