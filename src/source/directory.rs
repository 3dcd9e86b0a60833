//! Employee directory client
//!
//! Pages through the CRM's employee list and turns each active employee of a
//! numbered department into an [`Employee`].

use regex::Regex;
use serde_json::Value;
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::core::Employee;
use crate::error::SourceError;
use crate::source::EmployeeSource;
use crate::source::http::{JsonClient, join_url};

const PAGE_LIMIT: usize = 1000;
/// Safety stop for a directory that never returns a short page
const MAX_PAGES: usize = 100;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(-?й\s*)?отдел").expect("valid department pattern")
});
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)отдел\s*(\d+)").expect("valid department pattern"));

pub(crate) struct DirectoryClient {
    client: JsonClient,
    list_url: String,
    departments: RangeInclusive<u32>,
}

impl DirectoryClient {
    pub(crate) fn new(base_url: &str, token: &str, departments: RangeInclusive<u32>) -> Self {
        Self {
            client: JsonClient::new(),
            list_url: join_url(base_url, &format!("{token}/employees/list")),
            departments,
        }
    }

    fn fetch_raw(&self) -> Result<Vec<Value>, SourceError> {
        let mut all = Vec::new();
        for page in 1..=MAX_PAGES {
            let query = [
                ("page", page.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("mode", "short".to_string()),
                ("order_by", "last_name".to_string()),
                ("order_dir", "asc".to_string()),
            ];
            let body = self.client.get_json(&self.list_url, &query)?;
            let employees = extract_employees(body);
            debug!(page, count = employees.len(), "directory page");

            let short_page = employees.len() < PAGE_LIMIT;
            all.extend(employees);
            if short_page {
                break;
            }
        }
        Ok(all)
    }
}

impl EmployeeSource for DirectoryClient {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn list_employees(&self) -> Result<Vec<Employee>, SourceError> {
        let raw = self.fetch_raw()?;
        let total = raw.len();
        let employees: Vec<Employee> = raw
            .iter()
            .filter_map(|entry| to_employee(entry, &self.departments))
            .collect();
        info!(total, kept = employees.len(), "loaded employee directory");
        Ok(employees)
    }
}

/// Pull the employee list out of whichever envelope this API version uses:
/// a bare list, `result` as a list, `result.{employees,list,data,items}`,
/// `result` as an object of objects, or `data` as a list.
pub(crate) fn extract_employees(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(result) = map.remove("result") {
                return match result {
                    Value::Array(items) => items,
                    Value::Object(mut inner) => {
                        for key in ["employees", "list", "data", "items"] {
                            if let Some(Value::Array(items)) = inner.remove(key) {
                                return items;
                            }
                        }
                        if !inner.is_empty() && inner.values().all(Value::is_object) {
                            inner.into_iter().map(|(_, v)| v).collect()
                        } else {
                            Vec::new()
                        }
                    }
                    _ => Vec::new(),
                };
            }
            match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Department number from names such as "5 отдел", "5-й отдел", "Отдел 5"
pub(crate) fn parse_department_number(name: &str) -> Option<u32> {
    let name = name.trim();
    LEADING_NUMBER
        .captures(name)
        .or_else(|| TRAILING_NUMBER.captures(name))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn text_field(entry: &Value, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Convert one directory entry; `None` for inactive employees and those
/// outside the department range.
pub(crate) fn to_employee(entry: &Value, departments: &RangeInclusive<u32>) -> Option<Employee> {
    let active = entry
        .get("is_active")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    if !active {
        return None;
    }

    let department_name = match entry.get("department") {
        Some(Value::Object(dept)) => dept.get("name").and_then(Value::as_str).unwrap_or(""),
        Some(Value::String(name)) => name.as_str(),
        _ => "",
    };
    let department = parse_department_number(department_name)?;
    if !departments.contains(&department) {
        return None;
    }

    let phone = text_field(entry, "phone")
        .or_else(|| text_field(entry, "second_phone"))
        .or_else(|| text_field(entry, "id"))
        .unwrap_or_default();
    let name = [text_field(entry, "last_name"), text_field(entry, "first_name")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    Some(Employee {
        name,
        phone,
        department: department.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_department_number_variants() {
        assert_eq!(parse_department_number("5 отдел"), Some(5));
        assert_eq!(parse_department_number("12-й отдел продаж"), Some(12));
        assert_eq!(parse_department_number("3й Отдел"), Some(3));
        assert_eq!(parse_department_number("Отдел 7"), Some(7));
        assert_eq!(parse_department_number("Отдел продаж"), None);
        assert_eq!(parse_department_number("Бухгалтерия"), None);
        assert_eq!(parse_department_number(""), None);
    }

    #[test]
    fn extract_employees_shapes() {
        let one = json!({"id": 1});
        assert_eq!(extract_employees(json!([one])).len(), 1);
        assert_eq!(extract_employees(json!({"result": [one, one]})).len(), 2);
        assert_eq!(
            extract_employees(json!({"result": {"items": [one], "total": 1}})).len(),
            1
        );
        assert_eq!(
            extract_employees(json!({"result": {"17": one, "18": one}})).len(),
            2
        );
        assert_eq!(extract_employees(json!({"data": [one]})).len(), 1);
        assert!(extract_employees(json!({"data": "nope"})).is_empty());
        assert!(extract_employees(json!({"result": {"total": 0}})).is_empty());
        assert!(extract_employees(json!(null)).is_empty());
    }

    #[test]
    fn to_employee_builds_roster_entry() {
        let entry = json!({
            "id": 42,
            "last_name": "Ivanova",
            "first_name": "Anna",
            "phone": "",
            "second_phone": "89991234567",
            "is_active": true,
            "department": {"name": "5-й отдел"}
        });
        let employee = to_employee(&entry, &(1..=18)).unwrap();
        assert_eq!(employee.name, "Ivanova Anna");
        assert_eq!(employee.phone, "89991234567");
        assert_eq!(employee.department, "5");
    }

    #[test]
    fn to_employee_phone_falls_back_to_id() {
        let entry = json!({"id": 42, "last_name": "Ivanova", "department": "Отдел 2"});
        let employee = to_employee(&entry, &(1..=18)).unwrap();
        assert_eq!(employee.phone, "42");
        assert_eq!(employee.name, "Ivanova");
    }

    #[test]
    fn to_employee_skips_inactive_and_out_of_range() {
        let inactive = json!({"is_active": false, "department": {"name": "1 отдел"}});
        assert!(to_employee(&inactive, &(1..=18)).is_none());

        let out_of_range = json!({"department": {"name": "19 отдел"}});
        assert!(to_employee(&out_of_range, &(1..=18)).is_none());

        let unnumbered = json!({"department": {"name": "Администрация"}});
        assert!(to_employee(&unnumbered, &(1..=18)).is_none());
    }
}
