//! Roster preparation
//!
//! Cleans the directory's employee list before any call history is fetched.

use tracing::debug;

use crate::consts::PHONE_SENTINELS;
use crate::core::types::{Employee, department_sort_key};
use crate::error::AppError;

/// Which departments a report covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum DepartmentScope {
    #[default]
    All,
    Only(String),
}

impl DepartmentScope {
    pub(crate) fn from_option(department: Option<&str>) -> Self {
        match department.map(str::trim) {
            None | Some("") => DepartmentScope::All,
            Some(id) if id.eq_ignore_ascii_case("all") => DepartmentScope::All,
            Some(id) => DepartmentScope::Only(normalize_department(id).unwrap_or_else(|| id.to_string())),
        }
    }
}

/// Every digit of the name, leading zeros dropped: "Отдел 05" -> "5",
/// "5 отдел 2" -> "52"
pub(crate) fn normalize_department(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

/// True when the phone is empty or a directory placeholder
pub(crate) fn is_placeholder_phone(phone: &str) -> bool {
    let phone = phone.trim();
    phone.is_empty()
        || PHONE_SENTINELS
            .iter()
            .any(|sentinel| phone.to_lowercase() == *sentinel)
}

/// Normalize departments, drop unusable entries and apply the scope.
pub(crate) fn prepare_roster(
    employees: Vec<Employee>,
    scope: &DepartmentScope,
) -> Result<Vec<Employee>, AppError> {
    let mut roster: Vec<Employee> = employees
        .into_iter()
        .filter_map(|mut employee| {
            let Some(department) = normalize_department(&employee.department) else {
                debug!(name = %employee.name, department = %employee.department, "no department number");
                return None;
            };
            if is_placeholder_phone(&employee.phone) {
                debug!(name = %employee.name, "no phone");
                return None;
            }
            employee.department = department;
            employee.phone = employee.phone.trim().to_string();
            Some(employee)
        })
        .collect();

    if let DepartmentScope::Only(id) = scope {
        if !roster.iter().any(|employee| &employee.department == id) {
            return Err(AppError::UnknownDepartment {
                input: id.clone(),
                available: available_departments(&roster).join(", "),
            });
        }
        roster.retain(|employee| &employee.department == id);
    }

    Ok(roster)
}

/// Distinct department ids in numeric order
pub(crate) fn available_departments(roster: &[Employee]) -> Vec<String> {
    let mut ids: Vec<&str> = roster.iter().map(|e| e.department.as_str()).collect();
    ids.sort_by_key(|id| department_sort_key(id));
    ids.dedup();
    ids.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, phone: &str, department: &str) -> Employee {
        Employee {
            name: name.to_string(),
            phone: phone.to_string(),
            department: department.to_string(),
        }
    }

    #[test]
    fn normalize_department_variants() {
        assert_eq!(normalize_department("5").as_deref(), Some("5"));
        assert_eq!(normalize_department("Отдел 05").as_deref(), Some("5"));
        assert_eq!(normalize_department("12-й отдел продаж").as_deref(), Some("12"));
        assert_eq!(normalize_department("00").as_deref(), Some("0"));
        assert_eq!(normalize_department("5 отдел 2").as_deref(), Some("52"));
        assert_eq!(normalize_department("Бухгалтерия"), None);
        assert_eq!(normalize_department(""), None);
    }

    #[test]
    fn placeholder_phones() {
        assert!(is_placeholder_phone(""));
        assert!(is_placeholder_phone("   "));
        assert!(is_placeholder_phone("Нет данных"));
        assert!(is_placeholder_phone("NO DATA"));
        assert!(!is_placeholder_phone("+79991234567"));
    }

    #[test]
    fn prepare_drops_unusable_entries() {
        let roster = prepare_roster(
            vec![
                employee("Ivanov Ivan", "+79990000001", "Отдел 05"),
                employee("Petrov Petr", "нет данных", "5"),
                employee("Sidorov Sid", "", "5"),
                employee("Kuznetsova Anna", "+79990000004", "Администрация"),
                employee("Smirnov Oleg", " 89990000005 ", "2"),
            ],
            &DepartmentScope::All,
        )
        .unwrap();

        let names: Vec<_> = roster.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ivanov Ivan", "Smirnov Oleg"]);
        assert_eq!(roster[0].department, "5");
        assert_eq!(roster[1].phone, "89990000005");
    }

    #[test]
    fn prepare_applies_scope() {
        let employees = vec![
            employee("A", "+79990000001", "1"),
            employee("B", "+79990000002", "5"),
            employee("C", "+79990000003", "5"),
        ];
        let roster =
            prepare_roster(employees, &DepartmentScope::Only("5".to_string())).unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.iter().all(|e| e.department == "5"));
    }

    #[test]
    fn prepare_unknown_department() {
        let employees = vec![
            employee("A", "+79990000001", "10"),
            employee("B", "+79990000002", "2"),
        ];
        let err =
            prepare_roster(employees, &DepartmentScope::Only("7".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Department 7 not found (available: 2, 10)");
    }

    #[test]
    fn scope_from_option() {
        assert_eq!(DepartmentScope::from_option(None), DepartmentScope::All);
        assert_eq!(DepartmentScope::from_option(Some("all")), DepartmentScope::All);
        assert_eq!(
            DepartmentScope::from_option(Some("05")),
            DepartmentScope::Only("5".to_string())
        );
    }
}
