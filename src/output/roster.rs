use comfy_table::{Cell, Color};
use serde_json::json;

use crate::core::{Employee, department_sort_key};
use crate::output::format::{create_styled_table, header_cell, right_cell, styled_cell};

fn sorted(roster: &[Employee]) -> Vec<&Employee> {
    let mut employees: Vec<_> = roster.iter().collect();
    employees.sort_by(|a, b| {
        department_sort_key(&a.department)
            .cmp(&department_sort_key(&b.department))
            .then_with(|| a.name.cmp(&b.name))
    });
    employees
}

pub(crate) fn output_roster_json(roster: &[Employee]) -> String {
    let employees: Vec<_> = sorted(roster)
        .into_iter()
        .map(|e| {
            json!({
                "name": e.name,
                "phone": e.phone,
                "department": e.department,
            })
        })
        .collect();
    serde_json::to_string_pretty(&employees).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn build_roster_table(roster: &[Employee], use_color: bool) -> comfy_table::Table {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Department", use_color),
        header_cell("Employee", use_color),
        header_cell("Phone", use_color),
    ]);
    for employee in sorted(roster) {
        table.add_row(vec![
            right_cell(&employee.department, None, false),
            Cell::new(&employee.name),
            Cell::new(&employee.phone),
        ]);
    }
    let cyan = use_color.then_some(Color::Cyan);
    table.add_row(vec![
        styled_cell("TOTAL", cyan, true),
        styled_cell(&format!("{} employees", roster.len()), cyan, true),
        Cell::new(""),
    ]);
    table
}

pub(crate) fn print_roster_table(roster: &[Employee], use_color: bool) {
    println!("{}", build_roster_table(roster, use_color));
}
