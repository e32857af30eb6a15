use std::fmt::Write as _;

use colored::{Color, Colorize};

use crate::{dashboard::Screen, view::DirectoryView};

const PALETTE: [Color; 6] = [
    Color::Blue,
    Color::Green,
    Color::Magenta,
    Color::Yellow,
    Color::Cyan,
    Color::Red,
];

/// Renders a [`Screen`] as plain text, optionally with ANSI colors.
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, screen: &Screen) -> String {
        match screen {
            Screen::Loading => "Loading employees...\n".to_string(),
            Screen::NoMatches(view) => {
                let mut out = self.header(view);
                out.push_str("\nNo employees match the current filters.\n");
                out.push_str("Type `reset` to clear the search and department filter.\n");
                out
            }
            Screen::Listing(view) => {
                let mut out = self.header(view);
                out.push('\n');
                out.push_str(&self.table(view));
                out
            }
        }
    }

    /// One department per line, the selected one marked with `*`.
    pub fn departments(&self, screen: &Screen) -> String {
        let view = match screen {
            Screen::Loading => return "Departments are not loaded yet.\n".to_string(),
            Screen::NoMatches(view) | Screen::Listing(view) => view,
        };
        let mut out = String::new();
        for (index, department) in view.departments.iter().enumerate() {
            let marker = if *department == view.filters.department {
                '*'
            } else {
                ' '
            };
            let color = index
                .checked_sub(1)
                .map(|slot| PALETTE[slot % PALETTE.len()]);
            let _ = writeln!(out, "{marker} {}", self.paint(department.label(), color, false));
        }
        out
    }

    fn header(&self, view: &DirectoryView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Employees: {} | Total salary: {} | Average salary: {}",
            view.stats.count,
            money(view.stats.total),
            money(view.stats.average as f64),
        );
        let tabs = view
            .departments
            .iter()
            .map(|department| {
                if *department == view.filters.department {
                    self.paint(&format!("[{}]", department.label()), None, true)
                } else {
                    department.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "Departments: {tabs}");
        if !view.filters.search.is_empty() {
            let _ = writeln!(out, "Search: \"{}\"", view.filters.search);
        }
        out
    }

    fn table(&self, view: &DirectoryView) -> String {
        let width = |field: fn(&entity::Employee) -> usize| {
            view.employees.iter().map(field).max().unwrap_or(0)
        };
        let id_w = width(|e| e.display_id().len());
        let name_w = width(|e| e.name.chars().count());
        let role_w = width(|e| e.role.chars().count());
        let dept_w = width(|e| e.department.chars().count());

        let mut out = String::new();
        for employee in &view.employees {
            let department = format!("{:<dept_w$}", employee.department);
            let color = view
                .department_index(&employee.department)
                .map(|index| PALETTE[index.saturating_sub(1) % PALETTE.len()]);
            let _ = writeln!(
                out,
                "{:<id_w$}  {:<name_w$}  {:<role_w$}  {}  {:>12}",
                employee.display_id(),
                employee.name,
                employee.role,
                self.paint(&department, color, false),
                money(employee.salary),
            );
        }
        out
    }

    fn paint(&self, text: &str, color: Option<Color>, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let mut styled = text.normal();
        if let Some(color) = color {
            styled = styled.color(color);
        }
        if bold {
            styled = styled.bold();
        }
        styled.to_string()
    }
}

/// Whole currency units with thousands separators, e.g. `$1,234,567`.
fn money(amount: f64) -> String {
    let whole = amount.round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
