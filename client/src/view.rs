//! Derived view over a fetched roster.
//!
//! Everything here is recomputed from scratch on each render. That is linear
//! in the roster size; a larger directory would want a search index and
//! per-department buckets instead.

use std::collections::HashSet;

use entity::Employee;

/// Department selection. `All` is the sentinel that admits every record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(String),
}

impl DepartmentFilter {
    pub const ALL_LABEL: &'static str = "All";

    /// `"all"` in any case selects the sentinel; anything else is taken verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::ALL_LABEL) {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => Self::ALL_LABEL,
            Self::Only(name) => name,
        }
    }

    /// Exact, case-sensitive match against the record's department.
    pub fn admits(&self, employee: &Employee) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => employee.department == *name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub department: DepartmentFilter,
}

impl Filters {
    pub fn is_default(&self) -> bool {
        self.search.is_empty() && self.department == DepartmentFilter::All
    }
}

/// `needle` must already be lowercased.
fn matches_search(employee: &Employee, needle: &str) -> bool {
    needle.is_empty()
        || employee.name.to_lowercase().contains(needle)
        || employee.role.to_lowercase().contains(needle)
}

/// The sentinel followed by each distinct department in first-seen order.
pub fn departments(employees: &[Employee]) -> Vec<DepartmentFilter> {
    let mut seen = HashSet::new();
    std::iter::once(DepartmentFilter::All)
        .chain(
            employees
                .iter()
                .filter(|employee| seen.insert(employee.department.as_str()))
                .map(|employee| DepartmentFilter::Only(employee.department.clone())),
        )
        .collect()
}

pub fn filter<'a>(employees: &'a [Employee], filters: &Filters) -> Vec<&'a Employee> {
    let needle = filters.search.to_lowercase();
    employees
        .iter()
        .filter(|employee| matches_search(employee, &needle) && filters.department.admits(employee))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SalaryStats {
    pub count: usize,
    pub total: f64,
    /// Rounded to the nearest whole unit; zero for an empty set.
    pub average: u64,
}

impl SalaryStats {
    pub fn over<'a>(employees: impl IntoIterator<Item = &'a Employee>) -> Self {
        let (count, total) = employees
            .into_iter()
            .fold((0usize, 0.0f64), |(count, total), employee| {
                (count + 1, total + employee.salary)
            });
        let average = if count == 0 {
            0
        } else {
            (total / count as f64).round() as u64
        };
        Self {
            count,
            total,
            average,
        }
    }
}

/// Owned result of applying `Filters` to a roster.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectoryView {
    pub filters: Filters,
    pub departments: Vec<DepartmentFilter>,
    pub employees: Vec<Employee>,
    pub stats: SalaryStats,
}

impl DirectoryView {
    pub fn compute(roster: &[Employee], filters: &Filters) -> Self {
        let matched = filter(roster, filters);
        let stats = SalaryStats::over(matched.iter().copied());
        Self {
            filters: filters.clone(),
            departments: departments(roster),
            employees: matched.into_iter().cloned().collect(),
            stats,
        }
    }

    /// Position of `department` in the department list, sentinel included.
    pub fn department_index(&self, department: &str) -> Option<usize> {
        self.departments
            .iter()
            .position(|entry| matches!(entry, DepartmentFilter::Only(name) if name == department))
    }
}
