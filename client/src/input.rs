//! Line commands accepted by the interactive client.

use crate::{dashboard::Dashboard, view::DepartmentFilter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// An empty term clears the search.
    Search(String),
    Department(DepartmentFilter),
    /// Lists the departments present in the fetched roster.
    Departments,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  search <text>   filter by name or role (no text clears)
  dept <name>     show one department (`dept all` shows every department)
  depts           list the departments in the directory
  reset           clear the search and department filter
  help            show this message
  quit            exit";

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match command.to_ascii_lowercase().as_str() {
            "search" | "s" => Self::Search(rest.to_string()),
            "dept" | "department" | "d" => Self::Department(DepartmentFilter::parse(rest)),
            "depts" | "departments" => Self::Departments,
            "reset" | "r" => Self::Reset,
            "help" | "?" | "" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }

    /// Applies the command; returns `false` once the session should end.
    pub fn apply(self, dashboard: &mut Dashboard) -> bool {
        match self {
            Self::Search(term) => dashboard.set_search(term),
            Self::Department(department) => dashboard.select_department(department),
            Self::Reset => dashboard.reset(),
            Self::Quit => return false,
            Self::Departments | Self::Help | Self::Unknown(_) => {}
        }
        true
    }
}
