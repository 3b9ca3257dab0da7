//! Client-side task views.
//!
//! Everything here is a pure projection over an in-memory task slice: pick
//! the tasks that belong to a view, narrow them with a [`Query`], sort them for
//! display and optionally group them by date.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Area, Project, Task, TaskStatus};
use crate::query::{DueDate, Filter, Operator, Query};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Inbox,
    #[default]
    Today,
    Upcoming,
    Someday,
    Completed,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Inbox,
        View::Today,
        View::Upcoming,
        View::Someday,
        View::Completed,
    ];
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Inbox => write!(f, "inbox"),
            View::Today => write!(f, "today"),
            View::Upcoming => write!(f, "upcoming"),
            View::Someday => write!(f, "someday"),
            View::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid view: {0} (expected inbox, today, upcoming, someday or completed)")]
pub struct ParseViewError(String);

impl FromStr for View {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inbox" => Ok(View::Inbox),
            "today" => Ok(View::Today),
            "upcoming" => Ok(View::Upcoming),
            "someday" => Ok(View::Someday),
            "completed" | "logbook" => Ok(View::Completed),
            _ => Err(ParseViewError(s.to_string())),
        }
    }
}

/// Lookup context for projecting tasks: the reference date plus the projects
/// and areas tasks can belong to.
#[derive(Debug, Clone)]
pub struct Projection {
    today: NaiveDate,
    projects: HashMap<Uuid, Project>,
    areas: HashMap<Uuid, Area>,
}

impl Projection {
    pub fn new(
        today: NaiveDate,
        projects: impl IntoIterator<Item = Project>,
        areas: impl IntoIterator<Item = Area>,
    ) -> Self {
        Self {
            today,
            projects: projects.into_iter().map(|p| (p.id, p)).collect(),
            areas: areas.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn project_name(&self, id: Uuid) -> Option<&str> {
        self.projects.get(&id).map(|p| p.name.as_str())
    }

    pub fn area_name(&self, id: Uuid) -> Option<&str> {
        self.areas.get(&id).map(|a| a.name.as_str())
    }

    /// The area a task belongs to, either directly or through its project.
    pub fn area_of(&self, task: &Task) -> Option<Uuid> {
        task.area_id.or_else(|| {
            task.project_id
                .and_then(|id| self.projects.get(&id))
                .and_then(|p| p.area_id)
        })
    }

    fn is_due_or_scheduled_by_today(&self, task: &Task) -> bool {
        let today = self.today;
        task.scheduled_date.is_some_and(|d| d <= today) || task.due_date.is_some_and(|d| d <= today)
    }

    pub fn in_view(&self, task: &Task, view: View) -> bool {
        if task.is_deleted {
            return false;
        }
        match view {
            View::Inbox => {
                task.is_pending()
                    && !task.is_someday
                    && task.project_id.is_none()
                    && task.area_id.is_none()
                    && task.scheduled_date.is_none()
            }
            View::Today => {
                task.is_pending() && !task.is_someday && self.is_due_or_scheduled_by_today(task)
            }
            View::Upcoming => {
                task.is_pending()
                    && !task.is_someday
                    && !self.is_due_or_scheduled_by_today(task)
                    && task.agenda_date().is_some()
            }
            View::Someday => task.is_pending() && task.is_someday,
            View::Completed => task.status == TaskStatus::Completed,
        }
    }

    /// Tasks in `view`, sorted the way the view displays them.
    pub fn view<'a>(&self, tasks: &'a [Task], view: View) -> Vec<&'a Task> {
        let mut selected: Vec<&Task> = tasks.iter().filter(|t| self.in_view(t, view)).collect();
        match view {
            View::Inbox | View::Someday => selected.sort_by_key(|t| t.created_at),
            View::Today => selected.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| cmp_dates_none_last(a.due_date, b.due_date))
                    .then_with(|| a.created_at.cmp(&b.created_at))
            }),
            View::Upcoming => selected.sort_by(|a, b| {
                cmp_dates_none_last(a.agenda_date(), b.agenda_date())
                    .then_with(|| b.priority.cmp(&a.priority))
                    .then_with(|| a.created_at.cmp(&b.created_at))
            }),
            View::Completed => selected.sort_by_key(|t| Reverse(t.completed_at)),
        }
        selected
    }

    /// Live tasks filed in a project, pending before completed.
    pub fn in_project<'a>(&self, tasks: &'a [Task], project_id: Uuid) -> Vec<&'a Task> {
        self.collect_members(tasks, |t| t.project_id == Some(project_id))
    }

    /// Live tasks in an area, directly or through one of its projects.
    pub fn in_area<'a>(&self, tasks: &'a [Task], area_id: Uuid) -> Vec<&'a Task> {
        self.collect_members(tasks, |t| self.area_of(t) == Some(area_id))
    }

    fn collect_members<'a>(&self, tasks: &'a [Task], member: impl Fn(&Task) -> bool) -> Vec<&'a Task> {
        let mut selected: Vec<&Task> = tasks
            .iter()
            .filter(|t| !t.is_deleted && member(*t))
            .collect();
        selected.sort_by(|a, b| {
            (a.status == TaskStatus::Completed)
                .cmp(&(b.status == TaskStatus::Completed))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        selected
    }

    pub fn matches(&self, task: &Task, query: &Query) -> bool {
        match query {
            Query::Filter(filter) => self.matches_filter(task, filter),
            Query::Not(inner) => !self.matches(task, inner),
            Query::Binary { op, left, right } => match op {
                Operator::And => self.matches(task, left) && self.matches(task, right),
                Operator::Or => self.matches(task, left) || self.matches(task, right),
            },
        }
    }

    fn matches_filter(&self, task: &Task, filter: &Filter) -> bool {
        match filter {
            Filter::Project(name) => task
                .project_id
                .and_then(|id| self.project_name(id))
                .is_some_and(|n| n.eq_ignore_ascii_case(name)),
            Filter::Area(name) => self
                .area_of(task)
                .and_then(|id| self.area_name(id))
                .is_some_and(|n| n.eq_ignore_ascii_case(name)),
            Filter::Status(status) => task.status == *status,
            Filter::Priority(priority) => task.priority == *priority,
            Filter::Due(due) => match due {
                DueDate::Today => task.due_date == Some(self.today),
                DueDate::Tomorrow => {
                    task.due_date.is_some() && task.due_date == self.today.checked_add_days(Days::new(1))
                }
                DueDate::Overdue => task.is_overdue(self.today),
                DueDate::None => task.due_date.is_none(),
            },
            Filter::Before(date) => task.due_date.is_some_and(|d| d < *date),
            Filter::After(date) => task.due_date.is_some_and(|d| d > *date),
        }
    }

    /// Keeps the tasks that satisfy `query`; `None` keeps everything.
    pub fn filter<'a>(&self, tasks: Vec<&'a Task>, query: Option<&Query>) -> Vec<&'a Task> {
        match query {
            Some(query) => tasks.into_iter().filter(|t| self.matches(t, query)).collect(),
            None => tasks,
        }
    }
}

fn cmp_dates_none_last(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Groups tasks by agenda date in ascending date order. Tasks without a date
/// are left out; order within a group is preserved.
pub fn group_by_agenda_date<'a>(tasks: &[&'a Task]) -> Vec<(NaiveDate, Vec<&'a Task>)> {
    let mut groups: BTreeMap<NaiveDate, Vec<&'a Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.agenda_date() {
            groups.entry(date).or_default().push(*task);
        }
    }
    groups.into_iter().collect()
}
