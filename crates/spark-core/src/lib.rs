//! # Spark Core Library
//!
//! The data and scheduling layer of the Spark task manager.
//!
//! ## Core Modules
//!
//! - [`calendar`]: Sunday-first month grids and month navigation
//! - [`date_query`]: Fuzzy date text matching and suggestions
//! - [`picker`]: Per-field date picker state
//! - [`recurrence`]: Repeat rules, their summaries and RRULE export
//! - [`projection`]: Inbox, Today, Upcoming, Someday and Completed views
//! - [`query`]: Filter expressions evaluated by [`projection`]
//! - [`db`]: Database connection and migration management
//! - [`auth`]: Accounts and the signed-in session
//! - [`repository`]: Owner-scoped data access with the Repository pattern
//! - [`notify`]: In-process change notifications
//! - [`cache`]: Task list cache invalidated by change notifications
//! - [`timezone`]: Timezone validation and local day bounds
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use spark_core::{
//!     auth, db,
//!     models::NewTaskData,
//!     notify::ChangeNotifier,
//!     projection::{Projection, View},
//!     repository::{AreaRepository, ProjectRepository, SqliteRepository, TaskRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("spark.db").await?;
//!     auth::sign_in_anonymously(&pool).await?;
//!     let repo = SqliteRepository::for_current_user(pool, ChangeNotifier::default()).await?;
//!
//!     let today = chrono::Local::now().date_naive();
//!     repo.add_task(NewTaskData {
//!         title: "Water the plants".to_string(),
//!         scheduled_date: Some(today),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     let tasks = repo.list_tasks().await?;
//!     let projection = Projection::new(today, repo.list_projects().await?, repo.list_areas().await?);
//!     for task in projection.view(&tasks, View::Today) {
//!         println!("{}", task.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod calendar;
pub mod date_query;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod picker;
pub mod projection;
pub mod query;
pub mod recurrence;
pub mod repository;
pub mod timezone;
